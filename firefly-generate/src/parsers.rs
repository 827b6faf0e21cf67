use std::path::Path;

use anyhow::{Context, Result, bail};
use firefly_data::{QuantityKind, SampleTableRecord, TimedDataEntry, TimedDataRecord};

fn parse_kind(value: &str) -> Result<QuantityKind> {
    match value.trim().to_lowercase().as_str() {
        "flow_rate" => Ok(QuantityKind::FlowRate),
        "specific_impulse" => Ok(QuantityKind::SpecificImpulse),
        other => bail!("unknown quantity kind '{other}'"),
    }
}

/// Parse one curve file.
///
/// Lines starting with `#` are comments. An optional `kind:` header selects
/// the quantity (flow rate when absent); every other non-empty line is a
/// `time value` pair.
pub fn parse_curve(name: &str, content: &str) -> Result<TimedDataEntry> {
    let mut kind = QuantityKind::FlowRate;
    let mut x = Vec::new();
    let mut y = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(value) = line.strip_prefix("kind:") {
            kind = parse_kind(value).with_context(|| format!("{name}:{}", lineno + 1))?;
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 2 {
            bail!(
                "{name}:{}: expected 'time value', got {} columns",
                lineno + 1,
                parts.len()
            );
        }
        let t: f64 = parts[0]
            .parse()
            .with_context(|| format!("{name}:{}: bad time '{}'", lineno + 1, parts[0]))?;
        let v: f64 = parts[1]
            .parse()
            .with_context(|| format!("{name}:{}: bad value '{}'", lineno + 1, parts[1]))?;
        x.push(t);
        y.push(v);
    }

    if x.is_empty() {
        bail!("{name}: no samples");
    }

    Ok(TimedDataEntry {
        name: name.to_string(),
        kind,
        data: TimedDataRecord::Variable(SampleTableRecord { x, y }),
    })
}

/// Parse every `*.txt` file of `dir`, sorted by name.
pub fn parse_dir(dir: &Path) -> Result<Vec<TimedDataEntry>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("failed to read {dir:?}"))? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("invalid file name {path:?}"))?
            .to_string();
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {path:?}"))?;
        entries.push(parse_curve(&name, &content)?);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_curve() {
        let content = "# motor A\nkind: specific_impulse\n0 300\n10.0   310\n\n20 320\n";
        let entry = parse_curve("a", content).unwrap();
        assert_eq!(entry.name, "a");
        assert_eq!(entry.kind, QuantityKind::SpecificImpulse);
        assert_eq!(
            entry.data,
            TimedDataRecord::Variable(SampleTableRecord {
                x: vec![0.0, 10.0, 20.0],
                y: vec![300.0, 310.0, 320.0],
            })
        );
    }

    #[test]
    fn test_default_kind_is_flow_rate() {
        let entry = parse_curve("b", "0 1\n1 2\n").unwrap();
        assert_eq!(entry.kind, QuantityKind::FlowRate);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_curve("c", "0 1 2\n").is_err());
        assert!(parse_curve("c", "0 abc\n").is_err());
        assert!(parse_curve("c", "kind: thrust\n0 1\n").is_err());
        assert!(parse_curve("c", "# only comments\n").is_err());
    }
}
