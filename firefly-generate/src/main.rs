mod parsers;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use firefly::{Dataset, FlowRate, SpecificImpulse};
use firefly_data::{QuantityKind, TimedDataset, VersionRecord};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "firefly-generate")]
#[command(about = "Pack propulsion curve files into a compressed firefly dataset")]
#[command(version)]
struct Args {
    /// Directory holding one `*.txt` curve file per entry
    input_dir: PathBuf,

    /// Output file
    output: PathBuf,

    /// Version tag stored in the dataset
    #[arg(long, default_value = env!("CARGO_PKG_VERSION"))]
    tag: String,

    /// zstd compression level
    #[arg(long, default_value_t = 19)]
    level: i32,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    if !args.input_dir.is_dir() {
        bail!("input directory not found at {:?}", args.input_dir);
    }

    info!("parsing curve files from {:?}", args.input_dir);
    let entries = parsers::parse_dir(&args.input_dir)?;
    if entries.is_empty() {
        bail!("no *.txt curve files in {:?}", args.input_dir);
    }

    for entry in &entries {
        match entry.kind {
            QuantityKind::FlowRate => {
                let flow = FlowRate::from_record(&entry.data)
                    .with_context(|| format!("invalid flow rate '{}'", entry.name))?;
                info!(name = %entry.name, total_mass = flow.total_mass(), "flow rate");
            }
            QuantityKind::SpecificImpulse => {
                SpecificImpulse::from_record(&entry.data)
                    .with_context(|| format!("invalid specific impulse '{}'", entry.name))?;
                info!(name = %entry.name, "specific impulse");
            }
        }
    }

    let data = TimedDataset {
        version: VersionRecord {
            tag: args.tag.clone(),
            notes: format!("generated from {}", args.input_dir.display()),
        },
        entries,
    };

    let serialized = postcard::to_allocvec(&data).context("postcard serialization failed")?;
    info!(bytes = serialized.len(), "serialized with postcard");

    let compressed =
        zstd::encode_all(&serialized[..], args.level).context("zstd compression failed")?;
    info!(
        bytes = compressed.len(),
        ratio = %format!("{:.1}x", serialized.len() as f64 / compressed.len() as f64),
        "compressed with zstd (level {})",
        args.level
    );

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {parent:?}"))?;
    }
    std::fs::write(&args.output, &compressed)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    info!("wrote {:?}", args.output);

    // round trip through the library decoder
    let decoded = Dataset::from_compressed(&compressed).context("round-trip decode failed")?;
    if decoded.raw() != &data {
        bail!("round-trip mismatch");
    }
    info!(entries = decoded.raw().entries.len(), "round-trip OK");
    Ok(())
}
