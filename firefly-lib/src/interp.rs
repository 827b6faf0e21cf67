//! Piecewise-linear primitives shared by [`Interp1D`](crate::Interp1D).
//!
//! These functions assume `xp` is non-empty, strictly increasing and the same
//! length as `fp`. The table type checks that once at construction so the hot
//! path here stays free of validation.

/// Linear interpolation (equivalent to numpy.interp).
///
/// Interpolates values from `(xp, fp)` at points `x`.
/// Values outside the range are clamped to the boundary values.
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    x.iter().map(|&xi| interp_one(xi, xp, fp)).collect()
}

/// Interpolate a single value, clamping outside `[xp[0], xp[n-1]]`.
pub fn interp_one(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[xp.len() - 1] {
        return fp[fp.len() - 1];
    }
    interior(x, xp, fp)
}

/// Interpolate a single value, continuing the edge segment's slope outside
/// `[xp[0], xp[n-1]]`.
///
/// A single-sample table has no segment to extend and returns `fp[0]`.
pub fn interp_one_linear(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len();
    if n == 1 {
        return fp[0];
    }
    if x < xp[0] {
        return segment(x, xp, fp, 0);
    }
    if x > xp[n - 1] {
        return segment(x, xp, fp, n - 2);
    }
    if x == xp[n - 1] {
        return fp[n - 1];
    }
    interior(x, xp, fp)
}

/// Trapezoidal rule over `(x, y)` samples (equivalent to numpy.trapz).
///
/// Fewer than two samples integrate to zero.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| 0.5 * (xs[1] - xs[0]) * (ys[0] + ys[1]))
        .sum()
}

// x is known to satisfy xp[0] <= x < xp[n-1].
fn interior(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    // Binary search for the bracket
    let idx = xp.partition_point(|&v| v < x);
    if idx == 0 {
        return fp[0];
    }

    // Check for exact match
    if (xp[idx] - x).abs() < f64::EPSILON * xp[idx].abs() {
        return fp[idx];
    }

    segment(x, xp, fp, idx - 1)
}

#[inline]
fn segment(x: f64, xp: &[f64], fp: &[f64], lo: usize) -> f64 {
    let t = (x - xp[lo]) / (xp[lo + 1] - xp[lo]);
    fp[lo] + t * (fp[lo + 1] - fp[lo])
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_interp_basic() {
        let xp = vec![0.0, 1.0, 2.0];
        let fp = vec![0.0, 10.0, 20.0];

        let result = interp(&[0.5, 1.5, 2.0], &xp, &fp);
        assert_relative_eq!(result[0], 5.0);
        assert_relative_eq!(result[1], 15.0);
        assert_eq!(result[2], 20.0);
    }

    #[test]
    fn test_interp_clamping() {
        let xp = vec![1.0, 2.0, 3.0];
        let fp = vec![10.0, 20.0, 30.0];

        assert_eq!(interp(&[0.0, 4.0], &xp, &fp), vec![10.0, 30.0]);
        assert_eq!(interp_one(1.0, &xp, &fp), 10.0);
    }

    #[test]
    fn test_linear_extension() {
        let xp = vec![1.0, 2.0, 3.0];
        let fp = vec![4.0, 5.0, 7.0];

        assert_relative_eq!(interp_one_linear(0.0, &xp, &fp), 3.0);
        // right edge uses the last segment's slope (2 per unit)
        assert_relative_eq!(interp_one_linear(4.0, &xp, &fp), 9.0);
        assert_eq!(interp_one_linear(3.0, &xp, &fp), 7.0);
        assert_eq!(interp_one_linear(2.0, &xp, &fp), 5.0);
    }

    #[test]
    fn test_linear_single_sample() {
        assert_eq!(interp_one_linear(-5.0, &[0.0], &[300.0]), 300.0);
        assert_eq!(interp_one_linear(5.0, &[0.0], &[300.0]), 300.0);
    }

    #[test]
    fn test_trapezoid() {
        assert_relative_eq!(trapezoid(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 10.0);
        assert_eq!(trapezoid(&[1.0], &[4.0]), 0.0);
        assert_eq!(trapezoid(&[], &[]), 0.0);
    }
}
