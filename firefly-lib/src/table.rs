use firefly_data::SampleTableRecord;
use tracing::{debug, trace};

use crate::array::{is_strictly_monotonic_increasing, sort_pairs};
use crate::error::{FireflyError, Result};
use crate::interp::{interp_one, interp_one_linear, trapezoid};

/// What [`Interp1D::get_value`] returns for a query outside the sampled domain
/// when extrapolation is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Extrapolation {
    /// Continue the slope of the nearest edge segment.
    #[default]
    Linear,
    /// Hold the edge sample value.
    Clamp,
    /// Fixed values left of the first sample and right of the last one.
    Fill { left: f64, right: f64 },
}

/// One-dimensional piecewise-linear interpolant over a strictly increasing
/// sample table.
///
/// The table always holds at least one sample and `x` is strictly increasing;
/// both are checked on construction and after every [`add_points`](Self::add_points).
#[derive(Debug, Clone, PartialEq)]
pub struct Interp1D {
    x: Vec<f64>,
    y: Vec<f64>,
    extrapolation: Extrapolation,
}

impl Interp1D {
    /// Build a table from abscissas `x` and ordinates `y`.
    ///
    /// Fails with [`FireflyError::InvalidShape`] when the lengths differ, the
    /// table is empty, or `x` is not strictly increasing. Ties are rejected,
    /// never silently sorted.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        validate(&x, &y)?;
        Ok(Interp1D {
            x,
            y,
            extrapolation: Extrapolation::default(),
        })
    }

    pub fn from_slices(x: &[f64], y: &[f64]) -> Result<Self> {
        Self::new(x.to_vec(), y.to_vec())
    }

    /// Replace the extrapolation policy used when extrapolation is allowed.
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    pub fn extrapolation(&self) -> Extrapolation {
        self.extrapolation
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Number of samples, always at least one.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Always false: a table cannot be built without samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn min_x(&self) -> f64 {
        self.x[0]
    }

    pub fn max_x(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Returns true if `min_x <= value <= max_x`.
    pub fn is_in_range(&self, value: f64) -> bool {
        self.min_x() <= value && value <= self.max_x()
    }

    /// Interpolated value at `new_x`.
    ///
    /// Outside the sampled domain the table's [`Extrapolation`] policy applies
    /// if `allow_extrapolation` is set; otherwise the call fails with
    /// [`FireflyError::ExtrapolationNotAllowed`].
    pub fn get_value(&self, new_x: f64, allow_extrapolation: bool) -> Result<f64> {
        if new_x.is_nan() {
            return Err(FireflyError::InvalidParameter(
                "cannot interpolate at NaN".to_string(),
            ));
        }
        if !allow_extrapolation && !self.is_in_range(new_x) {
            return Err(self.extrapolation_error(new_x));
        }
        Ok(self.get_value_with(new_x, self.extrapolation))
    }

    /// Interpolated value at `new_x` with an explicit extrapolation policy.
    pub fn get_value_with(&self, new_x: f64, extrapolation: Extrapolation) -> f64 {
        match extrapolation {
            Extrapolation::Linear => interp_one_linear(new_x, &self.x, &self.y),
            Extrapolation::Clamp => interp_one(new_x, &self.x, &self.y),
            Extrapolation::Fill { left, right } => {
                if new_x < self.min_x() {
                    left
                } else if new_x > self.max_x() {
                    right
                } else {
                    interp_one(new_x, &self.x, &self.y)
                }
            }
        }
    }

    /// Vectorized [`get_value`](Self::get_value). Fails if any query fails.
    pub fn get_values(&self, new_x: &[f64], allow_extrapolation: bool) -> Result<Vec<f64>> {
        new_x
            .iter()
            .map(|&v| self.get_value(v, allow_extrapolation))
            .collect()
    }

    /// Insert new samples, keeping the table sorted by abscissa.
    ///
    /// Fails with [`FireflyError::DuplicateAbscissa`] if any abscissa in
    /// `new_x` is already present (or repeated within `new_x`). On failure the
    /// table is left untouched.
    pub fn add_points(&mut self, new_x: &[f64], new_y: &[f64]) -> Result<()> {
        if new_x.len() != new_y.len() {
            return Err(FireflyError::InvalidShape(format!(
                "x and y must have the same length, got {} and {}",
                new_x.len(),
                new_y.len()
            )));
        }
        for (i, &v) in new_x.iter().enumerate() {
            if self.x.contains(&v) || new_x[..i].contains(&v) {
                return Err(FireflyError::DuplicateAbscissa(v));
            }
        }

        let mut x = self.x.clone();
        let mut y = self.y.clone();
        x.extend_from_slice(new_x);
        y.extend_from_slice(new_y);
        let (x, y) = sort_pairs(&x, &y);
        validate(&x, &y)?;

        debug!(added = new_x.len(), total = x.len(), "rebuilt sample table");
        self.x = x;
        self.y = y;
        Ok(())
    }

    /// Trapezoidal integral over the whole sampled domain.
    pub fn integrate_all(&self) -> f64 {
        trapezoid(&self.x, &self.y)
    }

    /// Integral of the interpolant over `[begin_x, stop_x]`.
    ///
    /// Both bounds must lie in the sampled domain and `begin_x <= stop_x`.
    /// Bounds that are not samples are interpolated into a scratch copy of the
    /// bracketing samples; the stored table is not modified.
    pub fn integrate(&self, begin_x: f64, stop_x: f64) -> Result<f64> {
        for bound in [begin_x, stop_x] {
            if !self.is_in_range(bound) {
                return Err(self.out_of_range(bound));
            }
        }
        if begin_x > stop_x {
            return Err(FireflyError::InvalidInterval {
                begin: begin_x,
                end: stop_x,
            });
        }
        if begin_x == stop_x {
            return Ok(0.0);
        }

        let (xs, ys) = self.scratch_segment(begin_x, stop_x);
        trace!(begin_x, stop_x, samples = xs.len(), "integrating sub-range");
        Ok(trapezoid(&xs, &ys))
    }

    /// Integral of the interpolant from `min_x` to `current_x`.
    pub fn cumulative_integral(&self, current_x: f64) -> Result<f64> {
        if !self.is_in_range(current_x) {
            return Err(self.out_of_range(current_x));
        }
        if current_x == self.min_x() {
            return Ok(0.0);
        }
        if current_x == self.max_x() {
            return Ok(self.integrate_all());
        }

        let (xs, ys) = self.scratch_segment(self.min_x(), current_x);
        Ok(trapezoid(&xs, &ys))
    }

    // Samples strictly inside (begin, end) framed by interpolated end points.
    // Both bounds are in range, so interpolation never extrapolates here.
    fn scratch_segment(&self, begin: f64, end: f64) -> (Vec<f64>, Vec<f64>) {
        let lo = self.x.partition_point(|&v| v <= begin);
        let hi = self.x.partition_point(|&v| v < end);

        let mut xs = Vec::with_capacity(hi.saturating_sub(lo) + 2);
        let mut ys = Vec::with_capacity(xs.capacity());
        xs.push(begin);
        ys.push(interp_one(begin, &self.x, &self.y));
        if lo < hi {
            xs.extend_from_slice(&self.x[lo..hi]);
            ys.extend_from_slice(&self.y[lo..hi]);
        }
        xs.push(end);
        ys.push(interp_one(end, &self.x, &self.y));
        (xs, ys)
    }

    fn extrapolation_error(&self, value: f64) -> FireflyError {
        FireflyError::ExtrapolationNotAllowed {
            value,
            min: self.min_x(),
            max: self.max_x(),
        }
    }

    fn out_of_range(&self, value: f64) -> FireflyError {
        FireflyError::OutOfRange {
            value,
            min: self.min_x(),
            max: self.max_x(),
        }
    }
}

fn validate(x: &[f64], y: &[f64]) -> Result<()> {
    if x.len() != y.len() {
        return Err(FireflyError::InvalidShape(format!(
            "x and y must have the same length, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(FireflyError::InvalidShape(
            "at least one sample is required".to_string(),
        ));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(FireflyError::InvalidShape(
            "x values must be finite".to_string(),
        ));
    }
    if !is_strictly_monotonic_increasing(x) {
        return Err(FireflyError::InvalidShape(format!(
            "x must be strictly increasing, got {x:?}"
        )));
    }
    Ok(())
}

impl TryFrom<SampleTableRecord> for Interp1D {
    type Error = FireflyError;

    fn try_from(record: SampleTableRecord) -> Result<Self> {
        Interp1D::new(record.x, record.y)
    }
}

impl From<&Interp1D> for SampleTableRecord {
    fn from(table: &Interp1D) -> Self {
        SampleTableRecord {
            x: table.x.clone(),
            y: table.y.clone(),
        }
    }
}
