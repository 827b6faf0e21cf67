//! Allan variance (AVAR) of sensor readings and identification of noise
//! coefficients from the Allan deviation curve.
//!
//! Consider an underlying measurement y(t) whose sensor outputs integrals of
//! y(t) over successive intervals of length `dt`. With X(j) the integral of y
//! from 0 to `j * dt`, the overlapping Allan variance at `tau = m * dt` is
//!
//! ```text
//! AVAR(tau) = 1 / (2 tau^2) * < (X(k + 2m) - 2 X(k + m) + X(k))^2 >
//! ```
//!
//! where `< >` averages over every start index `k`.
//! See <https://en.wikipedia.org/wiki/Allan_variance>.

use std::f64::consts::{LN_2, PI};
use std::str::FromStr;

use firefly_data::AllanCurveRecord;
use tracing::debug;

use crate::error::{FireflyError, Result};

/// How to interpret the samples passed to [`allan_variance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    /// Each sample is the mean of the signal over one period.
    #[default]
    Mean,
    /// Each sample is the integral of the signal over one period.
    Increment,
    /// Samples are already the running integral of the signal.
    Integral,
}

impl FromStr for InputType {
    type Err = FireflyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(InputType::Mean),
            "increment" => Ok(InputType::Increment),
            "integral" => Ok(InputType::Integral),
            _ => Err(FireflyError::InvalidParameter(format!(
                "input type must be one of mean, increment, integral; got '{s}'"
            ))),
        }
    }
}

/// Parameters of an Allan variance computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllanConfig {
    /// Sampling period.
    pub dt: f64,
    /// Minimum averaging time. `None` means one sample period.
    pub tau_min: Option<f64>,
    /// Maximum averaging time. `None` averages over ten independent clusters.
    pub tau_max: Option<f64>,
    /// Number of averaging times, spread log-uniformly before deduplication.
    pub n_clusters: usize,
    pub input_type: InputType,
}

impl Default for AllanConfig {
    fn default() -> Self {
        AllanConfig {
            dt: 1.0,
            tau_min: None,
            tau_max: None,
            n_clusters: 100,
            input_type: InputType::Mean,
        }
    }
}

impl AllanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn tau_min(mut self, tau_min: f64) -> Self {
        self.tau_min = Some(tau_min);
        self
    }

    pub fn tau_max(mut self, tau_max: f64) -> Self {
        self.tau_max = Some(tau_max);
        self
    }

    pub fn n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }
}

/// Averaging times and the Allan variance at each of them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AllanCurve {
    pub tau: Vec<f64>,
    pub avar: Vec<f64>,
}

impl AllanCurve {
    /// Allan deviation, the square root of each variance value.
    pub fn deviation(&self) -> Vec<f64> {
        self.avar.iter().map(|v| v.sqrt()).collect()
    }

    pub fn len(&self) -> usize {
        self.tau.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tau.is_empty()
    }
}

impl From<&AllanCurve> for AllanCurveRecord {
    fn from(curve: &AllanCurve) -> Self {
        AllanCurveRecord {
            tau: curve.tau.clone(),
            avar: curve.avar.clone(),
        }
    }
}

/// Cluster sizes (in samples) for an Allan variance computation.
///
/// `n_clusters` sizes are spaced log-uniformly (base 2) between `tau_min / dt`
/// and `tau_max / dt`, rounded to integers and deduplicated. Defaults are one
/// sample and `n_samples / 10`.
pub fn cluster_sizes(
    n_samples: usize,
    dt: f64,
    tau_min: Option<f64>,
    tau_max: Option<f64>,
    n_clusters: usize,
) -> Result<Vec<usize>> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(FireflyError::InvalidParameter(format!(
            "sampling period must be positive, got {dt}"
        )));
    }
    if n_clusters == 0 {
        return Err(FireflyError::InvalidParameter(
            "at least one cluster is required".to_string(),
        ));
    }

    let min_size = tau_min.map_or(1.0, |t| (t / dt).trunc());
    let max_size = tau_max.map_or((n_samples / 10) as f64, |t| (t / dt).trunc());
    if !(min_size >= 1.0 && max_size >= min_size) {
        return Err(FireflyError::InvalidParameter(format!(
            "empty cluster size range [{min_size}, {max_size}] for {n_samples} samples"
        )));
    }

    let lo = min_size.log2();
    let hi = max_size.log2();
    let step = if n_clusters > 1 {
        (hi - lo) / (n_clusters - 1) as f64
    } else {
        0.0
    };

    let mut sizes: Vec<usize> = (0..n_clusters)
        .map(|i| {
            // pin the last exponent so rounding cannot overshoot max_size
            let e = if n_clusters > 1 && i + 1 == n_clusters {
                hi
            } else {
                lo + step * i as f64
            };
            e.exp2().round_ties_even() as usize
        })
        .collect();
    sizes.dedup();

    debug!(n_samples, count = sizes.len(), ?sizes, "computed cluster sizes");
    Ok(sizes)
}

/// Compute the overlapping Allan variance of `x`.
///
/// Cluster sizes too large to form a single second difference are skipped.
pub fn allan_variance(x: &[f64], config: &AllanConfig) -> Result<AllanCurve> {
    if x.is_empty() {
        return Err(FireflyError::InvalidShape(
            "cannot compute Allan variance of an empty series".to_string(),
        ));
    }

    let data: Vec<f64> = match config.input_type {
        InputType::Integral => x.to_vec(),
        InputType::Mean | InputType::Increment => x
            .iter()
            .scan(0.0, |acc, &v| {
                *acc += v;
                Some(*acc)
            })
            .collect(),
    };

    let scale = match config.input_type {
        InputType::Mean => 0.5,
        InputType::Increment | InputType::Integral => 0.5 / (config.dt * config.dt),
    };

    let sizes = cluster_sizes(
        x.len(),
        config.dt,
        config.tau_min,
        config.tau_max,
        config.n_clusters,
    )?;

    let mut curve = AllanCurve::default();
    for k in sizes {
        if 2 * k >= data.len() {
            debug!(k, n = data.len(), "cluster size too large, skipping");
            continue;
        }
        let m = data.len() - 2 * k;
        let sum_sq: f64 = (0..m)
            .map(|i| {
                let c = data[i + 2 * k] - 2.0 * data[i + k] + data[i];
                c * c
            })
            .sum();
        let kf = k as f64;
        curve.tau.push(kf * config.dt);
        curve.avar.push(scale * sum_sq / m as f64 / kf / kf);
    }
    Ok(curve)
}

/// Local slopes of the log-log curve: `diff(log10 values) / diff(log10 tau)`.
pub fn identify_slope(tau: &[f64], values: &[f64]) -> Result<Vec<f64>> {
    validate_curve(tau, values)?;
    Ok(tau
        .windows(2)
        .zip(values.windows(2))
        .map(|(t, v)| (v[1].log10() - v[0].log10()) / (t[1].log10() - t[0].log10()))
        .collect())
}

fn validate_curve(tau: &[f64], values: &[f64]) -> Result<()> {
    if tau.len() != values.len() {
        return Err(FireflyError::InvalidShape(format!(
            "tau and values must have the same length, got {} and {}",
            tau.len(),
            values.len()
        )));
    }
    if tau.len() < 2 {
        return Err(FireflyError::InvalidShape(
            "at least two points are required to compute a slope".to_string(),
        ));
    }
    if tau.iter().chain(values).any(|&v| !(v.is_finite() && v > 0.0)) {
        return Err(FireflyError::InvalidParameter(
            "tau and values must be finite and positive for a log-log slope".to_string(),
        ));
    }
    if !crate::array::is_strictly_monotonic_increasing(tau) {
        return Err(FireflyError::InvalidShape(
            "tau must be strictly increasing".to_string(),
        ));
    }
    Ok(())
}

/// Index of the log-log slope closest to `target` and the intercept of the
/// line of slope `target` through that point (`log10 adev = b + target * log10 tau`).
fn match_slope(tau: &[f64], adev: &[f64], target: f64, tolerance: f64) -> Result<(usize, f64)> {
    let slopes = identify_slope(tau, adev)?;
    let (index, min_delta) = slopes
        .iter()
        .map(|s| (target - s).abs())
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, d)| if d < best.1 { (i, d) } else { best });

    if min_delta > tolerance {
        return Err(FireflyError::NoMatchingSlope { target, min_delta });
    }

    let intercept = adev[index].log10() - target * tau[index].log10();
    debug!(target, index, min_delta, intercept, "matched Allan deviation slope");
    Ok((index, intercept))
}

fn slope_tolerance(target: f64) -> f64 {
    if target == 0.0 { 0.1 } else { target.abs() }
}

/// Coefficient `C` of the power law `adev = C * tau^target_slope` fitted at
/// the part of the curve whose slope is closest to `target_slope`.
///
/// Fails with [`FireflyError::NoMatchingSlope`] when no slope is within
/// `|target_slope|` of the target (0.1 for a flat target).
pub fn identify_slope_coefficient(tau: &[f64], adev: &[f64], target_slope: f64) -> Result<f64> {
    let (_, b) = match_slope(tau, adev, target_slope, slope_tolerance(target_slope))?;
    Ok(10f64.powf(b))
}

/// White noise coefficient `N`, where `adev = N / sqrt(tau)`.
pub fn identify_white_noise_coefficient(tau: &[f64], adev: &[f64]) -> Result<f64> {
    let slope = -0.5;
    let (_, b) = match_slope(tau, adev, slope, slope_tolerance(slope))?;
    Ok(10f64.powf(b + slope * 1f64.log10()))
}

/// Random walk coefficient `K`, where `adev = K * sqrt(tau / 3)`.
pub fn identify_random_walk_coefficient(tau: &[f64], adev: &[f64]) -> Result<f64> {
    let slope = 0.5;
    let (_, b) = match_slope(tau, adev, slope, slope_tolerance(slope))?;
    Ok(10f64.powf(b + slope * 3f64.log10()))
}

/// Bias instability (pink noise) coefficient `B`: the level of the flat part
/// of the Allan deviation curve.
///
/// The plateau is returned as is. The theoretical plateau of a bias
/// instability `B` is `B * sqrt(2 ln 2 / pi)`; divide by that factor for the
/// normalised value.
pub fn identify_bias_instability_coefficient(tau: &[f64], adev: &[f64]) -> Result<f64> {
    let slope = 0.0;
    let (_, b) = match_slope(tau, adev, slope, slope_tolerance(slope))?;
    Ok(10f64.powf(b))
}

/// Noise processes whose AVAR contributions can be fitted by
/// [`fit_noise_parameters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoiseEffect {
    Quantization,
    White,
    Flicker,
    Walk,
    Ramp,
}

impl NoiseEffect {
    pub const ALL: [NoiseEffect; 5] = [
        NoiseEffect::Quantization,
        NoiseEffect::White,
        NoiseEffect::Flicker,
        NoiseEffect::Walk,
        NoiseEffect::Ramp,
    ];

    /// AVAR of this effect at `tau` for a unit coefficient.
    pub fn basis(self, tau: f64) -> f64 {
        match self {
            NoiseEffect::Quantization => 3.0 / (tau * tau),
            NoiseEffect::White => 1.0 / tau,
            NoiseEffect::Flicker => 2.0 * LN_2 / PI,
            NoiseEffect::Walk => tau / 3.0,
            NoiseEffect::Ramp => tau * tau / 2.0,
        }
    }
}

impl FromStr for NoiseEffect {
    type Err = FireflyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "quantization" => Ok(NoiseEffect::Quantization),
            "white" => Ok(NoiseEffect::White),
            "flicker" => Ok(NoiseEffect::Flicker),
            "walk" => Ok(NoiseEffect::Walk),
            "ramp" => Ok(NoiseEffect::Ramp),
            _ => Err(FireflyError::InvalidParameter(format!(
                "unknown noise effect: {s}"
            ))),
        }
    }
}

/// Result of [`fit_noise_parameters`].
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseFit {
    /// Estimated coefficient of each requested effect, once per effect, in
    /// [`NoiseEffect::ALL`] order.
    pub params: Vec<(NoiseEffect, f64)>,
    /// AVAR predicted by the fitted coefficients at each input `tau`.
    pub prediction: Vec<f64>,
}

impl NoiseFit {
    pub fn get(&self, effect: NoiseEffect) -> Option<f64> {
        self.params
            .iter()
            .find(|(e, _)| *e == effect)
            .map(|&(_, v)| v)
    }
}

/// Estimate noise parameters from an Allan variance curve.
///
/// Solves a non-negative least squares problem with each row weighted by
/// `1 / avar`, so the sum of relative errors is minimized (close to fitting in
/// log-log scale). Returned parameters are square roots of the fitted AVAR
/// coefficients, matching the conventions of the `identify_*` functions.
pub fn fit_noise_parameters(
    tau: &[f64],
    avar: &[f64],
    effects: &[NoiseEffect],
) -> Result<NoiseFit> {
    validate_curve(tau, avar)?;
    if effects.is_empty() {
        return Err(FireflyError::InvalidParameter(
            "at least one noise effect is required".to_string(),
        ));
    }
    // one column per effect, in canonical order
    let effects: Vec<NoiseEffect> = NoiseEffect::ALL
        .into_iter()
        .filter(|e| effects.contains(e))
        .collect();

    let columns: Vec<Vec<f64>> = effects
        .iter()
        .map(|e| tau.iter().zip(avar).map(|(&t, &v)| e.basis(t) / v).collect())
        .collect();
    let ones = vec![1.0; tau.len()];
    let coefficients = nnls(&columns, &ones);

    let prediction = tau
        .iter()
        .map(|&t| {
            effects
                .iter()
                .zip(&coefficients)
                .map(|(e, c)| c * e.basis(t))
                .sum()
        })
        .collect();

    Ok(NoiseFit {
        params: effects
            .into_iter()
            .zip(coefficients.iter().map(|c| c.sqrt()))
            .collect(),
        prediction,
    })
}

/// Lawson-Hanson non-negative least squares: minimize `|A x - b|` with `x >= 0`.
///
/// `columns` holds A column by column.
fn nnls(columns: &[Vec<f64>], b: &[f64]) -> Vec<f64> {
    let p = columns.len();
    let n = b.len();
    let a_norm = columns
        .iter()
        .map(|c| c.iter().map(|v| v.abs()).sum::<f64>())
        .fold(0.0, f64::max);
    let tol = 10.0 * f64::EPSILON * a_norm * n.max(p) as f64;

    let mut x = vec![0.0; p];
    let mut passive = vec![false; p];

    for _ in 0..3 * p.max(1) {
        let w = gradient(columns, b, &x);
        let candidate = (0..p)
            .filter(|&j| !passive[j])
            .max_by(|&i, &j| w[i].total_cmp(&w[j]));
        let Some(j) = candidate.filter(|&j| w[j] > tol) else {
            break;
        };
        passive[j] = true;

        for _ in 0..3 * p {
            let z = passive_least_squares(columns, b, &passive);
            if (0..p).filter(|&i| passive[i]).all(|i| z[i] > tol) {
                x = z;
                break;
            }
            let alpha = (0..p)
                .filter(|&i| passive[i] && z[i] <= tol)
                .map(|i| {
                    let d = x[i] - z[i];
                    if d > 0.0 { x[i] / d } else { 0.0 }
                })
                .fold(f64::INFINITY, f64::min);
            for i in 0..p {
                x[i] += alpha * (z[i] - x[i]);
                if passive[i] && x[i] <= tol {
                    x[i] = 0.0;
                    passive[i] = false;
                }
            }
            if !passive.iter().any(|&f| f) {
                break;
            }
        }
    }
    x
}

// A^T (b - A x)
fn gradient(columns: &[Vec<f64>], b: &[f64], x: &[f64]) -> Vec<f64> {
    let residual: Vec<f64> = (0..b.len())
        .map(|r| b[r] - columns.iter().zip(x).map(|(c, xi)| c[r] * xi).sum::<f64>())
        .collect();
    columns
        .iter()
        .map(|c| c.iter().zip(&residual).map(|(a, r)| a * r).sum())
        .collect()
}

// Unconstrained least squares over the passive columns (modified Gram-Schmidt QR);
// inactive entries are zero.
fn passive_least_squares(columns: &[Vec<f64>], b: &[f64], passive: &[bool]) -> Vec<f64> {
    let active: Vec<usize> = (0..columns.len()).filter(|&j| passive[j]).collect();
    let m = active.len();
    let mut q: Vec<Vec<f64>> = active.iter().map(|&j| columns[j].clone()).collect();
    let mut r = vec![vec![0.0; m]; m];

    for k in 0..m {
        let norm = q[k].iter().map(|v| v * v).sum::<f64>().sqrt();
        r[k][k] = norm;
        if norm > 0.0 {
            q[k].iter_mut().for_each(|v| *v /= norm);
        }
        for l in k + 1..m {
            let dot: f64 = q[k].iter().zip(&q[l]).map(|(a, c)| a * c).sum();
            r[k][l] = dot;
            let (head, tail) = q.split_at_mut(l);
            tail[0]
                .iter_mut()
                .zip(&head[k])
                .for_each(|(v, qk)| *v -= dot * qk);
        }
    }

    let qtb: Vec<f64> = q
        .iter()
        .map(|col| col.iter().zip(b).map(|(a, bi)| a * bi).sum())
        .collect();
    let mut z_active = vec![0.0; m];
    for k in (0..m).rev() {
        if r[k][k] == 0.0 {
            continue;
        }
        let s: f64 = (k + 1..m).map(|l| r[k][l] * z_active[l]).sum();
        z_active[k] = (qtb[k] - s) / r[k][k];
    }

    let mut z = vec![0.0; columns.len()];
    for (&j, v) in active.iter().zip(z_active) {
        z[j] = v;
    }
    z
}
