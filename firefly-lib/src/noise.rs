//! Synthetic noise series for exercising the Allan variance tools.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::error::{FireflyError, Result};

fn rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn validate(psd: f64, fs: f64) -> Result<()> {
    if !(psd.is_finite() && psd >= 0.0) {
        return Err(FireflyError::InvalidParameter(format!(
            "power spectral density must be non-negative, got {psd}"
        )));
    }
    if !(fs.is_finite() && fs > 0.0) {
        return Err(FireflyError::InvalidParameter(format!(
            "sampling frequency must be positive, got {fs}"
        )));
    }
    Ok(())
}

/// White noise with a flat one-sided PSD of `psd` [X^2/Hz] up to the Nyquist
/// frequency, sampled at `fs` [Hz].
///
/// Samples are normal with standard deviation `sqrt(psd * fs)`.
pub fn white_noise(npts: usize, psd: f64, fs: f64, seed: Option<u64>) -> Result<Vec<f64>> {
    validate(psd, fs)?;
    let rms = (psd * fs).sqrt();
    let normal = Normal::new(0.0, rms)
        .map_err(|e| FireflyError::InvalidParameter(format!("normal distribution: {e}")))?;
    Ok(normal.sample_iter(rng(seed)).take(npts).collect())
}

/// Random walk: the running integral of white noise of PSD `psd`, sampled at
/// `fs` [Hz].
pub fn random_walk(npts: usize, psd: f64, fs: f64, seed: Option<u64>) -> Result<Vec<f64>> {
    validate(psd, fs)?;
    let dt = 1.0 / fs;
    let scale = (psd / dt).sqrt() * dt;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| FireflyError::InvalidParameter(format!("normal distribution: {e}")))?;
    Ok(normal
        .sample_iter(rng(seed))
        .take(npts)
        .scan(0.0, |acc, v: f64| {
            *acc += scale * v;
            Some(*acc)
        })
        .collect())
}
