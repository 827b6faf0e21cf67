//! WASM bindings for firefly.
//!
//! Build with:
//! ```sh
//! wasm-pack build -p firefly-wasm
//! ```

use js_sys::{Array, Float64Array};
use wasm_bindgen::prelude::*;

use firefly::allan::{self, AllanConfig, InputType};
use firefly::{FireflyError, Interp1D};

fn to_js(e: FireflyError) -> JsError {
    JsError::new(&e.to_string())
}

fn table(x: &[f64], y: &[f64]) -> Result<Interp1D, JsError> {
    Interp1D::from_slices(x, y).map_err(to_js)
}

// ── Interpolation ──

/// Interpolates the table `(x, y)` at each of `queries`.
///
/// Queries outside `[x[0], x[n-1]]` continue the edge slope when
/// `allow_extrapolation` is set and fail otherwise.
#[wasm_bindgen]
pub fn interp_values(
    x: &[f64],
    y: &[f64],
    queries: &[f64],
    allow_extrapolation: bool,
) -> Result<Vec<f64>, JsError> {
    table(x, y)?
        .get_values(queries, allow_extrapolation)
        .map_err(to_js)
}

/// Trapezoidal integral of the table between `begin` and `end`.
#[wasm_bindgen]
pub fn integrate(x: &[f64], y: &[f64], begin: f64, end: f64) -> Result<f64, JsError> {
    table(x, y)?.integrate(begin, end).map_err(to_js)
}

/// Integral of the table from its first abscissa to `at`.
#[wasm_bindgen]
pub fn cumulative_integral(x: &[f64], y: &[f64], at: f64) -> Result<f64, JsError> {
    table(x, y)?.cumulative_integral(at).map_err(to_js)
}

// ── Allan variance ──

/// Returns `[tau, avar]` as two `Float64Array`s.
///
/// `input_type` is one of: "mean", "increment", "integral".
#[wasm_bindgen]
pub fn allan_variance(
    x: &[f64],
    dt: f64,
    n_clusters: usize,
    input_type: &str,
) -> Result<Array, JsError> {
    let input_type: InputType = input_type.parse().map_err(to_js)?;
    let config = AllanConfig::new()
        .dt(dt)
        .n_clusters(n_clusters)
        .input_type(input_type);
    let curve = allan::allan_variance(x, &config).map_err(to_js)?;

    let out = Array::new();
    out.push(&Float64Array::from(curve.tau.as_slice()));
    out.push(&Float64Array::from(curve.avar.as_slice()));
    Ok(out)
}

/// White noise coefficient from an Allan deviation curve.
#[wasm_bindgen]
pub fn white_noise_coefficient(tau: &[f64], adev: &[f64]) -> Result<f64, JsError> {
    allan::identify_white_noise_coefficient(tau, adev).map_err(to_js)
}

/// Random walk coefficient from an Allan deviation curve.
#[wasm_bindgen]
pub fn random_walk_coefficient(tau: &[f64], adev: &[f64]) -> Result<f64, JsError> {
    allan::identify_random_walk_coefficient(tau, adev).map_err(to_js)
}
