use approx::assert_relative_eq;
use firefly::allan::{
    allan_variance, fit_noise_parameters, identify_bias_instability_coefficient,
    identify_random_walk_coefficient, identify_slope, identify_slope_coefficient,
    identify_white_noise_coefficient,
};
use firefly::{AllanConfig, FireflyError, InputType, NoiseEffect};

fn pseudo_random(n: usize) -> Vec<f64> {
    (0..n).map(|i| ((i as f64) * 12.9898).sin() * 437.585).map(|v| v - v.floor() - 0.5).collect()
}

fn geometric_tau() -> Vec<f64> {
    (-3..=10).map(|e| 2f64.powi(e)).collect()
}

#[test]
fn test_allan_variance_shape() {
    let x = pseudo_random(100);
    let curve = allan_variance(&x, &AllanConfig::new().n_clusters(10)).unwrap();
    assert!(!curve.is_empty());
    assert!(curve.len() <= 10);
    assert_eq!(curve.tau.len(), curve.avar.len());
    assert!(curve.tau.windows(2).all(|w| w[0] < w[1]));
    assert!(curve.avar.iter().all(|&v| v >= 0.0));
    assert_eq!(curve.tau, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 8.0, 10.0]);
}

#[test]
fn test_allan_variance_skips_large_clusters() {
    let x = pseudo_random(20);
    let config = AllanConfig::new().tau_max(15.0).n_clusters(5);
    let curve = allan_variance(&x, &config).unwrap();
    assert!(curve.tau.iter().all(|&t| 2.0 * t < 20.0));
}

#[test]
fn test_allan_variance_of_constant_is_zero() {
    let x = vec![3.0; 200];
    let curve = allan_variance(&x, &AllanConfig::new().n_clusters(8)).unwrap();
    assert!(curve.avar.iter().all(|&v| v == 0.0));
}

#[test]
fn test_allan_variance_of_ramp() {
    // a unit ramp has AVAR = tau^2 / 2
    let x: Vec<f64> = (0..500).map(|i| i as f64).collect();
    let curve = allan_variance(&x, &AllanConfig::new().n_clusters(12)).unwrap();
    for (t, v) in curve.tau.iter().zip(&curve.avar) {
        assert_relative_eq!(*v, 0.5 * t * t, max_relative = 1e-9);
    }

    let fit = fit_noise_parameters(&curve.tau, &curve.avar, &[NoiseEffect::Ramp]).unwrap();
    assert_relative_eq!(fit.get(NoiseEffect::Ramp).unwrap(), 1.0, max_relative = 1e-9);
}

#[test]
fn test_input_types_agree() {
    let dt = 0.25;
    let mean = pseudo_random(400);
    let increment: Vec<f64> = mean.iter().map(|v| v * dt).collect();
    let integral: Vec<f64> = increment
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect();

    let config = AllanConfig::new().dt(dt).n_clusters(10);
    let from_mean = allan_variance(&mean, &config).unwrap();
    let from_increment =
        allan_variance(&increment, &config.input_type(InputType::Increment)).unwrap();
    let from_integral = allan_variance(&integral, &config.input_type(InputType::Integral)).unwrap();

    assert_eq!(from_mean.tau, from_increment.tau);
    assert_eq!(from_mean.tau, from_integral.tau);
    for i in 0..from_mean.len() {
        assert_relative_eq!(from_mean.avar[i], from_increment.avar[i], max_relative = 1e-9);
        assert_relative_eq!(from_mean.avar[i], from_integral.avar[i], max_relative = 1e-6);
    }
}

#[test]
fn test_allan_variance_errors() {
    assert!(matches!(
        allan_variance(&[], &AllanConfig::default()),
        Err(FireflyError::InvalidShape(_))
    ));
    assert!(matches!(
        allan_variance(&pseudo_random(100), &AllanConfig::new().dt(0.0)),
        Err(FireflyError::InvalidParameter(_))
    ));
}

#[test]
fn test_identify_slope() {
    let tau = vec![1.0, 10.0, 100.0];
    let values = vec![1.0, 0.1, 0.1];
    let slopes = identify_slope(&tau, &values).unwrap();
    assert_relative_eq!(slopes[0], -1.0, epsilon = 1e-12);
    assert_relative_eq!(slopes[1], 0.0, epsilon = 1e-12);
    assert!(identify_slope(&[1.0], &[1.0]).is_err());
    assert!(identify_slope(&[1.0, 2.0], &[1.0]).is_err());
}

#[test]
fn test_identify_slope_coefficient() {
    let k = 0.3;
    let tau = vec![1.0, 2.0, 4.0, 8.0, 16.0];
    let adev: Vec<f64> = tau.iter().map(|t: &f64| k * t.sqrt()).collect();
    assert_relative_eq!(
        identify_slope_coefficient(&tau, &adev, 0.5).unwrap(),
        k,
        max_relative = 1e-12
    );
}

#[test]
fn test_identify_noise_coefficients() {
    let tau = geometric_tau();

    let n = 0.02;
    let adev: Vec<f64> = tau.iter().map(|t| n / t.sqrt()).collect();
    assert_relative_eq!(
        identify_white_noise_coefficient(&tau, &adev).unwrap(),
        n,
        max_relative = 1e-12
    );

    let k = 0.005;
    let adev: Vec<f64> = tau.iter().map(|t| k * (t / 3.0).sqrt()).collect();
    assert_relative_eq!(
        identify_random_walk_coefficient(&tau, &adev).unwrap(),
        k,
        max_relative = 1e-12
    );

    let plateau = 0.7;
    let adev = vec![plateau; tau.len()];
    assert_relative_eq!(
        identify_bias_instability_coefficient(&tau, &adev).unwrap(),
        plateau,
        max_relative = 1e-12
    );
}

#[test]
fn test_no_matching_slope() {
    let tau = vec![1.0, 2.0, 4.0];
    let adev: Vec<f64> = tau.iter().map(|t| t * t).collect();
    assert!(matches!(
        identify_white_noise_coefficient(&tau, &adev),
        Err(FireflyError::NoMatchingSlope { .. })
    ));
    assert!(matches!(
        identify_bias_instability_coefficient(&tau, &adev),
        Err(FireflyError::NoMatchingSlope { .. })
    ));
}

#[test]
fn test_fit_noise_parameters() {
    let (n, k) = (0.1, 0.01);
    let tau = geometric_tau();
    let avar: Vec<f64> = tau.iter().map(|t| n * n / t + k * k * t / 3.0).collect();

    let fit = fit_noise_parameters(&tau, &avar, &[NoiseEffect::White, NoiseEffect::Walk]).unwrap();
    assert_eq!(fit.params.len(), 2);
    assert_eq!(fit.params[0].0, NoiseEffect::White);
    assert_relative_eq!(fit.get(NoiseEffect::White).unwrap(), n, max_relative = 1e-6);
    assert_relative_eq!(fit.get(NoiseEffect::Walk).unwrap(), k, max_relative = 1e-6);
    assert!(fit.get(NoiseEffect::Ramp).is_none());
    for (p, v) in fit.prediction.iter().zip(&avar) {
        assert_relative_eq!(*p, *v, max_relative = 1e-6);
    }
}

#[test]
fn test_fit_noise_parameters_unused_effect_is_zero() {
    let tau = geometric_tau();
    let avar: Vec<f64> = tau.iter().map(|t| 0.04 / t).collect();
    let fit = fit_noise_parameters(&tau, &avar, &[NoiseEffect::White, NoiseEffect::Walk]).unwrap();
    assert_relative_eq!(fit.get(NoiseEffect::White).unwrap(), 0.2, max_relative = 1e-6);
    assert!(fit.get(NoiseEffect::Walk).unwrap() < 1e-3);
}

#[test]
fn test_fit_noise_parameters_repeated_effects() {
    let (n, k) = (0.1, 0.01);
    let tau = geometric_tau();
    let avar: Vec<f64> = tau.iter().map(|t| n * n / t + k * k * t / 3.0).collect();

    let requested = [NoiseEffect::White, NoiseEffect::Walk, NoiseEffect::White];
    let fit = fit_noise_parameters(&tau, &avar, &requested).unwrap();
    assert_eq!(fit.params.len(), 2);
    assert_eq!(fit.params[0].0, NoiseEffect::White);
    assert_eq!(fit.params[1].0, NoiseEffect::Walk);
    assert_relative_eq!(fit.get(NoiseEffect::White).unwrap(), n, max_relative = 1e-6);
    assert_relative_eq!(fit.get(NoiseEffect::Walk).unwrap(), k, max_relative = 1e-6);
}

#[test]
fn test_fit_noise_parameters_errors() {
    let tau = geometric_tau();
    let avar: Vec<f64> = tau.iter().map(|t| 1.0 / t).collect();
    assert!(fit_noise_parameters(&tau, &avar, &[]).is_err());
    assert!(fit_noise_parameters(&tau, &avar[1..], &[NoiseEffect::White]).is_err());
}

#[test]
fn test_curve_record() {
    let x = pseudo_random(100);
    let curve = allan_variance(&x, &AllanConfig::new().n_clusters(4)).unwrap();
    let record = firefly::firefly_data::AllanCurveRecord::from(&curve);
    assert_eq!(record.tau, curve.tau);
    for (d, v) in curve.deviation().iter().zip(&record.avar) {
        assert_relative_eq!(d * d, *v, max_relative = 1e-12);
    }
}

#[cfg(feature = "noise")]
#[test]
fn test_white_noise_coefficient_from_generated_series() {
    let psd = 0.04;
    let fs = 10.0;
    let dt = 1.0 / fs;
    let x = firefly::noise::white_noise(100_000, psd, fs, Some(42)).unwrap();

    let config = AllanConfig::new().dt(dt).tau_max(100.0 * dt).n_clusters(20);
    let curve = allan_variance(&x, &config).unwrap();
    let n = identify_white_noise_coefficient(&curve.tau, &curve.deviation()).unwrap();
    assert_relative_eq!(n, psd.sqrt(), max_relative = 0.1);
}
