//! Time-indexed propulsion quantities.
//!
//! Every curve is indexed by time since ignition in seconds, starting at
//! [`START_TIME`]. Negative query times fail with [`FireflyError::NegativeTime`].

use firefly_data::TimedDataRecord;

use crate::error::{FireflyError, Result};
use crate::table::{Extrapolation, Interp1D};

/// The epoch of all timed data: ignition, in seconds.
pub const START_TIME: f64 = 0.0;

/// A quantity that varies with time since ignition.
pub trait TimedQuantity {
    /// Value at `time_since_ignition` seconds.
    fn current(&self, time_since_ignition: f64) -> Result<f64>;

    /// Time of the last sample, in seconds.
    fn combustion_duration(&self) -> f64;
}

pub(crate) fn validate_time(time_since_ignition: f64) -> Result<f64> {
    if time_since_ignition.is_nan() {
        return Err(FireflyError::InvalidParameter(
            "time since ignition is NaN".to_string(),
        ));
    }
    if time_since_ignition < START_TIME {
        return Err(FireflyError::NegativeTime(time_since_ignition));
    }
    Ok(time_since_ignition)
}

fn validate_duration(duration: f64) -> Result<()> {
    if !(duration.is_finite() && duration > 0.0) {
        return Err(FireflyError::InvalidParameter(format!(
            "combustion duration must be positive, got {duration}"
        )));
    }
    Ok(())
}

fn validate_constant(value: f64, duration: f64) -> Result<()> {
    validate_duration(duration)?;
    if !(value.is_finite() && value >= 0.0) {
        return Err(FireflyError::InvalidParameter(format!(
            "value must be non-negative, got {value}"
        )));
    }
    Ok(())
}

fn starting_table(times: Vec<f64>, values: Vec<f64>) -> Result<Interp1D> {
    let table = Interp1D::new(times, values)?;
    if table.min_x() != START_TIME {
        return Err(FireflyError::InvalidParameter(format!(
            "the first time value must be {START_TIME} [s], got {}",
            table.min_x()
        )));
    }
    Ok(table)
}

/// Sampled values over time with no extrapolation past the last sample.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericTimedData {
    table: Interp1D,
}

impl GenericTimedData {
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Ok(GenericTimedData {
            table: starting_table(times, values)?,
        })
    }

    /// Two-sample curve holding `value` from ignition to `t_end_combustion`.
    pub fn constant(value: f64, t_end_combustion: f64) -> Result<Self> {
        validate_duration(t_end_combustion)?;
        Self::new(vec![START_TIME, t_end_combustion], vec![value, value])
    }

    pub fn table(&self) -> &Interp1D {
        &self.table
    }

    /// Interpolated value; times past the last sample are out of range.
    pub fn current_value(&self, current_time: f64) -> Result<f64> {
        let t = validate_time(current_time)?;
        self.table.get_value(t, false)
    }
}

impl TimedQuantity for GenericTimedData {
    fn current(&self, time_since_ignition: f64) -> Result<f64> {
        self.current_value(time_since_ignition)
    }

    fn combustion_duration(&self) -> f64 {
        self.table.max_x()
    }
}

/// A value held from ignition to `duration` seconds.
///
/// Only built through the validated constructors of the quantities using it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantProfile {
    value: f64,
    duration: f64,
}

impl ConstantProfile {
    fn new(value: f64, duration: f64) -> Result<Self> {
        validate_constant(value, duration)?;
        Ok(ConstantProfile { value, duration })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }
}

/// A sampled curve starting at ignition with non-negative values.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledProfile {
    table: Interp1D,
}

impl SampledProfile {
    fn new(times: Vec<f64>, values: Vec<f64>, extrapolation: Extrapolation) -> Result<Self> {
        if let Some(&v) = values.iter().find(|&&v| v.is_nan() || v < 0.0) {
            return Err(FireflyError::InvalidParameter(format!(
                "values must be non-negative, got {v}"
            )));
        }
        let table = starting_table(times, values)?;
        let extrapolation = match extrapolation {
            // hold the first sample before ignition
            Extrapolation::Fill { right, .. } => Extrapolation::Fill {
                left: table.y()[0],
                right,
            },
            other => other,
        };
        Ok(SampledProfile {
            table: table.with_extrapolation(extrapolation),
        })
    }

    pub fn table(&self) -> &Interp1D {
        &self.table
    }
}

/// Propellant mass flow rate of an engine, in kg/s.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowRate {
    Constant(ConstantProfile),
    Variable(SampledProfile),
}

impl FlowRate {
    /// Constant `rate` during `[0, duration]`, zero afterwards.
    pub fn constant(rate: f64, duration: f64) -> Result<Self> {
        Ok(FlowRate::Constant(ConstantProfile::new(rate, duration)?))
    }

    /// Sampled flow rate. Times must start at ignition and rates must be
    /// non-negative. The rate is zero after the last sample.
    pub fn variable(times: Vec<f64>, rates: Vec<f64>) -> Result<Self> {
        let fill = Extrapolation::Fill {
            left: 0.0,
            right: 0.0,
        };
        Ok(FlowRate::Variable(SampledProfile::new(times, rates, fill)?))
    }

    pub fn from_record(record: &TimedDataRecord) -> Result<Self> {
        match record {
            TimedDataRecord::Constant { value, duration } => Self::constant(*value, *duration),
            TimedDataRecord::Variable(table) => Self::variable(table.x.clone(), table.y.clone()),
        }
    }

    /// Propellant mass ejected between ignition and `time_since_ignition`.
    ///
    /// Past burn-out this is the total mass.
    pub fn used_mass(&self, time_since_ignition: f64) -> Result<f64> {
        let t = validate_time(time_since_ignition)?;
        match self {
            FlowRate::Constant(c) => Ok(c.value * t.min(c.duration)),
            FlowRate::Variable(p) => {
                if t < p.table.max_x() {
                    p.table.cumulative_integral(t)
                } else {
                    Ok(p.table.integrate_all())
                }
            }
        }
    }

    /// Total propellant mass burnt over the whole combustion.
    pub fn total_mass(&self) -> f64 {
        match self {
            FlowRate::Constant(c) => c.value * c.duration,
            FlowRate::Variable(p) => p.table.integrate_all(),
        }
    }

    /// Check that the curve ends at `combustion_time` and burns no more than
    /// `total_propellant_mass`.
    pub fn is_consistent_with(
        &self,
        total_propellant_mass: f64,
        combustion_time: f64,
    ) -> Result<bool> {
        if self.combustion_duration() != combustion_time {
            return Err(FireflyError::InvalidParameter(format!(
                "the last time value ({}) must be equal to the combustion time ({combustion_time})",
                self.combustion_duration()
            )));
        }
        Ok(self.total_mass() <= total_propellant_mass)
    }
}

impl TimedQuantity for FlowRate {
    fn current(&self, time_since_ignition: f64) -> Result<f64> {
        let t = validate_time(time_since_ignition)?;
        match self {
            FlowRate::Constant(c) => Ok(if t <= c.duration { c.value } else { 0.0 }),
            FlowRate::Variable(p) => p.table.get_value(t, true),
        }
    }

    fn combustion_duration(&self) -> f64 {
        match self {
            FlowRate::Constant(c) => c.duration,
            FlowRate::Variable(p) => p.table.max_x(),
        }
    }
}

/// Specific impulse of an engine, in seconds.
#[derive(Debug, Clone, PartialEq)]
pub enum SpecificImpulse {
    /// No motor: zero at all times.
    None,
    Constant(ConstantProfile),
    /// Sampled impulse, extended linearly past the last sample.
    Variable(SampledProfile),
}

impl SpecificImpulse {
    pub fn constant(value: f64, duration: f64) -> Result<Self> {
        Ok(SpecificImpulse::Constant(ConstantProfile::new(value, duration)?))
    }

    /// Sampled impulse. Times must start at ignition and values must be
    /// non-negative.
    pub fn variable(times: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Ok(SpecificImpulse::Variable(SampledProfile::new(
            times,
            values,
            Extrapolation::Linear,
        )?))
    }

    pub fn from_record(record: &TimedDataRecord) -> Result<Self> {
        match record {
            TimedDataRecord::Constant { value, duration } => Self::constant(*value, *duration),
            TimedDataRecord::Variable(table) => Self::variable(table.x.clone(), table.y.clone()),
        }
    }
}

impl TimedQuantity for SpecificImpulse {
    fn current(&self, time_since_ignition: f64) -> Result<f64> {
        let t = validate_time(time_since_ignition)?;
        match self {
            SpecificImpulse::None => Ok(0.0),
            SpecificImpulse::Constant(c) => {
                if t > c.duration {
                    return Err(FireflyError::OutOfRange {
                        value: t,
                        min: START_TIME,
                        max: c.duration,
                    });
                }
                Ok(c.value)
            }
            SpecificImpulse::Variable(p) => p.table.get_value(t, true),
        }
    }

    fn combustion_duration(&self) -> f64 {
        match self {
            SpecificImpulse::None => START_TIME,
            SpecificImpulse::Constant(c) => c.duration,
            SpecificImpulse::Variable(p) => p.table.max_x(),
        }
    }
}
