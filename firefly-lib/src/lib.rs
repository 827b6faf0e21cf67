pub mod allan;
pub mod array;
pub mod dataset;
pub mod error;
pub mod interp;
#[cfg(feature = "noise")]
pub mod noise;
pub mod table;
pub mod timed;

pub use allan::{AllanConfig, AllanCurve, InputType, NoiseEffect, NoiseFit};
pub use dataset::Dataset;
pub use error::{FireflyError, Result};
pub use table::{Extrapolation, Interp1D};
pub use timed::{
    ConstantProfile, FlowRate, GenericTimedData, SampledProfile, SpecificImpulse, START_TIME,
    TimedQuantity,
};
pub use firefly_data;
