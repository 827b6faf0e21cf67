#![no_std]

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

/// A set of named propulsion curves, deserialized from a dataset blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedDataset {
    pub version: VersionRecord,
    pub entries: Vec<TimedDataEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub tag: String,
    pub notes: String,
}

/// Which physical quantity a timed curve describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuantityKind {
    FlowRate,
    SpecificImpulse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedDataEntry {
    pub name: String,
    pub kind: QuantityKind,
    pub data: TimedDataRecord,
}

/// Raw (x, y) samples. Validation happens when the library builds a table from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SampleTableRecord {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimedDataRecord {
    /// Constant value from ignition to `duration` seconds.
    Constant { value: f64, duration: f64 },
    /// Time samples in seconds since ignition, first sample at 0.
    Variable(SampleTableRecord),
}

/// Averaging times and Allan variance values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AllanCurveRecord {
    pub tau: Vec<f64>,
    pub avar: Vec<f64>,
}
