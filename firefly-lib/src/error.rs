use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum FireflyError {
    InvalidShape(String),
    DuplicateAbscissa(f64),
    ExtrapolationNotAllowed { value: f64, min: f64, max: f64 },
    OutOfRange { value: f64, min: f64, max: f64 },
    InvalidInterval { begin: f64, end: f64 },
    NegativeTime(f64),
    InvalidParameter(String),
    NoMatchingSlope { target: f64, min_delta: f64 },
    UnknownEntry(String),
    DataError(String),
}

pub type Result<T> = std::result::Result<T, FireflyError>;

impl fmt::Display for FireflyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidShape(msg) => write!(f, "invalid shape: {msg}"),
            Self::DuplicateAbscissa(x) => {
                write!(f, "the following x value is already in the data: {x}")
            }
            Self::ExtrapolationNotAllowed { value, min, max } => {
                write!(f, "extrapolation is not allowed: {value} outside [{min}, {max}]")
            }
            Self::OutOfRange { value, min, max } => {
                write!(f, "value {value} out of range [{min}, {max}]")
            }
            Self::InvalidInterval { begin, end } => {
                write!(f, "invalid interval: begin {begin} is greater than end {end}")
            }
            Self::NegativeTime(t) => write!(f, "negative time value is not allowed: {t}"),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            Self::NoMatchingSlope { target, min_delta } => write!(
                f,
                "no part of the Allan deviation curve matches slope {target} \
                 (closest slope is {min_delta} away)"
            ),
            Self::UnknownEntry(name) => write!(f, "unknown dataset entry: {name}"),
            Self::DataError(msg) => write!(f, "data error: {msg}"),
        }
    }
}

impl std::error::Error for FireflyError {}
