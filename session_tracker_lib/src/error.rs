use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionField {
    Latitude,
    Longitude,
    Distance,
    Duration,
    Cadence,
    ElevationGain,
}

impl fmt::Display for SessionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionField::Latitude => "latitude",
            SessionField::Longitude => "longitude",
            SessionField::Distance => "distance",
            SessionField::Duration => "duration",
            SessionField::Cadence => "cadence",
            SessionField::ElevationGain => "elevation gain",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationReason {
    NotFinite,
    NotPositive,
    Negative,
    OutOfRange,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationReason::NotFinite => "must be a finite number",
            ValidationReason::NotPositive => "must be a positive number",
            ValidationReason::Negative => "must not be negative",
            ValidationReason::OutOfRange => "is out of range",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{field} {reason}")]
pub struct ValidationError {
    pub field: SessionField,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: SessionField, reason: ValidationReason) -> Self {
        Self { field, reason }
    }
}

#[derive(Debug, Error)]
#[error("failed to serialize sessions: {0}")]
pub struct CodecError(#[from] pub serde_json::Error);

#[derive(Debug, Error)]
#[error("stored sessions are malformed: {0}")]
pub struct RestoreError(#[from] pub serde_json::Error);
