//! Failure taxonomy for chart computation.
//!
//! Every fallible step returns a [`ChartError`]. Callers that need the coarse
//! class (for logging or response mapping) use [`ChartError::kind`].

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::ephemeris::ProviderError;

/// Coarse failure class of a [`ChartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed input.
    InputValidation,
    /// Input was well formed but could not be resolved (place, zone, local time).
    ResolutionFailure,
    /// A collaborator (ephemeris, geocoder, timezone lookup) errored or timed out.
    CollaboratorFailure,
    /// The computation produced data that breaks its own invariants.
    ComputationInvariantViolation,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("missing field: {0}")]
    MissingField(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidField { field: &'static str, message: String },
    #[error("invalid calendar date/time: {0}")]
    InvalidCalendarDate(String),
    #[error("location missing: supply latitude and longitude, or location")]
    LocationMissing,
    #[error("coordinates out of range: latitude {latitude}, longitude {longitude}")]
    CoordinatesOutOfRange { latitude: f64, longitude: f64 },
    #[error("unknown house system: {system}. Valid systems: {valid:?}")]
    UnknownHouseSystem { system: String, valid: Vec<String> },
    #[error("unknown time zone: {0}")]
    UnknownTimezone(String),

    #[error("location not found: {0}")]
    LocationNotFound(String),
    #[error("time zone resolution failed at ({latitude}, {longitude}): {message}")]
    TimezoneResolutionFailed {
        latitude: f64,
        longitude: f64,
        message: String,
    },
    #[error("ambiguous local time {local} in {zone}")]
    AmbiguousLocalTime { local: String, zone: String },
    #[error("local time {local} does not exist in {zone}")]
    NonexistentLocalTime { local: String, zone: String },

    #[error("{service} failed: {message}")]
    Collaborator { service: &'static str, message: String },
    #[error("{service} timed out after {timeout:?}")]
    Timeout { service: &'static str, timeout: Duration },
    #[error("ephemeris failed for {body}: {message}")]
    Ephemeris { body: String, message: String },

    #[error("house system {system} is undefined at latitude {latitude}")]
    HouseSystemUndefined { system: String, latitude: f64 },
    #[error("no house interval contains longitude {longitude}")]
    HouseAssignmentFailed { longitude: f64 },
}

impl ChartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChartError::MissingField(_)
            | ChartError::InvalidField { .. }
            | ChartError::InvalidCalendarDate(_)
            | ChartError::LocationMissing
            | ChartError::CoordinatesOutOfRange { .. }
            | ChartError::UnknownHouseSystem { .. }
            | ChartError::UnknownTimezone(_) => ErrorKind::InputValidation,
            ChartError::LocationNotFound(_)
            | ChartError::TimezoneResolutionFailed { .. }
            | ChartError::AmbiguousLocalTime { .. }
            | ChartError::NonexistentLocalTime { .. } => ErrorKind::ResolutionFailure,
            ChartError::Collaborator { .. }
            | ChartError::Timeout { .. }
            | ChartError::Ephemeris { .. } => ErrorKind::CollaboratorFailure,
            ChartError::HouseSystemUndefined { .. } | ChartError::HouseAssignmentFailed { .. } => {
                ErrorKind::ComputationInvariantViolation
            }
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ChartError::InvalidField {
            field,
            message: message.into(),
        }
    }
}

impl From<ProviderError> for ChartError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::CalculationFailed { body, message, .. } => ChartError::Ephemeris {
                body: body.name().to_string(),
                message,
            },
            other => ChartError::Collaborator {
                service: "ephemeris",
                message: other.to_string(),
            },
        }
    }
}

/// Failure reported by a remote collaborator (geocoder, timezone lookup).
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Malformed(String),
}
