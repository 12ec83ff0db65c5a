//! Error types for the DDNS system
//!
//! Every failure carries a detail string and maps onto one [`ErrorKind`].
//! Startup kinds are fatal; every other kind is reported for the current
//! tick only and the next tick retries.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// One or more required startup parameters are empty
    #[error("missing required parameter(s): {0}")]
    ConfigMissing(String),

    /// A startup parameter is present but unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Credential or session construction failed
    #[error("Authentication setup failed: {0}")]
    Authentication(String),

    /// The address-reflection service could not be reached
    #[error("address probe unreachable: {0}")]
    ProbeUnreachable(String),

    /// The probe response did not match the expected document
    #[error("address probe returned a malformed document: {0}")]
    ProbeMalformed(String),

    /// The probe response carried something that is not an IPv4 address
    #[error("address probe returned an invalid address: {0}")]
    ProbeInvalidAddress(String),

    /// The DNS provider refused the credentials
    #[error("zone access unauthorized: {0}")]
    ZoneUnauthorized(String),

    /// The DNS provider could not be reached or is throttling
    #[error("zone unavailable: {0}")]
    ZoneUnavailable(String),

    /// The DNS provider rejected a change batch
    #[error("zone rejected change: {0}")]
    ZoneRejected(String),

    /// No A-record with the managed name exists in the zone
    #[error("Record not found: {0}")]
    RecordMissing(String),

    /// The published record value is not a canonical IPv4 address
    #[error("record holds a malformed value: {0}")]
    RecordMalformed(String),

    /// Unexpected fault inside a tick
    #[error("internal fault: {0}")]
    Internal(String),
}

/// Discriminant of [`Error`], used in events and structured logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    StartupConfigMissing,
    StartupConfigInvalid,
    StartupAuthFailure,
    ProbeUnreachable,
    ProbeMalformed,
    ProbeInvalidAddress,
    ZoneUnauthorized,
    ZoneUnavailable,
    ZoneRejected,
    RecordMissing,
    RecordMalformed,
    Internal,
}

impl ErrorKind {
    /// Whether this kind aborts startup instead of a single tick
    pub fn is_startup(self) -> bool {
        matches!(
            self,
            ErrorKind::StartupConfigMissing
                | ErrorKind::StartupConfigInvalid
                | ErrorKind::StartupAuthFailure
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::StartupConfigMissing => "StartupConfigMissing",
            ErrorKind::StartupConfigInvalid => "StartupConfigInvalid",
            ErrorKind::StartupAuthFailure => "StartupAuthFailure",
            ErrorKind::ProbeUnreachable => "ProbeUnreachable",
            ErrorKind::ProbeMalformed => "ProbeMalformed",
            ErrorKind::ProbeInvalidAddress => "ProbeInvalidAddress",
            ErrorKind::ZoneUnauthorized => "ZoneUnauthorized",
            ErrorKind::ZoneUnavailable => "ZoneUnavailable",
            ErrorKind::ZoneRejected => "ZoneRejected",
            ErrorKind::RecordMissing => "RecordMissing",
            ErrorKind::RecordMalformed => "RecordMalformed",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// The taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigMissing(_) => ErrorKind::StartupConfigMissing,
            Error::Config(_) => ErrorKind::StartupConfigInvalid,
            Error::Authentication(_) => ErrorKind::StartupAuthFailure,
            Error::ProbeUnreachable(_) => ErrorKind::ProbeUnreachable,
            Error::ProbeMalformed(_) => ErrorKind::ProbeMalformed,
            Error::ProbeInvalidAddress(_) => ErrorKind::ProbeInvalidAddress,
            Error::ZoneUnauthorized(_) => ErrorKind::ZoneUnauthorized,
            Error::ZoneUnavailable(_) => ErrorKind::ZoneUnavailable,
            Error::ZoneRejected(_) => ErrorKind::ZoneRejected,
            Error::RecordMissing(_) => ErrorKind::RecordMissing,
            Error::RecordMalformed(_) => ErrorKind::RecordMalformed,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The detail string without the kind prefix
    pub fn detail(&self) -> &str {
        match self {
            Error::ConfigMissing(d)
            | Error::Config(d)
            | Error::Authentication(d)
            | Error::ProbeUnreachable(d)
            | Error::ProbeMalformed(d)
            | Error::ProbeInvalidAddress(d)
            | Error::ZoneUnauthorized(d)
            | Error::ZoneUnavailable(d)
            | Error::ZoneRejected(d)
            | Error::RecordMissing(d)
            | Error::RecordMalformed(d)
            | Error::Internal(d) => d,
        }
    }

    /// Create a missing-parameter error
    pub fn config_missing(msg: impl Into<String>) -> Self {
        Self::ConfigMissing(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication setup error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn probe_unreachable(msg: impl Into<String>) -> Self {
        Self::ProbeUnreachable(msg.into())
    }

    pub fn probe_malformed(msg: impl Into<String>) -> Self {
        Self::ProbeMalformed(msg.into())
    }

    pub fn probe_invalid_address(msg: impl Into<String>) -> Self {
        Self::ProbeInvalidAddress(msg.into())
    }

    pub fn zone_unauthorized(msg: impl Into<String>) -> Self {
        Self::ZoneUnauthorized(msg.into())
    }

    pub fn zone_unavailable(msg: impl Into<String>) -> Self {
        Self::ZoneUnavailable(msg.into())
    }

    pub fn zone_rejected(msg: impl Into<String>) -> Self {
        Self::ZoneRejected(msg.into())
    }

    /// Create a "record missing" error
    pub fn record_missing(msg: impl Into<String>) -> Self {
        Self::RecordMissing(msg.into())
    }

    pub fn record_malformed(msg: impl Into<String>) -> Self {
        Self::RecordMalformed(msg.into())
    }

    /// Create an internal fault error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
