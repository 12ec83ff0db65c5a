//! Configuration types for the DDNS system
//!
//! The configuration is built once at startup and shared read-only by every
//! component afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::dns_name::validate_record_name;
use crate::error::{Error, Result};

/// Default public-address reflection endpoint
pub const DEFAULT_PROBE_URL: &str = "https://api.myip.com";

/// TTL written with every upsert
pub const DEFAULT_RECORD_TTL: u32 = 60;

/// Upper bound for the probe request timeout
pub const MAX_PROBE_TIMEOUT_SECS: u64 = 10;

/// Upper bound for a single zone API call
pub const MAX_ZONE_TIMEOUT_SECS: u64 = 30;

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Static cloud credentials
    pub credentials: Credentials,

    /// Authoritative hosted zone identifier
    pub hosted_zone_id: String,

    /// The A-record this process is responsible for
    pub record_name: String,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub zone: ZoneConfig,

    #[serde(default)]
    pub scheduler: SchedulerConfig,
}

impl DdnsConfig {
    /// Create a configuration with default tuning
    pub fn new(
        credentials: Credentials,
        hosted_zone_id: impl Into<String>,
        record_name: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            hosted_zone_id: hosted_zone_id.into(),
            record_name: record_name.into(),
            probe: ProbeConfig::default(),
            zone: ZoneConfig::default(),
            scheduler: SchedulerConfig::default(),
        }
    }

    /// Validate the configuration
    ///
    /// Empty required parameters are reported together in a single
    /// `StartupConfigMissing` error, named as they appear on the command line.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.credentials.access_key_id.is_empty() {
            missing.push("awsId");
        }
        if self.credentials.secret_access_key.is_empty() {
            missing.push("awsSecret");
        }
        if self.hosted_zone_id.is_empty() {
            missing.push("hostedZoneId");
        }
        if self.record_name.is_empty() {
            missing.push("domainName");
        }
        if !missing.is_empty() {
            return Err(Error::config_missing(missing.join(", ")));
        }

        validate_record_name(&self.record_name)?;
        self.probe.validate()?;
        self.zone.validate()?;
        self.scheduler.validate()?;

        Ok(())
    }
}

/// Static access-key credentials
///
/// The secret is never printed by `Debug`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .finish()
    }
}

/// Public-address probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Endpoint returning `{"ip": "..."}`
    #[serde(default = "default_probe_url")]
    pub url: String,

    /// Total request timeout (in seconds)
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::config("Probe URL cannot be empty"));
        }
        if !self.url.starts_with("https://") && !self.url.starts_with("http://") {
            return Err(Error::config(format!(
                "Probe URL must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }
        if !(1..=MAX_PROBE_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(Error::config(format!(
                "Probe timeout must be between 1 and {} seconds. Got: {}",
                MAX_PROBE_TIMEOUT_SECS, self.timeout_secs
            )));
        }
        Ok(())
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            url: default_probe_url(),
            timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Zone client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Signing region for the control-plane API
    #[serde(default = "default_region")]
    pub region: String,

    /// TTL written with every upsert (in seconds)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u32,

    /// Per-call timeout (in seconds)
    #[serde(default = "default_zone_timeout_secs")]
    pub timeout_secs: u64,

    /// Read the zone but only log the writes that would be issued
    #[serde(default)]
    pub dry_run: bool,

    /// API endpoint override; `None` uses the AWS default
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl ZoneConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(Error::config("Zone region cannot be empty"));
        }
        if self.ttl_secs == 0 {
            return Err(Error::config("Record TTL must be > 0"));
        }
        if !(1..=MAX_ZONE_TIMEOUT_SECS).contains(&self.timeout_secs) {
            return Err(Error::config(format!(
                "Zone timeout must be between 1 and {} seconds. Got: {}",
                MAX_ZONE_TIMEOUT_SECS, self.timeout_secs
            )));
        }
        if let Some(url) = &self.endpoint_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(Error::config(format!(
                "Zone endpoint must be an http(s) URL. Got: {}",
                url
            )));
        }
        Ok(())
    }
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            ttl_secs: default_ttl_secs(),
            timeout_secs: default_zone_timeout_secs(),
            dry_run: false,
            endpoint_url: None,
        }
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Delay between the end of one tick and the start of the next (in seconds)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Capacity of the engine event channel
    ///
    /// When full, new events are dropped with a warning log.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl SchedulerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::config("Scheduler interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_probe_url() -> String {
    DEFAULT_PROBE_URL.to_string()
}

fn default_probe_timeout_secs() -> u64 {
    MAX_PROBE_TIMEOUT_SECS
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_ttl_secs() -> u32 {
    DEFAULT_RECORD_TTL
}

fn default_zone_timeout_secs() -> u64 {
    MAX_ZONE_TIMEOUT_SECS
}

fn default_interval_secs() -> u64 {
    60
}

fn default_event_channel_capacity() -> usize {
    64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn valid() -> DdnsConfig {
        DdnsConfig::new(
            Credentials::new("AKIDEXAMPLE", "secret"),
            "Z123",
            "home.example.com",
        )
    }

    #[test]
    fn defaults_validate() {
        let config = valid();
        assert!(config.validate().is_ok());
        assert_eq!(config.zone.ttl_secs, 60);
        assert_eq!(config.scheduler.interval(), Duration::from_secs(60));
        assert_eq!(config.probe.url, DEFAULT_PROBE_URL);
    }

    #[test]
    fn all_missing_parameters_reported_together() {
        let config = DdnsConfig::new(Credentials::new("", ""), "Z123", "");
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StartupConfigMissing);
        assert_eq!(err.detail(), "awsId, awsSecret, domainName");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = valid();
        config.zone.ttl_secs = 0;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::StartupConfigInvalid);

        let mut config = valid();
        config.probe.timeout_secs = 11;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.zone.timeout_secs = 31;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.scheduler.interval_secs = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.probe.url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.record_name = "bad..name".to_string();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.zone.endpoint_url = Some("route53.amazonaws.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_override_is_optional() {
        let mut config = valid();
        assert_eq!(config.zone.endpoint_url, None);

        config.zone.endpoint_url = Some("http://127.0.0.1:8053".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn secret_not_exposed_in_debug() {
        let debug_str = format!("{:?}", valid());
        assert!(!debug_str.contains("\"secret\""));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(debug_str.contains("AKIDEXAMPLE"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: DdnsConfig = serde_json::from_value(serde_json::json!({
            "credentials": { "access_key_id": "id", "secret_access_key": "s" },
            "hosted_zone_id": "Z1",
            "record_name": "home.example.com",
            "zone": { "dry_run": true }
        }))
        .unwrap();

        assert!(config.zone.dry_run);
        assert!(config.zone.endpoint_url.is_none());
        assert_eq!(config.zone.ttl_secs, DEFAULT_RECORD_TTL);
        assert_eq!(config.scheduler.event_channel_capacity, 64);
        assert!(config.validate().is_ok());
    }
}
