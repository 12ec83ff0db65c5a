//! Command-line and environment configuration
//!
//! Every flag can also be given through a `DDNS_*` environment variable.
//! The four required parameters default to empty so that `DdnsConfig::validate`
//! can report all missing ones in a single diagnostic.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ddns_core::config::{DEFAULT_PROBE_URL, DEFAULT_RECORD_TTL};
use ddns_core::{Credentials, DdnsConfig};

use crate::logging::LogOptions;

/// Zone write mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Send change batches
    Live,
    /// Read the zone, only log the change batches
    DryRun,
}

#[derive(Parser)]
#[command(
    name = "ddnsd",
    version,
    about = "Keeps a Route 53 A-record pointed at this host's public IPv4 address"
)]
pub struct Args {
    /// Access key id
    #[arg(long = "awsId", env = "DDNS_AWS_ID", default_value = "", hide_env_values = true)]
    pub aws_id: String,

    /// Secret access key
    #[arg(
        long = "awsSecret",
        env = "DDNS_AWS_SECRET",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub aws_secret: String,

    /// Hosted zone that owns the record
    #[arg(long = "hostedZoneId", env = "DDNS_HOSTED_ZONE_ID", default_value = "")]
    pub hosted_zone_id: String,

    /// Fully qualified record name (e.g. home.example.com)
    #[arg(long = "domainName", env = "DDNS_DOMAIN_NAME", default_value = "")]
    pub domain_name: String,

    /// Endpoint returning {"ip": "<address>"}
    #[arg(long, env = "DDNS_PROBE_URL", default_value = DEFAULT_PROBE_URL)]
    pub probe_url: String,

    /// Seconds between the end of one check and the start of the next
    #[arg(long, env = "DDNS_INTERVAL_SECS", default_value_t = 60)]
    pub interval_secs: u64,

    /// TTL written with the record
    #[arg(long, env = "DDNS_TTL", default_value_t = DEFAULT_RECORD_TTL)]
    pub ttl: u32,

    /// Signing region for the Route 53 API
    #[arg(long, env = "DDNS_REGION", default_value = "us-east-1")]
    pub region: String,

    /// Route 53 API endpoint override (e.g., a local test server)
    #[arg(long, env = "DDNS_ROUTE53_ENDPOINT")]
    pub route53_endpoint: Option<String>,

    /// Zone write mode
    #[arg(long, env = "DDNS_MODE", value_enum, default_value_t = Mode::Live)]
    pub mode: Mode,

    /// Shorthand for --mode dry-run
    #[arg(long)]
    pub dry_run: bool,

    /// JSON log file; rotated backups are written next to it
    #[arg(long, env = "DDNS_LOG_FILE", default_value = "log.jsonl")]
    pub log_file: PathBuf,

    /// Rotate the log file once it grows past this many megabytes
    #[arg(long, env = "DDNS_LOG_MAX_SIZE_MB", default_value_t = 500)]
    pub log_max_size_mb: u64,

    /// Number of rotated backups to keep
    #[arg(long, env = "DDNS_LOG_MAX_BACKUPS", default_value_t = 100)]
    pub log_max_backups: usize,

    /// Delete rotated backups older than this many days (0 keeps them forever)
    #[arg(long, env = "DDNS_LOG_MAX_AGE_DAYS", default_value_t = 3650)]
    pub log_max_age_days: u64,

    /// Keep rotated backups uncompressed
    #[arg(long)]
    pub log_no_compress: bool,

    /// Default filter when RUST_LOG is not set
    #[arg(long, env = "DDNS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Print console logs as JSON instead of human-readable lines
    #[arg(long, env = "DDNS_CONSOLE_JSON")]
    pub console_json: bool,
}

impl Args {
    pub fn is_dry_run(&self) -> bool {
        self.dry_run || self.mode == Mode::DryRun
    }

    /// Build the core configuration; validation is left to the caller
    pub fn to_config(&self) -> DdnsConfig {
        let mut config = DdnsConfig::new(
            Credentials::new(self.aws_id.clone(), self.aws_secret.clone()),
            self.hosted_zone_id.clone(),
            self.domain_name.clone(),
        );
        config.probe.url = self.probe_url.clone();
        config.zone.region = self.region.clone();
        config.zone.ttl_secs = self.ttl;
        config.zone.dry_run = self.is_dry_run();
        config.zone.endpoint_url = self.route53_endpoint.clone();
        config.scheduler.interval_secs = self.interval_secs;
        config
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions {
            path: self.log_file.clone(),
            max_size_mb: self.log_max_size_mb,
            max_backups: self.log_max_backups,
            max_age_days: self.log_max_age_days,
            compress: !self.log_no_compress,
            level: self.log_level.clone(),
            console_json: self.console_json,
        }
    }
}
