// # Route 53 Zone Client
//
// This crate provides the Route 53 implementation of `ZoneClient`.
//
// ## Behavior
//
// - `read`: one `ListResourceRecordSets` call narrowed to (name, A), max 1 item
// - `upsert`: one `ChangeResourceRecordSets` call carrying a single UPSERT
// - No retries: the SDK retry layer is disabled, the scheduler's cadence
//   decides when to try again
// - Dry-run mode: reads are real, the change batch is only logged
// - Endpoint override: `ZoneConfig::endpoint_url` replaces the AWS endpoint
//
// ## Error Mapping
//
// | Condition | Read | Upsert |
// |---|---|---|
// | auth error code, 401, 403 | `ZoneUnauthorized` | `ZoneUnauthorized` |
// | throttling, `PriorRequestNotComplete`, 429, 5xx | `ZoneUnavailable` | `ZoneUnavailable` |
// | timeout, dispatch failure | `ZoneUnavailable` | `ZoneUnavailable` |
// | any other service error | `ZoneUnavailable` | `ZoneRejected` |
//
// ## Security
//
// The secret access key is handed to the SDK credential provider at
// construction and never stored or logged by this crate.
//
// ## API Reference
//
// - ListResourceRecordSets: GET `/2013-04-01/hostedzone/{Id}/rrset?name=..&type=A&maxitems=1`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/{Id}/rrset`

use async_trait::async_trait;
use aws_sdk_route53::Client;
use aws_sdk_route53::config::http::HttpResponse;
use aws_sdk_route53::config::retry::RetryConfig;
use aws_sdk_route53::config::timeout::TimeoutConfig;
use aws_sdk_route53::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_route53::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use ddns_core::config::DdnsConfig;
use ddns_core::dns_name::names_match;
use ddns_core::traits::ZoneClient;
use ddns_core::{Address, Error, Result};

/// Name reported to the SDK for the static credentials
const CREDENTIALS_PROVIDER_NAME: &str = "ddnsd-static";

/// Error codes Route 53 (and the STS/IAM front door) use for auth failures
const AUTH_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "ExpiredToken",
    "IncompleteSignature",
    "InvalidClientTokenId",
    "MissingAuthenticationToken",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

/// Error codes that mean "try again later"
const TRANSIENT_ERROR_CODES: &[&str] = &[
    "PriorRequestNotComplete",
    "RequestLimitExceeded",
    "ServiceUnavailable",
    "Throttling",
    "ThrottlingException",
];

/// Which call produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Read,
    Write,
}

/// Route 53 zone client
///
/// Holds one SDK client for the lifetime of the process. The client is
/// immutable after construction and shared by every tick.
pub struct Route53Zone {
    client: Client,

    /// Hosted zone that owns the record
    hosted_zone_id: String,

    /// Kept for diagnostics only
    access_key_id: String,

    /// Dry-run mode: if true, perform reads but skip change batches
    dry_run: bool,
}

// Custom Debug implementation that never shows credentials
impl std::fmt::Debug for Route53Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Zone")
            .field("hosted_zone_id", &self.hosted_zone_id)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Route53Zone {
    /// Build the authenticated session from configuration
    ///
    /// No request is made here. Credentials that could never sign a request
    /// (embedded whitespace or control characters) are refused with
    /// `StartupAuthFailure`.
    pub fn connect(config: &DdnsConfig) -> Result<Self> {
        let creds = &config.credentials;
        check_credential("awsId", &creds.access_key_id)?;
        check_credential("awsSecret", &creds.secret_access_key)?;

        let credentials = Credentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut sdk_builder = aws_sdk_route53::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.zone.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled())
            .timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(config.zone.timeout())
                    .build(),
            );
        sdk_builder.set_endpoint_url(config.zone.endpoint_url.clone());
        let sdk_config = sdk_builder.build();

        tracing::debug!(
            hosted_zone_id = %config.hosted_zone_id,
            region = %config.zone.region,
            endpoint = ?config.zone.endpoint_url,
            dry_run = config.zone.dry_run,
            "Route 53 session created"
        );

        Ok(Self {
            client: Client::from_conf(sdk_config),
            hosted_zone_id: config.hosted_zone_id.clone(),
            access_key_id: creds.access_key_id.clone(),
            dry_run: config.zone.dry_run,
        })
    }

    pub fn hosted_zone_id(&self) -> &str {
        &self.hosted_zone_id
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl ZoneClient for Route53Zone {
    async fn read(&self, record_name: &str) -> Result<Address> {
        let output = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(&self.hosted_zone_id)
            .start_record_name(record_name)
            .start_record_type(RrType::A)
            .max_items(1)
            .send()
            .await
            .map_err(|e| from_sdk(Operation::Read, e))?;

        let address = select_published(record_name, output.resource_record_sets())?;
        tracing::debug!(domainIP = %address, "Read published address");
        Ok(address)
    }

    async fn upsert(&self, record_name: &str, address: Address, ttl_secs: u32) -> Result<()> {
        let batch = upsert_batch(record_name, address, ttl_secs)?;

        if self.dry_run {
            tracing::info!(
                hosted_zone_id = %self.hosted_zone_id,
                batch = ?batch,
                "[DRY-RUN] Would send change batch"
            );
            return Ok(());
        }

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&self.hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| from_sdk(Operation::Write, e))?;

        tracing::debug!(change = ?output.change_info(), "Change batch accepted");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "route53"
    }
}

fn check_credential(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::auth(format!("{} is empty", name)));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::auth(format!(
            "{} contains whitespace or control characters",
            name
        )));
    }
    Ok(())
}

/// Pick the published address out of a narrowed listing
///
/// The listing starts at (name, A) but Route 53 returns the next record set
/// in sort order when there is no exact match, so the name and type of the
/// first set are checked before its value is trusted. Only the first value
/// of a multi-value set is used.
fn select_published(record_name: &str, sets: &[ResourceRecordSet]) -> Result<Address> {
    let set = match sets.first() {
        Some(set) if names_match(set.name(), record_name) && *set.r#type() == RrType::A => set,
        Some(set) => {
            return Err(Error::record_missing(format!(
                "{} (first listed set is {} {})",
                record_name,
                set.name(),
                set.r#type().as_str()
            )));
        }
        None => return Err(Error::record_missing(record_name)),
    };

    let value = set
        .resource_records()
        .first()
        .map(|record| record.value())
        .ok_or_else(|| {
            Error::record_malformed(format!("{} has no record values", set.name()))
        })?;

    Address::parse(value).map_err(|e| Error::record_malformed(format!("{:?}: {}", value, e)))
}

fn upsert_batch(record_name: &str, address: Address, ttl_secs: u32) -> Result<ChangeBatch> {
    let record = ResourceRecord::builder()
        .value(address.to_string())
        .build()
        .map_err(|e| Error::internal(format!("Failed to build resource record: {}", e)))?;

    let set = ResourceRecordSet::builder()
        .name(record_name)
        .r#type(RrType::A)
        .ttl(i64::from(ttl_secs))
        .resource_records(record)
        .build()
        .map_err(|e| Error::internal(format!("Failed to build record set: {}", e)))?;

    let change = Change::builder()
        .action(ChangeAction::Upsert)
        .resource_record_set(set)
        .build()
        .map_err(|e| Error::internal(format!("Failed to build change: {}", e)))?;

    ChangeBatch::builder()
        .changes(change)
        .build()
        .map_err(|e| Error::internal(format!("Failed to build change batch: {}", e)))
}

fn from_sdk<E>(op: Operation, err: SdkError<E, HttpResponse>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    match &err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => {
            Error::zone_unavailable(detail)
        }
        SdkError::ConstructionFailure(_) => Error::internal(detail),
        _ => classify(
            op,
            err.code(),
            err.raw_response().map(|response| response.status().as_u16()),
            detail,
        ),
    }
}

/// Map a service error code and HTTP status to an error kind
fn classify(op: Operation, code: Option<&str>, status: Option<u16>, detail: String) -> Error {
    let code = code.unwrap_or_default();

    if AUTH_ERROR_CODES.contains(&code) || matches!(status, Some(401 | 403)) {
        return Error::zone_unauthorized(detail);
    }
    if TRANSIENT_ERROR_CODES.contains(&code) || matches!(status, Some(429 | 500..=599)) {
        return Error::zone_unavailable(detail);
    }

    match op {
        Operation::Read => Error::zone_unavailable(detail),
        Operation::Write => Error::zone_rejected(detail),
    }
}
