// # HTTP Address Probe
//
// This crate provides the public-address probe for the DDNS system.
//
// ## Behavior
//
// One HTTPS GET per observation against an address-reflection endpoint
// (default `https://api.myip.com`). The body must be a JSON document with a
// string field named `ip`; any other fields are ignored.
//
// ## Failure Mapping
//
// - transport error, timeout, or non-2xx status → `ProbeUnreachable`
// - body is not JSON, `ip` is missing / not a string, or the body is larger
//   than `MAX_BODY_BYTES` → `ProbeMalformed`
// - `ip` present but not a dotted-quad IPv4 → `ProbeInvalidAddress`
//
// The probe never retries; the scheduler's cadence is the retry policy.

use ddns_core::config::ProbeConfig;
use ddns_core::traits::AddressProbe;
use ddns_core::{Address, Error, Result};

use serde::Deserialize;
use std::time::Duration;

/// Largest reflection body accepted; real responses are well under 200 bytes
const MAX_BODY_BYTES: usize = 4 * 1024;

/// Shape of the reflection endpoint's response
#[derive(Debug, Deserialize)]
struct Reflection {
    ip: String,
}

/// Public-address probe backed by an HTTPS reflection service
pub struct HttpAddressProbe {
    /// URL to fetch the address from
    url: String,

    /// HTTP client with the total request timeout applied
    client: reqwest::Client,
}

impl HttpAddressProbe {
    /// Create a new HTTP probe
    ///
    /// # Parameters
    ///
    /// - `url`: reflection endpoint (e.g., "https://api.myip.com")
    /// - `timeout`: bound on the whole request, body included
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create a probe from validated configuration
    pub fn from_config(config: &ProbeConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Read the response body, refusing anything over `limit` bytes
async fn read_capped(mut response: reqwest::Response, limit: usize) -> Result<Vec<u8>> {
    if let Some(len) = response.content_length()
        && len > limit as u64
    {
        return Err(Error::probe_malformed(format!(
            "Response body of {} bytes exceeds {} bytes",
            len, limit
        )));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| Error::probe_unreachable(format!("Failed to read response: {}", e)))?
    {
        if body.len() + chunk.len() > limit {
            return Err(Error::probe_malformed(format!(
                "Response body exceeds {} bytes",
                limit
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Turn a response body into a canonical address
fn parse_body(body: &[u8]) -> Result<Address> {
    let reflection: Reflection = serde_json::from_slice(body)
        .map_err(|e| Error::probe_malformed(format!("Unexpected response body: {}", e)))?;

    Address::parse(&reflection.ip).map_err(|e| {
        Error::probe_invalid_address(format!("{:?} is not an IPv4 address: {}", reflection.ip, e))
    })
}

#[async_trait::async_trait]
impl AddressProbe for HttpAddressProbe {
    async fn observe(&self) -> Result<Address> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| Error::probe_unreachable(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::probe_unreachable(format!("HTTP error: {}", status)));
        }

        let body = read_capped(response, MAX_BODY_BYTES).await?;

        let address = parse_body(&body)?;
        tracing::debug!(url = %self.url, currentIP = %address, "Observed public address");
        Ok(address)
    }

    fn probe_name(&self) -> &'static str {
        "http"
    }
}
