// # Zone Client Trait
//
// Defines the interface for reading and writing the managed A-record in an
// authoritative DNS zone.
//
// ## Implementations
//
// - Route 53: `ddns-zone-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::ZoneClient;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let zone = /* ZoneClient implementation */;
//
//     let published = zone.read("home.example.com").await?;
//     zone.upsert("home.example.com", published, 60).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::Address;

/// Trait for authoritative zone implementations
///
/// A zone client is bound to one zone and one authenticated session, both
/// fixed at construction and reused for the lifetime of the process.
///
/// # Contract
///
/// - Single-shot: one API call per operation, no retry, no backoff
/// - No decision making: whether to write is decided by the `Reconciler`
/// - No caching between calls
#[async_trait]
pub trait ZoneClient: Send + Sync {
    /// Read the published value of the A-record `record_name`
    ///
    /// Only the first value of the first matching record set is examined.
    /// A listed record set whose name does not match `record_name` (after
    /// trailing-dot and case normalization) counts as missing.
    ///
    /// # Errors
    ///
    /// `RecordMissing`, `RecordMalformed`, `ZoneUnauthorized`, `ZoneUnavailable`
    async fn read(&self, record_name: &str) -> Result<Address, crate::Error>;

    /// Create or replace the A-record `record_name` with a single value
    ///
    /// Returns once the provider has accepted the change, not after
    /// propagation.
    ///
    /// # Errors
    ///
    /// `ZoneUnauthorized`, `ZoneUnavailable`, `ZoneRejected`
    async fn upsert(
        &self,
        record_name: &str,
        address: Address,
        ttl_secs: u32,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
