// # Address Probe Trait
//
// Defines the interface for discovering the host's apparent public IPv4.
//
// ## Implementations
//
// - HTTPS reflection service: `ddns-probe-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressProbe;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let probe = /* AddressProbe implementation */;
//     let observed = probe.observe().await?;
//     println!("public address: {}", observed);
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::address::Address;

/// Trait for public-address probe implementations
///
/// # Contract
///
/// - One outbound request per call, bounded by an intrinsic timeout
/// - No retry and no caching: the scheduler cadence is the retry policy
/// - Failures are reported with one of the probe kinds:
///   `ProbeUnreachable`, `ProbeMalformed`, `ProbeInvalidAddress`
#[async_trait]
pub trait AddressProbe: Send + Sync {
    /// Observe the current public address
    ///
    /// # Returns
    ///
    /// - `Ok(Address)`: The canonical observed address
    /// - `Err(Error)`: A probe-kind failure
    async fn observe(&self) -> Result<Address, crate::Error>;

    /// Get the probe name (for logging/debugging)
    fn probe_name(&self) -> &'static str;
}
