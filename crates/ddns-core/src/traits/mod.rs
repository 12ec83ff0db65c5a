//! Core traits for the DDNS system
//!
//! This module defines the abstract interfaces the reconciler drives.
//!
//! - [`AddressProbe`]: Observe the host's public IPv4 address
//! - [`ZoneClient`]: Read and upsert the managed A-record

pub mod probe;
pub mod zone;

pub use probe::AddressProbe;
pub use zone::ZoneClient;
