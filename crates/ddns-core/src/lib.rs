// # ddns-core
//
// Core library for the Route 53 dynamic DNS updater.
//
// ## Architecture Overview
//
// This library keeps one A-record pointed at the host's public IPv4:
// - **AddressProbe**: Trait for observing the public address
// - **ZoneClient**: Trait for reading and upserting the record
// - **Change Detector**: Pure comparison under canonical form
// - **Reconciler**: One probe → read → compare → write step, the failure boundary of a tick
// - **Scheduler**: Fixed-delay driver with write-aware shutdown
//
// ## Design Principles
//
// 1. **Separation of Concerns**: No network code here; probes and zones live in their own crates
// 2. **Single Worker**: Exactly one tick in flight, no locking around reconciliation state
// 3. **Cadence Is the Retry Policy**: Components never retry internally
// 4. **Library-First**: The daemon is thin glue over this crate

pub mod address;
pub mod config;
pub mod detector;
pub mod dns_name;
pub mod engine;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use address::{Address, AddressError, Published};
pub use config::{Credentials, DdnsConfig, ProbeConfig, SchedulerConfig, ZoneConfig};
pub use detector::Change;
pub use engine::{EngineEvent, Reconciler, Scheduler, TickError, TickOutcome};
pub use error::{Error, ErrorKind, Result};
pub use traits::{AddressProbe, ZoneClient};
