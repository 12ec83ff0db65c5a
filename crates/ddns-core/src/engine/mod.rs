//! Core DDNS engine
//!
//! The engine is split in two:
//! - [`Reconciler`]: one full probe → read → compare → write step
//! - [`Scheduler`]: drives the reconciler at a fixed delay until shutdown
//!
//! ## Architecture
//!
//! ```text
//!                         ┌──────────────┐
//!                         │  Scheduler   │
//!                         └──────────────┘
//!                                │ tick
//!                                ▼
//! ┌──────────────┐        ┌──────────────┐        ┌─────────────┐
//! │ AddressProbe │◀───────│  Reconciler  │───────▶│ ZoneClient  │
//! │ (observe)    │        └──────────────┘        │ (read/write)│
//! └──────────────┘                │               └─────────────┘
//!                                 ▼
//!                         ┌──────────────┐
//!                         │   Events     │
//!                         └──────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Observe the public address
//! 2. Read the published address (a missing record reads as `<none>`)
//! 3. First tick only: emit `Started`
//! 4. If they differ, upsert the observed address
//! 5. Emit exactly one `Tick` outcome

mod reconciler;
mod scheduler;

pub use reconciler::{ReconcileState, Reconciler};
pub use scheduler::Scheduler;

use crate::address::{Address, Published};
use crate::error::ErrorKind;

/// Result of a single tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Published and observed addresses already agree
    NoChange,

    /// The zone was moved from `from` to `to`
    Updated { from: Published, to: Address },

    /// The tick failed; the next tick retries
    Error(TickError),
}

impl TickOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, TickOutcome::Error(_))
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            TickOutcome::Error(err) => Some(err.kind),
            _ => None,
        }
    }
}

/// A failed tick, with whatever addresses were learned before the failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickError {
    pub kind: ErrorKind,
    pub detail: String,
    pub observed: Option<Address>,
    pub published: Option<Published>,
}

/// Events emitted by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// First successful observation of both sides, emitted once per process
    Started {
        observed: Address,
        published: Published,
    },

    /// Outcome of one tick
    Tick(TickOutcome),

    /// Scheduler stopped
    Stopped { reason: String },
}
