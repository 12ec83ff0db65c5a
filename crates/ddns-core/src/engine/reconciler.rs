//! Single-shot reconciliation
//!
//! The reconciler is the failure boundary of a tick: every error, including
//! a panic inside a probe or zone call, becomes a `TickOutcome::Error` and
//! control returns to the caller.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, info, warn};

use super::{EngineEvent, TickError, TickOutcome};
use crate::address::{Address, Published};
use crate::config::DdnsConfig;
use crate::detector::{Change, detect};
use crate::error::{Error, ErrorKind, Result};
use crate::traits::{AddressProbe, ZoneClient};

/// State carried from one tick to the next
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileState {
    /// True until the first tick that reaches both sides
    pub first_run: bool,
    pub last_observed: Option<Address>,
    pub last_published: Option<Published>,
}

impl Default for ReconcileState {
    fn default() -> Self {
        Self {
            first_run: true,
            last_observed: None,
            last_published: None,
        }
    }
}

/// Addresses learned during the current tick
#[derive(Debug, Default)]
struct TickContext {
    observed: Option<Address>,
    published: Option<Published>,
}

/// Clears the in-write flag when the upsert finishes, fails, or unwinds
struct WriteGuard(Arc<AtomicBool>);

impl WriteGuard {
    fn enter(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for WriteGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Probe, read, compare and conditionally write one A-record
pub struct Reconciler {
    probe: Box<dyn AddressProbe>,

    zone: Box<dyn ZoneClient>,

    /// The managed record name, fixed for the process lifetime
    record_name: String,

    ttl_secs: u32,

    state: ReconcileState,

    tick: TickContext,

    /// Set while a zone write is in flight
    writing: Arc<AtomicBool>,

    event_tx: mpsc::Sender<EngineEvent>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// A tuple of (reconciler, event_receiver) where event_receiver yields engine events
    pub fn new(
        probe: Box<dyn AddressProbe>,
        zone: Box<dyn ZoneClient>,
        config: &DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.scheduler.event_channel_capacity);

        let reconciler = Self {
            probe,
            zone,
            record_name: config.record_name.clone(),
            ttl_secs: config.zone.ttl_secs,
            state: ReconcileState::default(),
            tick: TickContext::default(),
            writing: Arc::new(AtomicBool::new(false)),
            event_tx: tx,
        };

        Ok((reconciler, rx))
    }

    pub fn record_name(&self) -> &str {
        &self.record_name
    }

    pub fn state(&self) -> &ReconcileState {
        &self.state
    }

    /// Shared flag that is true while a zone write is in flight
    pub fn write_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.writing)
    }

    /// Execute one reconciliation step
    ///
    /// Never fails and never panics outward: every fault is folded into the
    /// returned outcome, which is also logged and published as an event.
    pub async fn reconcile(&mut self) -> TickOutcome {
        self.tick = TickContext::default();

        let outcome = match AssertUnwindSafe(self.step()).catch_unwind().await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(err)) => TickOutcome::Error(self.tick_error(err.kind(), err.detail())),
            Err(panic) => {
                let detail = format!("panic: {}", panic_message(panic.as_ref()));
                TickOutcome::Error(self.tick_error(ErrorKind::Internal, &detail))
            }
        };

        self.log_outcome(&outcome);
        self.emit_event(EngineEvent::Tick(outcome.clone()));
        outcome
    }

    async fn step(&mut self) -> Result<TickOutcome> {
        let observed = self.probe.observe().await?;
        self.tick.observed = Some(observed);
        self.state.last_observed = Some(observed);

        let published = match self.zone.read(&self.record_name).await {
            Ok(address) => Published::Present(address),
            Err(Error::RecordMissing(detail)) => {
                debug!("Record {} missing ({}), will create it", self.record_name, detail);
                Published::Absent
            }
            Err(e) => return Err(e),
        };
        self.tick.published = Some(published);
        self.state.last_published = Some(published);

        if self.state.first_run {
            self.state.first_run = false;
            info!(currentIP = %observed, domainIP = %published, "Started");
            self.emit_event(EngineEvent::Started {
                observed,
                published,
            });
        }

        match detect(observed, published) {
            Change::Unchanged => Ok(TickOutcome::NoChange),
            Change::Required { from, to } => {
                info!(currentIP = %to, domainIP = %from, "IP change detected");

                {
                    let _guard = WriteGuard::enter(&self.writing);
                    self.zone
                        .upsert(&self.record_name, to, self.ttl_secs)
                        .await?;
                }

                self.state.last_published = Some(Published::Present(to));
                info!(currentIP = %to, "Changed domainIP");
                Ok(TickOutcome::Updated { from, to })
            }
        }
    }

    fn tick_error(&self, kind: ErrorKind, detail: &str) -> TickError {
        TickError {
            kind,
            detail: detail.to_string(),
            observed: self.tick.observed,
            published: self.tick.published,
        }
    }

    fn log_outcome(&self, outcome: &TickOutcome) {
        match outcome {
            TickOutcome::NoChange => {
                debug!(currentIP = %or_unknown(self.tick.observed), "no change");
            }
            TickOutcome::Updated { .. } => {}
            TickOutcome::Error(err) => {
                error!(
                    kind = %err.kind,
                    error = %err.detail,
                    currentIP = %or_unknown(err.observed),
                    domainIP = %or_unknown(err.published),
                    "loop error"
                );
            }
        }
    }

    /// Emit an engine event
    ///
    /// Drops the event with a warning when the channel is full. A closed
    /// channel means nobody listens, which is fine.
    pub(crate) fn emit_event(&self, event: EngineEvent) {
        if let Err(TrySendError::Full(_)) = self.event_tx.try_send(event) {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

fn or_unknown<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "<unknown>".to_string(), |v| v.to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
