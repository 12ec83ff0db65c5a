//! Test doubles and common utilities for contract tests
//!
//! The doubles share their recorded state through `Arc`s, so a test can keep
//! a handle while the reconciler owns a boxed clone.

#![allow(dead_code)]

use ddns_core::config::{Credentials, DdnsConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressProbe, ZoneClient};
use ddns_core::{Address, EngineEvent};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

pub const RECORD: &str = "home.example.com";

pub fn addr(s: &str) -> Address {
    Address::parse(s).expect("valid test address")
}

/// One scripted probe response
#[derive(Debug, Clone)]
pub enum ProbeStep {
    Observe(&'static str),
    Fail(Error),
    Panic(&'static str),
}

#[derive(Default)]
struct ProbeInner {
    steps: Mutex<VecDeque<ProbeStep>>,
    last: Mutex<Option<ProbeStep>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    started_at: Mutex<Vec<Instant>>,
    delay: Mutex<Duration>,
}

/// A probe that replays a script; the last step repeats once exhausted
#[derive(Clone, Default)]
pub struct ScriptedProbe {
    inner: Arc<ProbeInner>,
}

impl ScriptedProbe {
    pub fn new(steps: Vec<ProbeStep>) -> Self {
        let probe = Self::default();
        *probe.inner.steps.lock().unwrap() = steps.into();
        probe
    }

    pub fn always(ip: &'static str) -> Self {
        Self::new(vec![ProbeStep::Observe(ip)])
    }

    /// Make every call take `delay` of (tokio) time
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.inner.delay.lock().unwrap() = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// Highest number of concurrent observe() calls seen
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn started_at(&self) -> Vec<Instant> {
        self.inner.started_at.lock().unwrap().clone()
    }

    fn next_step(&self) -> ProbeStep {
        let next = self.inner.steps.lock().unwrap().pop_front();
        let mut last = self.inner.last.lock().unwrap();
        match next {
            Some(step) => {
                *last = Some(step.clone());
                step
            }
            None => last
                .clone()
                .unwrap_or(ProbeStep::Fail(Error::probe_unreachable("script empty"))),
        }
    }
}

#[async_trait::async_trait]
impl AddressProbe for ScriptedProbe {
    async fn observe(&self) -> Result<Address> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.started_at.lock().unwrap().push(Instant::now());
        let now_in_flight = self.inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner
            .max_in_flight
            .fetch_max(now_in_flight, Ordering::SeqCst);

        let delay = *self.inner.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.next_step() {
            ProbeStep::Observe(ip) => Ok(addr(ip)),
            ProbeStep::Fail(err) => Err(err),
            ProbeStep::Panic(msg) => panic!("{}", msg),
        }
    }

    fn probe_name(&self) -> &'static str {
        "scripted"
    }
}

/// A recorded upsert call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upsert {
    pub name: String,
    pub address: Address,
    pub ttl_secs: u32,
}

#[derive(Default)]
struct ZoneInner {
    /// Raw published value; `None` means no record
    published: Mutex<Option<String>>,
    read_failures: Mutex<VecDeque<Error>>,
    upsert_failures: Mutex<VecDeque<Error>>,
    upsert_panics: Mutex<Option<&'static str>>,
    upsert_delay: Mutex<Duration>,
    reads: AtomicUsize,
    upserts_started: AtomicUsize,
    upserts: Mutex<Vec<Upsert>>,
}

/// An in-memory zone that records every call
///
/// Successful upserts replace the published value, so later reads observe
/// earlier writes.
#[derive(Clone, Default)]
pub struct RecordingZone {
    inner: Arc<ZoneInner>,
}

impl RecordingZone {
    pub fn with_record(value: &str) -> Self {
        let zone = Self::default();
        *zone.inner.published.lock().unwrap() = Some(value.to_string());
        zone
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn fail_next_read(&self, err: Error) {
        self.inner.read_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_upsert(&self, err: Error) {
        self.inner.upsert_failures.lock().unwrap().push_back(err);
    }

    pub fn panic_on_upsert(&self, msg: &'static str) {
        *self.inner.upsert_panics.lock().unwrap() = Some(msg);
    }

    pub fn with_upsert_delay(self, delay: Duration) -> Self {
        *self.inner.upsert_delay.lock().unwrap() = delay;
        self
    }

    pub fn published(&self) -> Option<String> {
        self.inner.published.lock().unwrap().clone()
    }

    pub fn read_count(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    pub fn upserts_started(&self) -> usize {
        self.inner.upserts_started.load(Ordering::SeqCst)
    }

    /// Upserts that were accepted
    pub fn upserts(&self) -> Vec<Upsert> {
        self.inner.upserts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ZoneClient for RecordingZone {
    async fn read(&self, record_name: &str) -> Result<Address> {
        self.inner.reads.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = self.inner.read_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let published = self.inner.published.lock().unwrap().clone();
        match published {
            None => Err(Error::record_missing(record_name)),
            Some(raw) => Address::parse(&raw)
                .map_err(|e| Error::record_malformed(format!("{:?}: {}", raw, e))),
        }
    }

    async fn upsert(&self, record_name: &str, address: Address, ttl_secs: u32) -> Result<()> {
        self.inner.upserts_started.fetch_add(1, Ordering::SeqCst);

        let delay = *self.inner.upsert_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let panic_msg = *self.inner.upsert_panics.lock().unwrap();
        if let Some(msg) = panic_msg {
            panic!("{}", msg);
        }

        if let Some(err) = self.inner.upsert_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        self.inner.upserts.lock().unwrap().push(Upsert {
            name: record_name.to_string(),
            address,
            ttl_secs,
        });
        *self.inner.published.lock().unwrap() = Some(address.to_string());
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config() -> DdnsConfig {
    DdnsConfig::new(Credentials::new("AKIDTEST", "test-secret"), "ZTEST", RECORD)
}

/// Drain every event currently buffered in the channel
pub fn drain(rx: &mut mpsc::Receiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
