//! Contract Test: Single-Tick Reconciliation
//!
//! Constraints verified:
//! - Equal addresses never cause a write
//! - Divergent addresses cause exactly one UPSERT with TTL 60
//! - A missing record is created
//! - Probe failures short-circuit before any zone call
//! - Zone failures are reported with their own kind and retried next tick
//! - A write is observed by the next read

mod common;

use common::*;
use ddns_core::error::{Error, ErrorKind};
use ddns_core::{Published, Reconciler, TickOutcome};

fn reconciler(probe: &ScriptedProbe, zone: &RecordingZone) -> Reconciler {
    let (reconciler, _event_rx) = Reconciler::new(
        Box::new(probe.clone()),
        Box::new(zone.clone()),
        &minimal_config(),
    )
    .expect("reconciler construction succeeds");
    reconciler
}

#[tokio::test]
async fn steady_state_issues_no_upsert() {
    let probe = ScriptedProbe::always("203.0.113.7");
    let zone = RecordingZone::with_record("203.0.113.7");
    let mut reconciler = reconciler(&probe, &zone);

    let outcome = reconciler.reconcile().await;

    assert_eq!(outcome, TickOutcome::NoChange);
    assert_eq!(zone.upserts_started(), 0);
    assert_eq!(zone.read_count(), 1);
}

#[tokio::test]
async fn address_change_upserts_observed_address() {
    let probe = ScriptedProbe::always("203.0.113.8");
    let zone = RecordingZone::with_record("203.0.113.7");
    let mut reconciler = reconciler(&probe, &zone);

    let outcome = reconciler.reconcile().await;

    assert_eq!(
        outcome,
        TickOutcome::Updated {
            from: Published::Present(addr("203.0.113.7")),
            to: addr("203.0.113.8"),
        }
    );
    assert_eq!(
        zone.upserts(),
        vec![Upsert {
            name: RECORD.to_string(),
            address: addr("203.0.113.8"),
            ttl_secs: 60,
        }]
    );
}

#[tokio::test]
async fn probe_failure_skips_zone_and_next_tick_recovers() {
    let probe = ScriptedProbe::new(vec![
        ProbeStep::Fail(Error::probe_unreachable("connection refused")),
        ProbeStep::Observe("203.0.113.7"),
    ]);
    let zone = RecordingZone::with_record("203.0.113.7");
    let mut reconciler = reconciler(&probe, &zone);

    let outcome = reconciler.reconcile().await;
    assert_eq!(outcome.error_kind(), Some(ErrorKind::ProbeUnreachable));
    assert_eq!(zone.read_count(), 0, "zone must not be touched");
    assert_eq!(zone.upserts_started(), 0);

    let outcome = reconciler.reconcile().await;
    assert_eq!(outcome, TickOutcome::NoChange);
    assert_eq!(zone.read_count(), 1);
}

#[tokio::test]
async fn rejected_upsert_is_retried_next_tick() {
    let probe = ScriptedProbe::always("203.0.113.9");
    let zone = RecordingZone::with_record("203.0.113.7");
    zone.fail_next_upsert(Error::zone_rejected("InvalidChangeBatch"));
    let mut reconciler = reconciler(&probe, &zone);

    let outcome = reconciler.reconcile().await;
    match &outcome {
        TickOutcome::Error(err) => {
            assert_eq!(err.kind, ErrorKind::ZoneRejected);
            assert_eq!(err.observed, Some(addr("203.0.113.9")));
            assert_eq!(err.published, Some(Published::Present(addr("203.0.113.7"))));
        }
        other => panic!("expected error outcome, got {:?}", other),
    }
    assert!(zone.upserts().is_empty());
    assert_eq!(zone.published().as_deref(), Some("203.0.113.7"));

    let outcome = reconciler.reconcile().await;
    assert_eq!(
        outcome,
        TickOutcome::Updated {
            from: Published::Present(addr("203.0.113.7")),
            to: addr("203.0.113.9"),
        }
    );
    assert_eq!(zone.upserts_started(), 2);
    assert_eq!(zone.upserts().len(), 1);
}

#[tokio::test]
async fn missing_record_is_created() {
    let probe = ScriptedProbe::always("198.51.100.4");
    let zone = RecordingZone::empty();
    let mut reconciler = reconciler(&probe, &zone);

    let outcome = reconciler.reconcile().await;

    assert_eq!(
        outcome,
        TickOutcome::Updated {
            from: Published::Absent,
            to: addr("198.51.100.4"),
        }
    );
    match outcome {
        TickOutcome::Updated { from, .. } => assert_eq!(from.to_string(), "<none>"),
        _ => unreachable!(),
    }
    assert_eq!(zone.upserts().len(), 1);
    assert_eq!(zone.published().as_deref(), Some("198.51.100.4"));
}

#[tokio::test]
async fn malformed_probe_payload_makes_no_zone_calls() {
    let probe = ScriptedProbe::new(vec![ProbeStep::Fail(Error::probe_malformed(
        "missing field `ip`",
    ))]);
    let zone = RecordingZone::with_record("203.0.113.7");
    let mut reconciler = reconciler(&probe, &zone);

    let outcome = reconciler.reconcile().await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::ProbeMalformed));
    assert_eq!(zone.read_count(), 0);
    assert_eq!(zone.upserts_started(), 0);
}

#[tokio::test]
async fn malformed_published_value_is_an_error_not_a_write() {
    let probe = ScriptedProbe::always("203.0.113.7");
    let zone = RecordingZone::with_record("not-an-ip");
    let mut reconciler = reconciler(&probe, &zone);

    let outcome = reconciler.reconcile().await;

    assert_eq!(outcome.error_kind(), Some(ErrorKind::RecordMalformed));
    assert_eq!(zone.upserts_started(), 0);
}

#[tokio::test]
async fn zone_read_failures_keep_their_kind() {
    let probe = ScriptedProbe::always("203.0.113.7");
    let zone = RecordingZone::with_record("203.0.113.7");
    zone.fail_next_read(Error::zone_unauthorized("InvalidClientTokenId"));
    zone.fail_next_read(Error::zone_unavailable("Throttling"));
    let mut reconciler = reconciler(&probe, &zone);

    let first = reconciler.reconcile().await;
    let second = reconciler.reconcile().await;
    let third = reconciler.reconcile().await;

    assert_eq!(first.error_kind(), Some(ErrorKind::ZoneUnauthorized));
    assert_eq!(second.error_kind(), Some(ErrorKind::ZoneUnavailable));
    assert_eq!(third, TickOutcome::NoChange);
    assert_eq!(zone.upserts_started(), 0);
}

#[tokio::test]
async fn write_is_observed_by_next_tick() {
    let probe = ScriptedProbe::always("203.0.113.8");
    let zone = RecordingZone::with_record("203.0.113.7");
    let mut reconciler = reconciler(&probe, &zone);

    assert!(matches!(
        reconciler.reconcile().await,
        TickOutcome::Updated { .. }
    ));
    assert_eq!(reconciler.reconcile().await, TickOutcome::NoChange);
    assert_eq!(reconciler.reconcile().await, TickOutcome::NoChange);

    assert_eq!(zone.upserts().len(), 1, "only the first tick writes");
    assert_eq!(
        reconciler.state().last_published,
        Some(Published::Present(addr("203.0.113.8")))
    );
}

#[tokio::test]
async fn invalid_config_refuses_construction() {
    let mut config = minimal_config();
    config.hosted_zone_id.clear();

    let result = Reconciler::new(
        Box::new(ScriptedProbe::always("203.0.113.7")),
        Box::new(RecordingZone::empty()),
        &config,
    );

    let Err(err) = result else {
        panic!("construction should fail with an empty hosted zone id");
    };
    assert_eq!(err.kind(), ErrorKind::StartupConfigMissing);
}
