// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::device::{FakeDeviceLink, LinkCall, LinkError};
use pj_core::{Anomaly, FakeClock, PrinterClass, RecordingReporter};

struct Harness {
    link: FakeDeviceLink,
    clock: FakeClock,
    reporter: RecordingReporter,
    session: PrinterSession<FakeDeviceLink, FakeClock>,
}

fn harness(class: PrinterClass) -> Harness {
    let link = FakeDeviceLink::new();
    let clock = FakeClock::new();
    let reporter = RecordingReporter::new();
    let session = PrinterSession::new(
        link.clone(),
        clock.clone(),
        PrinterProfile::for_class(class),
        reporter.shared(),
    );
    Harness {
        link,
        clock,
        reporter,
        session,
    }
}

async fn started(class: PrinterClass) -> Harness {
    let mut h = harness(class);
    h.session.connect().await.unwrap();
    h.session
        .start_job("part.gcode", &JobFlags::new())
        .await
        .unwrap();
    h
}

#[tokio::test]
async fn connect_moves_to_ready() {
    let mut h = harness(PrinterClass::Klipper);
    assert_eq!(h.session.state(), DeviceState::Unknown);

    h.session.connect().await.unwrap();

    assert_eq!(h.session.state(), DeviceState::Ready);
    assert_eq!(h.link.calls(), vec![LinkCall::Open]);
}

#[tokio::test]
async fn failed_connect_is_a_transport_error() {
    let mut h = harness(PrinterClass::Klipper);
    h.link.fail_open(LinkError::Connection("refused".into()));

    let err = h.session.connect().await.unwrap_err();

    assert!(matches!(err, DeviceError::Transport(_)));
    assert_eq!(h.session.state(), DeviceState::Unknown);
}

#[tokio::test]
async fn start_requires_connection() {
    let mut h = harness(PrinterClass::Klipper);

    let err = h
        .session
        .start_job("part.gcode", &JobFlags::new())
        .await
        .unwrap_err();

    assert_eq!(err, DeviceError::NotConnected);
}

#[tokio::test]
async fn status_translates_raw_sample() {
    let mut h = harness(PrinterClass::Klipper);
    h.session.connect().await.unwrap();
    h.link.push("printing", 42.0);

    let status = h.session.status().await.unwrap();

    assert_eq!(status.state, DeviceState::Active);
    assert_eq!(status.progress, 42.0);
}

#[tokio::test]
async fn status_is_none_when_unreadable() {
    let mut h = harness(PrinterClass::Klipper);
    h.session.connect().await.unwrap();
    h.link.push_error(LinkError::Timeout("no reply".into()));

    assert_eq!(h.session.status().await, None);
}

#[tokio::test]
async fn completes_after_corroborated_finish() {
    let mut h = started(PrinterClass::Klipper).await;
    h.link
        .push("printing", 50.0)
        .push("printing", 95.0)
        .push("complete", 100.0);

    h.session.await_completion(&Interrupt::new()).await.unwrap();

    assert_eq!(h.session.state(), DeviceState::Completed);
    assert_eq!(h.link.sample_count(), 3);
    assert_eq!(
        h.clock.sleeps(),
        vec![Duration::from_secs(30), Duration::from_secs(15)]
    );
}

#[tokio::test]
async fn single_spurious_completion_does_not_end_wait() {
    let mut h = started(PrinterClass::Klipper).await;
    h.link
        .push("printing", 40.0)
        .push("complete", 40.0)
        .push("printing", 50.0)
        .push("complete", 100.0);

    h.session.await_completion(&Interrupt::new()).await.unwrap();

    assert_eq!(h.link.sample_count(), 4);
}

#[tokio::test]
async fn reported_fault_fails_the_job() {
    let mut h = started(PrinterClass::Klipper).await;
    h.link.push("printing", 20.0).push("error", 20.0);

    let err = h
        .session
        .await_completion(&Interrupt::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeviceError::Fault(FaultReason::Reported {
            state: DeviceState::Failed,
            progress: 20.0,
        })
    );
    assert_eq!(h.session.state(), DeviceState::Failed);
}

#[tokio::test]
async fn cancellation_ends_in_cancelled_state() {
    let mut h = started(PrinterClass::Klipper).await;
    h.link.push("printing", 20.0).push("cancelled", 20.0);

    let err = h
        .session
        .await_completion(&Interrupt::new())
        .await
        .unwrap_err();

    assert!(matches!(err, DeviceError::Fault(FaultReason::Reported { .. })));
    assert_eq!(h.session.state(), DeviceState::Cancelled);
}

#[tokio::test]
async fn known_false_positive_is_reported_and_ignored() {
    let mut h = started(PrinterClass::Anycubic).await;
    h.link
        .push("printing", 10.0)
        .push("error", 10.0)
        .push("complete", 100.0);

    h.session.await_completion(&Interrupt::new()).await.unwrap();

    assert_eq!(h.clock.sleeps()[0], Duration::from_secs(15));
    assert!(h.reporter.events().contains(&RunEvent::FaultIgnored {
        raw_state: "error".to_string()
    }));
}

#[tokio::test]
async fn first_job_waits_longer_than_later_jobs() {
    let mut h = started(PrinterClass::BambuLab).await;
    h.link.push("RUNNING", 100.0).push("FINISH", 100.0);
    h.session.await_completion(&Interrupt::new()).await.unwrap();
    assert_eq!(
        h.clock.sleeps(),
        vec![Duration::from_secs(30), Duration::from_secs(5)]
    );

    h.session
        .start_job("second.gcode", &JobFlags::new())
        .await
        .unwrap();
    h.link.push("RUNNING", 100.0).push("FINISH", 100.0);
    h.session.await_completion(&Interrupt::new()).await.unwrap();

    assert_eq!(h.clock.sleeps().len(), 3);
    assert_eq!(h.clock.sleeps()[2], Duration::from_secs(5));
    assert!(h.link.calls().contains(&LinkCall::Start {
        file: "second.gcode".to_string(),
        first_job: false,
    }));
}

#[tokio::test]
async fn leftover_terminal_state_is_not_taken_as_completion() {
    let mut h = started(PrinterClass::Klipper).await;
    h.link
        .push("complete", 100.0)
        .push("complete", 100.0)
        .push("printing", 3.0)
        .push("complete", 100.0);

    h.session.await_completion(&Interrupt::new()).await.unwrap();

    assert_eq!(h.link.sample_count(), 4);
    assert_eq!(h.clock.sleeps()[..2], [Duration::from_secs(5); 2]);
}

#[tokio::test]
async fn idle_printer_never_starts() {
    let mut h = started(PrinterClass::BambuLab).await;
    h.link.push("IDLE", 0.0);

    let err = h
        .session
        .await_completion(&Interrupt::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeviceError::Fault(FaultReason::NeverStarted { polls: 11 })
    );
    assert!(h
        .reporter
        .events()
        .iter()
        .any(|e| matches!(
            e,
            RunEvent::Anomaly {
                anomaly: Anomaly::IdleAtLowProgress { .. }
            }
        )));
}

#[tokio::test]
async fn unreadable_printer_gives_up_after_budget() {
    let mut h = started(PrinterClass::Klipper).await;
    h.link.push_error(LinkError::Timeout("no reply".into()));

    let err = h
        .session
        .await_completion(&Interrupt::new())
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DeviceError::Fault(FaultReason::Unreachable { failures: 5 })
    );
    assert_eq!(h.clock.sleeps(), vec![Duration::from_secs(15); 4]);
}

#[tokio::test]
async fn interrupt_cancels_wait() {
    let mut h = started(PrinterClass::Klipper).await;
    h.link.push("printing", 20.0);
    let interrupt = Interrupt::new();
    interrupt.trigger();

    let err = h.session.await_completion(&interrupt).await.unwrap_err();

    assert_eq!(err, DeviceError::Interrupted);
    assert_eq!(h.session.state(), DeviceState::Cancelled);
    assert_eq!(h.link.sample_count(), 0);
}

#[tokio::test]
async fn reposition_only_when_profile_requires_it() {
    let mut bambu = harness(PrinterClass::BambuLab);
    bambu.session.connect().await.unwrap();
    bambu.session.reposition_bed().await.unwrap();
    assert!(bambu.session.needs_bed_reposition());
    assert!(bambu.link.calls().contains(&LinkCall::Reposition));

    let mut klipper = harness(PrinterClass::Klipper);
    klipper.session.connect().await.unwrap();
    klipper.session.reposition_bed().await.unwrap();
    assert!(!klipper.session.needs_bed_reposition());
    assert!(!klipper.link.calls().contains(&LinkCall::Reposition));
}

#[tokio::test]
async fn cleanup_runs_for_classes_with_a_hook() {
    let mut prusa = harness(PrinterClass::Prusa);
    prusa.session.connect().await.unwrap();
    prusa.session.run_cleanup().await.unwrap();
    assert_eq!(prusa.session.cleanup_hook(), CleanupHook::AfterEveryJob);
    assert!(prusa.link.calls().contains(&LinkCall::Cleanup));

    let mut klipper = harness(PrinterClass::Klipper);
    klipper.session.connect().await.unwrap();
    klipper.session.run_cleanup().await.unwrap();
    assert!(!klipper.link.calls().contains(&LinkCall::Cleanup));
}

#[tokio::test]
async fn disconnect_closes_link_once() {
    let mut h = harness(PrinterClass::Klipper);
    h.session.connect().await.unwrap();

    h.session.disconnect().await;
    h.session.disconnect().await;

    let closes = h
        .link
        .calls()
        .iter()
        .filter(|c| matches!(c, LinkCall::Close))
        .count();
    assert_eq!(closes, 1);
    assert_eq!(h.session.state(), DeviceState::Unknown);
}
