// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::device::{DeviceCall, FakeDeviceSession, FakeOutcome};
use crate::ejector::{FakeEjectorTransport, TransportCall};
use pj_core::FaultReason;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// A writer that captures log output for testing
#[derive(Clone, Default)]
struct CapturedLogs {
    logs: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    fn new() -> Self {
        Self::default()
    }

    fn contents(&self) -> String {
        let logs = self.logs.lock().unwrap();
        String::from_utf8_lossy(&logs).to_string()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.logs.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run a test with captured tracing output
fn with_tracing<F, Fut>(f: F) -> (String, Fut::Output)
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future,
{
    let logs = CapturedLogs::new();
    let logs_clone = logs.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(logs_clone)
        .with_ansi(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, || {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
            .block_on(f())
    });

    (logs.contents(), result)
}

// =============================================================================
// Precondition validation tests
// =============================================================================

#[tokio::test]
async fn traced_device_rejects_empty_file_name() {
    let fake = FakeDeviceSession::new();
    let mut traced = TracedDeviceSession::new(fake.clone());

    let err = traced.start_job("  ", &JobFlags::new()).await.unwrap_err();

    assert!(
        err.to_string().contains("job file name is empty"),
        "Expected error about file name, got: {}",
        err
    );
    assert!(fake.calls().is_empty(), "inner session must not be called");
}

#[tokio::test]
async fn traced_ejector_rejects_empty_script() {
    let fake = FakeEjectorTransport::new();
    let traced = TracedEjectorTransport::new(fake.clone());

    let result = traced.dispatch("").await;

    assert!(matches!(result, Err(TransportError::Protocol(_))));
    assert!(fake.calls().is_empty());
}

// =============================================================================
// Tracing output verification tests
// =============================================================================

#[test]
fn traced_device_start_logs_entry_and_completion() {
    let (logs, result) = with_tracing(|| async {
        let mut traced = TracedDeviceSession::new(FakeDeviceSession::new());
        traced.connect().await.unwrap();
        traced.start_job("benchy.gcode", &JobFlags::new()).await
    });

    assert!(result.is_ok(), "start should succeed: {:?}", result);
    assert!(
        logs.contains("device.start_job"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("benchy.gcode"),
        "Should log file name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("started"),
        "Should log completion. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_device_logs_fault_with_reason() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeDeviceSession::new();
        fake.push_outcome(FakeOutcome::Fault(FaultReason::NeverStarted { polls: 11 }));
        let mut traced = TracedDeviceSession::new(fake);
        traced.connect().await.unwrap();
        traced.start_job("benchy.gcode", &JobFlags::new()).await.unwrap();
        traced.await_completion(&Interrupt::new()).await
    });

    assert!(result.is_err());
    assert!(
        logs.contains("print did not complete"),
        "Should log failure. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("never started"),
        "Should log fault reason. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("elapsed_ms"),
        "Should log timing. Logs:\n{}",
        logs
    );
}

#[test]
fn traced_ejector_dispatch_logs_provisional_reply() {
    let (logs, result) = with_tracing(|| async {
        let fake = FakeEjectorTransport::new();
        fake.on_dispatch("OTTOEJECT_HOME", Err(TransportError::GatewayTimeout(504)));
        TracedEjectorTransport::new(fake).dispatch("OTTOEJECT_HOME").await
    });

    assert_eq!(result, Err(TransportError::GatewayTimeout(504)));
    assert!(
        logs.contains("ejector.dispatch"),
        "Should log span name. Logs:\n{}",
        logs
    );
    assert!(
        logs.contains("may still be running"),
        "Should flag reply as provisional. Logs:\n{}",
        logs
    );
}

#[tokio::test]
async fn traced_wrappers_delegate() {
    let fake = FakeDeviceSession::new().with_reposition();
    let mut traced = TracedDeviceSession::new(fake.clone());
    traced.connect().await.unwrap();
    assert!(traced.needs_bed_reposition());
    traced.reposition_bed().await.unwrap();
    traced.disconnect().await;
    assert_eq!(
        fake.calls(),
        vec![
            DeviceCall::Connect,
            DeviceCall::RepositionBed,
            DeviceCall::Disconnect
        ]
    );

    let transport = FakeEjectorTransport::new();
    let traced = TracedEjectorTransport::new(transport.clone());
    traced.emergency_stop().await.unwrap();
    assert_eq!(transport.calls(), vec![TransportCall::EmergencyStop]);
}
