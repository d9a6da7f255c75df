// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn recording_reporter_captures_in_order() {
    let recorder = RecordingReporter::new();
    let sink = recorder.shared();

    sink.report(RunEvent::JobStarted {
        job: 1,
        file: "a.gcode".to_string(),
    });
    sink.report(RunEvent::PrintFinished { job: 1 });

    assert_eq!(
        recorder.events(),
        vec![
            RunEvent::JobStarted {
                job: 1,
                file: "a.gcode".to_string()
            },
            RunEvent::PrintFinished { job: 1 },
        ]
    );
}

#[test]
fn tracing_reporter_accepts_every_event() {
    let sink = TracingReporter::shared();
    sink.report(RunEvent::Anomaly {
        anomaly: Anomaly::Stalled {
            polls: 11,
            progress: 50.0,
        },
    });
    sink.report(RunEvent::PrintFailed {
        job: 2,
        reason: FaultReason::NeverStarted { polls: 11 },
    });
    sink.report(RunEvent::MacroDispatched {
        name: "OTTOEJECT_HOME".to_string(),
        provisional: true,
    });
}

#[test]
fn events_serialize_with_tag() {
    let json = serde_json::to_value(RunEvent::PlateStored { job: 2, slot: 4 }).unwrap();
    assert_eq!(
        json,
        serde_json::json!({ "event": "plate_stored", "job": 2, "slot": 4 })
    );
}
