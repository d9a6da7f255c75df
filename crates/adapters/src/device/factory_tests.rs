// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::device::DeviceSession;
use pj_core::{DeviceState, FakeClock, SystemClock, TracingReporter};

fn config(host: &str) -> LinkConfig {
    LinkConfig {
        host: host.to_string(),
        ..LinkConfig::default()
    }
}

#[test]
fn moonraker_classes_build_a_session() {
    for class in [PrinterClass::Klipper, PrinterClass::Anycubic] {
        let session = build_session(
            class,
            &config("printer.local"),
            SystemClock,
            TracingReporter::shared(),
        )
        .unwrap();
        assert_eq!(session.state(), DeviceState::Unknown);
        assert_eq!(session.profile().class, class);
    }
}

#[test]
fn other_classes_are_unsupported() {
    let err = link_for(PrinterClass::BambuLab, &config("printer.local"), FakeClock::new()).err();
    assert_eq!(err, Some(DeviceError::Unsupported(PrinterClass::BambuLab)));
}

#[test]
fn host_is_required() {
    let err = link_for(PrinterClass::Klipper, &config(" "), FakeClock::new()).err();
    assert!(matches!(err, Some(DeviceError::Protocol(_))));
}
