// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pj_core::FakeClock;
use serde_json::json;
use std::sync::Mutex;

#[test]
fn parses_print_status_query() {
    let body = json!({
        "result": {
            "status": {
                "print_stats": {"state": "printing", "filename": "part.gcode", "print_duration": 600.0},
                "virtual_sdcard": {"progress": 0.25},
                "extruder": {"temperature": 210.4, "target": 210.0},
                "heater_bed": {"temperature": 59.8, "target": 60.0}
            }
        }
    });

    let raw = parse_print_status(&body).unwrap();

    assert_eq!(raw.state, "printing");
    assert_eq!(raw.progress, 25.0);
    assert_eq!(raw.nozzle, Some(210.4));
    assert_eq!(raw.bed, Some(59.8));
    assert_eq!(raw.remaining, Some(Duration::from_secs(1800)));
}

#[test]
fn finished_print_has_nothing_remaining() {
    let body = json!({
        "result": {"status": {
            "print_stats": {"state": "complete", "print_duration": 3600.0},
            "virtual_sdcard": {"progress": 1.0}
        }}
    });

    let raw = parse_print_status(&body).unwrap();

    assert_eq!(raw.progress, 100.0);
    assert_eq!(raw.remaining, Some(Duration::ZERO));
    assert_eq!(raw.nozzle, None);
}

#[test]
fn missing_print_stats_is_a_protocol_error() {
    let body = json!({"result": {"status": {}}});
    assert!(matches!(
        parse_print_status(&body),
        Err(LinkError::Protocol(_))
    ));
}

#[test]
fn http_errors_map_to_link_errors() {
    assert!(matches!(
        LinkError::from(HttpError::GatewayTimeout(504)),
        LinkError::Timeout(_)
    ));
    assert!(matches!(
        LinkError::from(HttpError::Connection("refused".into())),
        LinkError::Connection(_)
    ));
    assert!(matches!(
        LinkError::from(HttpError::Status(500)),
        LinkError::Protocol(_)
    ));
}

#[test]
fn leviq_preamble_only_for_anycubic() {
    let config = LinkConfig {
        host: "printer.local".into(),
        ..LinkConfig::default()
    };
    let anycubic = MoonrakerLink::new(PrinterClass::Anycubic, &config, FakeClock::new());
    let klipper = MoonrakerLink::new(PrinterClass::Klipper, &config, FakeClock::new());
    let mut skip = JobFlags::new();
    skip.insert(LEVIQ_FLAG.to_string(), json!(false));

    assert!(anycubic.wants_leviq(&JobFlags::new()));
    assert!(!anycubic.wants_leviq(&skip));
    assert!(!klipper.wants_leviq(&JobFlags::new()));
}

#[tokio::test]
async fn preamble_is_spaced_on_the_injected_clock() {
    let clock = FakeClock::new();
    let sent = Mutex::new(Vec::new());

    send_preamble(&clock, |step| {
        sent.lock().unwrap().push(step);
        async move {
            match step {
                "LEVIQ2_PROBE" => Err(HttpError::Timeout),
                _ => Ok(()),
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(sent.into_inner().unwrap(), LEVIQ_PREAMBLE);
    assert_eq!(clock.sleeps(), vec![COMMAND_SPACING; LEVIQ_PREAMBLE.len()]);
}

#[tokio::test]
async fn preamble_stops_on_hard_error() {
    let clock = FakeClock::new();

    let err = send_preamble(&clock, |step| async move {
        match step {
            "LEVIQ2_PREHEATING" => Err(HttpError::Status(500)),
            _ => Ok(()),
        }
    })
    .await
    .unwrap_err();

    assert_eq!(err, HttpError::Status(500));
    assert_eq!(clock.sleeps(), vec![COMMAND_SPACING]);
}
