// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    bad_gateway = { 502, HttpError::GatewayTimeout(502) },
    gateway_timeout = { 504, HttpError::GatewayTimeout(504) },
    not_found = { 404, HttpError::Status(404) },
    server_error = { 500, HttpError::Status(500) },
)]
fn status_codes(code: u16, expected: HttpError) {
    assert_eq!(status_error(code), expected);
}

#[test]
fn only_timeouts_are_provisional() {
    assert!(HttpError::Timeout.is_provisional());
    assert!(HttpError::GatewayTimeout(504).is_provisional());
    assert!(!HttpError::Status(500).is_provisional());
    assert!(!HttpError::Connection("refused".into()).is_provisional());
}

#[test]
fn empty_body_is_null() {
    assert_eq!(parse_body("  ").unwrap(), Value::Null);
}

#[test]
fn garbage_body_is_a_protocol_error() {
    assert!(matches!(parse_body("<html>"), Err(HttpError::Protocol(_))));
}

#[test]
fn ok_result_is_case_insensitive() {
    assert!(is_ok_result(&json!({"result": "ok"})));
    assert!(is_ok_result(&json!({"result": "OK"})));
    assert!(!is_ok_result(&json!({"result": {"status": {}}})));
    assert!(!is_ok_result(&json!({"error": {"message": "Unknown command"}})));
}

#[test]
fn error_envelope_message() {
    let body = json!({"error": {"code": 400, "message": "Unknown command: \"FOO\""}});
    assert_eq!(
        error_message(&body).as_deref(),
        Some("Unknown command: \"FOO\"")
    );
    assert_eq!(error_message(&json!({"result": "ok"})), None);
}

#[test]
fn idle_timeout_state_is_read_from_status() {
    let body = json!({
        "result": {"eventtime": 1.0, "status": {"idle_timeout": {"state": "Idle", "printing_time": 0.0}}}
    });
    assert_eq!(idle_timeout_state(&body).as_deref(), Some("Idle"));
    assert_eq!(idle_timeout_state(&json!({"result": {}})), None);
}

#[test]
fn macro_names_come_from_gcode_macros_object() {
    let body = json!({
        "result": {"status": {"gcode_macros": {"OTTOEJECT_HOME": {}, "PARK_OTTOEJECT": {}}}}
    });
    let mut names = macro_names(&body);
    names.sort();
    assert_eq!(names, vec!["OTTOEJECT_HOME", "PARK_OTTOEJECT"]);
    assert!(macro_names(&json!({})).is_empty());
}

#[test]
fn client_trims_trailing_slash() {
    let client = MoonrakerClient::new("http://ejector.local:7125/", Duration::from_secs(1));
    assert_eq!(client.base_url(), "http://ejector.local:7125");
}
