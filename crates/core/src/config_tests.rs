// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::Write;

const FULL: &str = r#"
[printer]
class = "bambu_lab"
model = "P1S"

[printer.link]
host = "192.168.1.20"
serial = "01P00A000000000"
access_code = "12345678"

[ejector]
host = "ottoeject.local"
operation_timeout = "4m"

[macros]
load = "LOAD_CUSTOM"

[rack]
capacity = 6
occupied = [4, 5]

[run]
inter_job_delay = "30s"

[[job]]
file = "a.3mf"
store_slot = 1
grab_slot = 4
[job.flags]
use_ams = true

[[job]]
file = "b.3mf"
store_slot = 2
"#;

#[test]
fn parses_full_document() {
    let config = RunConfig::parse(FULL).unwrap();

    assert_eq!(config.printer.class, PrinterClass::BambuLab);
    assert_eq!(config.printer.link.host, "192.168.1.20");
    assert_eq!(
        config.printer.link.options.get("access_code").map(String::as_str),
        Some("12345678")
    );
    assert_eq!(config.ejector.port, DEFAULT_EJECTOR_PORT);
    assert_eq!(config.ejector.operation_timeout, Duration::from_secs(240));
    assert_eq!(config.ejector.command_timeout, Duration::from_secs(30));
    assert_eq!(config.ejector.base_url(), "http://ottoeject.local:7125");
    assert_eq!(config.run.inter_job_delay, Duration::from_secs(30));
    assert_eq!(config.jobs.len(), 2);
    assert_eq!(
        config.jobs[0].flags.get("use_ams"),
        Some(&serde_json::json!(true))
    );
}

#[test]
fn job_indices_follow_file_order() {
    let config = RunConfig::parse(FULL).unwrap();

    let jobs = config.job_list().unwrap();

    let indices: Vec<(u32, &str)> = jobs.iter().map(|j| (j.index, j.file.as_str())).collect();
    assert_eq!(indices, vec![(1, "a.3mf"), (2, "b.3mf")]);
}

#[test]
fn overrides_replace_catalog_defaults() {
    let config = RunConfig::parse(FULL).unwrap();

    let macros = config.device_macros();

    assert_eq!(macros.eject, "EJECT_FROM_BAMBULAB_P_ONE_S");
    assert_eq!(macros.load, "LOAD_CUSTOM");
    assert_eq!(macros.door_close.as_deref(), Some("CLOSE_DOOR_BAMBULAB_P_ONE_S"));
}

#[test]
fn initial_rack_marks_preloaded_slots() {
    let config = RunConfig::parse(FULL).unwrap();
    let rack = config.initial_rack().unwrap();
    assert_eq!(rack.occupied_slots(), vec![4, 5]);
}

#[test]
fn defaults_fill_optional_sections() {
    let text = r#"
[printer]
class = "klipper"
model = "Voron"

[ejector]
host = "arm"

[rack]
capacity = 3

[[job]]
file = "only.gcode"
store_slot = 1
"#;
    let config = RunConfig::parse(text).unwrap();

    assert_eq!(config.run.inter_job_delay, Duration::from_secs(10));
    assert_eq!(config.ejector.poll_interval, Duration::from_secs(3));
    assert_eq!(config.ejector.dispatch_attempts, 2);
    assert_eq!(config.macros, MacroOverrides::default());
}

#[test]
fn final_job_with_grab_slot_is_rejected() {
    let text = r#"
[printer]
class = "prusa"
model = "MK4"

[ejector]
host = "arm"

[rack]
capacity = 3

[[job]]
file = "a.gcode"
store_slot = 1
grab_slot = 2
"#;
    let err = RunConfig::parse(text).unwrap_err();
    assert!(matches!(err, ConfigError::Jobs(JobListError::FinalJobGrabs { job: 1 })));
}

#[test]
fn preloaded_slot_out_of_range_is_rejected() {
    let text = FULL.replace("occupied = [4, 5]", "occupied = [9]");
    let err = RunConfig::parse(&text).unwrap_err();
    assert!(matches!(err, ConfigError::Rack(SlotOutOfRange { slot: 9, capacity: 6 })));
}

#[test]
fn unknown_class_is_a_parse_error() {
    let text = FULL.replace("bambu_lab", "bambu");
    assert!(matches!(
        RunConfig::parse(&text).unwrap_err(),
        ConfigError::Parse(_)
    ));
}

#[test]
fn zero_capacity_is_rejected() {
    let text = FULL.replace("capacity = 6", "capacity = 0");
    let err = RunConfig::parse(&text).unwrap_err();
    assert_eq!(err.to_string(), "invalid config: rack.capacity must be at least 1");
}

#[test]
fn oversized_capacity_is_rejected_before_building_the_rack() {
    let text = FULL.replace("capacity = 6", "capacity = 4000000000");
    let err = RunConfig::parse(&text).unwrap_err();
    assert_eq!(err.to_string(), "invalid config: rack.capacity must be at most 256");

    let text = FULL.replace("capacity = 6", "capacity = 256");
    assert_eq!(RunConfig::parse(&text).unwrap().rack.capacity, 256);
}

#[test]
fn load_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL.as_bytes()).unwrap();

    let config = RunConfig::load(file.path()).unwrap();

    assert_eq!(config.rack.capacity, 6);
}

#[test]
fn load_reports_missing_file() {
    let err = RunConfig::load(Path::new("/nonexistent/run.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("/nonexistent/run.toml"));
}
