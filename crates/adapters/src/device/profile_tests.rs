// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pj_core::{CompletionMonitor, StatusTracker, Verdict};
use yare::parameterized;

fn translate(class: PrinterClass, state: &str, progress: f64) -> DeviceState {
    PrinterProfile::for_class(class)
        .translate(&RawStatus::new(state, progress))
        .status
        .state
}

#[parameterized(
    bambu_running = { PrinterClass::BambuLab, "RUNNING", 40.0, DeviceState::Active },
    bambu_finish = { PrinterClass::BambuLab, "FINISH", 100.0, DeviceState::Completed },
    bambu_paused_is_fault = { PrinterClass::BambuLab, "PAUSED", 40.0, DeviceState::Failed },
    bambu_lower_case = { PrinterClass::BambuLab, "idle", 0.0, DeviceState::Ready },
    flashforge_ready_done = { PrinterClass::FlashForge, "ready", 99.5, DeviceState::Completed },
    flashforge_ready_idle = { PrinterClass::FlashForge, "ready", 12.0, DeviceState::Ready },
    flashforge_stop_done = { PrinterClass::FlashForge, "stop", 100.0, DeviceState::Completed },
    flashforge_stop_early = { PrinterClass::FlashForge, "stop", 30.0, DeviceState::Cancelled },
    creality_finished = { PrinterClass::Creality, "4", 100.0, DeviceState::Completed },
    creality_error_at_end = { PrinterClass::Creality, "3", 99.0, DeviceState::Completed },
    creality_error_midway = { PrinterClass::Creality, "3", 40.0, DeviceState::Failed },
    elegoo_finished = { PrinterClass::Elegoo, "9", 100.0, DeviceState::Completed },
    elegoo_stopped = { PrinterClass::Elegoo, "10", 50.0, DeviceState::Cancelled },
    elegoo_preparing = { PrinterClass::Elegoo, "5", 0.0, DeviceState::Starting },
    prusa_finished = { PrinterClass::Prusa, "FINISHED", 100.0, DeviceState::Completed },
    prusa_attention = { PrinterClass::Prusa, "ATTENTION", 10.0, DeviceState::Failed },
    anycubic_complete = { PrinterClass::Anycubic, "complete", 100.0, DeviceState::Completed },
    klipper_standby = { PrinterClass::Klipper, "standby", 0.0, DeviceState::Ready },
    klipper_error = { PrinterClass::Klipper, "error", 20.0, DeviceState::Failed },
)]
fn translation_tables(class: PrinterClass, raw: &str, progress: f64, expected: DeviceState) {
    assert_eq!(translate(class, raw, progress), expected);
}

#[test]
fn anycubic_error_is_a_known_false_positive() {
    let profile = PrinterProfile::for_class(PrinterClass::Anycubic);

    let translation = profile.translate(&RawStatus::new("error", 35.0));

    assert_eq!(translation.status.state, DeviceState::Starting);
    assert_eq!(translation.ignored_fault.as_deref(), Some("error"));
}

#[test]
fn switching_off_false_positives_restores_fault() {
    let mut profile = PrinterProfile::for_class(PrinterClass::Anycubic);
    profile.ignore_false_positives = false;

    let translation = profile.translate(&RawStatus::new("error", 35.0));

    assert_eq!(translation.status.state, DeviceState::Failed);
    assert_eq!(translation.ignored_fault, None);
}

#[test]
fn temperatures_and_remaining_are_carried_over() {
    let profile = PrinterProfile::for_class(PrinterClass::Klipper);
    let raw = RawStatus {
        state: "printing".to_string(),
        progress: 150.0,
        nozzle: Some(210.0),
        bed: Some(60.0),
        remaining: Some(Duration::from_secs(90)),
    };

    let status = profile.translate(&raw).status;

    assert_eq!(status.progress, 100.0);
    assert_eq!(status.temperatures.nozzle, Some(210.0));
    assert_eq!(status.temperatures.bed, Some(60.0));
    assert_eq!(status.remaining, Some(Duration::from_secs(90)));
}

#[parameterized(
    bambu = { PrinterClass::BambuLab, true, CleanupHook::None },
    flashforge = { PrinterClass::FlashForge, true, CleanupHook::BeforeNextJob },
    prusa = { PrinterClass::Prusa, true, CleanupHook::AfterEveryJob },
    creality = { PrinterClass::Creality, false, CleanupHook::None },
    anycubic = { PrinterClass::Anycubic, false, CleanupHook::None },
)]
fn reposition_and_cleanup_per_class(class: PrinterClass, reposition: bool, hook: CleanupHook) {
    let profile = PrinterProfile::for_class(class);
    assert_eq!(profile.needs_reposition, reposition);
    assert_eq!(profile.cleanup, hook);
}

#[test]
fn bambu_thresholds_are_profile_local() {
    let bambu = PrinterProfile::for_class(PrinterClass::BambuLab);
    let klipper = PrinterProfile::for_class(PrinterClass::Klipper);

    assert_eq!(bambu.completion.max_idle_after_active, Some(5));
    assert_eq!(bambu.completion.max_initial_idle_polls, Some(10));
    assert_eq!(bambu.first_job_delay, Duration::from_secs(30));
    assert_eq!(klipper.completion.max_idle_after_active, None);
    assert_eq!(klipper.first_job_delay, Duration::ZERO);
}

#[test]
fn bambu_final_minute_is_not_completion() {
    let profile = PrinterProfile::for_class(PrinterClass::BambuLab);
    let mut monitor = CompletionMonitor::new(
        profile.completion.clone(),
        StatusTracker::new(profile.poll.clone()),
    );
    let mut sample = |state: &str, progress: f64, remaining: u64| {
        let mut raw = RawStatus::new(state, progress);
        raw.remaining = Some(Duration::from_secs(remaining));
        monitor.observe(&profile.translate(&raw).status)
    };

    assert!(matches!(sample("RUNNING", 50.0, 1800), Verdict::Continue(_)));
    assert!(matches!(sample("RUNNING", 97.0, 0), Verdict::Continue(_)));
    assert_eq!(sample("IDLE", 97.0, 0), Verdict::Completed);
}
