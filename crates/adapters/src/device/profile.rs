// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-class printer profiles
//!
//! Each printer class gets its own translation table from raw vendor
//! states to the canonical lifecycle, plus its own empirically tuned
//! completion thresholds. The values are deliberately not unified.

use super::{CleanupHook, RawStatus};
use pj_core::completion::{CompletionPolicy, CoolingRule, StaleGuard};
use pj_core::lifecycle::Temperatures;
use pj_core::{DeviceState, DeviceStatus, PollPolicy, PrinterClass};
use std::time::Duration;

/// Raw vendor state to canonical state, matched case-insensitively
#[derive(Debug, Clone, PartialEq)]
pub struct StateTable {
    entries: Vec<(&'static str, DeviceState)>,
    /// State used for raw values the table does not know
    unmapped: DeviceState,
}

impl StateTable {
    pub fn new(entries: &[(&'static str, DeviceState)]) -> Self {
        Self {
            entries: entries.to_vec(),
            unmapped: DeviceState::Starting,
        }
    }

    pub fn lookup(&self, raw: &str) -> DeviceState {
        let raw = raw.trim();
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(raw))
            .map(|(_, state)| *state)
            .unwrap_or(self.unmapped)
    }
}

fn contains(list: &[&'static str], raw: &str) -> bool {
    let raw = raw.trim();
    list.iter().any(|name| name.eq_ignore_ascii_case(raw))
}

/// Outcome of translating one raw sample
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub status: DeviceStatus,
    /// Set when a known false-positive fault state was suppressed
    pub ignored_fault: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrinterProfile {
    pub class: PrinterClass,
    pub states: StateTable,
    /// Raw states that mean "done" once progress reaches `high_progress`
    pub completes_at_high_progress: Vec<&'static str>,
    pub high_progress: f64,
    /// Raw fault states known to be firmware noise on this class
    pub false_positive_faults: Vec<&'static str>,
    pub ignore_false_positives: bool,
    pub completion: CompletionPolicy,
    pub poll: PollPolicy,
    pub needs_reposition: bool,
    pub cleanup: CleanupHook,
    /// Extra wait before monitoring the first job of a run
    pub first_job_delay: Duration,
    /// Wait after every start before the first sample
    pub start_settle: Duration,
}

// Bambu Lab
const BAMBU_MAX_IDLE_AFTER_PRINTING: u32 = 5;
const BAMBU_MAX_INITIAL_IDLE: u32 = 10;
const BAMBU_ZERO_REMAINING_ABOVE: f64 = 80.0;
const BAMBU_FIRST_JOB_DELAY: Duration = Duration::from_secs(30);

// FlashForge
const FLASHFORGE_DONE_PROGRESS: f64 = 99.5;

// Anycubic
const ANYCUBIC_FAULT_GRACE_POLLS: u32 = 6;
const ANYCUBIC_START_SETTLE: Duration = Duration::from_secs(15);
const ANYCUBIC_TRANSPORT_RETRY: Duration = Duration::from_secs(10);
const ANYCUBIC_COOL_NOZZLE: f64 = 50.0;
const ANYCUBIC_COOL_BED: f64 = 40.0;
const ANYCUBIC_COOL_MIN_PROGRESS: f64 = 80.0;
// 300 s of 5 s polls
const ANYCUBIC_STALE_GUARD_POLLS: u32 = 60;

// Creality
const CREALITY_MAX_INITIAL_IDLE: u32 = 6;

// Prusa
const PRUSA_MAX_IDLE_AFTER_PRINTING: u32 = 1;
const PRUSA_START_SETTLE: Duration = Duration::from_secs(10);

const MOONRAKER_STATES: &[(&str, DeviceState)] = &[
    ("standby", DeviceState::Ready),
    ("idle", DeviceState::Ready),
    ("ready", DeviceState::Ready),
    ("printing", DeviceState::Active),
    ("running", DeviceState::Active),
    ("paused", DeviceState::Active),
    ("complete", DeviceState::Completed),
    ("finished", DeviceState::Completed),
    ("cancelled", DeviceState::Cancelled),
    ("stopped", DeviceState::Failed),
    ("error", DeviceState::Failed),
];

impl PrinterProfile {
    fn base(class: PrinterClass, states: &[(&'static str, DeviceState)]) -> Self {
        Self {
            class,
            states: StateTable::new(states),
            completes_at_high_progress: Vec::new(),
            high_progress: 99.0,
            false_positive_faults: Vec::new(),
            ignore_false_positives: false,
            completion: CompletionPolicy::default(),
            poll: PollPolicy::default(),
            needs_reposition: false,
            cleanup: CleanupHook::None,
            first_job_delay: Duration::ZERO,
            start_settle: Duration::ZERO,
        }
    }

    pub fn for_class(class: PrinterClass) -> Self {
        match class {
            PrinterClass::BambuLab => Self {
                completion: CompletionPolicy {
                    max_idle_after_active: Some(BAMBU_MAX_IDLE_AFTER_PRINTING),
                    max_initial_idle_polls: Some(BAMBU_MAX_INITIAL_IDLE),
                    zero_remaining_above: Some(BAMBU_ZERO_REMAINING_ABOVE),
                    ..CompletionPolicy::default()
                },
                needs_reposition: true,
                first_job_delay: BAMBU_FIRST_JOB_DELAY,
                ..Self::base(
                    class,
                    &[
                        ("IDLE", DeviceState::Ready),
                        ("PREPARE", DeviceState::Starting),
                        ("SLICING", DeviceState::Starting),
                        ("RUNNING", DeviceState::Active),
                        ("PRINTING", DeviceState::Active),
                        ("FINISH", DeviceState::Completed),
                        ("FAILED", DeviceState::Failed),
                        ("ERROR", DeviceState::Failed),
                        ("FAULT", DeviceState::Failed),
                        ("PAUSED", DeviceState::Failed),
                        ("PAUSE", DeviceState::Failed),
                        ("ATTENTION", DeviceState::Failed),
                        ("CRITICAL", DeviceState::Failed),
                        ("OFFLINE", DeviceState::Failed),
                        ("STOPPED", DeviceState::Cancelled),
                    ],
                )
            },
            PrinterClass::FlashForge => Self {
                completes_at_high_progress: vec!["ready", "stop"],
                high_progress: FLASHFORGE_DONE_PROGRESS,
                poll: PollPolicy::progress_only(),
                needs_reposition: true,
                cleanup: CleanupHook::BeforeNextJob,
                ..Self::base(
                    class,
                    &[
                        ("ready", DeviceState::Ready),
                        ("busy", DeviceState::Starting),
                        ("building", DeviceState::Active),
                        ("printing", DeviceState::Active),
                        ("paused", DeviceState::Active),
                        ("completed", DeviceState::Completed),
                        ("stop", DeviceState::Cancelled),
                        ("error", DeviceState::Failed),
                        ("fault", DeviceState::Failed),
                    ],
                )
            },
            PrinterClass::Creality => Self {
                completes_at_high_progress: vec!["0", "2", "3"],
                completion: CompletionPolicy {
                    max_initial_idle_polls: Some(CREALITY_MAX_INITIAL_IDLE),
                    ..CompletionPolicy::default()
                },
                ..Self::base(
                    class,
                    &[
                        ("0", DeviceState::Ready),
                        ("1", DeviceState::Active),
                        ("2", DeviceState::Active),
                        ("3", DeviceState::Failed),
                        ("4", DeviceState::Completed),
                    ],
                )
            },
            PrinterClass::Elegoo => Self::base(
                class,
                &[
                    ("0", DeviceState::Ready),
                    ("1", DeviceState::Active),
                    ("9", DeviceState::Completed),
                    ("2", DeviceState::Failed),
                    ("3", DeviceState::Failed),
                    ("10", DeviceState::Cancelled),
                ],
            ),
            PrinterClass::Prusa => Self {
                completion: CompletionPolicy {
                    max_idle_after_active: Some(PRUSA_MAX_IDLE_AFTER_PRINTING),
                    ..CompletionPolicy::default()
                },
                needs_reposition: true,
                cleanup: CleanupHook::AfterEveryJob,
                start_settle: PRUSA_START_SETTLE,
                ..Self::base(
                    class,
                    &[
                        ("IDLE", DeviceState::Ready),
                        ("READY", DeviceState::Ready),
                        ("BUSY", DeviceState::Starting),
                        ("PRINTING", DeviceState::Active),
                        ("PAUSED", DeviceState::Active),
                        ("FINISHED", DeviceState::Completed),
                        ("STOPPED", DeviceState::Cancelled),
                        ("ERROR", DeviceState::Failed),
                        ("ATTENTION", DeviceState::Failed),
                    ],
                )
            },
            PrinterClass::Anycubic => Self {
                false_positive_faults: vec!["error"],
                ignore_false_positives: true,
                completion: CompletionPolicy {
                    cooling: Some(CoolingRule {
                        nozzle_below: ANYCUBIC_COOL_NOZZLE,
                        bed_below: ANYCUBIC_COOL_BED,
                        min_progress: ANYCUBIC_COOL_MIN_PROGRESS,
                    }),
                    fault_grace_polls: ANYCUBIC_FAULT_GRACE_POLLS,
                    stale_guard: StaleGuard {
                        max_polls: ANYCUBIC_STALE_GUARD_POLLS,
                        ..StaleGuard::default()
                    },
                    transport_retry: ANYCUBIC_TRANSPORT_RETRY,
                    ..CompletionPolicy::default()
                },
                start_settle: ANYCUBIC_START_SETTLE,
                ..Self::base(class, MOONRAKER_STATES)
            },
            PrinterClass::Klipper => Self::base(class, MOONRAKER_STATES),
        }
    }

    /// Translate a raw sample into the canonical lifecycle
    pub fn translate(&self, raw: &RawStatus) -> Translation {
        let mut state = self.states.lookup(&raw.state);
        let mut ignored_fault = None;

        if contains(&self.completes_at_high_progress, &raw.state) && raw.progress >= self.high_progress
        {
            state = DeviceState::Completed;
        } else if self.ignore_false_positives && contains(&self.false_positive_faults, &raw.state) {
            state = DeviceState::Starting;
            ignored_fault = Some(raw.state.clone());
        }

        let mut status = DeviceStatus::new(state, raw.progress);
        status.temperatures = Temperatures {
            nozzle: raw.nozzle,
            bed: raw.bed,
        };
        status.remaining = raw.remaining;

        Translation {
            status,
            ignored_fault,
        }
    }
}

#[cfg(test)]
#[path = "profile_tests.rs"]
mod tests;
