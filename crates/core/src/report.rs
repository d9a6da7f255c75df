// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured reporting sink
//!
//! Components receive a [`SharedReporter`] at construction and emit typed
//! [`RunEvent`]s through it instead of logging ad hoc.

use crate::completion::FaultReason;
use crate::tracker::Anomaly;
use serde::Serialize;
use std::sync::{Arc, Mutex};

/// Things worth telling an operator during a run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted { run_id: String, total_jobs: u32 },
    JobStarted { job: u32, file: String },
    /// The device reported a state its profile treats as a known false positive
    FaultIgnored { raw_state: String },
    Anomaly { anomaly: Anomaly },
    PrintFinished { job: u32 },
    PrintFailed { job: u32, reason: FaultReason },
    BedRepositioned { job: u32 },
    MacroDispatched { name: String, provisional: bool },
    PlateStored { job: u32, slot: u32 },
    PlateGrabbed { job: u32, slot: u32 },
    CleanupFinished { job: u32 },
    JobCompleted { job: u32, completed: u32 },
    EmergencyStop { acknowledged: bool },
    RunStopped { completed: u32, total_jobs: u32, reason: String },
    RunFinished { completed: u32, total_jobs: u32, interrupted: bool },
}

pub trait Reporter: Send + Sync {
    fn report(&self, event: RunEvent);
}

pub type SharedReporter = Arc<dyn Reporter>;

/// Forwards events to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl TracingReporter {
    pub fn shared() -> SharedReporter {
        Arc::new(TracingReporter)
    }
}

impl Reporter for TracingReporter {
    fn report(&self, event: RunEvent) {
        match event {
            RunEvent::RunStarted { run_id, total_jobs } => {
                tracing::info!(%run_id, total_jobs, "run started")
            }
            RunEvent::JobStarted { job, file } => tracing::info!(job, %file, "job started"),
            RunEvent::FaultIgnored { raw_state } => {
                tracing::warn!(%raw_state, "ignoring known false-positive fault state")
            }
            RunEvent::Anomaly { anomaly } => tracing::warn!(%anomaly, "status anomaly"),
            RunEvent::PrintFinished { job } => tracing::info!(job, "print finished"),
            RunEvent::PrintFailed { job, reason } => {
                tracing::error!(job, %reason, "print failed")
            }
            RunEvent::BedRepositioned { job } => tracing::info!(job, "bed repositioned"),
            RunEvent::MacroDispatched { name, provisional } => {
                if provisional {
                    tracing::info!(macro_name = %name, "macro dispatch timed out; awaiting idle")
                } else {
                    tracing::debug!(macro_name = %name, "macro accepted")
                }
            }
            RunEvent::PlateStored { job, slot } => tracing::info!(job, slot, "plate stored"),
            RunEvent::PlateGrabbed { job, slot } => tracing::info!(job, slot, "plate grabbed"),
            RunEvent::CleanupFinished { job } => tracing::info!(job, "cleanup hook finished"),
            RunEvent::JobCompleted { job, completed } => {
                tracing::info!(job, completed, "job completed")
            }
            RunEvent::EmergencyStop { acknowledged } => {
                tracing::warn!(acknowledged, "emergency stop issued")
            }
            RunEvent::RunStopped {
                completed,
                total_jobs,
                reason,
            } => tracing::error!(completed, total_jobs, %reason, "run stopped early"),
            RunEvent::RunFinished {
                completed,
                total_jobs,
                interrupted,
            } => tracing::info!(completed, total_jobs, interrupted, "run finished"),
        }
    }
}

/// Captures events in memory
#[derive(Debug, Clone, Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<RunEvent>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<RunEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn shared(&self) -> SharedReporter {
        Arc::new(self.clone())
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: RunEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
