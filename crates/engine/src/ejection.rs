// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ejection sequence for one finished job

use pj_core::macros;
use pj_core::{DeviceMacros, Job, MacroInvocation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Home,
    Eject,
    Store(u32),
    Grab(u32),
    Load,
    CloseDoor,
    Park,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EjectionStep {
    pub kind: StepKind,
    pub invocation: MacroInvocation,
}

impl EjectionStep {
    fn new(kind: StepKind, invocation: MacroInvocation) -> Self {
        Self { kind, invocation }
    }
}

/// Macros the arm runs after `job` finishes printing
///
/// Home, eject and store always run. A job with a grab slot then fetches
/// the next empty plate and loads it; the final job closes the door on
/// models that have one instead. The arm parks last.
pub fn plan(job: &Job, device: &DeviceMacros) -> Vec<EjectionStep> {
    let mut steps = vec![
        EjectionStep::new(StepKind::Home, macros::home()),
        EjectionStep::new(StepKind::Eject, MacroInvocation::new(&device.eject)),
        EjectionStep::new(
            StepKind::Store(job.store_slot),
            macros::store_to_slot(job.store_slot),
        ),
    ];

    match job.grab_slot {
        Some(slot) => {
            steps.push(EjectionStep::new(
                StepKind::Grab(slot),
                macros::grab_from_slot(slot),
            ));
            steps.push(EjectionStep::new(
                StepKind::Load,
                MacroInvocation::new(&device.load),
            ));
        }
        None => {
            if let Some(door) = &device.door_close {
                steps.push(EjectionStep::new(
                    StepKind::CloseDoor,
                    MacroInvocation::new(door),
                ));
            }
        }
    }

    steps.push(EjectionStep::new(StepKind::Park, macros::park()));
    steps
}

#[cfg(test)]
#[path = "ejection_tests.rs"]
mod tests;
