// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake device session for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{CleanupHook, DeviceError, DeviceSession};
use async_trait::async_trait;
use pj_core::{DeviceState, DeviceStatus, FaultReason, Interrupt, JobFlags};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recorded session call
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    Connect,
    Status,
    StartJob { file: String },
    AwaitCompletion,
    RepositionBed,
    RunCleanup,
    Disconnect,
}

/// How a scripted job ends
#[derive(Debug, Clone, PartialEq)]
pub enum FakeOutcome {
    Complete,
    Fault(FaultReason),
    Transport(String),
    /// The operator interrupts while the job is printing
    Interrupt,
}

struct FakeState {
    outcomes: VecDeque<FakeOutcome>,
    calls: Vec<DeviceCall>,
    state: DeviceState,
    connect_error: Option<DeviceError>,
    start_error: Option<DeviceError>,
    needs_reposition: bool,
    cleanup: CleanupHook,
}

/// Fake session that ends each job with the next scripted outcome
///
/// Jobs without a scripted outcome complete.
#[derive(Clone)]
pub struct FakeDeviceSession {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeDeviceSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDeviceSession {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                outcomes: VecDeque::new(),
                calls: Vec::new(),
                state: DeviceState::Unknown,
                connect_error: None,
                start_error: None,
                needs_reposition: false,
                cleanup: CleanupHook::None,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_outcome(&self, outcome: FakeOutcome) -> &Self {
        self.lock().outcomes.push_back(outcome);
        self
    }

    pub fn fail_connect(&self, err: DeviceError) {
        self.lock().connect_error = Some(err);
    }

    pub fn fail_start(&self, err: DeviceError) {
        self.lock().start_error = Some(err);
    }

    pub fn with_reposition(self) -> Self {
        self.lock().needs_reposition = true;
        self
    }

    pub fn with_cleanup(self, hook: CleanupHook) -> Self {
        self.lock().cleanup = hook;
        self
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, call: &DeviceCall) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: DeviceCall) {
        self.lock().calls.push(call);
    }
}

#[async_trait]
impl DeviceSession for FakeDeviceSession {
    async fn connect(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceCall::Connect);
        let mut state = self.lock();
        if let Some(err) = state.connect_error.take() {
            return Err(err);
        }
        state.state = DeviceState::Ready;
        Ok(())
    }

    async fn status(&mut self) -> Option<DeviceStatus> {
        self.record(DeviceCall::Status);
        let state = self.lock().state;
        Some(DeviceStatus::new(state, 0.0))
    }

    async fn start_job(&mut self, file: &str, _flags: &JobFlags) -> Result<(), DeviceError> {
        self.record(DeviceCall::StartJob {
            file: file.to_string(),
        });
        let mut state = self.lock();
        if let Some(err) = state.start_error.take() {
            state.state = DeviceState::Failed;
            return Err(err);
        }
        state.state = DeviceState::Starting;
        Ok(())
    }

    async fn await_completion(&mut self, interrupt: &Interrupt) -> Result<(), DeviceError> {
        self.record(DeviceCall::AwaitCompletion);
        let mut state = self.lock();
        let outcome = state.outcomes.pop_front().unwrap_or(FakeOutcome::Complete);
        match outcome {
            FakeOutcome::Complete => {
                state.state = DeviceState::Completed;
                Ok(())
            }
            FakeOutcome::Fault(reason) => {
                state.state = DeviceState::Failed;
                Err(DeviceError::Fault(reason))
            }
            FakeOutcome::Transport(message) => {
                state.state = DeviceState::Failed;
                Err(DeviceError::Transport(message))
            }
            FakeOutcome::Interrupt => {
                interrupt.trigger();
                state.state = DeviceState::Cancelled;
                Err(DeviceError::Interrupted)
            }
        }
    }

    fn needs_bed_reposition(&self) -> bool {
        self.lock().needs_reposition
    }

    async fn reposition_bed(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceCall::RepositionBed);
        Ok(())
    }

    fn cleanup_hook(&self) -> CleanupHook {
        self.lock().cleanup
    }

    async fn run_cleanup(&mut self) -> Result<(), DeviceError> {
        self.record(DeviceCall::RunCleanup);
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.record(DeviceCall::Disconnect);
        self.lock().state = DeviceState::Unknown;
    }

    fn state(&self) -> DeviceState {
        self.lock().state
    }
}
