// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake ejector transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DispatchAck, EjectorTransport, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Recorded transport call
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCall {
    Probe,
    Dispatch { script: String },
    QueryState,
    ListMacros,
    EmergencyStop,
    FirmwareRestart,
}

struct FakeState {
    calls: Vec<TransportCall>,
    probe: Result<(), TransportError>,
    /// Per-script dispatch results, consumed in order; default is accepted
    dispatch: HashMap<String, VecDeque<Result<DispatchAck, TransportError>>>,
    /// Idle-timeout states, consumed in order; the last one repeats
    states: VecDeque<Result<String, TransportError>>,
    last_state: Result<String, TransportError>,
    macros: Result<Vec<String>, TransportError>,
    emergency_stop: Result<(), TransportError>,
}

/// In-memory arm that is idle unless told otherwise
#[derive(Clone)]
pub struct FakeEjectorTransport {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeEjectorTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEjectorTransport {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                probe: Ok(()),
                dispatch: HashMap::new(),
                states: VecDeque::new(),
                last_state: Ok("Idle".to_string()),
                macros: Ok(Vec::new()),
                emergency_stop: Ok(()),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.lock().calls.clone()
    }

    /// Scripts dispatched so far, in order
    pub fn scripts(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                TransportCall::Dispatch { script } => Some(script.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn set_probe(&self, result: Result<(), TransportError>) {
        self.lock().probe = result;
    }

    /// Queue the next result for a given script
    pub fn on_dispatch(&self, script: &str, result: Result<DispatchAck, TransportError>) {
        self.lock()
            .dispatch
            .entry(script.to_string())
            .or_default()
            .push_back(result);
    }

    /// Queue idle-timeout states reported by successive queries
    pub fn push_state(&self, state: Result<String, TransportError>) {
        self.lock().states.push_back(state);
    }

    /// State reported once the queue is empty
    pub fn set_resting_state(&self, state: Result<String, TransportError>) {
        self.lock().last_state = state;
    }

    pub fn set_macros(&self, macros: Result<Vec<String>, TransportError>) {
        self.lock().macros = macros;
    }

    pub fn set_emergency_stop(&self, result: Result<(), TransportError>) {
        self.lock().emergency_stop = result;
    }
}

#[async_trait]
impl EjectorTransport for FakeEjectorTransport {
    async fn probe(&self) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::Probe);
        state.probe.clone()
    }

    async fn dispatch(&self, script: &str) -> Result<DispatchAck, TransportError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::Dispatch {
            script: script.to_string(),
        });
        state
            .dispatch
            .get_mut(script)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(DispatchAck::Accepted))
    }

    async fn query_state(&self) -> Result<String, TransportError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::QueryState);
        match state.states.pop_front() {
            Some(next) => next,
            None => state.last_state.clone(),
        }
    }

    async fn list_macros(&self) -> Result<Vec<String>, TransportError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::ListMacros);
        state.macros.clone()
    }

    async fn emergency_stop(&self) -> Result<(), TransportError> {
        let mut state = self.lock();
        state.calls.push(TransportCall::EmergencyStop);
        state.emergency_stop.clone()
    }

    async fn firmware_restart(&self) -> Result<(), TransportError> {
        self.lock().calls.push(TransportCall::FirmwareRestart);
        Ok(())
    }
}
