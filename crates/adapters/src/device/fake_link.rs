// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted printer link for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{DeviceLink, LinkError, RawStatus};
use async_trait::async_trait;
use pj_core::JobFlags;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Recorded link call
#[derive(Debug, Clone, PartialEq)]
pub enum LinkCall {
    Open,
    Sample,
    Start { file: String, first_job: bool },
    Reposition,
    Cleanup,
    Close,
}

#[derive(Default)]
struct LinkState {
    samples: VecDeque<Result<RawStatus, LinkError>>,
    /// Repeated once the script runs out
    last: Option<Result<RawStatus, LinkError>>,
    open_error: Option<LinkError>,
    start_error: Option<LinkError>,
    calls: Vec<LinkCall>,
}

/// Fake link that replays a scripted sequence of samples
#[derive(Clone, Default)]
pub struct FakeDeviceLink {
    inner: Arc<Mutex<LinkState>>,
}

impl FakeDeviceLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LinkState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queue a sample in the vendor's vocabulary
    pub fn push(&self, state: &str, progress: f64) -> &Self {
        self.push_raw(RawStatus::new(state, progress))
    }

    pub fn push_raw(&self, raw: RawStatus) -> &Self {
        self.state().samples.push_back(Ok(raw));
        self
    }

    pub fn push_error(&self, err: LinkError) -> &Self {
        self.state().samples.push_back(Err(err));
        self
    }

    pub fn fail_open(&self, err: LinkError) {
        self.state().open_error = Some(err);
    }

    pub fn fail_start(&self, err: LinkError) {
        self.state().start_error = Some(err);
    }

    pub fn calls(&self) -> Vec<LinkCall> {
        self.state().calls.clone()
    }

    pub fn sample_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, LinkCall::Sample))
            .count()
    }
}

#[async_trait]
impl DeviceLink for FakeDeviceLink {
    async fn open(&mut self) -> Result<(), LinkError> {
        let mut state = self.state();
        state.calls.push(LinkCall::Open);
        match state.open_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn sample(&mut self) -> Result<RawStatus, LinkError> {
        let mut state = self.state();
        state.calls.push(LinkCall::Sample);
        match state.samples.pop_front() {
            Some(next) => {
                state.last = Some(next.clone());
                next
            }
            None => state
                .last
                .clone()
                .unwrap_or_else(|| Err(LinkError::Connection("no samples scripted".into()))),
        }
    }

    async fn start(
        &mut self,
        file: &str,
        _flags: &JobFlags,
        first_job: bool,
    ) -> Result<(), LinkError> {
        let mut state = self.state();
        state.calls.push(LinkCall::Start {
            file: file.to_string(),
            first_job,
        });
        match state.start_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn reposition(&mut self) -> Result<(), LinkError> {
        self.state().calls.push(LinkCall::Reposition);
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), LinkError> {
        self.state().calls.push(LinkCall::Cleanup);
        Ok(())
    }

    async fn close(&mut self) {
        self.state().calls.push(LinkCall::Close);
    }
}
