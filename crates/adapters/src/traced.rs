// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::device::{CleanupHook, DeviceError, DeviceSession};
use crate::ejector::{DispatchAck, EjectorTransport, TransportError};
use async_trait::async_trait;
use pj_core::{DeviceState, DeviceStatus, Interrupt, JobFlags};
use tracing::Instrument;

/// Wrapper that adds tracing to any DeviceSession
pub struct TracedDeviceSession<S> {
    inner: S,
}

impl<S> TracedDeviceSession<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: DeviceSession> DeviceSession for TracedDeviceSession<S> {
    async fn connect(&mut self) -> Result<(), DeviceError> {
        let span = tracing::info_span!("device.connect");
        async {
            let start = std::time::Instant::now();
            let result = self.inner.connect().await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "connected"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "connect failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn status(&mut self) -> Option<DeviceStatus> {
        let result = self.inner.status().await;
        tracing::trace!(
            state = ?result.as_ref().map(|s| s.state),
            progress = ?result.as_ref().map(|s| s.progress),
            "status"
        );
        result
    }

    async fn start_job(&mut self, file: &str, flags: &JobFlags) -> Result<(), DeviceError> {
        let span = tracing::info_span!("device.start_job", file);
        async {
            tracing::info!(flag_count = flags.len(), "starting");

            // Precondition: a job needs a file
            if file.trim().is_empty() {
                tracing::error!("empty job file name");
                return Err(DeviceError::Protocol("job file name is empty".to_string()));
            }

            let result = self.inner.start_job(file, flags).await;
            match &result {
                Ok(()) => tracing::info!("started"),
                Err(e) => tracing::error!(error = %e, "start failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn await_completion(&mut self, interrupt: &Interrupt) -> Result<(), DeviceError> {
        let span = tracing::info_span!("device.await_completion");
        async {
            let start = std::time::Instant::now();
            let result = self.inner.await_completion(interrupt).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(()) => tracing::info!(elapsed_ms, "print completed"),
                Err(DeviceError::Interrupted) => tracing::warn!(elapsed_ms, "wait interrupted"),
                Err(e) => tracing::error!(elapsed_ms, error = %e, "print did not complete"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn needs_bed_reposition(&self) -> bool {
        self.inner.needs_bed_reposition()
    }

    async fn reposition_bed(&mut self) -> Result<(), DeviceError> {
        let span = tracing::info_span!("device.reposition_bed");
        async {
            let result = self.inner.reposition_bed().await;
            match &result {
                Ok(()) => tracing::info!("bed in ejection position"),
                Err(e) => tracing::error!(error = %e, "reposition failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    fn cleanup_hook(&self) -> CleanupHook {
        self.inner.cleanup_hook()
    }

    async fn run_cleanup(&mut self) -> Result<(), DeviceError> {
        let span = tracing::info_span!("device.run_cleanup");
        async {
            let result = self.inner.run_cleanup().await;
            // Cleanup failing is reported but the caller decides whether it matters
            match &result {
                Ok(()) => tracing::info!("cleanup finished"),
                Err(e) => tracing::warn!(error = %e, "cleanup failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn disconnect(&mut self) {
        let span = tracing::info_span!("device.disconnect");
        async {
            self.inner.disconnect().await;
            tracing::info!("disconnected");
        }
        .instrument(span)
        .await
    }

    fn state(&self) -> DeviceState {
        self.inner.state()
    }
}

/// Wrapper that adds tracing to any EjectorTransport
#[derive(Clone)]
pub struct TracedEjectorTransport<T> {
    inner: T,
}

impl<T> TracedEjectorTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: EjectorTransport> EjectorTransport for TracedEjectorTransport<T> {
    async fn probe(&self) -> Result<(), TransportError> {
        let span = tracing::info_span!("ejector.probe");
        async {
            let result = self.inner.probe().await;
            match &result {
                Ok(()) => tracing::debug!("reachable"),
                Err(e) => tracing::error!(error = %e, "probe failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn dispatch(&self, script: &str) -> Result<DispatchAck, TransportError> {
        let span = tracing::info_span!("ejector.dispatch", script);
        async {
            // Precondition: an empty script would be a no-op the arm still acknowledges
            if script.trim().is_empty() {
                tracing::error!("empty script");
                return Err(TransportError::Protocol("empty G-code script".to_string()));
            }

            let start = std::time::Instant::now();
            let result = self.inner.dispatch(script).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(DispatchAck::Accepted) => tracing::info!(elapsed_ms, "accepted"),
                Ok(DispatchAck::Rejected(reason)) => {
                    tracing::error!(elapsed_ms, %reason, "rejected")
                }
                Err(e) if e.is_provisional() => {
                    tracing::warn!(elapsed_ms, error = %e, "no reply (may still be running)")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "dispatch failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn query_state(&self) -> Result<String, TransportError> {
        let result = self.inner.query_state().await;
        tracing::trace!(state = ?result.as_ref().ok(), "arm state");
        result
    }

    async fn list_macros(&self) -> Result<Vec<String>, TransportError> {
        let result = self.inner.list_macros().await;
        tracing::debug!(
            count = result.as_ref().map(|v| v.len()).ok(),
            "listed macros"
        );
        result
    }

    async fn emergency_stop(&self) -> Result<(), TransportError> {
        let span = tracing::warn_span!("ejector.emergency_stop");
        async {
            let result = self.inner.emergency_stop().await;
            match &result {
                Ok(()) => tracing::warn!("emergency stop acknowledged"),
                Err(e) => tracing::error!(error = %e, "emergency stop failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn firmware_restart(&self) -> Result<(), TransportError> {
        let span = tracing::info_span!("ejector.firmware_restart");
        async {
            let result = self.inner.firmware_restart().await;
            match &result {
                Ok(()) => tracing::info!("restart requested"),
                Err(e) => tracing::error!(error = %e, "restart failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
