// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Profile-driven device session

use super::profile::PrinterProfile;
use super::{CleanupHook, DeviceError, DeviceLink, DeviceSession};
use async_trait::async_trait;
use pj_core::{
    Clock, CompletionMonitor, DeviceState, DeviceStatus, FaultReason, Interrupt, JobFlags,
    Lifecycle, RunEvent, SharedReporter, StatusTracker, Verdict,
};
use std::time::Duration;

/// A [`DeviceSession`] for any printer class
///
/// The link speaks the wire protocol; the profile decides what the samples
/// mean. Waits go through the injected clock.
pub struct PrinterSession<L, C> {
    link: L,
    clock: C,
    profile: PrinterProfile,
    reporter: SharedReporter,
    lifecycle: Lifecycle,
    connected: bool,
    jobs_started: u32,
    /// Settle time owed by the last start, consumed by `await_completion`
    pending_delay: Duration,
}

impl<L: DeviceLink, C: Clock> PrinterSession<L, C> {
    pub fn new(link: L, clock: C, profile: PrinterProfile, reporter: SharedReporter) -> Self {
        Self {
            link,
            clock,
            profile,
            reporter,
            lifecycle: Lifecycle::new(),
            connected: false,
            jobs_started: 0,
            pending_delay: Duration::ZERO,
        }
    }

    pub fn profile(&self) -> &PrinterProfile {
        &self.profile
    }

    fn enter(&mut self, next: DeviceState) {
        if let Err(e) = self.lifecycle.advance(next) {
            tracing::warn!(error = %e, "ignoring lifecycle transition");
        }
    }

    fn finish(&mut self, terminal: DeviceState) {
        // A print can finish between two samples without ever being seen active
        if terminal == DeviceState::Completed && self.lifecycle.state() == DeviceState::Starting {
            self.enter(DeviceState::Active);
        }
        self.enter(terminal);
    }

    fn cancelled(&mut self) -> DeviceError {
        self.enter(DeviceState::Cancelled);
        DeviceError::Interrupted
    }

    fn ensure_connected(&self) -> Result<(), DeviceError> {
        if self.connected {
            Ok(())
        } else {
            Err(DeviceError::NotConnected)
        }
    }
}

#[async_trait]
impl<L: DeviceLink, C: Clock> DeviceSession for PrinterSession<L, C> {
    async fn connect(&mut self) -> Result<(), DeviceError> {
        if self.connected {
            return Ok(());
        }
        self.lifecycle.reset();
        self.enter(DeviceState::Connecting);

        match self.link.open().await {
            Ok(()) => {
                self.connected = true;
                self.enter(DeviceState::Ready);
                tracing::info!(class = %self.profile.class, "printer connected");
                Ok(())
            }
            Err(e) => {
                self.lifecycle.reset();
                Err(e.into())
            }
        }
    }

    async fn status(&mut self) -> Option<DeviceStatus> {
        if !self.connected {
            return None;
        }
        match self.link.sample().await {
            Ok(raw) => Some(self.profile.translate(&raw).status),
            Err(e) => {
                tracing::debug!(error = %e, "status unavailable");
                None
            }
        }
    }

    async fn start_job(&mut self, file: &str, flags: &JobFlags) -> Result<(), DeviceError> {
        self.ensure_connected()?;
        self.lifecycle
            .rearm()
            .map_err(|e| DeviceError::Protocol(e.to_string()))?;
        self.enter(DeviceState::Starting);

        let first_job = self.jobs_started == 0;
        if let Err(e) = self.link.start(file, flags, first_job).await {
            self.enter(DeviceState::Failed);
            return Err(e.into());
        }
        self.jobs_started += 1;

        self.pending_delay = self.profile.start_settle;
        if first_job {
            self.pending_delay += self.profile.first_job_delay;
        }
        tracing::info!(file, first_job, "print started");
        Ok(())
    }

    async fn await_completion(&mut self, interrupt: &Interrupt) -> Result<(), DeviceError> {
        self.ensure_connected()?;

        let delay = std::mem::take(&mut self.pending_delay);
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "waiting for print to settle");
            if interrupt.sleep(&self.clock, delay).await.is_err() {
                return Err(self.cancelled());
            }
        }

        let mut monitor = CompletionMonitor::new(
            self.profile.completion.clone(),
            StatusTracker::new(self.profile.poll.clone()),
        );

        loop {
            if interrupt.is_triggered() {
                return Err(self.cancelled());
            }

            let verdict = match self.link.sample().await {
                Ok(raw) => {
                    let translation = self.profile.translate(&raw);
                    if let Some(raw_state) = translation.ignored_fault {
                        self.reporter.report(RunEvent::FaultIgnored { raw_state });
                    }
                    let status = translation.status;
                    tracing::debug!(
                        raw_state = %raw.state,
                        state = %status.state,
                        progress = status.progress,
                        "sampled"
                    );
                    if status.state == DeviceState::Active
                        && self.lifecycle.state() == DeviceState::Starting
                    {
                        self.enter(DeviceState::Active);
                    }
                    let verdict = monitor.observe(&status);
                    if let Some(anomaly) = monitor.take_anomaly() {
                        self.reporter.report(RunEvent::Anomaly { anomaly });
                    }
                    verdict
                }
                Err(e) => {
                    tracing::warn!(error = %e, "status sample failed");
                    monitor.observe_failure()
                }
            };

            match verdict {
                Verdict::Continue(interval) => {
                    if interrupt.sleep(&self.clock, interval).await.is_err() {
                        return Err(self.cancelled());
                    }
                }
                Verdict::Completed => {
                    self.finish(DeviceState::Completed);
                    return Ok(());
                }
                Verdict::Failed(reason) => {
                    let terminal = match reason {
                        FaultReason::Reported {
                            state: DeviceState::Cancelled,
                            ..
                        } => DeviceState::Cancelled,
                        _ => DeviceState::Failed,
                    };
                    self.finish(terminal);
                    return Err(DeviceError::Fault(reason));
                }
            }
        }
    }

    fn needs_bed_reposition(&self) -> bool {
        self.profile.needs_reposition
    }

    async fn reposition_bed(&mut self) -> Result<(), DeviceError> {
        if !self.profile.needs_reposition {
            return Ok(());
        }
        self.ensure_connected()?;
        self.link.reposition().await?;
        Ok(())
    }

    fn cleanup_hook(&self) -> CleanupHook {
        self.profile.cleanup
    }

    async fn run_cleanup(&mut self) -> Result<(), DeviceError> {
        if self.profile.cleanup == CleanupHook::None {
            return Ok(());
        }
        self.ensure_connected()?;
        self.link.cleanup().await?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        if self.connected {
            self.link.close().await;
            self.connected = false;
            tracing::info!(class = %self.profile.class, "printer disconnected");
        }
        self.lifecycle.reset();
    }

    fn state(&self) -> DeviceState {
        self.lifecycle.state()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
