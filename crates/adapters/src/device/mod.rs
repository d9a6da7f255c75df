// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Printer device sessions
//!
//! [`DeviceSession`] is the uniform contract the orchestrator drives. The
//! production implementation is [`PrinterSession`], which layers a
//! per-class [`PrinterProfile`] over a wire-level [`DeviceLink`].

mod factory;
mod moonraker;
mod profile;
mod session;

pub use factory::{build_session, link_for};
pub use moonraker::{MoonrakerLink, LEVIQ_FLAG};
pub use profile::{PrinterProfile, StateTable, Translation};
pub use session::PrinterSession;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
mod fake_link;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{DeviceCall, FakeDeviceSession, FakeOutcome};
#[cfg(any(test, feature = "test-support"))]
pub use fake_link::{FakeDeviceLink, LinkCall};

use async_trait::async_trait;
use pj_core::{DeviceState, DeviceStatus, FaultReason, Interrupt, JobFlags, PrinterClass};
use std::time::Duration;
use thiserror::Error;

/// Errors from device session operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DeviceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("device fault: {0}")]
    Fault(FaultReason),
    #[error("device is not connected")]
    NotConnected,
    #[error("interrupted")]
    Interrupted,
    #[error("no built-in link for printer class {0}")]
    Unsupported(PrinterClass),
}

/// Brand-specific work between jobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupHook {
    None,
    /// Run after every ejection, including the last
    AfterEveryJob,
    /// Run before the next job starts; skipped after the last job
    BeforeNextJob,
}

/// Uniform contract over every printer class
///
/// A session is exclusively owned by one run; nothing else polls or mutates
/// it while the run is in progress.
#[async_trait]
pub trait DeviceSession: Send + 'static {
    async fn connect(&mut self) -> Result<(), DeviceError>;

    /// One status sample, or `None` when the device cannot be read
    async fn status(&mut self) -> Option<DeviceStatus>;

    async fn start_job(&mut self, file: &str, flags: &JobFlags) -> Result<(), DeviceError>;

    /// Block until the started job reaches a terminal outcome
    async fn await_completion(&mut self, interrupt: &Interrupt) -> Result<(), DeviceError>;

    fn needs_bed_reposition(&self) -> bool;

    async fn reposition_bed(&mut self) -> Result<(), DeviceError>;

    fn cleanup_hook(&self) -> CleanupHook;

    async fn run_cleanup(&mut self) -> Result<(), DeviceError>;

    async fn disconnect(&mut self);

    fn state(&self) -> DeviceState;
}

/// A status sample in the vendor's own vocabulary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawStatus {
    pub state: String,
    pub progress: f64,
    pub nozzle: Option<f64>,
    pub bed: Option<f64>,
    pub remaining: Option<Duration>,
}

impl RawStatus {
    pub fn new(state: impl Into<String>, progress: f64) -> Self {
        Self {
            state: state.into(),
            progress,
            ..Self::default()
        }
    }
}

/// Errors from the wire-level printer link
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("unexpected response: {0}")]
    Protocol(String),
    #[error("printer rejected command: {0}")]
    Rejected(String),
}

impl From<LinkError> for DeviceError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Timeout(_) | LinkError::Connection(_) => {
                DeviceError::Transport(err.to_string())
            }
            LinkError::Protocol(_) | LinkError::Rejected(_) => {
                DeviceError::Protocol(err.to_string())
            }
        }
    }
}

/// Wire-level access to one printer
///
/// Implementations speak the vendor protocol (MQTT, WebSocket, REST, ...)
/// and nothing else; lifecycle policy lives in [`PrinterSession`].
#[async_trait]
pub trait DeviceLink: Send + 'static {
    async fn open(&mut self) -> Result<(), LinkError>;

    async fn sample(&mut self) -> Result<RawStatus, LinkError>;

    async fn start(&mut self, file: &str, flags: &JobFlags, first_job: bool)
        -> Result<(), LinkError>;

    /// Move the bed into the ejection position
    async fn reposition(&mut self) -> Result<(), LinkError>;

    /// Brand-specific cleanup between jobs
    async fn cleanup(&mut self) -> Result<(), LinkError>;

    async fn close(&mut self);
}

#[async_trait]
impl DeviceLink for Box<dyn DeviceLink> {
    async fn open(&mut self) -> Result<(), LinkError> {
        (**self).open().await
    }

    async fn sample(&mut self) -> Result<RawStatus, LinkError> {
        (**self).sample().await
    }

    async fn start(
        &mut self,
        file: &str,
        flags: &JobFlags,
        first_job: bool,
    ) -> Result<(), LinkError> {
        (**self).start(file, flags, first_job).await
    }

    async fn reposition(&mut self) -> Result<(), LinkError> {
        (**self).reposition().await
    }

    async fn cleanup(&mut self) -> Result<(), LinkError> {
        (**self).cleanup().await
    }

    async fn close(&mut self) {
        (**self).close().await
    }
}
