// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ejector arm adapters
//!
//! The arm runs Klipper behind Moonraker. Every motion is a named G-code
//! macro; completion is observed by polling the idle-timeout state.

mod client;
mod http;

pub use client::EjectorClient;
pub use http::MoonrakerTransport;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeEjectorTransport, TransportCall};

pub use crate::moonraker::HttpError as TransportError;

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Firmware's answer to a dispatched script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchAck {
    Accepted,
    Rejected(String),
}

/// Arm state as reported by the idle-timeout object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    Idle,
    Busy,
    Offline,
}

impl ArmState {
    pub fn from_idle_timeout(state: &str) -> Self {
        if state.eq_ignore_ascii_case("idle") || state.eq_ignore_ascii_case("ready") {
            ArmState::Idle
        } else {
            ArmState::Busy
        }
    }
}

impl fmt::Display for ArmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArmState::Idle => "idle",
            ArmState::Busy => "busy",
            ArmState::Offline => "offline",
        };
        write!(f, "{}", s)
    }
}

/// Errors from ejector operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EjectorError {
    #[error("ejector unreachable: {0}")]
    Connection(String),
    #[error("ejector protocol error: {0}")]
    Protocol(String),
    #[error("macro {name} rejected: {reason}")]
    Rejected { name: String, reason: String },
    #[error("macro {name} did not finish within {}s", timeout.as_secs())]
    NotIdle { name: String, timeout: Duration },
    #[error("interrupted")]
    Interrupted,
}

/// Raw request surface of the arm's Moonraker API
#[async_trait]
pub trait EjectorTransport: Clone + Send + Sync + 'static {
    /// `GET /printer/info`
    async fn probe(&self) -> Result<(), TransportError>;

    /// `POST /printer/gcode/script`
    async fn dispatch(&self, script: &str) -> Result<DispatchAck, TransportError>;

    /// Raw idle-timeout state, e.g. `Idle` or `Printing`
    async fn query_state(&self) -> Result<String, TransportError>;

    async fn list_macros(&self) -> Result<Vec<String>, TransportError>;

    async fn emergency_stop(&self) -> Result<(), TransportError>;

    async fn firmware_restart(&self) -> Result<(), TransportError>;
}
