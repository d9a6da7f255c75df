// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical device lifecycle
//!
//! Every printer, whatever its vendor vocabulary, is reported through these
//! states:
//!
//! ```text
//! Unknown -> Connecting -> Ready -> Starting -> Active -> {Completed | Failed | Cancelled}
//! ```
//!
//! Terminal states accept no further transitions for the job that reached
//! them. A session that runs another job re-arms to `Ready` first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    Unknown,
    Connecting,
    Ready,
    Starting,
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl DeviceState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeviceState::Completed | DeviceState::Failed | DeviceState::Cancelled
        )
    }

    pub fn can_transition_to(&self, next: DeviceState) -> bool {
        use DeviceState::*;
        match (self, next) {
            (Unknown, Connecting) => true,
            (Connecting, Ready | Failed) => true,
            (Ready, Starting) => true,
            (Starting, Active | Failed | Cancelled) => true,
            (Active, Completed | Failed | Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeviceState::Unknown => "unknown",
            DeviceState::Connecting => "connecting",
            DeviceState::Ready => "ready",
            DeviceState::Starting => "starting",
            DeviceState::Active => "active",
            DeviceState::Completed => "completed",
            DeviceState::Failed => "failed",
            DeviceState::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal lifecycle transition {from} -> {to}")]
pub struct IllegalTransition {
    pub from: DeviceState,
    pub to: DeviceState,
}

/// Lifecycle state owned by one device session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lifecycle {
    state: DeviceState,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: DeviceState::Unknown,
        }
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn advance(&mut self, next: DeviceState) -> Result<(), IllegalTransition> {
        if self.state == next {
            return Ok(());
        }
        if !self.state.can_transition_to(next) {
            return Err(IllegalTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }

    /// Prepare for the next job after a terminal outcome
    pub fn rearm(&mut self) -> Result<(), IllegalTransition> {
        match self.state {
            DeviceState::Ready => Ok(()),
            s if s.is_terminal() => {
                self.state = DeviceState::Ready;
                Ok(())
            }
            from => Err(IllegalTransition {
                from,
                to: DeviceState::Ready,
            }),
        }
    }

    /// Connection released; any state may fall back to unknown
    pub fn reset(&mut self) {
        self.state = DeviceState::Unknown;
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    pub nozzle: Option<f64>,
    pub bed: Option<f64>,
}

/// One status sample, already translated into the canonical lifecycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub state: DeviceState,
    /// Clamped to `0.0..=100.0`
    pub progress: f64,
    #[serde(default)]
    pub temperatures: Temperatures,
    #[serde(default, with = "humantime_serde")]
    pub remaining: Option<Duration>,
}

impl DeviceStatus {
    pub fn new(state: DeviceState, progress: f64) -> Self {
        Self {
            state,
            progress: clamp_progress(progress),
            temperatures: Temperatures::default(),
            remaining: None,
        }
    }

    pub fn with_remaining(mut self, remaining: Duration) -> Self {
        self.remaining = Some(remaining);
        self
    }

    pub fn with_temperatures(mut self, nozzle: f64, bed: f64) -> Self {
        self.temperatures = Temperatures {
            nozzle: Some(nozzle),
            bed: Some(bed),
        };
        self
    }
}

pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
