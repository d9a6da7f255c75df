// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for a run

use pj_adapters::{DeviceError, EjectorError};
use pj_core::{FaultReason, RackConflict};
use thiserror::Error;

/// Why a run stopped before finishing every job
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("protocol error: {0}")]
    Protocol(String),
    #[error("device fault during job {job}: {reason}")]
    DeviceFault { job: u32, reason: FaultReason },
    #[error("rack sequence conflict: {0}")]
    SequenceConflict(RackConflict),
    #[error("interrupted by user")]
    Interrupted,
    #[error("ejector failed{}: {source}", at_job(*job))]
    Ejection {
        job: Option<u32>,
        source: EjectorError,
    },
}

fn at_job(job: Option<u32>) -> String {
    job.map(|j| format!(" during job {}", j)).unwrap_or_default()
}

impl RunError {
    pub(crate) fn from_device(job: u32, err: DeviceError) -> Self {
        match err {
            DeviceError::Transport(message) => RunError::Transport(message),
            DeviceError::Protocol(message) => RunError::Protocol(message),
            DeviceError::Fault(reason) => RunError::DeviceFault { job, reason },
            DeviceError::Interrupted => RunError::Interrupted,
            DeviceError::NotConnected | DeviceError::Unsupported(_) => {
                RunError::Protocol(err.to_string())
            }
        }
    }

    pub(crate) fn from_ejector(job: Option<u32>, err: EjectorError) -> Self {
        match err {
            EjectorError::Interrupted => RunError::Interrupted,
            source => RunError::Ejection { job, source },
        }
    }

    pub fn is_interrupt(&self) -> bool {
        matches!(self, RunError::Interrupted)
    }
}
