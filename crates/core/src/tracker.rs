// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status tracking across repeated samples
//!
//! The tracker watches a stream of [`DeviceStatus`] samples for stalls,
//! counts consecutive transport failures, and chooses the next poll
//! interval from the latest sample.

use crate::lifecycle::{DeviceState, DeviceStatus};
use crate::poll::PollPolicy;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Limits after which a sample stream looks stuck
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyThresholds {
    /// Idle below `low_progress` for more than this many polls
    pub idle_polls: u32,
    pub low_progress: f64,
    /// Identical active samples for more than this many polls
    pub unchanged_polls: u32,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            idle_polls: 6,
            low_progress: 10.0,
            unchanged_polls: 10,
        }
    }
}

/// An advisory observation; never fatal on its own
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Device sat idle at low progress; the job may not have started
    IdleAtLowProgress { polls: u32, progress: f64 },
    /// Device reports the same active sample over and over
    Stalled { polls: u32, progress: f64 },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::IdleAtLowProgress { polls, progress } => write!(
                f,
                "device idle at {:.1}% for {} polls; job may not have started",
                progress, polls
            ),
            Anomaly::Stalled { polls, progress } => write!(
                f,
                "status unchanged at {:.1}% for {} polls; device may be stuck",
                progress, polls
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusTracker {
    policy: PollPolicy,
    thresholds: AnomalyThresholds,
    last: Option<DeviceStatus>,
    polls: u32,
    idle_polls: u32,
    unchanged_polls: u32,
    consecutive_failures: u32,
}

impl StatusTracker {
    pub fn new(policy: PollPolicy) -> Self {
        Self::with_thresholds(policy, AnomalyThresholds::default())
    }

    pub fn with_thresholds(policy: PollPolicy, thresholds: AnomalyThresholds) -> Self {
        Self {
            policy,
            thresholds,
            last: None,
            polls: 0,
            idle_polls: 0,
            unchanged_polls: 0,
            consecutive_failures: 0,
        }
    }

    /// Record a successful sample
    ///
    /// Returns an anomaly the first time a threshold is crossed; it is not
    /// repeated while the condition persists.
    pub fn observe(&mut self, status: &DeviceStatus) -> Option<Anomaly> {
        self.polls += 1;
        self.consecutive_failures = 0;

        let mut anomaly = None;

        if status.state == DeviceState::Ready && status.progress < self.thresholds.low_progress {
            self.idle_polls += 1;
            if self.idle_polls == self.thresholds.idle_polls + 1 {
                anomaly = Some(Anomaly::IdleAtLowProgress {
                    polls: self.idle_polls,
                    progress: status.progress,
                });
            }
        } else {
            self.idle_polls = 0;
        }

        let unchanged = status.state == DeviceState::Active
            && self
                .last
                .as_ref()
                .is_some_and(|last| last.state == status.state && last.progress == status.progress);
        if unchanged {
            self.unchanged_polls += 1;
            if self.unchanged_polls == self.thresholds.unchanged_polls + 1 {
                anomaly = Some(Anomaly::Stalled {
                    polls: self.unchanged_polls,
                    progress: status.progress,
                });
            }
        } else {
            self.unchanged_polls = 0;
        }

        self.last = Some(status.clone());
        anomaly
    }

    /// Record a failed sample, returning the consecutive failure count
    pub fn observe_failure(&mut self) -> u32 {
        self.consecutive_failures += 1;
        self.consecutive_failures
    }

    pub fn next_interval(&self) -> Duration {
        match &self.last {
            Some(status) => self.policy.interval(status.remaining, Some(status.progress)),
            None => self.policy.interval(None, None),
        }
    }

    pub fn last(&self) -> Option<&DeviceStatus> {
        self.last.as_ref()
    }

    /// Successful samples seen so far
    pub fn polls(&self) -> u32 {
        self.polls
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
