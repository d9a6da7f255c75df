// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adaptive poll interval policy
//!
//! Long waits while a job is far from done, short waits near the end.
//! Remaining-time estimates take priority over progress when present.

use std::time::Duration;

/// Remaining-time thresholds and the interval used above each
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    /// `(threshold, interval)` pairs checked in order; the first whose
    /// threshold the remaining time exceeds wins
    pub by_remaining: Vec<(Duration, Duration)>,
    /// Used when remaining time is known but below every threshold
    pub remaining_floor: Duration,
    /// `(progress_below, interval)` pairs checked in order
    pub by_progress: Vec<(f64, Duration)>,
    /// Used when progress is at or above every threshold
    pub near_done: Duration,
    /// Used when neither signal is available
    pub fallback: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            by_remaining: vec![
                (Duration::from_secs(10 * 60), Duration::from_secs(60)),
                (Duration::from_secs(2 * 60), Duration::from_secs(30)),
            ],
            remaining_floor: Duration::from_secs(10),
            by_progress: vec![
                (90.0, Duration::from_secs(30)),
                (99.0, Duration::from_secs(15)),
            ],
            near_done: Duration::from_secs(5),
            fallback: Duration::from_secs(30),
        }
    }
}

impl PollPolicy {
    /// Progress-only policy for devices that report no remaining time
    pub fn progress_only() -> Self {
        Self {
            by_remaining: Vec::new(),
            remaining_floor: Duration::from_secs(10),
            by_progress: vec![
                (90.0, Duration::from_secs(30)),
                (99.0, Duration::from_secs(10)),
            ],
            near_done: Duration::from_secs(5),
            fallback: Duration::from_secs(30),
        }
    }

    /// Fixed interval regardless of progress
    pub fn fixed(interval: Duration) -> Self {
        Self {
            by_remaining: Vec::new(),
            remaining_floor: interval,
            by_progress: Vec::new(),
            near_done: interval,
            fallback: interval,
        }
    }

    /// Next poll interval given what the device last reported
    pub fn interval(&self, remaining: Option<Duration>, progress: Option<f64>) -> Duration {
        if let Some(remaining) = remaining {
            if !self.by_remaining.is_empty() {
                return self
                    .by_remaining
                    .iter()
                    .find(|(threshold, _)| remaining > *threshold)
                    .map(|(_, interval)| *interval)
                    .unwrap_or(self.remaining_floor);
            }
        }
        match progress {
            Some(progress) => self
                .by_progress
                .iter()
                .find(|(below, _)| progress < *below)
                .map(|(_, interval)| *interval)
                .unwrap_or(self.near_done),
            None => self.fallback,
        }
    }
}

#[cfg(test)]
#[path = "poll_tests.rs"]
mod tests;
