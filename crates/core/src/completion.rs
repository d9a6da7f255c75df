// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Completion detection for a running print
//!
//! [`CompletionMonitor`] turns a noisy stream of canonical status samples
//! into one verdict per poll. It applies, in order:
//!
//! - the stale-terminal guard: a terminal first sample is treated as left
//!   over from the previous job until the device leaves it and progress
//!   resets,
//! - the fault grace window and fault debounce,
//! - completion debounce: a terminal report must repeat `confirm_polls`
//!   times unless high progress or cooled heaters corroborate it,
//! - the transport failure budget.
//!
//! Every threshold is a field of [`CompletionPolicy`] so each printer
//! profile keeps its own tuned values.

use crate::lifecycle::{DeviceState, DeviceStatus};
use crate::tracker::{Anomaly, StatusTracker};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Completion through cooled heaters after high progress
#[derive(Debug, Clone, PartialEq)]
pub struct CoolingRule {
    pub nozzle_below: f64,
    pub bed_below: f64,
    pub min_progress: f64,
}

impl CoolingRule {
    fn holds(&self, status: &DeviceStatus) -> bool {
        let temps = status.temperatures;
        status.progress > self.min_progress
            && temps.nozzle.is_some_and(|t| t < self.nozzle_below)
            && temps.bed.is_some_and(|t| t < self.bed_below)
    }
}

/// Bounds the wait for a device to leave the previous job's terminal state
///
/// Guarded samples are polled at a fixed `interval`, so the guard gives up
/// after `max_polls * interval` of wall time.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleGuard {
    /// Give up and fail the job after this many guarded samples
    pub max_polls: u32,
    pub interval: Duration,
    /// Progress below this counts as reset for the new job
    pub progress_reset_below: f64,
}

impl StaleGuard {
    pub fn timeout(&self) -> Duration {
        self.interval * self.max_polls
    }
}

impl Default for StaleGuard {
    fn default() -> Self {
        Self {
            max_polls: 60,
            interval: Duration::from_secs(5),
            progress_reset_below: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionPolicy {
    /// Consecutive terminal samples that confirm completion on their own
    pub confirm_polls: u32,
    /// Progress at or above which a single completed or idle report is trusted
    pub corroborating_progress: f64,
    /// An idle report after activity completes when progress corroborates it
    pub idle_after_active_completes: bool,
    /// Idle samples after activity beyond which the job counts as done
    pub max_idle_after_active: Option<u32>,
    pub cooling: Option<CoolingRule>,
    /// Idle sample after activity with zero remaining time above this progress
    /// counts as done
    pub zero_remaining_above: Option<f64>,
    /// Idle samples before any activity beyond which the job failed to start
    pub max_initial_idle_polls: Option<u32>,
    /// Fault reports within this many polls of the start are ignored
    pub fault_grace_polls: u32,
    /// Consecutive fault reports (after the grace window) that confirm a fault
    pub fault_confirm_polls: u32,
    pub stale_guard: StaleGuard,
    /// Consecutive failed samples tolerated before giving up
    pub max_transport_failures: u32,
    pub transport_retry: Duration,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        Self {
            confirm_polls: 2,
            corroborating_progress: 99.0,
            idle_after_active_completes: true,
            max_idle_after_active: None,
            cooling: None,
            zero_remaining_above: None,
            max_initial_idle_polls: None,
            fault_grace_polls: 0,
            fault_confirm_polls: 1,
            stale_guard: StaleGuard::default(),
            max_transport_failures: 4,
            transport_retry: Duration::from_secs(15),
        }
    }
}

/// Why a job did not complete
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaultReason {
    /// Device reported a fault or cancellation state
    Reported { state: DeviceState, progress: f64 },
    /// Device stayed idle and never became active
    NeverStarted { polls: u32 },
    /// Device kept reporting the previous job's terminal state
    StaleTerminal { polls: u32 },
    /// Status could not be read
    Unreachable { failures: u32 },
}

impl FaultReason {
    pub fn is_transport(&self) -> bool {
        matches!(self, FaultReason::Unreachable { .. })
    }
}

impl fmt::Display for FaultReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultReason::Reported { state, progress } => {
                write!(f, "device reported {} at {:.1}%", state, progress)
            }
            FaultReason::NeverStarted { polls } => {
                write!(f, "device stayed idle for {} polls; job never started", polls)
            }
            FaultReason::StaleTerminal { polls } => write!(
                f,
                "device still reports the previous job after {} polls",
                polls
            ),
            FaultReason::Unreachable { failures } => {
                write!(f, "status unavailable for {} consecutive polls", failures)
            }
        }
    }
}

/// Decision after one poll
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Poll again after the given interval
    Continue(Duration),
    Completed,
    Failed(FaultReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitFirst,
    Guarding { left_terminal: bool, polls: u32 },
    Monitoring,
}

#[derive(Debug, Clone)]
pub struct CompletionMonitor {
    policy: CompletionPolicy,
    tracker: StatusTracker,
    phase: Phase,
    polls: u32,
    seen_active: bool,
    terminal_streak: u32,
    fault_streak: u32,
    initial_idle: u32,
    idle_after_active: u32,
    anomaly: Option<Anomaly>,
}

impl CompletionMonitor {
    pub fn new(policy: CompletionPolicy, tracker: StatusTracker) -> Self {
        Self {
            policy,
            tracker,
            phase: Phase::AwaitFirst,
            polls: 0,
            seen_active: false,
            terminal_streak: 0,
            fault_streak: 0,
            initial_idle: 0,
            idle_after_active: 0,
            anomaly: None,
        }
    }

    pub fn observe(&mut self, status: &DeviceStatus) -> Verdict {
        if let Some(anomaly) = self.tracker.observe(status) {
            self.anomaly = Some(anomaly);
        }

        match self.phase {
            Phase::AwaitFirst if status.state.is_terminal() => {
                self.phase = Phase::Guarding {
                    left_terminal: false,
                    polls: 1,
                };
                return Verdict::Continue(self.policy.stale_guard.interval);
            }
            Phase::AwaitFirst => self.phase = Phase::Monitoring,
            Phase::Guarding {
                left_terminal,
                polls,
            } => {
                let polls = polls + 1;
                let left_terminal = left_terminal || !status.state.is_terminal();
                let reset = status.state == DeviceState::Active
                    || status.progress < self.policy.stale_guard.progress_reset_below;
                if !(left_terminal && reset) {
                    if polls > self.policy.stale_guard.max_polls {
                        return Verdict::Failed(FaultReason::StaleTerminal { polls });
                    }
                    self.phase = Phase::Guarding {
                        left_terminal,
                        polls,
                    };
                    return Verdict::Continue(self.policy.stale_guard.interval);
                }
                self.phase = Phase::Monitoring;
            }
            Phase::Monitoring => {}
        }

        self.polls += 1;
        self.judge(status)
    }

    pub fn observe_failure(&mut self) -> Verdict {
        let failures = self.tracker.observe_failure();
        if failures > self.policy.max_transport_failures {
            return Verdict::Failed(FaultReason::Unreachable { failures });
        }
        Verdict::Continue(self.policy.transport_retry)
    }

    /// Anomaly raised by the most recent samples, if not yet taken
    pub fn take_anomaly(&mut self) -> Option<Anomaly> {
        self.anomaly.take()
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub fn is_guarding(&self) -> bool {
        matches!(self.phase, Phase::Guarding { .. })
    }

    fn judge(&mut self, status: &DeviceStatus) -> Verdict {
        let policy = &self.policy;

        match status.state {
            DeviceState::Completed => {
                self.fault_streak = 0;
                self.terminal_streak += 1;
                let corroborated = status.progress >= policy.corroborating_progress
                    || policy.cooling.as_ref().is_some_and(|rule| rule.holds(status));
                if corroborated || self.terminal_streak >= policy.confirm_polls {
                    return Verdict::Completed;
                }
            }
            DeviceState::Failed | DeviceState::Cancelled => {
                self.terminal_streak = 0;
                if self.polls > policy.fault_grace_polls {
                    self.fault_streak += 1;
                    if self.fault_streak >= policy.fault_confirm_polls {
                        return Verdict::Failed(FaultReason::Reported {
                            state: status.state,
                            progress: status.progress,
                        });
                    }
                }
            }
            DeviceState::Active | DeviceState::Starting => {
                self.terminal_streak = 0;
                self.fault_streak = 0;
                self.idle_after_active = 0;
                if status.state == DeviceState::Active {
                    self.seen_active = true;
                }
            }
            DeviceState::Ready | DeviceState::Unknown | DeviceState::Connecting => {
                self.terminal_streak = 0;
                self.fault_streak = 0;
                if self.seen_active {
                    self.idle_after_active += 1;
                    if policy.idle_after_active_completes
                        && status.progress >= policy.corroborating_progress
                    {
                        return Verdict::Completed;
                    }
                    if policy.cooling.as_ref().is_some_and(|rule| rule.holds(status)) {
                        return Verdict::Completed;
                    }
                    let drained = status.remaining.is_some_and(|r| r.is_zero());
                    if policy
                        .zero_remaining_above
                        .is_some_and(|above| drained && status.progress > above)
                    {
                        return Verdict::Completed;
                    }
                    if policy
                        .max_idle_after_active
                        .is_some_and(|max| self.idle_after_active > max)
                    {
                        return Verdict::Completed;
                    }
                } else if status.state == DeviceState::Ready {
                    self.initial_idle += 1;
                    if let Some(max) = policy.max_initial_idle_polls {
                        if self.initial_idle > max {
                            return Verdict::Failed(FaultReason::NeverStarted {
                                polls: self.initial_idle,
                            });
                        }
                    }
                }
            }
        }

        self.keep_polling()
    }

    fn keep_polling(&self) -> Verdict {
        Verdict::Continue(self.tracker.next_interval())
    }
}

#[cfg(test)]
#[path = "completion_tests.rs"]
mod tests;
