// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pj-core: Core library for the print-queue runner (pj)
//!
//! This crate provides:
//! - The pure rack occupancy model and job list
//! - The canonical device lifecycle, status tracking and completion policies
//! - The ejector macro catalog
//! - Clock, interrupt and reporting abstractions shared by every component
//! - Run configuration loading

pub mod clock;
pub mod id;

pub mod config;
pub mod interrupt;
pub mod macros;
pub mod printer;
pub mod report;

// Domain model (order matters for dependencies)
pub mod job;
pub mod rack;
pub mod lifecycle;
pub mod poll;
pub mod tracker;
pub mod completion;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use completion::{CompletionMonitor, CompletionPolicy, FaultReason, Verdict};
pub use config::{ConfigError, RunConfig};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use interrupt::{Interrupt, Interrupted};
pub use job::{Job, JobFlags, JobList, JobListError};
pub use lifecycle::{DeviceState, DeviceStatus, Lifecycle, Temperatures};
pub use macros::{DeviceMacros, MacroInvocation};
pub use poll::PollPolicy;
pub use printer::PrinterClass;
pub use rack::{validate_sequence, RackConflict, RackState, RackStep};
pub use report::{RecordingReporter, Reporter, RunEvent, SharedReporter, TracingReporter};
pub use tracker::{Anomaly, StatusTracker};
