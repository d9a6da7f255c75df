// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Print-queue execution engine

pub mod ejection;
mod error;
mod orchestrator;

pub use error::RunError;
pub use orchestrator::{JobOrchestrator, RunDeps, RunPlan, RunResult};
