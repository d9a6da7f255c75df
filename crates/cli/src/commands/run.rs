// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj run` - Execute a run file end to end

use crate::adapters;
use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use pj_core::{RackState, SystemClock, TracingReporter, UuidIdGen};
use pj_engine::{JobOrchestrator, RunDeps, RunPlan, RunResult};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct RunArgs {
    /// Run file
    #[arg(short, long)]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    run_id: String,
    completed: u32,
    total_jobs: u32,
    interrupted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stopped: Option<String>,
    rack: RackState,
}

impl From<&RunResult> for RunSummary {
    fn from(result: &RunResult) -> Self {
        Self {
            run_id: result.run_id.clone(),
            completed: result.completed,
            total_jobs: result.total_jobs,
            interrupted: result.interrupted,
            stopped: result.stop.as_ref().map(ToString::to_string),
            rack: result.rack.clone(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run: {}", self.run_id)?;
        writeln!(f, "  Completed: {}/{}", self.completed, self.total_jobs)?;
        if self.interrupted {
            writeln!(f, "  Interrupted by user")?;
        }
        if let Some(reason) = &self.stopped {
            writeln!(f, "  Stopped: {}", reason)?;
        }
        writeln!(f, "  Rack: {}", self.rack)
    }
}

pub async fn handle(args: RunArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let plan = RunPlan::from_config(&config)?;
    let reporter = TracingReporter::shared();

    let deps = RunDeps {
        device: adapters::make_device(&config.printer, reporter.clone())?,
        ejector: adapters::make_ejector(&config.ejector, reporter.clone()),
        clock: SystemClock,
        reporter,
    };
    let interrupt = super::interrupt_on_ctrlc()?;

    let result = JobOrchestrator::new(deps, plan, UuidIdGen)
        .run(&interrupt)
        .await;
    output::print(&RunSummary::from(&result), args.format);

    if let Some(stop) = result.stop {
        anyhow::bail!(
            "run stopped after {}/{} jobs: {}",
            result.completed,
            result.total_jobs,
            stop
        );
    }
    if result.interrupted {
        anyhow::bail!(
            "run interrupted after {}/{} jobs",
            result.completed,
            result.total_jobs
        );
    }
    Ok(())
}
