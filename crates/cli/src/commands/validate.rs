// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj validate` - Simulate a run's rack movements

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use pj_core::rack::{self, Utilization};
use pj_core::RackState;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct ValidateArgs {
    /// Run file
    #[arg(short, long)]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub jobs: usize,
    pub initial: RackState,
    pub movements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_rack: Option<RackState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization: Option<Utilization>,
    pub suggestions: Vec<String>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Jobs: {}", self.jobs)?;
        writeln!(f, "Initial rack: {}", self.initial)?;
        if !self.movements.is_empty() {
            writeln!(f, "Movements:")?;
            for movement in &self.movements {
                writeln!(f, "  {}", movement)?;
            }
        }
        match &self.conflict {
            Some(conflict) => writeln!(f, "Conflict: {}", conflict)?,
            None => writeln!(f, "Sequence is valid")?,
        }
        if let Some(rack) = &self.final_rack {
            writeln!(f, "Final rack: {}", rack)?;
        }
        if let Some(u) = &self.utilization {
            writeln!(
                f,
                "Utilization: {}/{} slots ({:.1}%)",
                u.occupied, u.total, u.percent
            )?;
        }
        for suggestion in &self.suggestions {
            writeln!(f, "Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

pub fn report(steps: &[rack::RackStep], initial: &RackState) -> ValidationReport {
    let simulation = rack::simulate(steps, initial);
    let movements = simulation.log.iter().map(ToString::to_string).collect();
    let (conflict, final_rack) = match simulation.outcome {
        Ok(rack) => (None, Some(rack)),
        Err(conflict) => (Some(conflict.to_string()), None),
    };
    ValidationReport {
        valid: conflict.is_none(),
        jobs: steps.len(),
        initial: initial.clone(),
        movements,
        conflict,
        utilization: final_rack.as_ref().map(RackState::utilization),
        final_rack,
        suggestions: rack::suggest(steps),
    }
}

pub fn handle(args: ValidateArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;
    let jobs = config.job_list()?;
    let initial = config.initial_rack()?;

    let report = report(&jobs.rack_steps(), &initial);
    output::print(&report, args.format);

    match report.conflict {
        Some(conflict) => anyhow::bail!("rack sequence rejected: {}", conflict),
        None => Ok(()),
    }
}
