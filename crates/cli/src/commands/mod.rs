// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod completions;
pub mod ejector;
pub mod macros;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use pj_core::{Interrupt, RunConfig};
use std::path::Path;

fn load_config(path: &Path) -> Result<RunConfig> {
    RunConfig::load(path).with_context(|| format!("invalid run file {}", path.display()))
}

/// Interrupt token triggered by Ctrl-C
fn interrupt_on_ctrlc() -> Result<Interrupt> {
    let interrupt = Interrupt::new();
    let token = interrupt.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping...");
        token.trigger();
    })?;
    Ok(interrupt)
}
