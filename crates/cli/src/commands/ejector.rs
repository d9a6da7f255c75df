// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj ejector` - Manual control of the ejector arm

use crate::adapters;
use anyhow::Result;
use clap::{Args, Subcommand};
use pj_core::{MacroInvocation, TracingReporter};
use std::path::PathBuf;

#[derive(Args)]
pub struct EjectorArgs {
    /// Run file providing the [ejector] section
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: EjectorCommand,
}

#[derive(Subcommand)]
pub enum EjectorCommand {
    /// Show whether the arm is idle, busy or offline
    Status,
    /// Home the arm
    Home,
    /// Park the arm
    Park,
    /// Emergency stop
    Stop,
    /// Run a macro and wait for the arm to finish
    Macro {
        /// Macro name, e.g. STORE_TO_SLOT_2
        name: String,
        /// Macro parameters (KEY=VALUE)
        #[arg(value_parser = parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// List macros defined on the ejector
    Macros,
    /// Restart the ejector firmware and wait for it to come back
    Restart,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let pos = s
        .find('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

pub async fn handle(args: EjectorArgs) -> Result<()> {
    let path = args
        .config
        .ok_or_else(|| anyhow::anyhow!("--config is required for ejector commands"))?;
    let config = super::load_config(&path)?;
    let ejector = adapters::make_ejector(&config.ejector, TracingReporter::shared());

    match args.command {
        EjectorCommand::Status => {
            println!("{}", ejector.status().await);
        }
        EjectorCommand::Home => {
            let interrupt = super::interrupt_on_ctrlc()?;
            ejector.home(&interrupt).await?;
            println!("Homed");
        }
        EjectorCommand::Park => {
            let interrupt = super::interrupt_on_ctrlc()?;
            ejector.park(&interrupt).await?;
            println!("Parked");
        }
        EjectorCommand::Stop => {
            if !ejector.emergency_stop().await {
                anyhow::bail!("emergency stop was not acknowledged");
            }
            println!("Emergency stop sent");
        }
        EjectorCommand::Macro { name, params } => {
            if !ejector.validate_macro_exists(&name).await {
                anyhow::bail!("macro '{}' is not defined on the ejector", name);
            }
            let invocation = params
                .into_iter()
                .fold(MacroInvocation::new(name), |m, (k, v)| m.param(k, v));
            let interrupt = super::interrupt_on_ctrlc()?;
            ejector.execute_macro(&invocation, &interrupt).await?;
            println!("Finished {}", invocation);
        }
        EjectorCommand::Macros => {
            let names = ejector.available_macros().await;
            if names.is_empty() {
                println!("No macros reported");
            }
            for name in names {
                println!("{}", name);
            }
        }
        EjectorCommand::Restart => {
            let interrupt = super::interrupt_on_ctrlc()?;
            ejector.restart_firmware(&interrupt).await?;
            println!("Ejector restarted");
        }
    }
    Ok(())
}
