// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj macros` - Default device macros from the catalog

use crate::output::{self, OutputFormat};
use anyhow::Result;
use clap::Args;
use pj_core::macros;
use pj_core::PrinterClass;
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct MacrosArgs {
    /// Printer class (bambu_lab, flash_forge, creality, anycubic, elegoo, prusa, klipper)
    #[arg(long)]
    pub class: Option<PrinterClass>,

    /// Printer model, e.g. "P1S"
    #[arg(long, requires = "class")]
    pub model: Option<String>,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct MacroEntry {
    class: PrinterClass,
    model: String,
    eject: String,
    load: String,
    door_close: Option<String>,
}

impl fmt::Display for MacroEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<12} {:<16} {:<36} {:<36} {}",
            self.class,
            self.model,
            self.eject,
            self.load,
            self.door_close.as_deref().unwrap_or("-")
        )
    }
}

pub fn handle(args: MacrosArgs) -> Result<()> {
    let entries: Vec<MacroEntry> = match (args.class, args.model) {
        (Some(class), Some(model)) => vec![entry(class, &model)],
        (class, _) => macros::catalog()
            .into_iter()
            .filter(|(c, _, _)| class.is_none_or(|wanted| wanted == *c))
            .map(|(class, model, _)| entry(class, model))
            .collect(),
    };

    if entries.is_empty() {
        println!("No catalogued models");
        return Ok(());
    }
    output::print_list(&entries, args.format);
    Ok(())
}

fn entry(class: PrinterClass, model: &str) -> MacroEntry {
    let device = macros::defaults(class, model);
    MacroEntry {
        class,
        model: model.to_string(),
        eject: device.eject,
        load: device.load,
        door_close: device.door_close,
    }
}
