// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Printer classes
//!
//! Device sessions, profiles and macro defaults are all selected by this
//! closed enumeration. Nothing downstream matches on vendor name strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterClass {
    BambuLab,
    FlashForge,
    Creality,
    Anycubic,
    Elegoo,
    Prusa,
    Klipper,
}

impl PrinterClass {
    pub const ALL: [PrinterClass; 7] = [
        PrinterClass::BambuLab,
        PrinterClass::FlashForge,
        PrinterClass::Creality,
        PrinterClass::Anycubic,
        PrinterClass::Elegoo,
        PrinterClass::Prusa,
        PrinterClass::Klipper,
    ];

    /// Configuration key, e.g. `bambu_lab`
    pub fn key(&self) -> &'static str {
        match self {
            PrinterClass::BambuLab => "bambu_lab",
            PrinterClass::FlashForge => "flash_forge",
            PrinterClass::Creality => "creality",
            PrinterClass::Anycubic => "anycubic",
            PrinterClass::Elegoo => "elegoo",
            PrinterClass::Prusa => "prusa",
            PrinterClass::Klipper => "klipper",
        }
    }

    /// Brand segment used when composing macro names
    pub fn macro_brand(&self) -> &'static str {
        match self {
            PrinterClass::BambuLab => "BAMBULAB",
            PrinterClass::FlashForge => "FLASHFORGE",
            PrinterClass::Creality => "CREALITY",
            PrinterClass::Anycubic => "ANYCUBIC",
            PrinterClass::Elegoo => "ELEGOO",
            PrinterClass::Prusa => "PRUSA",
            PrinterClass::Klipper => "KLIPPER",
        }
    }
}

impl fmt::Display for PrinterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown printer class '{0}' (expected one of: bambu_lab, flash_forge, creality, anycubic, elegoo, prusa, klipper)")]
pub struct UnknownPrinterClass(pub String);

impl FromStr for PrinterClass {
    type Err = UnknownPrinterClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PrinterClass::ALL
            .into_iter()
            .find(|class| class.key() == normalized)
            .ok_or_else(|| UnknownPrinterClass(s.to_string()))
    }
}

#[cfg(test)]
#[path = "printer_tests.rs"]
mod tests;
