// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ejector macros and the per-printer macro catalog

use crate::printer::PrinterClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const HOME: &str = "OTTOEJECT_HOME";
pub const PARK: &str = "PARK_OTTOEJECT";

/// Prefixes every device-specific macro name starts with
pub const DEVICE_MACRO_PREFIXES: [&str; 3] = ["EJECT_FROM_", "LOAD_ONTO_", "CLOSE_DOOR_"];

/// One ejector command: a macro name plus optional parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroInvocation {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl MacroInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// G-code script line, e.g. `SET_SPEED SPEED=50`
    pub fn script(&self) -> String {
        let mut script = self.name.clone();
        for (key, value) in &self.params {
            script.push(' ');
            script.push_str(&key.to_uppercase());
            script.push('=');
            script.push_str(value);
        }
        script
    }
}

impl fmt::Display for MacroInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.script())
    }
}

pub fn home() -> MacroInvocation {
    MacroInvocation::new(HOME)
}

pub fn park() -> MacroInvocation {
    MacroInvocation::new(PARK)
}

pub fn store_to_slot(slot: u32) -> MacroInvocation {
    MacroInvocation::new(format!("STORE_TO_SLOT_{}", slot))
}

pub fn grab_from_slot(slot: u32) -> MacroInvocation {
    MacroInvocation::new(format!("GRAB_FROM_SLOT_{}", slot))
}

/// Whether a name looks like a device-specific macro
pub fn is_device_macro(name: &str) -> bool {
    DEVICE_MACRO_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Device-specific macros used by the ejection sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceMacros {
    pub eject: String,
    pub load: String,
    /// Only for models with a door
    pub door_close: Option<String>,
}

/// Known (class, model, suffix) combinations
const KNOWN_MODELS: &[(PrinterClass, &str, &str)] = &[
    (PrinterClass::BambuLab, "P1P", "BAMBULAB_P_ONE_P"),
    (PrinterClass::BambuLab, "P1S", "BAMBULAB_P_ONE_S"),
    (PrinterClass::BambuLab, "A1", "BAMBULAB_A_ONE"),
    (PrinterClass::BambuLab, "X1C", "BAMBULAB_X_ONE_C"),
    (PrinterClass::Elegoo, "Centauri Carbon", "ELEGOO_CC"),
    (PrinterClass::Creality, "K1", "CREALITY_K_ONE_C"),
    (PrinterClass::Creality, "K1C", "CREALITY_K_ONE_C"),
    (PrinterClass::FlashForge, "AD5X", "FLASHFORGE_AD_FIVE_X"),
    (PrinterClass::FlashForge, "5M Pro", "FLASHFORGE_AD_FIVE_X"),
    (PrinterClass::Prusa, "MK3", "PRUSA_MK_THREE"),
    (PrinterClass::Prusa, "MK4", "PRUSA_MK_FOUR"),
    (PrinterClass::Prusa, "Core One", "PRUSA_CORE_ONE"),
    (PrinterClass::Anycubic, "Kobra S1", "ANYCUBIC_KOBRA_S_ONE"),
];

const DOOR_MODELS: &[(PrinterClass, &str, &str)] = &[
    (PrinterClass::BambuLab, "P1S", "CLOSE_DOOR_BAMBULAB_P_ONE_S"),
    (PrinterClass::BambuLab, "X1C", "CLOSE_DOOR_BAMBULAB_X_ONE_C"),
    (PrinterClass::Creality, "K1", "CLOSE_DOOR_CREALITY_K_ONE_C"),
    (PrinterClass::Creality, "K1C", "CLOSE_DOOR_CREALITY_K_ONE_C"),
    (PrinterClass::Creality, "K1/K1C", "CLOSE_DOOR_CREALITY_K_ONE_C"),
    (PrinterClass::Anycubic, "Kobra S1", "CLOSE_DOOR_ANYCUBIC_KOBRA_S_ONE"),
    (PrinterClass::Elegoo, "Centauri Carbon", "CLOSE_DOOR_ELEGOO_CC"),
];

fn same_model(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

/// Door-close macro for door-equipped models
pub fn door_close(class: PrinterClass, model: &str) -> Option<&'static str> {
    DOOR_MODELS
        .iter()
        .find(|(c, m, _)| *c == class && same_model(m, model))
        .map(|(_, _, name)| *name)
}

/// Default macros for a printer; unknown models get generated names
pub fn defaults(class: PrinterClass, model: &str) -> DeviceMacros {
    let suffix = KNOWN_MODELS
        .iter()
        .find(|(c, m, _)| *c == class && same_model(m, model))
        .map(|(_, _, suffix)| suffix.to_string())
        .unwrap_or_else(|| {
            let model = model.trim().to_uppercase().replace([' ', '/'], "_");
            format!("{}_{}", class.macro_brand(), model)
        });

    DeviceMacros {
        eject: format!("EJECT_FROM_{}", suffix),
        load: format!("LOAD_ONTO_{}", suffix),
        door_close: door_close(class, model).map(str::to_string),
    }
}

/// Every catalogued model with its default macros
pub fn catalog() -> Vec<(PrinterClass, &'static str, DeviceMacros)> {
    KNOWN_MODELS
        .iter()
        .map(|(class, model, _)| (*class, *model, defaults(*class, model)))
        .collect()
}

#[cfg(test)]
#[path = "macros_tests.rs"]
mod tests;
