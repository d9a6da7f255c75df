// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Printer class to session wiring

use super::moonraker::MoonrakerLink;
use super::{DeviceError, DeviceLink, PrinterProfile, PrinterSession};
use pj_core::config::LinkConfig;
use pj_core::{Clock, PrinterClass, SharedReporter};

/// Wire-level link for a printer class
///
/// Vendor protocols without a built-in link are reported as unsupported;
/// callers can still drive them through their own [`DeviceLink`].
pub fn link_for<C: Clock>(
    class: PrinterClass,
    config: &LinkConfig,
    clock: C,
) -> Result<Box<dyn DeviceLink>, DeviceError> {
    if config.host.trim().is_empty() {
        return Err(DeviceError::Protocol(format!(
            "printer host is required for {}",
            class
        )));
    }
    match class {
        PrinterClass::Klipper | PrinterClass::Anycubic => {
            Ok(Box::new(MoonrakerLink::new(class, config, clock)))
        }
        PrinterClass::BambuLab
        | PrinterClass::FlashForge
        | PrinterClass::Creality
        | PrinterClass::Elegoo
        | PrinterClass::Prusa => Err(DeviceError::Unsupported(class)),
    }
}

/// Session for a printer class using its built-in link and profile
pub fn build_session<C: Clock>(
    class: PrinterClass,
    config: &LinkConfig,
    clock: C,
    reporter: SharedReporter,
) -> Result<PrinterSession<Box<dyn DeviceLink>, C>, DeviceError> {
    let link = link_for(class, config, clock.clone())?;
    Ok(PrinterSession::new(
        link,
        clock,
        PrinterProfile::for_class(class),
        reporter,
    ))
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
