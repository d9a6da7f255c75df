// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production adapter wiring for CLI commands

use anyhow::{Context, Result};
use pj_adapters::{
    build_session, DeviceLink, EjectorClient, MoonrakerTransport, PrinterSession,
    TracedDeviceSession, TracedEjectorTransport,
};
use pj_core::config::{EjectorConfig, PrinterConfig};
use pj_core::{SharedReporter, SystemClock};

pub type Device = TracedDeviceSession<PrinterSession<Box<dyn DeviceLink>, SystemClock>>;
pub type Ejector = EjectorClient<TracedEjectorTransport<MoonrakerTransport>, SystemClock>;

/// Session for the configured printer
pub fn make_device(printer: &PrinterConfig, reporter: SharedReporter) -> Result<Device> {
    let session = build_session(printer.class, &printer.link, SystemClock, reporter)
        .with_context(|| format!("cannot drive {} printer '{}'", printer.class, printer.model))?;
    Ok(TracedDeviceSession::new(session))
}

/// Client for the configured ejector arm
pub fn make_ejector(config: &EjectorConfig, reporter: SharedReporter) -> Ejector {
    let transport = TracedEjectorTransport::new(MoonrakerTransport::new(config));
    EjectorClient::new(transport, SystemClock, config.clone(), reporter)
}
