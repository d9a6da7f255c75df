// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Printer link for Klipper firmware behind Moonraker
//!
//! Covers stock Klipper printers and Anycubic Kobra printers running
//! Rinkhals. Anycubic jobs are preceded by the LeviQ bed-levelling macros.

use super::{DeviceLink, LinkError, RawStatus};
use crate::moonraker::{self, HttpError, MoonrakerClient};
use async_trait::async_trait;
use pj_core::config::LinkConfig;
use pj_core::{Clock, JobFlags, PrinterClass};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MOONRAKER_PORT: u16 = 7125;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const COMMAND_SPACING: Duration = Duration::from_secs(1);

const STATUS_QUERY: &str =
    "/printer/objects/query?print_stats&virtual_sdcard&extruder&heater_bed&display_status";

const LEVIQ_PREAMBLE: &[&str] = &[
    "LEVIQ2_AUTO_ZOFFSET_ON_OFF",
    "LEVIQ2_PREHEATING",
    "LEVIQ2_WIPING",
    "LEVIQ2_PROBE",
];

/// Job flag that turns the LeviQ preamble off for one job
pub const LEVIQ_FLAG: &str = "leviq";

impl From<HttpError> for LinkError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Timeout | HttpError::GatewayTimeout(_) => LinkError::Timeout(err.to_string()),
            HttpError::Connection(_) => LinkError::Connection(err.to_string()),
            HttpError::Status(_) | HttpError::Protocol(_) => LinkError::Protocol(err.to_string()),
        }
    }
}

pub struct MoonrakerLink<C> {
    class: PrinterClass,
    client: MoonrakerClient,
    clock: C,
}

impl<C: Clock> MoonrakerLink<C> {
    pub fn new(class: PrinterClass, config: &LinkConfig, clock: C) -> Self {
        let port = config.port.unwrap_or(DEFAULT_MOONRAKER_PORT);
        let base_url = format!("http://{}:{}", config.host, port);
        Self {
            class,
            client: MoonrakerClient::new(base_url, REQUEST_TIMEOUT),
            clock,
        }
    }

    async fn script(&self, script: &str) -> Result<(), HttpError> {
        let body = self
            .client
            .post("/printer/gcode/script", &[("script", script)])
            .await?;
        if moonraker::is_ok_result(&body) {
            return Ok(());
        }
        Err(HttpError::Protocol(
            moonraker::error_message(&body).unwrap_or_else(|| format!("{} not acknowledged", script)),
        ))
    }

    fn wants_leviq(&self, flags: &JobFlags) -> bool {
        self.class == PrinterClass::Anycubic
            && flags
                .get(LEVIQ_FLAG)
                .and_then(Value::as_bool)
                .unwrap_or(true)
    }
}

/// Send each preamble macro in order, spaced out on `clock`
///
/// A macro that outlives the HTTP timeout counts as queued.
async fn send_preamble<C, F, Fut>(clock: &C, mut send: F) -> Result<(), HttpError>
where
    C: Clock,
    F: FnMut(&'static str) -> Fut,
    Fut: Future<Output = Result<(), HttpError>>,
{
    for &step in LEVIQ_PREAMBLE {
        match send(step).await {
            Ok(()) => {}
            Err(e) if e.is_provisional() => {
                tracing::info!(script = step, "no reply before timeout; assuming queued")
            }
            Err(e) => return Err(e),
        }
        clock.sleep(COMMAND_SPACING).await;
    }
    Ok(())
}

/// Build a raw sample from a print status query
pub fn parse_print_status(body: &Value) -> Result<RawStatus, LinkError> {
    let print_stats = moonraker::object(body, "print_stats")
        .ok_or_else(|| LinkError::Protocol("missing print_stats".into()))?;
    let state = print_stats
        .get("state")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let fraction = moonraker::object(body, "virtual_sdcard")
        .and_then(|sd| sd.get("progress"))
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let temperature = |name: &str| {
        moonraker::object(body, name)
            .and_then(|heater| heater.get("temperature"))
            .and_then(Value::as_f64)
    };

    // Estimate from elapsed print time; Moonraker reports no remaining time
    let elapsed = print_stats.get("print_duration").and_then(Value::as_f64);
    let remaining = match elapsed {
        Some(elapsed) if fraction > 0.0 && fraction < 1.0 && elapsed > 0.0 => Some(
            Duration::from_secs_f64(elapsed * (1.0 - fraction) / fraction),
        ),
        Some(_) if fraction >= 1.0 => Some(Duration::ZERO),
        _ => None,
    };

    Ok(RawStatus {
        state: state.to_string(),
        progress: fraction * 100.0,
        nozzle: temperature("extruder"),
        bed: temperature("heater_bed"),
        remaining,
    })
}

#[async_trait]
impl<C: Clock> DeviceLink for MoonrakerLink<C> {
    async fn open(&mut self) -> Result<(), LinkError> {
        let body = self.client.get("/printer/info", &[]).await?;
        let state = body
            .get("result")
            .and_then(|r| r.get("state"))
            .and_then(Value::as_str)
            .ok_or_else(|| LinkError::Protocol("printer info without state".into()))?;
        tracing::debug!(url = self.client.base_url(), klippy_state = state, "moonraker reachable");
        Ok(())
    }

    async fn sample(&mut self) -> Result<RawStatus, LinkError> {
        let body = self.client.get(STATUS_QUERY, &[]).await?;
        parse_print_status(&body)
    }

    async fn start(
        &mut self,
        file: &str,
        flags: &JobFlags,
        _first_job: bool,
    ) -> Result<(), LinkError> {
        if self.wants_leviq(flags) {
            let this = &*self;
            send_preamble(&this.clock, |step| this.script(step)).await?;
        }

        let command = format!("SDCARD_PRINT_FILE FILENAME=\"{}\"", file);
        match self.script(&command).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_provisional() => {
                tracing::info!(file, "print command timed out; assuming queued");
                Ok(())
            }
            Err(HttpError::Protocol(message)) => Err(LinkError::Rejected(message)),
            Err(e) => Err(e.into()),
        }
    }

    async fn reposition(&mut self) -> Result<(), LinkError> {
        // END_PRINT raises the bed on these printers
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    async fn close(&mut self) {}
}

#[cfg(test)]
#[path = "moonraker_tests.rs"]
mod tests;
