// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Moonraker-backed ejector transport

use super::{DispatchAck, EjectorTransport, TransportError};
use crate::moonraker::{self, MoonrakerClient};
use async_trait::async_trait;
use pj_core::config::EjectorConfig;

/// Talks to the arm over HTTP
///
/// Script dispatch uses the longer command timeout so slow macros return
/// before an upstream proxy gives up; every other request uses the short
/// status timeout.
#[derive(Clone)]
pub struct MoonrakerTransport {
    command: MoonrakerClient,
    status: MoonrakerClient,
}

impl MoonrakerTransport {
    pub fn new(config: &EjectorConfig) -> Self {
        let base_url = config.base_url();
        Self {
            command: MoonrakerClient::new(base_url.clone(), config.command_timeout),
            status: MoonrakerClient::new(base_url, config.status_timeout),
        }
    }
}

#[async_trait]
impl EjectorTransport for MoonrakerTransport {
    async fn probe(&self) -> Result<(), TransportError> {
        let body = self.status.get("/printer/info", &[]).await?;
        if body.get("result").is_some() {
            Ok(())
        } else {
            Err(TransportError::Protocol("printer info without result".into()))
        }
    }

    async fn dispatch(&self, script: &str) -> Result<DispatchAck, TransportError> {
        let body = match self
            .command
            .post("/printer/gcode/script", &[("script", script)])
            .await
        {
            Ok(body) => body,
            // Klipper answers unknown or failing commands with a client error
            Err(TransportError::Status(code)) if (400..500).contains(&code) => {
                return Ok(DispatchAck::Rejected(format!("HTTP {}", code)));
            }
            Err(e) => return Err(e),
        };
        if moonraker::is_ok_result(&body) {
            return Ok(DispatchAck::Accepted);
        }
        let reason = moonraker::error_message(&body).unwrap_or_else(|| body.to_string());
        Ok(DispatchAck::Rejected(reason))
    }

    async fn query_state(&self) -> Result<String, TransportError> {
        let body = self
            .status
            .get("/printer/objects/query?idle_timeout", &[])
            .await?;
        moonraker::idle_timeout_state(&body)
            .ok_or_else(|| TransportError::Protocol("missing idle_timeout state".into()))
    }

    async fn list_macros(&self) -> Result<Vec<String>, TransportError> {
        let body = self
            .status
            .get("/printer/objects/query?gcode_macros", &[])
            .await?;
        Ok(moonraker::macro_names(&body))
    }

    async fn emergency_stop(&self) -> Result<(), TransportError> {
        self.status.post("/printer/emergency_stop", &[]).await?;
        Ok(())
    }

    async fn firmware_restart(&self) -> Result<(), TransportError> {
        self.status.post("/printer/firmware_restart", &[]).await?;
        Ok(())
    }
}
