// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Macro-level ejector client

use super::{ArmState, DispatchAck, EjectorError, EjectorTransport, TransportError};
use pj_core::config::EjectorConfig;
use pj_core::macros;
use pj_core::{Clock, Interrupt, MacroInvocation, RunEvent, SharedReporter};
use std::time::Duration;

const FIRMWARE_RESTART_SETTLE: Duration = Duration::from_secs(10);

/// Drives the arm one macro at a time
///
/// A macro counts as done only once the arm reports idle again. Dispatch
/// timeouts are normal for long motions and are treated as provisionally
/// accepted; the idle wait decides.
#[derive(Clone)]
pub struct EjectorClient<T, C> {
    transport: T,
    clock: C,
    config: EjectorConfig,
    reporter: SharedReporter,
}

impl<T: EjectorTransport, C: Clock> EjectorClient<T, C> {
    pub fn new(transport: T, clock: C, config: EjectorConfig, reporter: SharedReporter) -> Self {
        Self {
            transport,
            clock,
            config,
            reporter,
        }
    }

    pub fn config(&self) -> &EjectorConfig {
        &self.config
    }

    pub async fn test_connection(&self) -> Result<(), EjectorError> {
        self.transport.probe().await.map_err(|e| {
            tracing::error!(host = %self.config.host, error = %e, "ejector unreachable");
            connection_error(e)
        })?;
        tracing::info!(host = %self.config.host, "ejector connected");
        Ok(())
    }

    pub async fn status(&self) -> ArmState {
        match self.transport.query_state().await {
            Ok(state) => ArmState::from_idle_timeout(&state),
            Err(e) => {
                tracing::warn!(error = %e, "ejector status unavailable");
                ArmState::Offline
            }
        }
    }

    /// Poll until the arm is idle; `Ok(false)` on timeout
    pub async fn wait_for_idle(
        &self,
        timeout: Duration,
        interrupt: &Interrupt,
    ) -> Result<bool, EjectorError> {
        let start = self.clock.now();
        loop {
            interrupt.check().map_err(|_| EjectorError::Interrupted)?;
            if self.status().await == ArmState::Idle {
                return Ok(true);
            }
            if self.clock.now().duration_since(start) >= timeout {
                tracing::error!(timeout_s = timeout.as_secs(), "ejector did not become idle");
                return Ok(false);
            }
            interrupt
                .sleep(&self.clock, self.config.poll_interval)
                .await
                .map_err(|_| EjectorError::Interrupted)?;
        }
    }

    /// Dispatch a macro and wait for the arm to finish it
    pub async fn execute_macro(
        &self,
        invocation: &MacroInvocation,
        interrupt: &Interrupt,
    ) -> Result<(), EjectorError> {
        interrupt.check().map_err(|_| EjectorError::Interrupted)?;
        let name = invocation.name.clone();
        let script = invocation.script();
        let attempts = self.config.dispatch_attempts.max(1);

        let mut attempt = 0;
        let provisional = loop {
            attempt += 1;
            match self.transport.dispatch(&script).await {
                Ok(DispatchAck::Accepted) => break false,
                Ok(DispatchAck::Rejected(reason)) => {
                    tracing::error!(macro_name = %name, %reason, "macro rejected");
                    return Err(EjectorError::Rejected { name, reason });
                }
                Err(e) if e.is_provisional() => {
                    tracing::warn!(macro_name = %name, error = %e, "no reply to dispatch; command may be running");
                    break true;
                }
                Err(TransportError::Connection(message)) if attempt < attempts => {
                    tracing::warn!(macro_name = %name, attempt, %message, "dispatch failed; retrying");
                    interrupt
                        .sleep(&self.clock, self.config.poll_interval)
                        .await
                        .map_err(|_| EjectorError::Interrupted)?;
                }
                Err(e) => return Err(connection_error(e)),
            }
        };
        self.reporter.report(RunEvent::MacroDispatched {
            name: name.clone(),
            provisional,
        });

        let timeout = self.config.operation_timeout;
        if !self.wait_for_idle(timeout, interrupt).await? {
            return Err(EjectorError::NotIdle { name, timeout });
        }
        Ok(())
    }

    pub async fn home(&self, interrupt: &Interrupt) -> Result<(), EjectorError> {
        self.execute_macro(&macros::home(), interrupt).await
    }

    pub async fn park(&self, interrupt: &Interrupt) -> Result<(), EjectorError> {
        self.execute_macro(&macros::park(), interrupt).await
    }

    pub async fn store(&self, slot: u32, interrupt: &Interrupt) -> Result<(), EjectorError> {
        self.execute_macro(&macros::store_to_slot(slot), interrupt)
            .await
    }

    pub async fn grab(&self, slot: u32, interrupt: &Interrupt) -> Result<(), EjectorError> {
        self.execute_macro(&macros::grab_from_slot(slot), interrupt)
            .await
    }

    /// Best effort; never fails the caller
    pub async fn emergency_stop(&self) -> bool {
        match self.transport.emergency_stop().await {
            Ok(()) => {
                tracing::warn!("ejector emergency stop sent");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, "ejector emergency stop failed");
                false
            }
        }
    }

    /// Macro names known to the arm; empty when they cannot be read
    pub async fn available_macros(&self) -> Vec<String> {
        match self.transport.list_macros().await {
            Ok(names) => names,
            Err(e) => {
                tracing::error!(error = %e, "failed to list ejector macros");
                Vec::new()
            }
        }
    }

    /// Case-insensitive check; an unreadable macro list counts as present
    pub async fn validate_macro_exists(&self, name: &str) -> bool {
        match self.transport.list_macros().await {
            Ok(names) => {
                let found = names.iter().any(|n| n.eq_ignore_ascii_case(name));
                if !found {
                    tracing::warn!(macro_name = name, available = names.len(), "macro not found on ejector");
                }
                found
            }
            Err(e) => {
                tracing::warn!(macro_name = name, error = %e, "could not validate macro");
                true
            }
        }
    }

    pub async fn restart_firmware(&self, interrupt: &Interrupt) -> Result<(), EjectorError> {
        self.transport
            .firmware_restart()
            .await
            .map_err(connection_error)?;
        interrupt
            .sleep(&self.clock, FIRMWARE_RESTART_SETTLE)
            .await
            .map_err(|_| EjectorError::Interrupted)?;
        self.test_connection().await
    }
}

fn connection_error(err: TransportError) -> EjectorError {
    match err {
        TransportError::Connection(message) => EjectorError::Connection(message),
        TransportError::Timeout | TransportError::GatewayTimeout(_) => {
            EjectorError::Connection(err.to_string())
        }
        TransportError::Status(_) | TransportError::Protocol(_) => {
            EjectorError::Protocol(err.to_string())
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
