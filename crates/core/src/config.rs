// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run configuration
//!
//! A single TOML document describes the printer, the ejector, the rack and
//! the ordered job list. Loading parses and fills defaults; slot feasibility
//! is left to the rack model.

use crate::job::{Job, JobFlags, JobList, JobListError};
use crate::macros::{self, DeviceMacros};
use crate::printer::PrinterClass;
use crate::rack::{RackState, SlotOutOfRange};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid job list: {0}")]
    Jobs(#[from] JobListError),
    #[error("invalid rack: pre-loaded {0}")]
    Rack(#[from] SlotOutOfRange),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub printer: PrinterConfig,
    pub ejector: EjectorConfig,
    #[serde(default)]
    pub macros: MacroOverrides,
    pub rack: RackConfig,
    #[serde(default)]
    pub run: RunSettings,
    #[serde(rename = "job", default)]
    pub jobs: Vec<JobEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrinterConfig {
    pub class: PrinterClass,
    pub model: String,
    #[serde(default)]
    pub link: LinkConfig,
}

/// Connection parameters for the printer's own protocol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default)]
    pub host: String,
    pub port: Option<u16>,
    /// Brand-specific parameters (serial numbers, access codes, ...)
    #[serde(flatten)]
    pub options: BTreeMap<String, String>,
}

pub const DEFAULT_EJECTOR_PORT: u16 = 7125;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EjectorConfig {
    pub host: String,
    #[serde(default = "default_ejector_port")]
    pub port: u16,
    /// Response timeout for a macro dispatch
    #[serde(default = "default_command_timeout", with = "humantime_serde")]
    pub command_timeout: Duration,
    #[serde(default = "default_status_timeout", with = "humantime_serde")]
    pub status_timeout: Duration,
    /// How long a macro may run before the arm must be idle again
    #[serde(default = "default_operation_timeout", with = "humantime_serde")]
    pub operation_timeout: Duration,
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Dispatch attempts on connection failure
    #[serde(default = "default_dispatch_attempts")]
    pub dispatch_attempts: u32,
}

impl EjectorConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: default_ejector_port(),
            command_timeout: default_command_timeout(),
            status_timeout: default_status_timeout(),
            operation_timeout: default_operation_timeout(),
            poll_interval: default_poll_interval(),
            dispatch_attempts: default_dispatch_attempts(),
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn default_ejector_port() -> u16 {
    DEFAULT_EJECTOR_PORT
}

fn default_command_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_status_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_operation_timeout() -> Duration {
    Duration::from_secs(180)
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_dispatch_attempts() -> u32 {
    2
}

/// Overrides of the catalog's device macros
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MacroOverrides {
    pub eject: Option<String>,
    pub load: Option<String>,
    pub door_close: Option<String>,
}

/// Largest rack a run file may describe
pub const MAX_RACK_CAPACITY: u32 = 256;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RackConfig {
    pub capacity: u32,
    /// Slots holding empty plates before the run
    #[serde(default)]
    pub occupied: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    #[serde(default = "default_inter_job_delay", with = "humantime_serde")]
    pub inter_job_delay: Duration,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            inter_job_delay: default_inter_job_delay(),
        }
    }
}

fn default_inter_job_delay() -> Duration {
    Duration::from_secs(10)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobEntry {
    pub file: String,
    pub store_slot: u32,
    pub grab_slot: Option<u32>,
    #[serde(default)]
    pub flags: JobFlags,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.rack.capacity == 0 {
            return Err(ConfigError::Invalid("rack.capacity must be at least 1".into()));
        }
        if self.rack.capacity > MAX_RACK_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "rack.capacity must be at most {}",
                MAX_RACK_CAPACITY
            )));
        }
        if self.ejector.host.trim().is_empty() {
            return Err(ConfigError::Invalid("ejector.host must not be empty".into()));
        }
        if self.ejector.dispatch_attempts == 0 {
            return Err(ConfigError::Invalid(
                "ejector.dispatch_attempts must be at least 1".into(),
            ));
        }
        self.initial_rack()?;
        self.job_list()?;
        Ok(())
    }

    /// Jobs in execution order; index is the 1-based position in the file
    pub fn job_list(&self) -> Result<JobList, ConfigError> {
        let jobs = (1u32..)
            .zip(self.jobs.iter())
            .map(|(index, entry)| Job {
                index,
                file: entry.file.clone(),
                store_slot: entry.store_slot,
                grab_slot: entry.grab_slot,
                flags: entry.flags.clone(),
            })
            .collect();
        Ok(JobList::new(jobs)?)
    }

    pub fn initial_rack(&self) -> Result<RackState, ConfigError> {
        Ok(RackState::with_occupied(
            self.rack.capacity,
            self.rack.occupied.iter().copied(),
        )?)
    }

    /// Catalog defaults for the configured printer with overrides applied
    pub fn device_macros(&self) -> DeviceMacros {
        let defaults = macros::defaults(self.printer.class, &self.printer.model);
        DeviceMacros {
            eject: self.macros.eject.clone().unwrap_or(defaults.eject),
            load: self.macros.load.clone().unwrap_or(defaults.load),
            door_close: self.macros.door_close.clone().or(defaults.door_close),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
