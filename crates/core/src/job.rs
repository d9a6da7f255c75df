// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Print jobs and the ordered job list

use crate::rack::RackStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Brand-specific job options, passed through to the device untouched
pub type JobFlags = BTreeMap<String, serde_json::Value>;

/// One print job in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    /// 1-based execution position
    pub index: u32,
    pub file: String,
    pub store_slot: u32,
    /// Slot holding the empty plate for the next job; `None` only on the last job
    pub grab_slot: Option<u32>,
    #[serde(default)]
    pub flags: JobFlags,
}

impl Job {
    pub fn new(index: u32, file: impl Into<String>, store_slot: u32, grab_slot: Option<u32>) -> Self {
        Self {
            index,
            file: file.into(),
            store_slot,
            grab_slot,
            flags: JobFlags::new(),
        }
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.flags.insert(key.into(), value);
        self
    }

    pub fn is_last(&self) -> bool {
        self.grab_slot.is_none()
    }

    /// Token recorded in the rack for this job's finished plate
    pub fn plate_token(&self) -> String {
        format!("job_{}_{}", self.index, self.file)
    }

    pub fn rack_step(&self) -> RackStep {
        let step = RackStep::new(self.index)
            .store(self.store_slot)
            .plate(self.plate_token());
        match self.grab_slot {
            Some(slot) => step.grab(slot),
            None => step,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobListError {
    #[error("job list is empty")]
    Empty,
    #[error("job at position {position} has index {found}, expected {position}")]
    NonContiguous { position: u32, found: u32 },
    #[error("job {job} has no grab slot but is not the last job")]
    MissingGrabSlot { job: u32 },
    #[error("last job {job} must not have a grab slot")]
    FinalJobGrabs { job: u32 },
}

/// Jobs in execution order
///
/// Indices are contiguous from 1, and exactly one job (the last) has no
/// grab slot.
#[derive(Debug, Clone, PartialEq)]
pub struct JobList {
    jobs: Vec<Job>,
}

impl JobList {
    pub fn new(mut jobs: Vec<Job>) -> Result<Self, JobListError> {
        if jobs.is_empty() {
            return Err(JobListError::Empty);
        }
        jobs.sort_by_key(|job| job.index);

        let last = jobs.len() as u32;
        for (position, job) in (1u32..).zip(jobs.iter()) {
            if job.index != position {
                return Err(JobListError::NonContiguous {
                    position,
                    found: job.index,
                });
            }
            match (job.grab_slot, position == last) {
                (None, false) => return Err(JobListError::MissingGrabSlot { job: job.index }),
                (Some(_), true) => return Err(JobListError::FinalJobGrabs { job: job.index }),
                _ => {}
            }
        }

        Ok(Self { jobs })
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn get(&self, index: u32) -> Option<&Job> {
        self.jobs.iter().find(|job| job.index == index)
    }

    pub fn rack_steps(&self) -> Vec<RackStep> {
        self.jobs.iter().map(Job::rack_step).collect()
    }
}

impl<'a> IntoIterator for &'a JobList {
    type Item = &'a Job;
    type IntoIter = std::slice::Iter<'a, Job>;

    fn into_iter(self) -> Self::IntoIter {
        self.jobs.iter()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
