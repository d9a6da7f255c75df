// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job orchestrator: print, eject, store, swap, repeat

use crate::ejection::{self, StepKind};
use crate::error::RunError;
use pj_adapters::{CleanupHook, DeviceSession, EjectorClient, EjectorTransport};
use pj_core::{
    validate_sequence, Clock, ConfigError, DeviceMacros, IdGen, Interrupt, Job, JobList,
    RackState, RunConfig, RunEvent, SharedReporter,
};
use std::time::Duration;
use tracing::Instrument;

/// Adapter dependencies for a run
pub struct RunDeps<D, T, C> {
    pub device: D,
    pub ejector: EjectorClient<T, C>,
    pub clock: C,
    pub reporter: SharedReporter,
}

/// What a run executes
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub jobs: JobList,
    /// Rack occupancy before the first job
    pub rack: RackState,
    pub macros: DeviceMacros,
    /// Pause between a finished job and the next start
    pub inter_job_delay: Duration,
}

impl RunPlan {
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            jobs: config.job_list()?,
            rack: config.initial_rack()?,
            macros: config.device_macros(),
            inter_job_delay: config.run.inter_job_delay,
        })
    }
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub run_id: String,
    pub completed: u32,
    pub total_jobs: u32,
    /// Set only when the operator interrupted the run
    pub interrupted: bool,
    /// Why the run ended early; `None` when every job ran or on interrupt
    pub stop: Option<RunError>,
    /// Rack occupancy as tracked during execution
    pub rack: RackState,
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        self.stop.is_none() && !self.interrupted
    }
}

/// Runs the job list against one printer and one ejector
pub struct JobOrchestrator<D, T, C: Clock, I: IdGen> {
    device: D,
    ejector: EjectorClient<T, C>,
    clock: C,
    reporter: SharedReporter,
    id_gen: I,
    plan: RunPlan,
}

impl<D, T, C, I> JobOrchestrator<D, T, C, I>
where
    D: DeviceSession,
    T: EjectorTransport,
    C: Clock,
    I: IdGen,
{
    pub fn new(deps: RunDeps<D, T, C>, plan: RunPlan, id_gen: I) -> Self {
        Self {
            device: deps.device,
            ejector: deps.ejector,
            clock: deps.clock,
            reporter: deps.reporter,
            id_gen,
            plan,
        }
    }

    pub fn plan(&self) -> &RunPlan {
        &self.plan
    }

    /// Execute every job in order
    ///
    /// The rack sequence is validated before any device or ejector call.
    /// The device is disconnected exactly once however the run ends.
    pub async fn run(mut self, interrupt: &Interrupt) -> RunResult {
        let run_id = self.id_gen.next();
        let span = tracing::info_span!("run", %run_id);
        async move {
            let total_jobs = self.plan.jobs.len() as u32;
            let mut rack = self.plan.rack.clone();
            let mut completed = 0;

            let outcome = match validate_sequence(&self.plan.jobs.rack_steps(), &self.plan.rack) {
                Ok(_) => {
                    self.reporter.report(RunEvent::RunStarted {
                        run_id: run_id.clone(),
                        total_jobs,
                    });
                    self.execute(interrupt, &mut rack, &mut completed).await
                }
                Err(conflict) => {
                    tracing::error!(%conflict, "rack sequence rejected");
                    Err(RunError::SequenceConflict(conflict))
                }
            };

            self.device.disconnect().await;

            let (interrupted, stop) = match outcome {
                Ok(()) => (false, None),
                Err(e) if e.is_interrupt() => (true, None),
                Err(e) => (false, Some(e)),
            };
            match &stop {
                None => self.reporter.report(RunEvent::RunFinished {
                    completed,
                    total_jobs,
                    interrupted,
                }),
                Some(e) => self.reporter.report(RunEvent::RunStopped {
                    completed,
                    total_jobs,
                    reason: e.to_string(),
                }),
            }

            RunResult {
                run_id,
                completed,
                total_jobs,
                interrupted,
                stop,
                rack,
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &mut self,
        interrupt: &Interrupt,
        rack: &mut RackState,
        completed: &mut u32,
    ) -> Result<(), RunError> {
        interrupt.check().map_err(|_| RunError::Interrupted)?;
        self.device
            .connect()
            .await
            .map_err(|e| RunError::from_device(0, e))?;
        self.ejector
            .test_connection()
            .await
            .map_err(|e| RunError::from_ejector(None, e))?;
        if let Err(e) = self.ejector.home(interrupt).await {
            return Err(self.ejector_failure(None, e, interrupt).await);
        }

        let jobs: Vec<Job> = self.plan.jobs.iter().cloned().collect();
        let total = jobs.len();
        for (position, job) in jobs.iter().enumerate() {
            interrupt.check().map_err(|_| RunError::Interrupted)?;
            self.run_job(job, interrupt, rack).await?;

            *completed += 1;
            self.reporter.report(RunEvent::JobCompleted {
                job: job.index,
                completed: *completed,
            });
            tracing::info!(rack = %rack, "rack state");

            let delay = self.plan.inter_job_delay;
            if position + 1 < total && !delay.is_zero() {
                tracing::info!(delay_s = delay.as_secs(), "waiting before next job");
                interrupt
                    .sleep(&self.clock, delay)
                    .await
                    .map_err(|_| RunError::Interrupted)?;
            }
        }
        Ok(())
    }

    async fn run_job(
        &mut self,
        job: &Job,
        interrupt: &Interrupt,
        rack: &mut RackState,
    ) -> Result<(), RunError> {
        self.reporter.report(RunEvent::JobStarted {
            job: job.index,
            file: job.file.clone(),
        });
        self.device
            .start_job(&job.file, &job.flags)
            .await
            .map_err(|e| RunError::from_device(job.index, e))?;

        match self.device.await_completion(interrupt).await {
            Ok(()) => self.reporter.report(RunEvent::PrintFinished { job: job.index }),
            Err(e) => {
                if let pj_adapters::DeviceError::Fault(reason) = &e {
                    self.reporter.report(RunEvent::PrintFailed {
                        job: job.index,
                        reason: reason.clone(),
                    });
                }
                return Err(RunError::from_device(job.index, e));
            }
        }

        if self.device.needs_bed_reposition() {
            self.device
                .reposition_bed()
                .await
                .map_err(|e| RunError::from_device(job.index, e))?;
            self.reporter
                .report(RunEvent::BedRepositioned { job: job.index });
        }

        self.eject(job, interrupt, rack).await?;

        let cleanup = match self.device.cleanup_hook() {
            CleanupHook::AfterEveryJob => true,
            CleanupHook::BeforeNextJob => !job.is_last(),
            CleanupHook::None => false,
        };
        if cleanup {
            self.device
                .run_cleanup()
                .await
                .map_err(|e| RunError::from_device(job.index, e))?;
            self.reporter
                .report(RunEvent::CleanupFinished { job: job.index });
        }
        Ok(())
    }

    async fn eject(
        &self,
        job: &Job,
        interrupt: &Interrupt,
        rack: &mut RackState,
    ) -> Result<(), RunError> {
        for step in ejection::plan(job, &self.plan.macros) {
            if let Err(e) = self.ejector.execute_macro(&step.invocation, interrupt).await {
                return Err(self.ejector_failure(Some(job.index), e, interrupt).await);
            }
            match step.kind {
                StepKind::Store(slot) => {
                    rack.store(slot, job.plate_token())
                        .map_err(|e| RunError::Protocol(e.to_string()))?;
                    self.reporter.report(RunEvent::PlateStored {
                        job: job.index,
                        slot,
                    });
                }
                StepKind::Grab(slot) => {
                    rack.grab(slot)
                        .map_err(|e| RunError::Protocol(e.to_string()))?;
                    self.reporter.report(RunEvent::PlateGrabbed {
                        job: job.index,
                        slot,
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// An interrupt while the arm is moving halts it before the run stops
    async fn ejector_failure(
        &self,
        job: Option<u32>,
        err: pj_adapters::EjectorError,
        interrupt: &Interrupt,
    ) -> RunError {
        let err = RunError::from_ejector(job, err);
        if err.is_interrupt() || interrupt.is_triggered() {
            let acknowledged = self.ejector.emergency_stop().await;
            self.reporter
                .report(RunEvent::EmergencyStop { acknowledged });
            return RunError::Interrupted;
        }
        err
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
