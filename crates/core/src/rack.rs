// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Rack occupancy model
//!
//! A pure simulation of the plate rack. [`validate_sequence`] proves that a
//! job sequence's store/grab assignments are physically realizable before any
//! hardware is touched. The caller's initial state is never mutated; every
//! simulation runs on a private copy.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

/// Token used for plates that are in the rack before the run starts
pub const PRELOADED_PLATE: &str = "empty_plate";

/// What a rack slot currently holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "plate")]
pub enum Occupant {
    Empty,
    Plate(String),
}

impl Occupant {
    pub fn is_empty(&self) -> bool {
        matches!(self, Occupant::Empty)
    }
}

impl fmt::Display for Occupant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Occupant::Empty => write!(f, "empty"),
            Occupant::Plate(token) => write!(f, "{}", token),
        }
    }
}

/// A slot index outside `1..=capacity`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("slot {slot} is out of range (must be 1-{capacity})")]
pub struct SlotOutOfRange {
    pub slot: u32,
    pub capacity: u32,
}

/// Occupancy of every slot in a rack of fixed capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackState {
    capacity: u32,
    slots: BTreeMap<u32, Occupant>,
}

impl RackState {
    /// A rack with every slot empty
    pub fn empty(capacity: u32) -> Self {
        let slots = (1..=capacity).map(|slot| (slot, Occupant::Empty)).collect();
        Self { capacity, slots }
    }

    /// A rack with the given slots holding pre-loaded plates
    pub fn with_occupied(
        capacity: u32,
        occupied: impl IntoIterator<Item = u32>,
    ) -> Result<Self, SlotOutOfRange> {
        let mut rack = Self::empty(capacity);
        for slot in occupied {
            rack.put(slot, Occupant::Plate(PRELOADED_PLATE.to_string()))?;
        }
        Ok(rack)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn contains(&self, slot: u32) -> bool {
        (1..=self.capacity).contains(&slot)
    }

    /// Occupant of a slot, or `None` when the slot is out of range
    pub fn get(&self, slot: u32) -> Option<&Occupant> {
        self.slots.get(&slot)
    }

    pub fn is_occupied(&self, slot: u32) -> bool {
        self.get(slot).is_some_and(|o| !o.is_empty())
    }

    pub fn slots(&self) -> impl Iterator<Item = (u32, &Occupant)> {
        self.slots.iter().map(|(slot, occupant)| (*slot, occupant))
    }

    pub fn occupied_slots(&self) -> Vec<u32> {
        self.slots()
            .filter(|(_, o)| !o.is_empty())
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Record a plate stored into `slot` during live execution
    pub fn store(&mut self, slot: u32, plate: impl Into<String>) -> Result<(), SlotOutOfRange> {
        self.put(slot, Occupant::Plate(plate.into()))
    }

    /// Record a plate taken out of `slot` during live execution
    pub fn grab(&mut self, slot: u32) -> Result<Occupant, SlotOutOfRange> {
        let previous = self.get(slot).cloned().unwrap_or(Occupant::Empty);
        self.put(slot, Occupant::Empty)?;
        Ok(previous)
    }

    pub fn utilization(&self) -> Utilization {
        let occupied = self.occupied_slots().len() as u32;
        let percent = if self.capacity == 0 {
            0.0
        } else {
            f64::from(occupied) / f64::from(self.capacity) * 100.0
        };
        Utilization {
            occupied,
            total: self.capacity,
            percent,
            available: self
                .slots()
                .filter(|(_, o)| o.is_empty())
                .map(|(slot, _)| slot)
                .collect(),
        }
    }

    fn put(&mut self, slot: u32, occupant: Occupant) -> Result<(), SlotOutOfRange> {
        if !self.contains(slot) {
            return Err(SlotOutOfRange {
                slot,
                capacity: self.capacity,
            });
        }
        self.slots.insert(slot, occupant);
        Ok(())
    }
}

impl fmt::Display for RackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .slots()
            .map(|(slot, occupant)| match occupant {
                Occupant::Empty => format!("Slot {}: Empty", slot),
                Occupant::Plate(token) => format!("Slot {}: {}", slot, token),
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Summary of how much of the rack is in use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utilization {
    pub occupied: u32,
    pub total: u32,
    pub percent: f64,
    pub available: Vec<u32>,
}

/// The rack effect of one job: an optional store and an optional grab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackStep {
    pub job: u32,
    pub store: Option<u32>,
    pub grab: Option<u32>,
    /// Token recorded in the slot the finished plate is stored to
    pub plate: String,
}

impl RackStep {
    pub fn new(job: u32) -> Self {
        Self {
            job,
            store: None,
            grab: None,
            plate: format!("job_{}", job),
        }
    }

    pub fn store(mut self, slot: u32) -> Self {
        self.store = Some(slot);
        self
    }

    pub fn grab(mut self, slot: u32) -> Self {
        self.grab = Some(slot);
        self
    }

    pub fn plate(mut self, plate: impl Into<String>) -> Self {
        self.plate = plate.into();
        self
    }
}

/// Which side of a step a slot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotRole {
    Store,
    Grab,
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRole::Store => write!(f, "store"),
            SlotRole::Grab => write!(f, "grab"),
        }
    }
}

/// First physically impossible step in a sequence
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RackConflict {
    #[error("Job {job}: Invalid {role} slot {slot} (must be 1-{capacity})")]
    SlotOutOfRange {
        job: u32,
        role: SlotRole,
        slot: u32,
        capacity: u32,
    },
    #[error("Job {job}: Cannot store to slot {slot} - already occupied by {occupant}")]
    SlotOccupied {
        job: u32,
        slot: u32,
        occupant: String,
    },
    #[error("Job {job}: Cannot grab from slot {slot} - slot is empty")]
    SlotEmpty { job: u32, slot: u32 },
}

impl RackConflict {
    pub fn job(&self) -> u32 {
        match self {
            RackConflict::SlotOutOfRange { job, .. }
            | RackConflict::SlotOccupied { job, .. }
            | RackConflict::SlotEmpty { job, .. } => *job,
        }
    }

    pub fn slot(&self) -> u32 {
        match self {
            RackConflict::SlotOutOfRange { slot, .. }
            | RackConflict::SlotOccupied { slot, .. }
            | RackConflict::SlotEmpty { slot, .. } => *slot,
        }
    }
}

/// One simulated rack movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RackEvent {
    pub job: u32,
    pub role: SlotRole,
    pub slot: u32,
}

impl fmt::Display for RackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            SlotRole::Grab => write!(f, "Job {}: grab plate from slot {}", self.job, self.slot),
            SlotRole::Store => write!(f, "Job {}: store plate to slot {}", self.job, self.slot),
        }
    }
}

/// Outcome of a simulation together with every movement applied before it ended
#[derive(Debug, Clone)]
pub struct Simulation {
    pub outcome: Result<RackState, RackConflict>,
    pub log: Vec<RackEvent>,
}

/// Validate a job sequence against an initial rack state
///
/// Steps are processed in ascending job order. For each step, both slots are
/// checked against the occupancy before the step: the store slot must be in
/// range and empty, the grab slot in range and occupied. The grab is then
/// applied, followed by the store. On success the final occupancy is
/// returned.
pub fn validate_sequence(
    steps: &[RackStep],
    initial: &RackState,
) -> Result<RackState, RackConflict> {
    simulate(steps, initial).outcome
}

/// Like [`validate_sequence`], also returning the movement log
pub fn simulate(steps: &[RackStep], initial: &RackState) -> Simulation {
    let mut ordered: Vec<&RackStep> = steps.iter().collect();
    ordered.sort_by_key(|step| step.job);

    let mut rack = initial.clone();
    let mut log = Vec::new();

    for step in ordered {
        if let Err(conflict) = check_step(step, &rack) {
            return Simulation {
                outcome: Err(conflict),
                log,
            };
        }
        // check_step proved both slots are in range
        if let Some(slot) = step.grab {
            let _ = rack.put(slot, Occupant::Empty);
            log.push(RackEvent {
                job: step.job,
                role: SlotRole::Grab,
                slot,
            });
        }
        if let Some(slot) = step.store {
            let _ = rack.put(slot, Occupant::Plate(step.plate.clone()));
            log.push(RackEvent {
                job: step.job,
                role: SlotRole::Store,
                slot,
            });
        }
    }

    Simulation {
        outcome: Ok(rack),
        log,
    }
}

fn check_step(step: &RackStep, rack: &RackState) -> Result<(), RackConflict> {
    if let Some(slot) = step.store {
        match rack.get(slot) {
            None => {
                return Err(RackConflict::SlotOutOfRange {
                    job: step.job,
                    role: SlotRole::Store,
                    slot,
                    capacity: rack.capacity(),
                })
            }
            Some(Occupant::Plate(token)) => {
                return Err(RackConflict::SlotOccupied {
                    job: step.job,
                    slot,
                    occupant: token.clone(),
                })
            }
            Some(Occupant::Empty) => {}
        }
    }
    if let Some(slot) = step.grab {
        match rack.get(slot) {
            None => {
                return Err(RackConflict::SlotOutOfRange {
                    job: step.job,
                    role: SlotRole::Grab,
                    slot,
                    capacity: rack.capacity(),
                })
            }
            Some(Occupant::Empty) => {
                return Err(RackConflict::SlotEmpty {
                    job: step.job,
                    slot,
                })
            }
            Some(Occupant::Plate(_)) => {}
        }
    }
    Ok(())
}

/// Advisory notes about a sequence's slot layout
///
/// Never affects validity.
pub fn suggest(steps: &[RackStep]) -> Vec<String> {
    let mut suggestions = Vec::new();

    let stores: BTreeSet<u32> = steps.iter().filter_map(|s| s.store).collect();
    let grabs: BTreeSet<u32> = steps.iter().filter_map(|s| s.grab).collect();
    let used: BTreeSet<u32> = stores.union(&grabs).copied().collect();

    if let (Some(min), Some(max)) = (used.first(), used.last()) {
        let count = used.len() as u32;
        if max - min + 1 > count {
            suggestions.push(format!(
                "Consider using consecutive slots ({}-{}) for better rack organization",
                min,
                min + count - 1
            ));
        }
    }

    let both: Vec<String> = stores.intersection(&grabs).map(u32::to_string).collect();
    if !both.is_empty() {
        suggestions.push(format!(
            "Slots {} are used for both storing and grabbing; check the order of jobs that share them",
            both.join(", ")
        ));
    }

    suggestions
}

#[cfg(test)]
#[path = "rack_tests.rs"]
mod tests;
