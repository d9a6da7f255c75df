// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::rack::{validate_sequence, RackState};
use yare::parameterized;

fn three_jobs() -> Vec<Job> {
    vec![
        Job::new(1, "a.gcode", 1, Some(4)),
        Job::new(2, "b.gcode", 2, Some(5)),
        Job::new(3, "c.gcode", 3, None),
    ]
}

#[test]
fn accepts_well_formed_list() {
    let list = JobList::new(three_jobs()).unwrap();
    assert_eq!(list.len(), 3);
    assert!(list.get(3).unwrap().is_last());
    assert!(!list.get(1).unwrap().is_last());
}

#[test]
fn sorts_jobs_by_index() {
    let mut jobs = three_jobs();
    jobs.reverse();

    let list = JobList::new(jobs).unwrap();

    let order: Vec<u32> = list.iter().map(|j| j.index).collect();
    assert_eq!(order, vec![1, 2, 3]);
}

#[parameterized(
    gap = { vec![Job::new(1, "a", 1, Some(2)), Job::new(3, "b", 2, None)], JobListError::NonContiguous { position: 2, found: 3 } },
    zero_based = { vec![Job::new(0, "a", 1, None)], JobListError::NonContiguous { position: 1, found: 0 } },
    early_final = { vec![Job::new(1, "a", 1, None), Job::new(2, "b", 2, None)], JobListError::MissingGrabSlot { job: 1 } },
    last_grabs = { vec![Job::new(1, "a", 1, Some(2))], JobListError::FinalJobGrabs { job: 1 } },
    empty = { vec![], JobListError::Empty },
)]
fn rejects_malformed_lists(jobs: Vec<Job>, expected: JobListError) {
    assert_eq!(JobList::new(jobs).unwrap_err(), expected);
}

#[test]
fn rack_steps_carry_plate_tokens() {
    let job = Job::new(2, "benchy.gcode", 3, Some(1));

    let step = job.rack_step();

    assert_eq!(step.job, 2);
    assert_eq!(step.store, Some(3));
    assert_eq!(step.grab, Some(1));
    assert_eq!(step.plate, "job_2_benchy.gcode");
}

#[test]
fn job_list_validates_against_preloaded_rack() {
    let list = JobList::new(three_jobs()).unwrap();
    let rack = RackState::with_occupied(6, [4, 5]).unwrap();

    let final_state = validate_sequence(&list.rack_steps(), &rack).unwrap();

    assert_eq!(final_state.occupied_slots(), vec![1, 2, 3]);
}

#[test]
fn flags_are_opaque_values() {
    let job = Job::new(1, "a", 1, None).with_flag("use_ams", serde_json::json!(true));
    assert_eq!(job.flags.get("use_ams"), Some(&serde_json::json!(true)));
}
