// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn idle(progress: f64) -> DeviceStatus {
    DeviceStatus::new(DeviceState::Ready, progress)
}

fn active(progress: f64) -> DeviceStatus {
    DeviceStatus::new(DeviceState::Active, progress)
}

#[test]
fn idle_at_low_progress_is_flagged_once_after_threshold() {
    let mut tracker = StatusTracker::new(PollPolicy::default());

    let anomalies: Vec<Option<Anomaly>> = (0..10).map(|_| tracker.observe(&idle(0.0))).collect();

    let raised: Vec<usize> = anomalies
        .iter()
        .enumerate()
        .filter_map(|(i, a)| a.as_ref().map(|_| i))
        .collect();
    assert_eq!(raised, vec![6]);
    assert_eq!(
        anomalies[6],
        Some(Anomaly::IdleAtLowProgress {
            polls: 7,
            progress: 0.0
        })
    );
}

#[test]
fn unchanged_active_sample_is_flagged_as_stall() {
    let mut tracker = StatusTracker::new(PollPolicy::default());
    tracker.observe(&active(42.0));

    let mut raised = None;
    for _ in 0..11 {
        if let Some(anomaly) = tracker.observe(&active(42.0)) {
            raised = Some(anomaly);
        }
    }

    assert_eq!(
        raised,
        Some(Anomaly::Stalled {
            polls: 11,
            progress: 42.0
        })
    );
}

#[test]
fn progress_change_resets_stall_counter() {
    let mut tracker = StatusTracker::new(PollPolicy::default());
    for i in 0..30 {
        let progress = if i % 5 == 0 { i as f64 } else { (i - i % 5) as f64 };
        assert_eq!(tracker.observe(&active(progress)), None);
    }
}

#[test]
fn failures_count_until_next_success() {
    let mut tracker = StatusTracker::new(PollPolicy::default());
    assert_eq!(tracker.observe_failure(), 1);
    assert_eq!(tracker.observe_failure(), 2);

    tracker.observe(&active(5.0));

    assert_eq!(tracker.consecutive_failures(), 0);
    assert_eq!(tracker.observe_failure(), 1);
    assert_eq!(tracker.polls(), 1);
}

#[test]
fn next_interval_follows_latest_sample() {
    let mut tracker = StatusTracker::new(PollPolicy::default());
    assert_eq!(tracker.next_interval(), Duration::from_secs(30));

    tracker.observe(&active(20.0).with_remaining(Duration::from_secs(3600)));
    assert_eq!(tracker.next_interval(), Duration::from_secs(60));

    tracker.observe(&active(99.5));
    assert_eq!(tracker.next_interval(), Duration::from_secs(5));
}

#[test]
fn anomaly_messages_are_readable() {
    let stalled = Anomaly::Stalled {
        polls: 11,
        progress: 42.0,
    };
    assert_eq!(
        stalled.to_string(),
        "status unchanged at 42.0% for 11 polls; device may be stuck"
    );
}
