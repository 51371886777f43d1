//! Cadence scenarios for the report scheduler.

use deckpower_reporting::{
    PowerSummary, ReportDecision, ReportLayout, ReportingScheduler, SchedulerConfig, encode,
};
use deckpower_status::PresentStatus;

fn summary(capacity: u8) -> PowerSummary {
    PowerSummary {
        capacity_pct: capacity,
        runtime_to_empty_s: u16::from(capacity) * 72,
        status: PresentStatus::from_bits(
            PresentStatus::DISCHARGING | PresentStatus::BATTERY_PRESENT,
        ),
    }
}

/// Consecutive register-read failures stretch the periodic cadence from
/// 30 s to 45 s and then 60 s; the next successful read restores 30 s.
#[test]
fn test_read_failures_lengthen_cadence_then_success_restores_it() {
    let mut scheduler = ReportingScheduler::new(SchedulerConfig::default());
    scheduler.note_configured(0);
    let s = summary(60);

    assert_eq!(scheduler.poll(1_000, &s), ReportDecision::Send);
    scheduler.mark_sent(1_000, &s);
    assert_eq!(scheduler.current_interval_ms(), 30_000);

    scheduler.record_read_failure();
    assert_eq!(scheduler.current_interval_ms(), 45_000);
    // The 30 s mark passes without a send now.
    assert_eq!(scheduler.poll(31_000, &s), ReportDecision::Hold);

    scheduler.record_read_failure();
    assert_eq!(scheduler.current_interval_ms(), 45_000);
    scheduler.record_read_failure();
    assert_eq!(scheduler.current_interval_ms(), 60_000);

    // 45 s elapsed is no longer enough either.
    assert_eq!(scheduler.poll(46_000, &s), ReportDecision::Hold);
    assert_eq!(scheduler.poll(61_000, &s), ReportDecision::Send);
    scheduler.mark_sent(61_000, &s);

    // Fourth read succeeds: base cadence again.
    scheduler.record_read_success();
    assert_eq!(scheduler.consecutive_read_failures(), 0);
    assert_eq!(scheduler.current_interval_ms(), 30_000);
    assert_eq!(scheduler.poll(91_000, &s), ReportDecision::Send);
}

/// While reads are failing the summary is stale, so byte changes do not
/// trigger early sends; only the degraded periodic cadence applies.
#[test]
fn test_change_detection_suspended_during_read_failures() {
    let mut scheduler = ReportingScheduler::new(SchedulerConfig::default());
    scheduler.note_configured(0);
    scheduler.mark_sent(1_000, &summary(60));
    scheduler.record_read_failure();

    let changed = summary(59);
    assert_eq!(scheduler.poll(10_000, &changed), ReportDecision::Hold);
    assert_eq!(scheduler.poll(46_000, &changed), ReportDecision::Send);
}

/// A failed interrupt write is not retried immediately; the next attempt
/// waits out the spacing guard.
#[test]
fn test_send_failure_retries_at_next_scheduled_report() {
    let mut scheduler = ReportingScheduler::new(SchedulerConfig::default());
    scheduler.note_configured(0);
    let s = summary(60);

    assert_eq!(scheduler.poll(1_000, &s), ReportDecision::Send);
    scheduler.mark_transport_failure(1_000);
    assert_eq!(scheduler.poll(1_001, &s), ReportDecision::Hold);
    assert_eq!(scheduler.poll(5_999, &s), ReportDecision::Hold);
    // Never-sent trigger still pending, so the retry fires right after.
    assert_eq!(scheduler.poll(6_000, &s), ReportDecision::Send);
}

/// Re-enumeration forgets the send history and goes through the
/// quiescent window again.
#[test]
fn test_reenumeration_restarts_reporting() {
    let mut scheduler = ReportingScheduler::new(SchedulerConfig::default());
    scheduler.note_configured(0);
    scheduler.mark_sent(1_000, &summary(60));

    scheduler.note_configured(80_000);
    assert_eq!(scheduler.poll(80_200, &summary(60)), ReportDecision::Hold);
    assert_eq!(scheduler.poll(80_500, &summary(60)), ReportDecision::Send);
}

/// A burst of small capacity changes is paced to one send per 5 s.
#[test]
fn test_min_spacing_paces_change_bursts() {
    let mut scheduler = ReportingScheduler::new(SchedulerConfig::default());
    scheduler.note_configured(0);

    let mut sent_at = Vec::new();
    let mut capacity = 90u8;
    for tick in 0..30 {
        let now = 1_000 + tick * 1_000;
        capacity = capacity.saturating_sub(1); // changes every tick
        let s = summary(capacity);
        if scheduler.poll(now, &s) == ReportDecision::Send {
            scheduler.mark_sent(now, &s);
            sent_at.push(now);
        }
    }
    assert!(sent_at.len() >= 2);
    for pair in sent_at.windows(2) {
        assert!(pair[1] - pair[0] >= 5_000, "sends too close: {pair:?}");
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Whatever mix of events occurs, two send attempts are never
        /// closer than the minimum spacing.
        #[test]
        fn prop_min_spacing_always_holds(
            events in proptest::collection::vec((0u64..120_000, 0u8..=100, 0u8..4), 1..200)
        ) {
            let mut scheduler = ReportingScheduler::new(SchedulerConfig::default());
            scheduler.note_configured(0);
            let mut timeline: Vec<(u64, u8, u8)> = events;
            timeline.sort_by_key(|e| e.0);

            let mut last_attempt: Option<u64> = None;
            for (now, capacity, kind) in timeline {
                let s = summary(capacity);
                if scheduler.poll(now, &s) == ReportDecision::Send {
                    if let Some(prev) = last_attempt {
                        prop_assert!(now - prev >= 5_000, "attempts at {prev} and {now}");
                    }
                    last_attempt = Some(now);
                    if kind == 0 {
                        scheduler.mark_transport_failure(now);
                    } else {
                        scheduler.mark_sent(now, &s);
                    }
                }
                match kind {
                    2 => scheduler.record_read_failure(),
                    3 => scheduler.record_read_success(),
                    _ => {}
                }
            }
        }

        /// The encoded combined frame always matches the fingerprint the
        /// scheduler keys change detection on.
        #[test]
        fn prop_combined_frame_equals_fingerprint(capacity in 0u8..=100, runtime in any::<u16>(), bits in any::<u16>()) {
            let s = PowerSummary {
                capacity_pct: capacity,
                runtime_to_empty_s: runtime,
                status: PresentStatus::from_bits(bits),
            };
            let frames = encode(&s, ReportLayout::Combined);
            prop_assert_eq!(frames.len(), 1);
            prop_assert_eq!(frames[0].payload.clone(), s.fingerprint().to_vec());
        }
    }
}
