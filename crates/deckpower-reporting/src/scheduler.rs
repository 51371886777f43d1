//! Rate-limited report scheduling.
//!
//! The scheduler answers one question every service tick: should the
//! current summary go out on the interrupt endpoint now? It sends when
//! nothing was ever sent, when the summary changed, or when the periodic
//! interval elapsed; it holds during the post-enumeration quiescent
//! window and inside the minimum-spacing guard. Consecutive register
//! read failures lengthen the periodic interval (30 s base, 45 s after
//! one or two failures, 60 s from the third) so a host facing a
//! misbehaving pack is not spammed with stale summaries. A failed send
//! is terminal for that attempt; the retry is simply the next scheduled
//! report. The scheduler never sleeps; all timing comes from the
//! caller-supplied millisecond clock.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::wire::PowerSummary;

/// Timing knobs for [`ReportingScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Periodic resend interval when everything is healthy.
    pub base_interval_ms: u64,
    /// Minimum spacing between any two send attempts.
    pub min_spacing_ms: u64,
    /// Silence after enumeration before the first report.
    pub quiescent_ms: u64,
    /// Periodic interval after one or two consecutive read failures.
    pub degraded_interval_ms: u64,
    /// Periodic interval from the third consecutive read failure on.
    pub max_degraded_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_interval_ms: 30_000,
            min_spacing_ms: 5_000,
            quiescent_ms: 500,
            degraded_interval_ms: 45_000,
            max_degraded_interval_ms: 60_000,
        }
    }
}

/// What to do with the current summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportDecision {
    Send,
    Hold,
}

/// Decides when power summaries go out.
#[derive(Debug, Clone, Default)]
pub struct ReportingScheduler {
    config: SchedulerConfig,
    configured_at_ms: Option<u64>,
    last_sent_ms: Option<u64>,
    last_attempt_ms: Option<u64>,
    last_fingerprint: Option<[u8; 5]>,
    consecutive_read_failures: u32,
}

impl ReportingScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The device reached the Configured state; reporting restarts from
    /// scratch after the quiescent window.
    pub fn note_configured(&mut self, now_ms: u64) {
        debug!(now_ms, quiescent_ms = self.config.quiescent_ms, "reporting armed");
        self.configured_at_ms = Some(now_ms);
        self.last_sent_ms = None;
        self.last_attempt_ms = None;
        self.last_fingerprint = None;
    }

    /// Bus reset or detach; nothing goes out until the next
    /// [`ReportingScheduler::note_configured`].
    pub fn reset(&mut self) {
        self.configured_at_ms = None;
        self.last_sent_ms = None;
        self.last_attempt_ms = None;
        self.last_fingerprint = None;
        self.consecutive_read_failures = 0;
    }

    /// The periodic resend interval currently in force.
    pub fn current_interval_ms(&self) -> u64 {
        match self.consecutive_read_failures {
            0 => self.config.base_interval_ms,
            1 | 2 => self.config.degraded_interval_ms,
            _ => self.config.max_degraded_interval_ms,
        }
    }

    pub fn consecutive_read_failures(&self) -> u32 {
        self.consecutive_read_failures
    }

    /// Decide whether `summary` should be sent at `now_ms`.
    pub fn poll(&self, now_ms: u64, summary: &PowerSummary) -> ReportDecision {
        let Some(configured_at) = self.configured_at_ms else {
            return ReportDecision::Hold;
        };
        if now_ms < configured_at.saturating_add(self.config.quiescent_ms) {
            return ReportDecision::Hold;
        }
        if let Some(attempt) = self.last_attempt_ms
            && now_ms.saturating_sub(attempt) < self.config.min_spacing_ms
        {
            return ReportDecision::Hold;
        }
        let Some(last_fp) = self.last_fingerprint else {
            return ReportDecision::Send;
        };
        // While reads are failing the summary is stale; only the
        // (lengthened) periodic cadence applies, not change detection.
        if self.consecutive_read_failures == 0 && last_fp != summary.fingerprint() {
            return ReportDecision::Send;
        }
        match self.last_sent_ms {
            Some(sent) if now_ms.saturating_sub(sent) >= self.current_interval_ms() => {
                ReportDecision::Send
            }
            None => ReportDecision::Send,
            _ => ReportDecision::Hold,
        }
    }

    /// Record a successful send.
    pub fn mark_sent(&mut self, now_ms: u64, summary: &PowerSummary) {
        self.last_sent_ms = Some(now_ms);
        self.last_attempt_ms = Some(now_ms);
        self.last_fingerprint = Some(summary.fingerprint());
    }

    /// Record a failed send attempt. The attempt still counts toward the
    /// spacing guard; the retry is the next scheduled report.
    pub fn mark_transport_failure(&mut self, now_ms: u64) {
        self.last_attempt_ms = Some(now_ms);
        warn!(now_ms, "interrupt report failed; retrying at the next scheduled report");
    }

    /// A register read failed; lengthen the reporting cadence.
    pub fn record_read_failure(&mut self) {
        self.consecutive_read_failures = self.consecutive_read_failures.saturating_add(1);
        warn!(
            failures = self.consecutive_read_failures,
            interval_ms = self.current_interval_ms(),
            "register read failed, reporting cadence lengthened"
        );
    }

    /// A register read succeeded; restore the base cadence.
    pub fn record_read_success(&mut self) {
        if self.consecutive_read_failures > 0 {
            debug!(
                failures = self.consecutive_read_failures,
                "register transport recovered, base cadence restored"
            );
        }
        self.consecutive_read_failures = 0;
    }
}
