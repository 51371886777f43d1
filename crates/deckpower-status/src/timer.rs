//! Shutdown-timer state and runtime baselines.

use serde::{Deserialize, Serialize};

/// Runtime estimation baselines, advertised to the host via feature
/// reports and reused when scaling runtime-to-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Average runtime from full charge to empty, in seconds.
    pub avg_time_to_empty_s: u16,
    /// Average time from empty to full charge, in seconds.
    pub avg_time_to_full_s: u16,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            avg_time_to_empty_s: 7200,
            avg_time_to_full_s: 4 * 3600,
        }
    }
}

/// Host-controlled shutdown countdowns plus the runtime floor.
///
/// The delay values mirror the writable Power Device feature reports:
/// -1 means inactive, a positive value arms the countdown. The remaining
/// state machine (actually powering anything off) belongs to the host;
/// this type only feeds the status bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownTimer {
    /// Seconds until requested shutdown; -1 when inactive.
    pub delay_before_shutdown_s: i16,
    /// Seconds until requested reboot; -1 when inactive.
    pub delay_before_reboot_s: i16,
    /// Runtime floor below which the runtime-limit-expired flag is
    /// raised, in seconds.
    pub remain_time_limit_s: u16,
}

impl Default for ShutdownTimer {
    fn default() -> Self {
        Self {
            delay_before_shutdown_s: -1,
            delay_before_reboot_s: -1,
            remain_time_limit_s: 600,
        }
    }
}

impl ShutdownTimer {
    /// Whether the shutdown countdown is armed.
    pub fn shutdown_requested(&self) -> bool {
        self.delay_before_shutdown_s > 0
    }

    /// Arm the shutdown countdown.
    pub fn request_shutdown(&mut self, delay_s: i16) {
        self.delay_before_shutdown_s = delay_s;
    }

    /// Disarm the shutdown countdown.
    pub fn cancel_shutdown(&mut self) {
        self.delay_before_shutdown_s = -1;
    }
}
