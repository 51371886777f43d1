//! LED pattern computation.

use deckpower_estimator::BatteryStatus;
use serde::{Deserialize, Serialize};

/// One RGB frame, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedOutput {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl LedOutput {
    pub const OFF: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
    };

    const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Scale all channels by `level` / 255.
    fn scaled(self, level: u8) -> Self {
        let scale = |c: u8| ((u16::from(c) * u16::from(level)) / 255) as u8;
        Self {
            red: scale(self.red),
            green: scale(self.green),
            blue: scale(self.blue),
        }
    }

    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}

/// Thresholds and periods for the indicator patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Full blink period when disconnected (half on, half off).
    pub blink_period_ms: u64,
    /// Triangular fade period while charging.
    pub fade_period_ms: u64,
    /// Duty cycle period while discharging.
    pub duty_period_ms: u64,
    /// Capacity at or below this shows red.
    pub low_capacity_pct: u8,
    /// Capacity at or above this shows green; between the two, yellow.
    pub high_capacity_pct: u8,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            blink_period_ms: 1_000,
            fade_period_ms: 5_000,
            duty_period_ms: 5_000,
            low_capacity_pct: 25,
            high_capacity_pct: 75,
        }
    }
}

/// Maps battery state and the clock to an LED frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorController {
    config: IndicatorConfig,
}

impl IndicatorController {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// The LED frame for `now_ms`.
    pub fn tick(&self, now_ms: u64, status: &BatteryStatus) -> LedOutput {
        if !status.is_connected {
            return self.blink(now_ms);
        }
        let color = self.capacity_color(status.capacity_pct);
        if status.is_charging {
            color.scaled(self.fade_level(now_ms))
        } else if status.is_discharging {
            if self.duty_on(now_ms, status.capacity_pct) {
                color
            } else {
                LedOutput::OFF
            }
        } else {
            // Idle on AC: steady.
            color
        }
    }

    fn capacity_color(&self, capacity_pct: u8) -> LedOutput {
        if capacity_pct <= self.config.low_capacity_pct {
            LedOutput::rgb(255, 0, 0)
        } else if capacity_pct >= self.config.high_capacity_pct {
            LedOutput::rgb(0, 255, 0)
        } else {
            LedOutput::rgb(255, 255, 0)
        }
    }

    fn blink(&self, now_ms: u64) -> LedOutput {
        let half = (self.config.blink_period_ms / 2).max(1);
        if (now_ms / half) % 2 == 0 {
            LedOutput::rgb(255, 0, 0)
        } else {
            LedOutput::OFF
        }
    }

    /// Triangular brightness: 0 at the cycle edges, 255 at the middle.
    fn fade_level(&self, now_ms: u64) -> u8 {
        let period = self.config.fade_period_ms.max(2);
        let phase = now_ms % period;
        let half = period / 2;
        let level = if phase < half {
            phase * 255 / half
        } else {
            (period - phase) * 255 / (period - half)
        };
        level.min(255) as u8
    }

    /// On for the first `capacity` percent of the duty period.
    fn duty_on(&self, now_ms: u64, capacity_pct: u8) -> bool {
        let period = self.config.duty_period_ms.max(1);
        let on_ms = period * u64::from(capacity_pct.min(100)) / 100;
        (now_ms % period) < on_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(capacity: u8, charging: bool, discharging: bool) -> BatteryStatus {
        BatteryStatus {
            voltage_mv: 11_000,
            current_ma: if charging { 800 } else { -600 },
            capacity_pct: capacity,
            temperature_c: 30,
            is_charging: charging,
            is_ac_present: charging,
            is_discharging: discharging,
            is_connected: true,
            last_update_ms: 0,
        }
    }

    #[test]
    fn test_disconnected_blinks_red_at_500ms() {
        let controller = IndicatorController::default();
        let gone = BatteryStatus::disconnected();
        assert_eq!(controller.tick(0, &gone), LedOutput::rgb(255, 0, 0));
        assert_eq!(controller.tick(499, &gone), LedOutput::rgb(255, 0, 0));
        assert_eq!(controller.tick(500, &gone), LedOutput::OFF);
        assert_eq!(controller.tick(999, &gone), LedOutput::OFF);
        assert_eq!(controller.tick(1_000, &gone), LedOutput::rgb(255, 0, 0));
    }

    #[test]
    fn test_capacity_color_bands() {
        let controller = IndicatorController::default();
        // Idle on AC renders the band color steadily.
        let mut s = status(20, false, false);
        s.is_ac_present = true;
        assert_eq!(controller.tick(0, &s), LedOutput::rgb(255, 0, 0));
        s.capacity_pct = 25;
        assert_eq!(controller.tick(0, &s), LedOutput::rgb(255, 0, 0));
        s.capacity_pct = 26;
        assert_eq!(controller.tick(0, &s), LedOutput::rgb(255, 255, 0));
        s.capacity_pct = 74;
        assert_eq!(controller.tick(0, &s), LedOutput::rgb(255, 255, 0));
        s.capacity_pct = 75;
        assert_eq!(controller.tick(0, &s), LedOutput::rgb(0, 255, 0));
    }

    #[test]
    fn test_charging_fade_is_triangular() {
        let controller = IndicatorController::default();
        let s = status(80, true, false);
        assert_eq!(controller.tick(0, &s), LedOutput::OFF);
        // Mid-cycle is full brightness.
        assert_eq!(controller.tick(2_500, &s), LedOutput::rgb(0, 255, 0));
        // Symmetric shoulders.
        assert_eq!(controller.tick(1_250, &s), controller.tick(3_750, &s));
        // Next cycle starts dark again.
        assert_eq!(controller.tick(5_000, &s), LedOutput::OFF);
    }

    #[test]
    fn test_discharging_duty_tracks_capacity() {
        let controller = IndicatorController::default();
        let s = status(40, false, true);
        // 40% of 5 s: on until 2 s, off after.
        assert_eq!(controller.tick(0, &s), LedOutput::rgb(255, 255, 0));
        assert_eq!(controller.tick(1_999, &s), LedOutput::rgb(255, 255, 0));
        assert_eq!(controller.tick(2_000, &s), LedOutput::OFF);
        assert_eq!(controller.tick(4_999, &s), LedOutput::OFF);
        assert_eq!(controller.tick(5_000, &s), LedOutput::rgb(255, 255, 0));
    }

    #[test]
    fn test_full_capacity_never_goes_dark_while_discharging() {
        let controller = IndicatorController::default();
        let s = status(100, false, true);
        for now in (0..10_000).step_by(250) {
            assert_eq!(controller.tick(now, &s), LedOutput::rgb(0, 255, 0));
        }
    }

    #[test]
    fn test_empty_capacity_stays_dark_while_discharging() {
        let controller = IndicatorController::default();
        let s = status(0, false, true);
        for now in (0..10_000).step_by(250) {
            assert!(controller.tick(now, &s).is_off());
        }
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: IndicatorConfig = serde_json::from_str("{}").expect("empty config");
        assert_eq!(config, IndicatorConfig::default());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Charging brightness never exceeds the band color and the
            /// pattern is periodic.
            #[test]
            fn prop_fade_periodic_and_bounded(now in any::<u64>()) {
                let controller = IndicatorController::default();
                let s = status(50, true, false);
                let frame = controller.tick(now % 1_000_000, &s);
                prop_assert!(frame.red <= 255 && frame.blue == 0);
                prop_assert_eq!(
                    controller.tick(now % 5_000, &s),
                    controller.tick(now % 5_000 + 5_000, &s)
                );
            }

            /// The discharge duty cycle on-fraction tracks capacity to
            /// within one frame of the 5 s period.
            #[test]
            fn prop_duty_fraction_matches_capacity(capacity in 0u8..=100) {
                let controller = IndicatorController::default();
                let s = status(capacity, false, true);
                let lit = (0..5_000u64)
                    .step_by(50)
                    .filter(|&now| !controller.tick(now, &s).is_off())
                    .count() as u64;
                let expected = u64::from(capacity); // 100 frames per cycle
                prop_assert!(lit.abs_diff(expected) <= 1, "lit {lit} vs {expected}");
            }
        }
    }
}
