//! The state estimator: register snapshot in, battery status out.

use deckpower_errors::{PowerError, PowerResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::average::{DEFAULT_WINDOW, MovingAverage};
use crate::ocv::curve_for_load;
use crate::registers::RegisterSnapshot;
use crate::status::BatteryStatus;

/// Tunable constants for the estimation pipeline.
///
/// Defaults describe the production pack: 3 Li-ion cells in series,
/// 300 mΩ assumed internal resistance per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Cells in series; pack voltage is divided by this before lookup.
    pub cells_in_series: u16,
    /// Assumed internal resistance per cell, in milliohms.
    pub internal_resistance_mohm: u32,
    /// Discharge current below which IR compensation is skipped (ADC
    /// noise floor), in mA.
    pub compensation_floor_ma: u16,
    /// Charge current below which the pack is considered fully charged
    /// rather than charging, in mA.
    pub charge_noise_floor_ma: u16,
    /// Maximum capacity rise allowed per update while discharging, in
    /// percentage points.
    pub hysteresis_step_pct: u8,
    /// Moving-average window, in samples.
    pub smoothing_window: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            cells_in_series: 3,
            internal_resistance_mohm: 300,
            compensation_floor_ma: 100,
            charge_noise_floor_ma: 64,
            hysteresis_step_pct: 3,
            smoothing_window: DEFAULT_WINDOW,
        }
    }
}

/// Converts register snapshots into [`BatteryStatus`] records.
///
/// Owns the OCV curves, the IR-compensation constant and the smoothing
/// filter state. One instance lives for the whole process; `update` is
/// called once per poll from the control loop.
#[derive(Debug)]
pub struct StateEstimator {
    config: EstimatorConfig,
    average: MovingAverage,
    status: BatteryStatus,
    previous_capacity: Option<u8>,
    battery_seen: bool,
}

impl StateEstimator {
    /// Create an estimator with the given configuration.
    pub fn new(config: EstimatorConfig) -> Self {
        Self {
            config,
            average: MovingAverage::new(config.smoothing_window),
            status: BatteryStatus::disconnected(),
            previous_capacity: None,
            battery_seen: false,
        }
    }

    /// Estimate the rest (open-circuit) voltage of one cell.
    ///
    /// Adds `I * R_internal` to the loaded reading when discharge current
    /// is above the noise floor. The symmetric charge-side subtraction is
    /// deliberately absent: the original calibration was taken without it
    /// and applying it double-counts the charger's own regulation.
    fn rest_voltage_mv(&self, pack_mv: u16, discharge_ma: u16) -> u16 {
        let cell_mv = pack_mv / self.config.cells_in_series;
        if discharge_ma > self.config.compensation_floor_ma {
            let sag = u32::from(discharge_ma) * self.config.internal_resistance_mohm / 1000;
            cell_mv.saturating_add(sag.min(u32::from(u16::MAX)) as u16)
        } else {
            cell_mv
        }
    }

    /// Decode a snapshot and produce a fresh status record.
    ///
    /// # Errors
    ///
    /// Returns [`PowerError::NoBattery`] when the voltage register holds
    /// the zero sentinel. The retained status keeps its previous readings
    /// but is marked disconnected.
    pub fn update(&mut self, snapshot: &RegisterSnapshot, now_ms: u64) -> PowerResult<BatteryStatus> {
        if snapshot.is_no_battery() {
            if self.status.is_connected {
                warn!("battery disappeared (sentinel voltage reading)");
            }
            self.status.is_connected = false;
            return Err(PowerError::NoBattery);
        }

        let pack_mv = snapshot.pack_voltage_mv();
        let charge_ma = snapshot.charge_current_ma();
        let discharge_ma = snapshot.discharge_current_ma();
        let ac_present = snapshot.ac_present();

        // At most one of the two currents is non-zero by construction of
        // the charger; both zero is the idle state, not an error.
        let (is_charging, is_discharging) = if ac_present {
            (charge_ma > self.config.charge_noise_floor_ma, false)
        } else {
            (false, discharge_ma > 0)
        };

        let v_rest = self.rest_voltage_mv(pack_mv, discharge_ma);
        let raw_soc = curve_for_load(discharge_ma).soc_for_voltage(v_rest);
        let mut capacity = self.average.push(u32::from(raw_soc)).min(100) as u8;

        // Discharge hysteresis: voltage recovers when load drops, which
        // would otherwise make the gauge tick upward while draining.
        if !ac_present {
            if let Some(prev) = self.previous_capacity {
                if capacity > prev {
                    let rise = capacity - prev;
                    if rise <= self.config.hysteresis_step_pct {
                        capacity = prev;
                    } else {
                        capacity = prev + self.config.hysteresis_step_pct;
                    }
                }
            }
        }
        self.previous_capacity = Some(capacity);
        self.battery_seen = true;

        let current_ma: i16 = if is_charging {
            i16::try_from(charge_ma).unwrap_or(i16::MAX)
        } else if is_discharging {
            i16::try_from(discharge_ma).map(|ma| -ma).unwrap_or(i16::MIN)
        } else {
            0
        };

        self.status = BatteryStatus {
            voltage_mv: pack_mv,
            current_ma,
            capacity_pct: capacity,
            temperature_c: snapshot.temperature_c(),
            is_charging,
            is_ac_present: ac_present,
            is_discharging,
            is_connected: true,
            last_update_ms: now_ms,
        };

        debug!(
            voltage_mv = pack_mv,
            current_ma,
            capacity_pct = capacity,
            charging = is_charging,
            "battery status updated"
        );

        Ok(self.status)
    }

    /// The most recent status record, possibly marked disconnected.
    pub fn last_status(&self) -> &BatteryStatus {
        &self.status
    }

    /// Whether a non-zero voltage reading has ever been produced.
    ///
    /// Latched for the lifetime of the estimator; drives the
    /// battery-present flag.
    pub fn has_seen_battery(&self) -> bool {
        self.battery_seen
    }

    /// The active configuration.
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }
}

impl Default for StateEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}
