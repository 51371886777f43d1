//! The battery status value record.

use serde::{Deserialize, Serialize};

/// One complete battery reading, recomputed each poll.
///
/// The record is a value type: it is produced whole by
/// [`crate::StateEstimator::update`] and never partially updated. When
/// `is_connected` is false every other field is stale and consumers must
/// treat it as such.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryStatus {
    /// Pack voltage in millivolts; 0 when no battery is present.
    pub voltage_mv: u16,
    /// Signed current in milliamps: positive while charging, negative
    /// while discharging, 0 when idle.
    pub current_ma: i16,
    /// Smoothed state of charge, clamped to 0..=100.
    pub capacity_pct: u8,
    /// Pack temperature in degrees Celsius.
    pub temperature_c: u8,
    /// Charge current is flowing into the pack.
    pub is_charging: bool,
    /// The AC adapter is attached.
    pub is_ac_present: bool,
    /// Discharge current is flowing out of the pack.
    pub is_discharging: bool,
    /// The charge controller produced a valid reading.
    pub is_connected: bool,
    /// Tick timestamp of the last successful update, in milliseconds.
    pub last_update_ms: u64,
}

impl BatteryStatus {
    /// A disconnected placeholder status.
    pub fn disconnected() -> Self {
        Self {
            voltage_mv: 0,
            current_ma: 0,
            capacity_pct: 0,
            temperature_c: 0,
            is_charging: false,
            is_ac_present: false,
            is_discharging: false,
            is_connected: false,
            last_update_ms: 0,
        }
    }

    /// Neither charging nor discharging.
    pub fn is_idle(&self) -> bool {
        !self.is_charging && !self.is_discharging
    }
}

impl Default for BatteryStatus {
    fn default() -> Self {
        Self::disconnected()
    }
}
