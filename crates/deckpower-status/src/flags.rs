//! The 16-bit present-status field.

use serde::{Deserialize, Serialize};

/// Power Device present-status bitfield.
///
/// Bit assignments follow the Power Device usage page ordering the host
/// driver expects; the field travels on the wire as a little-endian u16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresentStatus(u16);

impl PresentStatus {
    /// Charge current is flowing.
    pub const CHARGING: u16 = 1 << 0;
    /// Discharge current is flowing.
    pub const DISCHARGING: u16 = 1 << 1;
    /// AC adapter attached.
    pub const AC_PRESENT: u16 = 1 << 2;
    /// A battery has been observed since boot.
    pub const BATTERY_PRESENT: u16 = 1 << 3;
    /// Capacity below the remaining-capacity limit.
    pub const BELOW_RCL: u16 = 1 << 4;
    /// Remaining-time limit expired while discharging.
    pub const RTL_EXPIRED: u16 = 1 << 5;
    /// Battery needs replacement.
    pub const NEED_REPLACEMENT: u16 = 1 << 6;
    /// Output voltage out of regulation.
    pub const VOLTAGE_NOT_REGULATED: u16 = 1 << 7;
    /// Pack fully charged.
    pub const FULL_CHARGE: u16 = 1 << 8;
    /// Pack fully discharged.
    pub const FULL_DISCHARGE: u16 = 1 << 9;
    /// Host-armed shutdown countdown went positive.
    pub const SHUTDOWN_REQUESTED: u16 = 1 << 10;
    /// Shutdown imminent (requested OR runtime limit expired).
    pub const SHUTDOWN_IMMINENT: u16 = 1 << 11;
    /// Communication with the pack lost.
    pub const COMM_LOST: u16 = 1 << 12;
    /// Output overloaded.
    pub const OVERLOAD: u16 = 1 << 13;

    /// No flags set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Construct from a raw wire value.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// The raw wire value.
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Test whether all bits in `mask` are set.
    pub const fn contains(self, mask: u16) -> bool {
        self.0 & mask == mask
    }

    /// Set the bits in `mask`.
    pub fn set(&mut self, mask: u16) {
        self.0 |= mask;
    }

    /// Clear the bits in `mask`.
    pub fn clear(&mut self, mask: u16) {
        self.0 &= !mask;
    }

    /// Set or clear `mask` depending on `condition`.
    pub fn assign(&mut self, mask: u16, condition: bool) {
        if condition {
            self.set(mask);
        } else {
            self.clear(mask);
        }
    }
}

impl From<PresentStatus> for u16 {
    fn from(flags: PresentStatus) -> u16 {
        flags.bits()
    }
}
