//! Raw register snapshot decoding.
//!
//! The external I2C transport hands us a fixed-size byte buffer covering
//! the charge controller's register file. The snapshot is decoded, never
//! mutated; all scaling constants come from the controller's ADC data
//! sheet (base-plus-LSB formulas).

/// Size of one register snapshot in bytes.
pub const SNAPSHOT_LEN: usize = 0x24;

/// Charger status register, low byte.
const REG_CHARGER_STATUS: usize = 0x00;
/// Discharge current ADC. Full range 32.512 A, LSB 256 mA.
const REG_ADC_IDCHG: usize = 0x08;
/// Charge current ADC. Full range 8.128 A, LSB 64 mA.
const REG_ADC_ICHG: usize = 0x09;
/// Die temperature ADC, degrees Celsius.
const REG_ADC_TEMP: usize = 0x06;
/// Battery voltage ADC. Full range 2.88 V - 19.2 V, LSB 64 mV.
const REG_ADC_VBAT: usize = 0x0C;

/// AC adapter present bit in the charger status high byte.
const AC_STAT_BIT: u8 = 0x80;

/// An opaque snapshot of the charge controller's register file.
///
/// Wraps the raw byte buffer returned by the register transport and
/// exposes typed accessors with data-sheet scaling applied. An all-zero
/// voltage register is the documented "no battery" sentinel; see
/// [`RegisterSnapshot::pack_voltage_mv`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterSnapshot {
    buf: [u8; SNAPSHOT_LEN],
}

impl RegisterSnapshot {
    /// Wrap a raw register buffer.
    pub fn new(buf: [u8; SNAPSHOT_LEN]) -> Self {
        Self { buf }
    }

    /// Raw VBAT ADC value, before scaling.
    pub fn raw_vbat(&self) -> u8 {
        self.buf[REG_ADC_VBAT]
    }

    /// Pack voltage in millivolts.
    ///
    /// The ADC reads `2880 + raw * 64` mV. A raw value of zero would
    /// decode to the 2880 mV range floor, which the hardware uses as its
    /// "no battery connected" sentinel; it is forced to 0 here so
    /// downstream code has a single unambiguous signal.
    pub fn pack_voltage_mv(&self) -> u16 {
        let raw = self.raw_vbat();
        if raw == 0 {
            0
        } else {
            2880 + u16::from(raw) * 64
        }
    }

    /// Charge current in milliamps.
    pub fn charge_current_ma(&self) -> u16 {
        u16::from(self.buf[REG_ADC_ICHG]) * 64
    }

    /// Discharge current in milliamps.
    pub fn discharge_current_ma(&self) -> u16 {
        u16::from(self.buf[REG_ADC_IDCHG]) * 256
    }

    /// Die temperature in degrees Celsius.
    pub fn temperature_c(&self) -> u8 {
        self.buf[REG_ADC_TEMP]
    }

    /// Whether the AC adapter is present, from the charger status word.
    pub fn ac_present(&self) -> bool {
        self.buf[REG_CHARGER_STATUS + 1] & AC_STAT_BIT != 0
    }

    /// Whether this snapshot carries the no-battery sentinel.
    pub fn is_no_battery(&self) -> bool {
        self.raw_vbat() == 0
    }

    /// The raw bytes, for diagnostics.
    pub fn as_bytes(&self) -> &[u8; SNAPSHOT_LEN] {
        &self.buf
    }
}

impl Default for RegisterSnapshot {
    fn default() -> Self {
        Self::new([0u8; SNAPSHOT_LEN])
    }
}

impl From<[u8; SNAPSHOT_LEN]> for RegisterSnapshot {
    fn from(buf: [u8; SNAPSHOT_LEN]) -> Self {
        Self::new(buf)
    }
}
