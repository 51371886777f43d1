//! HID class constants and Power Device report ids.
//!
//! Request and descriptor codes are from the HID 1.11 specification;
//! the report ids are this device's own assignment, shared with the
//! report descriptor in [`crate::descriptor`].

/// HID class-specific requests (HID 1.11 §7.2).
pub mod request {
    pub const GET_REPORT: u8 = 0x01;
    pub const GET_IDLE: u8 = 0x02;
    pub const GET_PROTOCOL: u8 = 0x03;
    pub const SET_REPORT: u8 = 0x09;
    pub const SET_IDLE: u8 = 0x0A;
    pub const SET_PROTOCOL: u8 = 0x0B;
}

/// Class descriptor types (HID 1.11 §7.1).
pub mod descriptor_type {
    pub const HID: u8 = 0x21;
    pub const REPORT: u8 = 0x22;
    pub const PHYSICAL: u8 = 0x23;
    pub const STRING: u8 = 0x03;
}

/// Report types carried in the high byte of wValue (HID 1.11 §7.2.1).
pub mod report_type {
    pub const INPUT: u8 = 1;
    pub const OUTPUT: u8 = 2;
    pub const FEATURE: u8 = 3;
}

/// Get/Set_Protocol values (HID 1.11 §7.2.5).
pub mod protocol {
    pub const BOOT: u8 = 0;
    pub const REPORT: u8 = 1;
}

/// Input report ids on the interrupt endpoint.
pub mod report_id {
    /// Remaining capacity percentage, one byte.
    pub const POWER_REMAINING: u16 = 1;
    /// Runtime to empty in seconds, little-endian u16.
    pub const POWER_RUNTIME: u16 = 2;
    /// Present-status bitfield, little-endian u16.
    pub const POWER_STATUS: u16 = 3;
}

/// Feature report ids served over the control pipe.
///
/// The writable ones (remain-time limit, shutdown/reboot delays, audible
/// alarm) are how the host arms the shutdown machinery.
pub mod feature_id {
    pub const REMAINING_CAPACITY: u16 = 0x0C;
    pub const RUNTIME_TO_EMPTY: u16 = 0x0D;
    pub const PRESENT_STATUS: u16 = 0x07;
    pub const REMAIN_TIME_LIMIT: u16 = 0x08;
    pub const CONFIG_VOLTAGE: u16 = 0x0A;
    pub const VOLTAGE: u16 = 0x0B;
    pub const FULL_CHARGE_CAPACITY: u16 = 0x0E;
    pub const WARN_CAPACITY_LIMIT: u16 = 0x0F;
    pub const CAPACITY_GRANULARITY_1: u16 = 0x10;
    pub const REMAINING_CAPACITY_LIMIT: u16 = 0x11;
    pub const DELAY_BEFORE_SHUTDOWN: u16 = 0x12;
    pub const DELAY_BEFORE_REBOOT: u16 = 0x13;
    pub const AUDIBLE_ALARM_CONTROL: u16 = 0x14;
    pub const CAPACITY_MODE: u16 = 0x16;
    pub const DESIGN_CAPACITY: u16 = 0x17;
    pub const CAPACITY_GRANULARITY_2: u16 = 0x18;
    pub const RECHARGEABLE: u16 = 0x06;
    pub const AVERAGE_TIME_TO_FULL: u16 = 0x1A;
    pub const AVERAGE_TIME_TO_EMPTY: u16 = 0x1C;
}

/// String feature ids, mapped into the HID string-descriptor range.
///
/// String-valued features are stored in the registry at
/// `STRING_FEATURE_BASE | index` and served for string-descriptor
/// requests as well as feature reads.
pub mod string_id {
    /// Registry offset for string features.
    pub const STRING_FEATURE_BASE: u16 = 0xFF00;

    pub const PRODUCT: u16 = 0x01;
    pub const SERIAL: u16 = 0x02;
    pub const MANUFACTURER: u16 = 0x03;
    pub const DEVICE_CHEMISTRY: u16 = 0x04;
    pub const OEM_VENDOR: u16 = 0x05;
}

/// bmRequestType values this driver answers.
pub mod request_type {
    /// Device-to-host, standard, interface recipient.
    pub const DEVICE_TO_HOST_STANDARD_INTERFACE: u8 = 0x81;
    /// Device-to-host, class, interface recipient.
    pub const DEVICE_TO_HOST_CLASS_INTERFACE: u8 = 0xA1;
    /// Host-to-device, class, interface recipient.
    pub const HOST_TO_DEVICE_CLASS_INTERFACE: u8 = 0x21;
}
