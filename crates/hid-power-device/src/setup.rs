//! Decoded control-transfer setup packets.

/// Transfer direction encoded in bmRequestType bit 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestDirection {
    HostToDevice,
    DeviceToHost,
}

/// Request kind encoded in bmRequestType bits 6..5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Standard,
    Class,
    Vendor,
    Reserved,
}

/// Request recipient encoded in bmRequestType bits 4..0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRecipient {
    Device,
    Interface,
    Endpoint,
    Other(u8),
}

/// The 8-byte setup stage of a USB control transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupPacket {
    pub bm_request_type: u8,
    pub b_request: u8,
    pub w_value: u16,
    pub w_index: u16,
    pub w_length: u16,
}

impl SetupPacket {
    /// Build a packet from raw fields.
    pub const fn new(
        bm_request_type: u8,
        b_request: u8,
        w_value: u16,
        w_index: u16,
        w_length: u16,
    ) -> Self {
        Self {
            bm_request_type,
            b_request,
            w_value,
            w_index,
            w_length,
        }
    }

    /// Decode from the raw 8 bytes of the setup stage.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self {
            bm_request_type: bytes[0],
            b_request: bytes[1],
            w_value: u16::from_le_bytes([bytes[2], bytes[3]]),
            w_index: u16::from_le_bytes([bytes[4], bytes[5]]),
            w_length: u16::from_le_bytes([bytes[6], bytes[7]]),
        }
    }

    pub fn direction(&self) -> RequestDirection {
        if self.bm_request_type & 0x80 != 0 {
            RequestDirection::DeviceToHost
        } else {
            RequestDirection::HostToDevice
        }
    }

    pub fn kind(&self) -> RequestKind {
        match (self.bm_request_type >> 5) & 0x03 {
            0 => RequestKind::Standard,
            1 => RequestKind::Class,
            2 => RequestKind::Vendor,
            _ => RequestKind::Reserved,
        }
    }

    pub fn recipient(&self) -> RequestRecipient {
        match self.bm_request_type & 0x1F {
            0 => RequestRecipient::Device,
            1 => RequestRecipient::Interface,
            2 => RequestRecipient::Endpoint,
            other => RequestRecipient::Other(other),
        }
    }

    /// High byte of wValue (report/descriptor type in HID requests).
    pub fn w_value_high(&self) -> u8 {
        (self.w_value >> 8) as u8
    }

    /// Low byte of wValue (report id / descriptor index).
    pub fn w_value_low(&self) -> u8 {
        (self.w_value & 0xFF) as u8
    }
}
