//! Report-descriptor assembly.
//!
//! The driver's HID class descriptor advertises one report descriptor
//! whose length is the concatenation of all appended sub-descriptor
//! blocks; hosts read it back with a single class GET_DESCRIPTOR. The
//! power-summary blocks themselves are fixed byte sequences agreed with
//! the wire format in `deckpower-reporting` — the report-id byte and the
//! little-endian field order are the bit-exact compatibility surface.

use crate::consts::{descriptor_type, report_id};

/// Power Device usage page.
const USAGE_PAGE_POWER_DEVICE: u8 = 0x84;
/// Battery strength usage (remaining capacity percent).
const USAGE_BATTERY_STRENGTH: u8 = 0x20;
/// RunTimeToEmpty usage.
const USAGE_RUNTIME_TO_EMPTY: u8 = 0x44;
/// PresentStatus usage.
const USAGE_PRESENT_STATUS: u8 = 0x16;

/// How the power reports are arranged across USB interfaces.
///
/// The firmware historically carried both arrangements; this is one
/// builder parameterized by the choice. `SharedInterface` (one interface,
/// report-id-tagged collections) is the production configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorLayout {
    /// One HID interface; each report carries its report id.
    #[default]
    SharedInterface,
    /// One HID interface per report; no report-id prefix on the wire.
    SeparateInterfaces,
}

fn input_block(usage: u8, rid: Option<u8>, report_size_bits: u8, logical_max: u16) -> Vec<u8> {
    let mut block = vec![
        0x05,
        USAGE_PAGE_POWER_DEVICE, // Usage Page (Power Device)
        0x09,
        usage, // Usage
        0xA1,
        0x01, // Collection (Application)
    ];
    if let Some(id) = rid {
        block.extend_from_slice(&[0x85, id]); // Report ID
    }
    block.extend_from_slice(&[
        0x15,
        0x00, // Logical Minimum (0)
        0x26,
        (logical_max & 0xFF) as u8,
        (logical_max >> 8) as u8, // Logical Maximum
        0x75,
        report_size_bits, // Report Size
        0x95,
        0x01, // Report Count (1)
        0x81,
        0x02, // Input (Data,Var,Abs)
        0xC0, // End Collection
    ]);
    block
}

/// The power-summary sub-descriptor blocks for the chosen layout.
///
/// Always three blocks (remaining capacity, runtime to empty, present
/// status); under [`DescriptorLayout::SeparateInterfaces`] each block is
/// meant for its own [`ReportDescriptorSet`], and no report-id items are
/// emitted.
pub fn power_summary_descriptor(layout: DescriptorLayout) -> Vec<Vec<u8>> {
    let tag = |id: u16| match layout {
        DescriptorLayout::SharedInterface => Some(id as u8),
        DescriptorLayout::SeparateInterfaces => None,
    };
    vec![
        input_block(USAGE_BATTERY_STRENGTH, tag(report_id::POWER_REMAINING), 8, 100),
        input_block(USAGE_RUNTIME_TO_EMPTY, tag(report_id::POWER_RUNTIME), 16, 0x7FFF),
        input_block(USAGE_PRESENT_STATUS, tag(report_id::POWER_STATUS), 16, 0x7FFF),
    ]
}

/// Enumeration-time parameters for one HID interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceConfig {
    /// Interface number within the composite configuration.
    pub interface_index: u8,
    /// Interrupt-IN endpoint number (address gets the IN bit).
    pub ep_in: u8,
    /// Optional interrupt-OUT endpoint number.
    pub ep_out: Option<u8>,
    /// Endpoint max packet size; must cover the largest report.
    pub max_packet: u16,
    /// Interrupt-IN polling interval in frames.
    pub poll_interval_in: u8,
    /// Interrupt-OUT polling interval in frames.
    pub poll_interval_out: u8,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            interface_index: 0,
            ep_in: 4,
            ep_out: Some(5),
            max_packet: 64,
            poll_interval_in: 0x14,
            poll_interval_out: 0x0A,
        }
    }
}

/// An ordered collection of report sub-descriptors.
///
/// Descriptors are fixed at boot: blocks are appended during driver
/// construction and the set is never mutated after enumeration starts.
#[derive(Debug, Clone, Default)]
pub struct ReportDescriptorSet {
    nodes: Vec<Vec<u8>>,
}

impl ReportDescriptorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sub-descriptor block.
    pub fn append(&mut self, block: Vec<u8>) {
        self.nodes.push(block);
    }

    /// Number of appended blocks.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total report-descriptor length in bytes.
    pub fn total_len(&self) -> u16 {
        self.nodes.iter().map(|n| n.len() as u16).sum()
    }

    /// The concatenated report descriptor, in append order.
    pub fn concatenated(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_len() as usize);
        for node in &self.nodes {
            out.extend_from_slice(node);
        }
        out
    }

    /// The 9-byte HID class descriptor for this set (bcdHID 1.11).
    pub fn hid_class_descriptor(&self) -> [u8; 9] {
        let len = self.total_len();
        [
            9,
            descriptor_type::HID,
            0x11,
            0x01, // bcdHID 1.11
            0x21, // country code
            1,    // one class descriptor follows
            descriptor_type::REPORT,
            (len & 0xFF) as u8,
            (len >> 8) as u8,
        ]
    }

    /// The interface descriptor plus class and endpoint descriptors, as
    /// returned during configuration-descriptor assembly.
    pub fn interface_descriptor(&self, config: &InterfaceConfig) -> Vec<u8> {
        let endpoints = 1 + u8::from(config.ep_out.is_some());
        let mut out = vec![
            9,    // bLength
            4,    // bDescriptorType (Interface)
            config.interface_index,
            0,    // bAlternateSetting
            endpoints,
            3,    // bInterfaceClass (HID)
            0,    // bInterfaceSubClass (none)
            0,    // bInterfaceProtocol (none)
            0,    // iInterface
        ];
        out.extend_from_slice(&self.hid_class_descriptor());
        out.extend_from_slice(&endpoint_descriptor(
            0x80 | config.ep_in,
            config.max_packet,
            config.poll_interval_in,
        ));
        if let Some(ep_out) = config.ep_out {
            out.extend_from_slice(&endpoint_descriptor(
                ep_out,
                config.max_packet,
                config.poll_interval_out,
            ));
        }
        out
    }
}

fn endpoint_descriptor(address: u8, max_packet: u16, interval: u8) -> [u8; 7] {
    [
        7, // bLength
        5, // bDescriptorType (Endpoint)
        address,
        3, // bmAttributes: interrupt
        (max_packet & 0xFF) as u8,
        (max_packet >> 8) as u8,
        interval,
    ]
}
