//! The Power Device class driver proper.

use deckpower_errors::{PowerError, PowerResult};
use tracing::{debug, warn};

use crate::consts::{descriptor_type, protocol, report_type, request, request_type, string_id};
use crate::descriptor::{DescriptorLayout, InterfaceConfig, ReportDescriptorSet, power_summary_descriptor};
use crate::registry::FeatureRegistry;
use crate::setup::SetupPacket;
use crate::transport::UsbBus;

/// Where the device stands in USB enumeration.
///
/// Interrupt reports are only legal in `Configured`; the control pipe
/// answers from `Addressed` onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumerationState {
    #[default]
    Unattached,
    Addressed,
    Configured,
}

/// Boot vs report protocol, per Get/Set_Protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HidProtocol {
    Boot,
    #[default]
    Report,
}

/// Outcome of a handled control request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlReply {
    /// Status-stage acknowledge, no data.
    Ack,
    /// Data stage to send to the host.
    Data(Vec<u8>),
}

/// Device-side HID Power Device driver.
///
/// Owns the feature registry, the report descriptor and the bus; the
/// surrounding service feeds it decoded [`SetupPacket`]s and asks it to
/// push interrupt reports. All state transitions are explicit method
/// calls, so the whole thing is deterministic under test.
#[derive(Debug)]
pub struct PowerDeviceDriver<B: UsbBus> {
    bus: B,
    interface: InterfaceConfig,
    descriptors: ReportDescriptorSet,
    registry: FeatureRegistry,
    state: EnumerationState,
    protocol: HidProtocol,
    idle_rate: u8,
    serial: Option<String>,
}

impl<B: UsbBus> PowerDeviceDriver<B> {
    /// Build a driver with the power-summary descriptor for `layout`.
    pub fn new(bus: B, layout: DescriptorLayout, interface: InterfaceConfig) -> Self {
        let mut descriptors = ReportDescriptorSet::new();
        for block in power_summary_descriptor(layout) {
            descriptors.append(block);
        }
        Self {
            bus,
            interface,
            descriptors,
            registry: FeatureRegistry::new(),
            state: EnumerationState::Unattached,
            protocol: HidProtocol::Report,
            idle_rate: 0,
            serial: None,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn descriptors(&self) -> &ReportDescriptorSet {
        &self.descriptors
    }

    /// Append an extra sub-descriptor block. Only legal before
    /// enumeration starts.
    pub fn append_descriptor(&mut self, block: Vec<u8>) {
        self.descriptors.append(block);
    }

    pub fn enumeration_state(&self) -> EnumerationState {
        self.state
    }

    pub fn is_configured(&self) -> bool {
        self.state == EnumerationState::Configured
    }

    pub fn protocol(&self) -> HidProtocol {
        self.protocol
    }

    pub fn idle_rate(&self) -> u8 {
        self.idle_rate
    }

    /// Bus reset: back to square one, report protocol restored.
    pub fn on_bus_reset(&mut self) {
        self.state = EnumerationState::Unattached;
        self.protocol = HidProtocol::Report;
    }

    pub fn on_address_assigned(&mut self) {
        self.state = EnumerationState::Addressed;
    }

    pub fn on_configured(&mut self) {
        debug!(interface = self.interface.interface_index, "interface configured");
        self.state = EnumerationState::Configured;
    }

    pub fn set_serial(&mut self, serial: impl Into<String>) {
        self.serial = Some(serial.into());
    }

    /// Short identifier for logs and the platform device name.
    ///
    /// Prefers the serial number; without one, derives a stable 5-char
    /// name from the report-descriptor length so distinct descriptor
    /// configurations get distinct names.
    pub fn short_name(&self) -> String {
        if let Some(serial) = self.serial.as_deref()
            && !serial.is_empty()
        {
            return serial.chars().take(5).collect();
        }
        let size = self.descriptors.total_len();
        let mut name = String::from("PWR");
        name.push((b'A' + (size & 0xF) as u8) as char);
        name.push((b'A' + ((size >> 4) & 0xF) as u8) as char);
        name
    }

    /// Register a feature report (first registration wins).
    pub fn set_feature(&mut self, id: u16, data: &[u8]) -> usize {
        self.registry.set_feature(id, data)
    }

    /// Device-side feature update.
    pub fn update_feature(&mut self, id: u16, data: &[u8]) -> PowerResult<()> {
        self.registry.overwrite(id, data)
    }

    pub fn feature(&self, id: u16) -> Option<&[u8]> {
        self.registry.feature(id).map(|r| r.data())
    }

    pub fn lock_feature(&mut self, id: u16, locked: bool) -> bool {
        self.registry.lock_feature(id, locked)
    }

    /// Register a string-valued feature (chemistry, vendor, ...).
    pub fn set_string_feature(&mut self, index: u16, value: &str) -> usize {
        self.registry
            .set_feature(string_id::STRING_FEATURE_BASE | index, value.as_bytes())
    }

    /// Handle a setup packet addressed to this interface.
    ///
    /// `payload` is the data stage of host-to-device transfers (empty
    /// otherwise). Returns `Ok(None)` when the request is not for this
    /// driver, so a composite dispatcher can try the next interface.
    pub fn handle_setup(
        &mut self,
        setup: &SetupPacket,
        payload: &[u8],
    ) -> PowerResult<Option<ControlReply>> {
        if (setup.w_index & 0xFF) as u8 != self.interface.interface_index {
            return Ok(None);
        }
        match setup.bm_request_type {
            request_type::DEVICE_TO_HOST_STANDARD_INTERFACE => self.handle_get_descriptor(setup),
            request_type::DEVICE_TO_HOST_CLASS_INTERFACE => self.handle_class_get(setup),
            request_type::HOST_TO_DEVICE_CLASS_INTERFACE => self.handle_class_set(setup, payload),
            _ => Ok(None),
        }
    }

    /// Standard GET_DESCRIPTOR for the class descriptors.
    fn handle_get_descriptor(&mut self, setup: &SetupPacket) -> PowerResult<Option<ControlReply>> {
        const GET_DESCRIPTOR: u8 = 0x06;
        if setup.b_request != GET_DESCRIPTOR {
            return Ok(None);
        }
        match setup.w_value_high() {
            descriptor_type::REPORT => {
                // The host rereads the report descriptor when it
                // (re)binds the interface; HID requires the device to
                // come up in report protocol at that point.
                if self.protocol != HidProtocol::Report {
                    debug!("report descriptor read, protocol reset to report");
                    self.protocol = HidProtocol::Report;
                }
                Ok(Some(ControlReply::Data(self.descriptors.concatenated())))
            }
            descriptor_type::HID => Ok(Some(ControlReply::Data(
                self.descriptors.hid_class_descriptor().to_vec(),
            ))),
            descriptor_type::STRING => {
                let index = u16::from(setup.w_value_low());
                match self.registry.feature(string_id::STRING_FEATURE_BASE | index) {
                    Some(report) => Ok(Some(ControlReply::Data(string_descriptor(report.data())))),
                    None => Ok(None),
                }
            }
            _ => Ok(None),
        }
    }

    fn handle_class_get(&mut self, setup: &SetupPacket) -> PowerResult<Option<ControlReply>> {
        match setup.b_request {
            request::GET_REPORT => {
                if setup.w_value_high() != report_type::FEATURE {
                    return Err(PowerError::violation(format!(
                        "get_report type {} unsupported, only feature reports are served",
                        setup.w_value_high()
                    )));
                }
                let id = u16::from(setup.w_value_low());
                let report = self
                    .registry
                    .feature(id)
                    .or_else(|| self.registry.feature(string_id::STRING_FEATURE_BASE | id))
                    .ok_or(PowerError::UnknownReport(id))?;
                let mut data = Vec::with_capacity(report.len() + 1);
                data.push(setup.w_value_low());
                data.extend_from_slice(report.data());
                Ok(Some(ControlReply::Data(data)))
            }
            request::GET_IDLE => Ok(Some(ControlReply::Data(vec![self.idle_rate]))),
            request::GET_PROTOCOL => {
                let value = match self.protocol {
                    HidProtocol::Boot => protocol::BOOT,
                    HidProtocol::Report => protocol::REPORT,
                };
                Ok(Some(ControlReply::Data(vec![value])))
            }
            other => Err(PowerError::violation(format!(
                "unsupported class request {other:#04x}"
            ))),
        }
    }

    fn handle_class_set(
        &mut self,
        setup: &SetupPacket,
        payload: &[u8],
    ) -> PowerResult<Option<ControlReply>> {
        match setup.b_request {
            request::SET_REPORT => {
                if setup.w_value_high() != report_type::FEATURE {
                    return Err(PowerError::violation(format!(
                        "set_report type {} unsupported",
                        setup.w_value_high()
                    )));
                }
                let id = u16::from(setup.w_value_low());
                let stored = self
                    .registry
                    .feature(id)
                    .ok_or(PowerError::UnknownReport(id))?;
                let expected = stored.len() as u16 + 1;
                if setup.w_length != expected || payload.len() != usize::from(setup.w_length) {
                    warn!(
                        id,
                        w_length = setup.w_length,
                        expected,
                        "set_report length mismatch"
                    );
                    return Err(PowerError::violation(format!(
                        "set_report {id:#06x}: wLength {} != {expected}",
                        setup.w_length
                    )));
                }
                if payload[0] != setup.w_value_low() {
                    return Err(PowerError::violation(format!(
                        "set_report {id:#06x}: payload id byte {} mismatch",
                        payload[0]
                    )));
                }
                self.registry.write(id, &payload[1..])?;
                debug!(id, len = payload.len() - 1, "feature report written by host");
                Ok(Some(ControlReply::Ack))
            }
            request::SET_IDLE => {
                self.idle_rate = setup.w_value_high();
                Ok(Some(ControlReply::Ack))
            }
            request::SET_PROTOCOL => {
                self.protocol = match setup.w_value_low() {
                    x if x == protocol::BOOT => HidProtocol::Boot,
                    x if x == protocol::REPORT => HidProtocol::Report,
                    other => {
                        return Err(PowerError::violation(format!(
                            "set_protocol value {other} out of range"
                        )));
                    }
                };
                Ok(Some(ControlReply::Ack))
            }
            other => Err(PowerError::violation(format!(
                "unsupported class request {other:#04x}"
            ))),
        }
    }

    /// Push one input report on the interrupt-IN endpoint.
    ///
    /// The report goes out as two transfers, the id byte first and the
    /// payload second, matching the host-side parser. Returns the total
    /// bytes written; the caller decides whether and when to retry.
    pub fn send_report(&mut self, id: u16, payload: &[u8]) -> PowerResult<usize> {
        if !self.is_configured() {
            return Err(PowerError::violation(
                "interrupt report before configuration".to_string(),
            ));
        }
        let ep = self.interface.ep_in;
        let id_written = self.bus.interrupt_write(ep, &[id as u8]);
        if id_written < 0 {
            return Err(PowerError::interrupt_failure(id_written));
        }
        let payload_written = self.bus.interrupt_write(ep, payload);
        if payload_written < 0 {
            return Err(PowerError::interrupt_failure(payload_written));
        }
        Ok(id_written as usize + payload_written as usize)
    }
}

/// USB string descriptor: length, type, UTF-16LE code units.
fn string_descriptor(bytes: &[u8]) -> Vec<u8> {
    let text = String::from_utf8_lossy(bytes);
    let units: Vec<u16> = text.encode_utf16().collect();
    let mut out = Vec::with_capacity(2 + units.len() * 2);
    out.push((2 + units.len() * 2) as u8);
    out.push(descriptor_type::STRING);
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}
