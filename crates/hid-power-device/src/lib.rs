//! USB HID Power Device class driver.
//!
//! This crate is the device side of the HID battery interface: it builds
//! the report descriptor, answers enumeration and class-specific control
//! requests, stores the host-accessible feature reports and pushes
//! interrupt-IN reports. It is deliberately independent of any USB stack:
//! the [`UsbBus`] trait is the only seam, and everything above it is
//! plain, synchronous, allocation-light Rust that can be driven from a
//! single-threaded control loop.
//!
//! Layering, bottom up:
//! - [`consts`] — HID class request codes, descriptor types and the
//!   Power Device report/string ids;
//! - [`SetupPacket`] — a decoded 8-byte control-transfer setup stage;
//! - [`ReportDescriptorSet`] — sub-descriptor concatenation and the
//!   interface/class/endpoint descriptors derived from it;
//! - [`FeatureRegistry`] — insertion-ordered owned storage for feature
//!   reports;
//! - [`PowerDeviceDriver`] — ties the above together and owns the bus.

pub mod consts;
mod descriptor;
mod driver;
mod registry;
mod setup;
mod transport;

pub use descriptor::{
    DescriptorLayout, InterfaceConfig, ReportDescriptorSet, power_summary_descriptor,
};
pub use driver::{ControlReply, EnumerationState, HidProtocol, PowerDeviceDriver};
pub use registry::{FeatureRegistry, FeatureReport};
pub use setup::{RequestDirection, RequestKind, RequestRecipient, SetupPacket};
pub use transport::{UsbBus, mock};
