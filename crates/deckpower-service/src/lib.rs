//! The power subsystem control loop.
//!
//! [`PowerService`] owns every component of the subsystem and drives it
//! from a single non-blocking `tick(now_ms)` entry point: register read
//! (1 s cadence) → state estimation → present-status derivation → LED
//! indicator (50 ms cadence) → report scheduling → interrupt
//! transmission, in that order, every tick. Host control requests are
//! serviced synchronously from the same execution context, so the
//! feature registry needs no locking.
//!
//! The two seams to the outside world are [`RegisterTransport`] (the
//! charge controller's register file) and [`LedSink`] (the PWM output),
//! plus the `UsbBus` trait from the HID crate. Mocks for all three live
//! in the respective `mock` modules so integration tests can run the
//! whole pipeline deterministically.

mod config;
mod service;
mod transport;

pub use config::{DeviceIdentity, ServiceConfig};
pub use service::{PowerService, TickOutcome};
pub use transport::{LedSink, RegisterTransport, mock};
