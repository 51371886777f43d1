//! Battery state rendered as an RGB LED pattern.
//!
//! The controller is a pure function of the clock and the latest
//! [`BatteryStatus`]: the service calls [`IndicatorController::tick`]
//! every frame and pushes the returned [`LedOutput`] to the hardware.
//! No internal phase accumulators, so a missed frame never desyncs the
//! pattern.
//!
//! Patterns:
//! - disconnected: red blink, 500 ms on / 500 ms off;
//! - charging: capacity-band color on a 5 s triangular fade;
//! - discharging: capacity-band color, on-time proportional to the
//!   remaining capacity within a 5 s cycle;
//! - idle on AC: capacity-band color, steady.

mod controller;

pub use controller::{IndicatorConfig, IndicatorController, LedOutput};
