//! Battery state-of-charge estimation from raw charge-controller registers.
//!
//! The estimator turns an opaque register snapshot from the charge
//! controller into a [`BatteryStatus`] record: pack voltage, signed
//! current, a smoothed state-of-charge percentage and the
//! charging/discharging/AC-present classification. The pipeline is
//! deliberately boring and deterministic:
//!
//! 1. decode the ADC registers ([`RegisterSnapshot`]);
//! 2. compensate the per-cell voltage for internal-resistance sag under
//!    discharge load;
//! 3. interpolate state of charge from a load-dependent OCV curve
//!    ([`OcvCurve`]);
//! 4. smooth through a fixed-window moving average ([`MovingAverage`]);
//! 5. apply discharge hysteresis so capacity never visibly jumps upward
//!    during load transients.
//!
//! All arithmetic is integer except the interpolation fraction, and every
//! step is O(1) with no allocation after construction.

mod average;
mod estimator;
mod ocv;
mod registers;
mod status;

pub use average::MovingAverage;
pub use estimator::{EstimatorConfig, StateEstimator};
pub use ocv::{OcvCurve, heavy_load_curve, light_load_curve};
pub use registers::{RegisterSnapshot, SNAPSHOT_LEN};
pub use status::BatteryStatus;
