//! Wire format and scheduling for the periodic power reports.
//!
//! [`PowerSummary`] is the snapshot the host sees: remaining capacity,
//! runtime to empty and the present-status bitfield. [`encode`] turns it
//! into interrupt-report frames under either wire layout, and
//! [`ReportingScheduler`] decides on every tick whether the frames go
//! out now, later, or not at all (duplicate suppression, minimum
//! spacing, post-enumeration quiescence and failure backoff).

mod scheduler;
mod wire;

pub use scheduler::{ReportDecision, ReportingScheduler, SchedulerConfig};
pub use wire::{PowerSummary, ReportFrame, ReportLayout, encode};
