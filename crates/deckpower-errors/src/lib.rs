//! Centralized error types for the DeckPower battery telemetry suite.
//!
//! Everything in this subsystem is recoverable: a failed register read or
//! USB write marks the pack as disconnected and is retried on the next
//! control-loop tick. The taxonomy here exists so callers can tell the
//! three failure classes apart without string matching.

mod power;

pub use power::{ErrorSeverity, PowerError, PowerResult, TransportKind};
