//! Power subsystem error taxonomy.
//!
//! Three failure classes cross component boundaries: a sentinel voltage
//! reading (`NoBattery`), an I/O error on either transport
//! (`TransportFailure`), and a malformed host request rejected at the
//! protocol boundary (`ProtocolViolation`). None of them are fatal to the
//! process.

/// Severity classification for power subsystem errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, expected during normal operation
    Info,
    /// Degraded but functional
    Warning,
    /// Operation failed, retry may succeed
    Error,
    /// Device unusable until it reappears
    Critical,
}

/// Which external transport produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// The I2C register transport to the charge controller
    Registers,
    /// The USB interrupt-IN endpoint
    UsbInterrupt,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Registers => write!(f, "register transport"),
            TransportKind::UsbInterrupt => write!(f, "usb interrupt endpoint"),
        }
    }
}

/// Errors produced by the battery telemetry and HID reporting pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PowerError {
    /// The voltage register read back the no-battery sentinel.
    #[error("no battery present (sentinel voltage reading)")]
    NoBattery,

    /// A transport write or read returned an error code.
    #[error("{transport} failure (code {code})")]
    TransportFailure {
        /// The transport that failed
        transport: TransportKind,
        /// Raw error code returned by the transport
        code: i32,
    },

    /// A host control request was rejected at the protocol boundary.
    #[error("protocol violation: {reason}")]
    ProtocolViolation {
        /// Why the request was rejected
        reason: String,
    },

    /// A get/set report request named a report id that was never registered.
    #[error("unknown report id {0:#06x}")]
    UnknownReport(u16),
}

/// Result alias used throughout the workspace.
pub type PowerResult<T> = Result<T, PowerError>;

impl PowerError {
    /// Get the error severity.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PowerError::NoBattery => ErrorSeverity::Warning,
            PowerError::TransportFailure { .. } => ErrorSeverity::Error,
            PowerError::ProtocolViolation { .. } => ErrorSeverity::Warning,
            PowerError::UnknownReport(_) => ErrorSeverity::Info,
        }
    }

    /// Check if retrying on the next tick might succeed.
    ///
    /// Protocol violations are host mistakes; retrying the same request
    /// verbatim will fail the same way.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PowerError::NoBattery | PowerError::TransportFailure { .. }
        )
    }

    /// Check if this error must drive the pipeline into its
    /// disconnected state (`is_connected = false`, indicator blinking).
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            PowerError::NoBattery
                | PowerError::TransportFailure {
                    transport: TransportKind::Registers,
                    ..
                }
        )
    }

    /// Create a register transport failure.
    pub fn register_failure(code: i32) -> Self {
        PowerError::TransportFailure {
            transport: TransportKind::Registers,
            code,
        }
    }

    /// Create a USB interrupt endpoint failure.
    pub fn interrupt_failure(code: i32) -> Self {
        PowerError::TransportFailure {
            transport: TransportKind::UsbInterrupt,
            code,
        }
    }

    /// Create a protocol violation with a reason string.
    pub fn violation(reason: impl Into<String>) -> Self {
        PowerError::ProtocolViolation {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_battery_is_retryable_and_disconnecting() {
        let err = PowerError::NoBattery;
        assert!(err.is_retryable());
        assert!(err.is_disconnect());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_register_failure_disconnects() {
        let err = PowerError::register_failure(-5);
        assert!(err.is_disconnect());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_usb_failure_does_not_disconnect() {
        // A failed interrupt write leaves the battery state valid; only the
        // register transport decides connectivity.
        let err = PowerError::interrupt_failure(-1);
        assert!(!err.is_disconnect());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_protocol_violation_not_retryable() {
        let err = PowerError::violation("length mismatch");
        assert!(!err.is_retryable());
        assert!(!err.is_disconnect());
    }

    #[test]
    fn test_display_messages() {
        let err = PowerError::interrupt_failure(-32);
        let msg = err.to_string();
        assert!(msg.contains("interrupt"));
        assert!(msg.contains("-32"));

        let msg = PowerError::UnknownReport(0xFF02).to_string();
        assert!(msg.contains("0xff02"));
    }

    #[test]
    fn test_is_std_error() {
        let err = PowerError::NoBattery;
        let _: &dyn std::error::Error = &err;
    }

    #[test]
    fn test_severity_ordering() {
        assert!(ErrorSeverity::Info < ErrorSeverity::Warning);
        assert!(ErrorSeverity::Warning < ErrorSeverity::Error);
        assert!(ErrorSeverity::Error < ErrorSeverity::Critical);
    }
}
