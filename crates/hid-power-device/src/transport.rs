//! The seam between the driver and the physical USB stack.

/// Low-level USB writes the driver issues.
///
/// Control-transfer data stages are not sent here: the driver hands them
/// back as [`crate::ControlReply::Data`] and the composite dispatcher
/// owns endpoint 0. Returns the byte count written, or a negative
/// stack-specific error code; the driver maps negatives into
/// [`deckpower_errors::PowerError::TransportFailure`]. Implementations
/// must not block the control loop.
pub trait UsbBus {
    /// Queue an interrupt-IN transfer on the given endpoint.
    fn interrupt_write(&mut self, endpoint: u8, data: &[u8]) -> i32;
}

/// Test double for [`UsbBus`].
pub mod mock {
    use super::UsbBus;
    use std::collections::VecDeque;

    /// Records every write and can be scripted to fail.
    ///
    /// Queued failure codes are consumed one per write, first-come
    /// first-served, so a two-write `send_report` can be made to fail on
    /// either half.
    #[derive(Debug, Default)]
    pub struct MockUsbBus {
        interrupt_writes: Vec<(u8, Vec<u8>)>,
        interrupt_failures: VecDeque<i32>,
    }

    impl MockUsbBus {
        pub fn new() -> Self {
            Self::default()
        }

        /// Script the next interrupt write to return `code`.
        pub fn fail_next_interrupt(&mut self, code: i32) {
            self.interrupt_failures.push_back(code);
        }

        pub fn interrupt_writes(&self) -> &[(u8, Vec<u8>)] {
            &self.interrupt_writes
        }

        pub fn clear(&mut self) {
            self.interrupt_writes.clear();
        }
    }

    impl UsbBus for MockUsbBus {
        fn interrupt_write(&mut self, endpoint: u8, data: &[u8]) -> i32 {
            if let Some(code) = self.interrupt_failures.pop_front() {
                return code;
            }
            self.interrupt_writes.push((endpoint, data.to_vec()));
            data.len() as i32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockUsbBus;
    use super::*;

    #[test]
    fn test_mock_records_writes() {
        let mut bus = MockUsbBus::new();
        assert_eq!(bus.interrupt_write(4, &[1, 2, 3]), 3);
        assert_eq!(bus.interrupt_writes(), &[(4, vec![1, 2, 3])]);
        bus.clear();
        assert!(bus.interrupt_writes().is_empty());
    }

    #[test]
    fn test_scripted_failures_are_consumed_in_order() {
        let mut bus = MockUsbBus::new();
        bus.fail_next_interrupt(-5);
        assert_eq!(bus.interrupt_write(4, &[0]), -5);
        assert_eq!(bus.interrupt_write(4, &[0]), 1);
        assert_eq!(bus.interrupt_writes().len(), 1);
    }
}
