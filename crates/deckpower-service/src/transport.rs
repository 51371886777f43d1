//! External seams: the register transport and the LED output.

use deckpower_errors::PowerResult;
use deckpower_estimator::RegisterSnapshot;
use deckpower_indicator::LedOutput;

/// Synchronous, non-blocking access to the charge controller's register
/// file. One call returns the most recent complete snapshot.
pub trait RegisterTransport {
    fn read_registers(&mut self) -> PowerResult<RegisterSnapshot>;
}

/// Consumes LED frames; typically a PWM peripheral.
pub trait LedSink {
    fn set_led(&mut self, output: LedOutput);
}

/// Test doubles for the service seams.
pub mod mock {
    use super::{LedSink, RegisterTransport};
    use deckpower_errors::{PowerError, PowerResult};
    use deckpower_estimator::RegisterSnapshot;
    use deckpower_indicator::LedOutput;

    /// Serves a scripted snapshot (or failure) on every read.
    #[derive(Debug, Default)]
    pub struct MockRegisterTransport {
        current: Option<PowerResult<RegisterSnapshot>>,
        reads: usize,
    }

    impl MockRegisterTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// All subsequent reads return this snapshot.
        pub fn set_snapshot(&mut self, snapshot: RegisterSnapshot) {
            self.current = Some(Ok(snapshot));
        }

        /// All subsequent reads fail with a register transport error.
        pub fn set_failure(&mut self, code: i32) {
            self.current = Some(Err(PowerError::register_failure(code)));
        }

        pub fn read_count(&self) -> usize {
            self.reads
        }
    }

    impl RegisterTransport for MockRegisterTransport {
        fn read_registers(&mut self) -> PowerResult<RegisterSnapshot> {
            self.reads += 1;
            match &self.current {
                Some(Ok(snapshot)) => Ok(*snapshot),
                Some(Err(err)) => Err(err.clone()),
                // Unscripted: the all-zero "no data" snapshot.
                None => Ok(RegisterSnapshot::default()),
            }
        }
    }

    /// Records every frame pushed to the LED.
    #[derive(Debug, Default)]
    pub struct MockLedSink {
        frames: Vec<LedOutput>,
    }

    impl MockLedSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn frames(&self) -> &[LedOutput] {
            &self.frames
        }

        pub fn last(&self) -> Option<LedOutput> {
            self.frames.last().copied()
        }
    }

    impl LedSink for MockLedSink {
        fn set_led(&mut self, output: LedOutput) {
            self.frames.push(output);
        }
    }
}
