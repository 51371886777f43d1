//! Fixed-window moving average for capacity smoothing.

/// Default smoothing window, in samples.
pub const DEFAULT_WINDOW: usize = 20;

/// A fixed-capacity circular buffer with a running sum.
///
/// Damps the quantization noise introduced by the voltage ADC's 64 mV
/// LSB, which otherwise makes the reported percentage flicker. The
/// window is fixed at construction; pushing the same value `window`
/// times converges the output to exactly that value.
#[derive(Debug, Clone)]
pub struct MovingAverage {
    samples: Vec<u32>,
    index: usize,
    sum: u32,
    seeded: bool,
}

impl MovingAverage {
    /// Create an average over `window` samples, initially filled with
    /// zeros.
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            samples: vec![0; window],
            index: 0,
            sum: 0,
            seeded: false,
        }
    }

    /// Push a sample and return the new average (integer division).
    pub fn push(&mut self, value: u32) -> u32 {
        // First real sample seeds the whole window so startup does not
        // ramp from zero over 20 polls.
        if !self.seeded {
            self.seed(value);
            return value;
        }
        self.sum -= self.samples[self.index];
        self.samples[self.index] = value;
        self.sum += value;
        self.index = (self.index + 1) % self.samples.len();
        self.sum / self.samples.len() as u32
    }

    /// Fill the window with `value`.
    pub fn seed(&mut self, value: u32) {
        for slot in &mut self.samples {
            *slot = value;
        }
        self.sum = value * self.samples.len() as u32;
        self.index = 0;
        self.seeded = true;
    }

    /// Current average without pushing a sample.
    pub fn current(&self) -> u32 {
        self.sum / self.samples.len() as u32
    }

    /// Window size in samples.
    pub fn window(&self) -> usize {
        self.samples.len()
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_seeds_window() {
        let mut avg = MovingAverage::new(20);
        assert_eq!(avg.push(50), 50);
        assert_eq!(avg.current(), 50);
    }

    #[test]
    fn test_idempotent_convergence() {
        let mut avg = MovingAverage::new(20);
        avg.seed(10);
        let mut out = 0;
        for _ in 0..20 {
            out = avg.push(90);
        }
        assert_eq!(out, 90);
    }

    #[test]
    fn test_single_outlier_damped() {
        let mut avg = MovingAverage::new(20);
        avg.seed(50);
        // One sample 19 points high moves the average by less than 1.
        let out = avg.push(69);
        assert_eq!(out, 50);
    }

    #[test]
    fn test_window_of_one_tracks_input() {
        let mut avg = MovingAverage::new(1);
        avg.seed(0);
        assert_eq!(avg.push(42), 42);
        assert_eq!(avg.push(7), 7);
    }

    #[test]
    fn test_zero_window_clamped_to_one() {
        let avg = MovingAverage::new(0);
        assert_eq!(avg.window(), 1);
    }

    #[test]
    fn test_partial_convergence() {
        let mut avg = MovingAverage::new(4);
        avg.seed(0);
        avg.push(100);
        avg.push(100);
        // (0 + 0 + 100 + 100) / 4
        assert_eq!(avg.current(), 50);
    }
}
