//! Open-circuit-voltage lookup curves.
//!
//! Two calibration curves map rest voltage to state of charge: one taken
//! at light load (~0.8 A) and one at heavy load (~2 A). Each is an
//! ordered list of (SoC %, millivolt) breakpoints, strictly increasing on
//! both axes. Lookup is piecewise-linear with endpoint clamping and
//! truncates to an integer percent, matching the device's reporting
//! granularity.

/// Number of breakpoints per curve.
pub const BREAKPOINTS: usize = 11;

/// Discharge current above which the heavy-load curve applies, in mA.
pub const HEAVY_LOAD_THRESHOLD_MA: u16 = 1200;

const SOC_PCT: [u16; BREAKPOINTS] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

const OCV_MV_LIGHT: [u16; BREAKPOINTS] = [
    2600, 3000, 3150, 3300, 3450, 3600, 3750, 3850, 3940, 4040, 4150,
];

const OCV_MV_HEAVY: [u16; BREAKPOINTS] = [
    2600, 2900, 3070, 3220, 3370, 3520, 3670, 3780, 3900, 3980, 4100,
];

/// A per-cell OCV-to-SoC calibration curve.
///
/// Immutable after construction. Values outside the breakpoint range
/// clamp to the nearest endpoint (0% or 100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcvCurve {
    soc_pct: [u16; BREAKPOINTS],
    ocv_mv: [u16; BREAKPOINTS],
}

impl OcvCurve {
    /// Build a curve from parallel breakpoint arrays.
    ///
    /// Callers are expected to supply axes that are strictly increasing;
    /// the built-in curves are, and [`OcvCurve::is_strictly_increasing`]
    /// exists so tests can assert it.
    pub const fn new(soc_pct: [u16; BREAKPOINTS], ocv_mv: [u16; BREAKPOINTS]) -> Self {
        Self { soc_pct, ocv_mv }
    }

    /// Interpolate state of charge for a rest voltage in millivolts.
    ///
    /// Piecewise-linear between breakpoints, clamped to the endpoints,
    /// truncated to an integer percent.
    pub fn soc_for_voltage(&self, v_rest_mv: u16) -> u8 {
        if v_rest_mv <= self.ocv_mv[0] {
            return self.soc_pct[0] as u8;
        }
        if v_rest_mv >= self.ocv_mv[BREAKPOINTS - 1] {
            return self.soc_pct[BREAKPOINTS - 1] as u8;
        }

        for i in 0..BREAKPOINTS - 1 {
            let v0 = self.ocv_mv[i];
            let v1 = self.ocv_mv[i + 1];
            if v_rest_mv >= v0 && v_rest_mv <= v1 {
                let t = f32::from(v_rest_mv - v0) / f32::from(v1 - v0);
                let span = self.soc_pct[i + 1] - self.soc_pct[i];
                return (self.soc_pct[i] + (t * f32::from(span)) as u16) as u8;
            }
        }

        self.soc_pct[BREAKPOINTS - 1] as u8
    }

    /// Check that both axes are strictly increasing.
    pub fn is_strictly_increasing(&self) -> bool {
        self.soc_pct.windows(2).all(|w| w[0] < w[1]) && self.ocv_mv.windows(2).all(|w| w[0] < w[1])
    }

    /// Lowest calibrated voltage, in mV.
    pub fn min_voltage_mv(&self) -> u16 {
        self.ocv_mv[0]
    }

    /// Highest calibrated voltage, in mV.
    pub fn max_voltage_mv(&self) -> u16 {
        self.ocv_mv[BREAKPOINTS - 1]
    }
}

/// The ~0.8 A calibration curve, used below the heavy-load threshold.
pub const fn light_load_curve() -> OcvCurve {
    OcvCurve::new(SOC_PCT, OCV_MV_LIGHT)
}

/// The ~2 A calibration curve, used above the heavy-load threshold.
pub const fn heavy_load_curve() -> OcvCurve {
    OcvCurve::new(SOC_PCT, OCV_MV_HEAVY)
}

/// Select the curve for a given discharge current.
pub fn curve_for_load(discharge_ma: u16) -> OcvCurve {
    if discharge_ma > HEAVY_LOAD_THRESHOLD_MA {
        heavy_load_curve()
    } else {
        light_load_curve()
    }
}
