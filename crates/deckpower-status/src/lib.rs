//! Present-status flag derivation for the HID Power Device reports.
//!
//! The host-visible power state is a 16-bit field with one bit per named
//! condition, following the USB Power Device usage model. The field is
//! derived, never stored: [`derive_present_status`] is a pure function of
//! the current [`BatteryStatus`], the latched battery-seen flag, the
//! runtime-to-empty estimate and the shutdown timer.

mod flags;
mod timer;

pub use flags::PresentStatus;
pub use timer::{RuntimeConfig, ShutdownTimer};

use deckpower_estimator::BatteryStatus;

/// Derive the present-status bitfield for one control-loop cycle.
///
/// Nothing here latches across cycles except through the inputs: the
/// shutdown-imminent bit in particular is a plain OR of two independent
/// triggers and is recomputed every call.
pub fn derive_present_status(
    status: &BatteryStatus,
    battery_seen: bool,
    runtime_to_empty_s: u16,
    timer: &ShutdownTimer,
) -> PresentStatus {
    let mut flags = PresentStatus::empty();

    flags.assign(PresentStatus::CHARGING, status.is_charging);
    flags.assign(PresentStatus::AC_PRESENT, status.is_ac_present);

    // Full charge is a charge-side condition; a full pack sitting on
    // battery power is just a fresh discharge.
    flags.assign(
        PresentStatus::FULL_CHARGE,
        status.is_charging && status.capacity_pct == 100,
    );

    if status.is_discharging {
        flags.set(PresentStatus::DISCHARGING);
        flags.assign(
            PresentStatus::RTL_EXPIRED,
            runtime_to_empty_s < timer.remain_time_limit_s,
        );
    }

    flags.assign(PresentStatus::SHUTDOWN_REQUESTED, timer.shutdown_requested());
    flags.assign(
        PresentStatus::SHUTDOWN_IMMINENT,
        flags.contains(PresentStatus::SHUTDOWN_REQUESTED) || flags.contains(PresentStatus::RTL_EXPIRED),
    );

    flags.assign(PresentStatus::BATTERY_PRESENT, battery_seen);

    flags
}

/// Estimate seconds of runtime left from the average-time-to-empty
/// baseline and the current capacity.
///
/// Units are seconds throughout; the baseline defaults to two hours at
/// full charge. (Earlier firmware snapshots disagreed on minutes vs.
/// seconds; this crate standardizes on seconds, matching the values the
/// descriptor advertises.)
pub fn runtime_to_empty_s(config: &RuntimeConfig, capacity_pct: u8) -> u16 {
    let capacity = u32::from(capacity_pct.min(100));
    (u32::from(config.avg_time_to_empty_s) * capacity / 100) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discharging_status(capacity_pct: u8) -> BatteryStatus {
        BatteryStatus {
            voltage_mv: 10_800,
            current_ma: -500,
            capacity_pct,
            temperature_c: 25,
            is_charging: false,
            is_ac_present: false,
            is_discharging: true,
            is_connected: true,
            last_update_ms: 0,
        }
    }

    fn charging_status(capacity_pct: u8) -> BatteryStatus {
        BatteryStatus {
            voltage_mv: 12_400,
            current_ma: 800,
            capacity_pct,
            temperature_c: 25,
            is_charging: true,
            is_ac_present: true,
            is_discharging: false,
            is_connected: true,
            last_update_ms: 0,
        }
    }

    #[test]
    fn test_full_charge_while_charging() {
        // 100% while charging -> charging + full charge set,
        // discharging clear.
        let flags = derive_present_status(&charging_status(100), true, 7200, &ShutdownTimer::default());
        assert!(flags.contains(PresentStatus::CHARGING));
        assert!(flags.contains(PresentStatus::FULL_CHARGE));
        assert!(flags.contains(PresentStatus::AC_PRESENT));
        assert!(!flags.contains(PresentStatus::DISCHARGING));
    }

    #[test]
    fn test_full_capacity_on_battery_is_not_full_charge() {
        let flags = derive_present_status(&discharging_status(100), true, 7200, &ShutdownTimer::default());
        assert!(!flags.contains(PresentStatus::FULL_CHARGE));
        assert!(flags.contains(PresentStatus::DISCHARGING));
    }

    #[test]
    fn test_rtl_expired_only_while_discharging() {
        let timer = ShutdownTimer::default();

        let flags = derive_present_status(&discharging_status(4), true, 300, &timer);
        assert!(flags.contains(PresentStatus::RTL_EXPIRED));
        assert!(flags.contains(PresentStatus::SHUTDOWN_IMMINENT));

        // Same runtime figure while charging: both clear.
        let flags = derive_present_status(&charging_status(4), true, 300, &timer);
        assert!(!flags.contains(PresentStatus::RTL_EXPIRED));
        assert!(!flags.contains(PresentStatus::SHUTDOWN_IMMINENT));
    }

    #[test]
    fn test_shutdown_request_triggers_imminent() {
        let mut timer = ShutdownTimer::default();
        timer.request_shutdown(30);

        let flags = derive_present_status(&charging_status(80), true, 7200, &timer);
        assert!(flags.contains(PresentStatus::SHUTDOWN_REQUESTED));
        assert!(flags.contains(PresentStatus::SHUTDOWN_IMMINENT));
        assert!(!flags.contains(PresentStatus::RTL_EXPIRED));
    }

    #[test]
    fn test_imminent_clears_when_triggers_clear() {
        let mut timer = ShutdownTimer::default();
        timer.request_shutdown(30);
        let armed = derive_present_status(&charging_status(80), true, 7200, &timer);
        assert!(armed.contains(PresentStatus::SHUTDOWN_IMMINENT));

        timer.cancel_shutdown();
        let cleared = derive_present_status(&charging_status(80), true, 7200, &timer);
        assert!(!cleared.contains(PresentStatus::SHUTDOWN_IMMINENT));
    }

    #[test]
    fn test_battery_present_follows_latch() {
        let flags = derive_present_status(&discharging_status(50), false, 3600, &ShutdownTimer::default());
        assert!(!flags.contains(PresentStatus::BATTERY_PRESENT));

        let flags = derive_present_status(&discharging_status(50), true, 3600, &ShutdownTimer::default());
        assert!(flags.contains(PresentStatus::BATTERY_PRESENT));
    }

    #[test]
    fn test_runtime_to_empty_scaling() {
        let config = RuntimeConfig::default();
        assert_eq!(runtime_to_empty_s(&config, 100), 7200);
        assert_eq!(runtime_to_empty_s(&config, 50), 3600);
        assert_eq!(runtime_to_empty_s(&config, 0), 0);
        // Out-of-range capacity clamps rather than overflowing.
        assert_eq!(runtime_to_empty_s(&config, 255), 7200);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// The imminent bit is exactly the OR of its two triggers,
            /// whatever the rest of the state looks like.
            #[test]
            fn prop_imminent_is_or_of_triggers(
                capacity in 0u8..=100,
                runtime in any::<u16>(),
                discharging in any::<bool>(),
                delay in any::<i16>(),
                limit in any::<u16>(),
            ) {
                let mut status = discharging_status(capacity);
                status.is_discharging = discharging;
                let timer = ShutdownTimer {
                    delay_before_shutdown_s: delay,
                    delay_before_reboot_s: -1,
                    remain_time_limit_s: limit,
                };
                let flags = derive_present_status(&status, true, runtime, &timer);
                let requested = flags.contains(PresentStatus::SHUTDOWN_REQUESTED);
                let expired = flags.contains(PresentStatus::RTL_EXPIRED);
                prop_assert_eq!(
                    flags.contains(PresentStatus::SHUTDOWN_IMMINENT),
                    requested || expired
                );
                prop_assert_eq!(requested, delay > 0);
                prop_assert_eq!(expired, discharging && runtime < limit);
            }

            /// Runtime scaling stays within the baseline and is monotone
            /// in capacity.
            #[test]
            fn prop_runtime_monotone(a in 0u8..=100, b in 0u8..=100) {
                let config = RuntimeConfig::default();
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                prop_assert!(runtime_to_empty_s(&config, lo) <= runtime_to_empty_s(&config, hi));
                prop_assert!(runtime_to_empty_s(&config, hi) <= config.avg_time_to_empty_s);
            }
        }
    }
}
