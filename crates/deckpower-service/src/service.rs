//! The tick-driven power service.

use deckpower_errors::{PowerError, PowerResult};
use deckpower_estimator::{BatteryStatus, StateEstimator};
use deckpower_hid_power_device::consts::{feature_id, string_id};
use deckpower_hid_power_device::{
    ControlReply, InterfaceConfig, PowerDeviceDriver, SetupPacket, UsbBus,
};
use deckpower_indicator::{IndicatorController, LedOutput};
use deckpower_reporting::{PowerSummary, ReportDecision, ReportingScheduler, encode};
use deckpower_status::{PresentStatus, ShutdownTimer, derive_present_status, runtime_to_empty_s};
use tracing::{debug, info, warn};

use crate::config::ServiceConfig;
use crate::transport::{LedSink, RegisterTransport};

/// What one call to [`PowerService::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// The battery status the tick worked from.
    pub status: BatteryStatus,
    /// The derived present-status flags.
    pub flags: PresentStatus,
    /// Whether a report went out on the interrupt endpoint.
    pub report_sent: bool,
    /// The LED frame pushed this tick, if the indicator cadence fired.
    pub led: Option<LedOutput>,
}

/// Owns and sequences every component of the power subsystem.
///
/// Within one tick the order is fixed: register read, estimation, flag
/// derivation, indicator, scheduling, transmission. Host control
/// requests come in through [`PowerService::handle_control`] between
/// ticks, from the same thread.
pub struct PowerService<R: RegisterTransport, B: UsbBus, L: LedSink> {
    config: ServiceConfig,
    registers: R,
    led: L,
    driver: PowerDeviceDriver<B>,
    estimator: StateEstimator,
    scheduler: ReportingScheduler,
    indicator: IndicatorController,
    timer: ShutdownTimer,
    status: BatteryStatus,
    last_read_ms: Option<u64>,
    last_indicator_ms: Option<u64>,
}

impl<R: RegisterTransport, B: UsbBus, L: LedSink> PowerService<R, B, L> {
    /// Wire up the subsystem and register the static feature reports.
    pub fn new(config: ServiceConfig, registers: R, bus: B, led: L) -> Self {
        let mut driver = PowerDeviceDriver::new(
            bus,
            config.descriptor_layout,
            InterfaceConfig::default(),
        );
        if !config.identity.serial.is_empty() {
            driver.set_serial(config.identity.serial.clone());
        }

        let mut service = Self {
            estimator: StateEstimator::new(config.estimator),
            scheduler: ReportingScheduler::new(config.scheduler),
            indicator: IndicatorController::new(config.indicator),
            timer: config.shutdown,
            status: BatteryStatus::disconnected(),
            last_read_ms: None,
            last_indicator_ms: None,
            config,
            registers,
            led,
            driver,
        };
        service.register_static_features();
        info!(
            name = %service.driver.short_name(),
            descriptor_len = service.driver.descriptors().total_len(),
            "power service initialized"
        );
        service
    }

    /// Populate the feature registry with everything the host can query.
    ///
    /// Telemetry mirrors (capacity, runtime, status, voltage) are locked:
    /// the device overwrites them every tick and host writes would be
    /// overridden within a second anyway. The shutdown machinery and the
    /// alarm stay writable.
    fn register_static_features(&mut self) {
        let identity = self.config.identity.clone();
        self.driver.set_string_feature(string_id::PRODUCT, &identity.product);
        self.driver.set_string_feature(string_id::SERIAL, &identity.serial);
        self.driver
            .set_string_feature(string_id::MANUFACTURER, &identity.manufacturer);
        self.driver
            .set_string_feature(string_id::DEVICE_CHEMISTRY, &identity.chemistry);
        self.driver
            .set_string_feature(string_id::OEM_VENDOR, &identity.oem_vendor);

        let locked = [
            (feature_id::REMAINING_CAPACITY, vec![0u8]),
            (feature_id::RUNTIME_TO_EMPTY, vec![0, 0]),
            (feature_id::PRESENT_STATUS, vec![0, 0]),
            (feature_id::VOLTAGE, vec![0, 0]),
        ];
        for (id, bytes) in locked {
            self.driver.set_feature(id, &bytes);
            self.driver.lock_feature(id, true);
        }

        let config_voltage_mv = self.config.estimator.cells_in_series.min(8) * 4_200;
        let runtime = self.config.runtime;
        let fixed: [(u16, Vec<u8>); 10] = [
            (feature_id::RECHARGEABLE, vec![1]),
            (feature_id::CAPACITY_MODE, vec![2]), // percent
            (feature_id::DESIGN_CAPACITY, vec![100]),
            (feature_id::FULL_CHARGE_CAPACITY, vec![100]),
            (feature_id::WARN_CAPACITY_LIMIT, vec![10]),
            (feature_id::REMAINING_CAPACITY_LIMIT, vec![5]),
            (feature_id::CAPACITY_GRANULARITY_1, vec![1]),
            (feature_id::CAPACITY_GRANULARITY_2, vec![1]),
            (feature_id::CONFIG_VOLTAGE, config_voltage_mv.to_le_bytes().to_vec()),
            (
                feature_id::AVERAGE_TIME_TO_FULL,
                runtime.avg_time_to_full_s.to_le_bytes().to_vec(),
            ),
        ];
        for (id, bytes) in fixed {
            self.driver.set_feature(id, &bytes);
        }
        self.driver.set_feature(
            feature_id::AVERAGE_TIME_TO_EMPTY,
            &runtime.avg_time_to_empty_s.to_le_bytes(),
        );

        // Host-writable shutdown machinery and alarm control.
        self.driver.set_feature(
            feature_id::REMAIN_TIME_LIMIT,
            &self.timer.remain_time_limit_s.to_le_bytes(),
        );
        self.driver.set_feature(
            feature_id::DELAY_BEFORE_SHUTDOWN,
            &self.timer.delay_before_shutdown_s.to_le_bytes(),
        );
        self.driver.set_feature(
            feature_id::DELAY_BEFORE_REBOOT,
            &self.timer.delay_before_reboot_s.to_le_bytes(),
        );
        self.driver
            .set_feature(feature_id::AUDIBLE_ALARM_CONTROL, &[2]); // disabled
    }

    /// The device finished enumeration; arms the reporting gate.
    pub fn on_configured(&mut self, now_ms: u64) {
        self.driver.on_configured();
        self.scheduler.note_configured(now_ms);
    }

    pub fn on_address_assigned(&mut self) {
        self.driver.on_address_assigned();
    }

    /// Bus reset: the driver re-enumerates and reporting disarms.
    pub fn on_bus_reset(&mut self) {
        self.driver.on_bus_reset();
        self.scheduler.reset();
    }

    /// Service a host control request, then absorb any settings the host
    /// may have rewritten.
    pub fn handle_control(
        &mut self,
        setup: &SetupPacket,
        payload: &[u8],
    ) -> PowerResult<Option<ControlReply>> {
        let reply = self.driver.handle_setup(setup, payload)?;
        if matches!(reply, Some(ControlReply::Ack)) {
            self.absorb_host_settings();
        }
        Ok(reply)
    }

    /// Pull the writable feature reports back into the shutdown timer.
    fn absorb_host_settings(&mut self) {
        if let Some(bytes) = self.driver.feature(feature_id::DELAY_BEFORE_SHUTDOWN)
            && let Ok(raw) = <[u8; 2]>::try_from(bytes)
        {
            let delay = i16::from_le_bytes(raw);
            if delay != self.timer.delay_before_shutdown_s {
                info!(delay_s = delay, "host rewrote shutdown delay");
                self.timer.delay_before_shutdown_s = delay;
            }
        }
        if let Some(bytes) = self.driver.feature(feature_id::DELAY_BEFORE_REBOOT)
            && let Ok(raw) = <[u8; 2]>::try_from(bytes)
        {
            self.timer.delay_before_reboot_s = i16::from_le_bytes(raw);
        }
        if let Some(bytes) = self.driver.feature(feature_id::REMAIN_TIME_LIMIT)
            && let Ok(raw) = <[u8; 2]>::try_from(bytes)
        {
            self.timer.remain_time_limit_s = u16::from_le_bytes(raw);
        }
    }

    /// One pass of the control loop.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if self.read_due(now_ms) {
            self.last_read_ms = Some(now_ms);
            self.poll_registers(now_ms);
        }

        let runtime = runtime_to_empty_s(&self.config.runtime, self.status.capacity_pct);
        let flags = derive_present_status(
            &self.status,
            self.estimator.has_seen_battery(),
            runtime,
            &self.timer,
        );
        let summary = PowerSummary {
            capacity_pct: self.status.capacity_pct,
            runtime_to_empty_s: runtime,
            status: flags,
        };
        self.mirror_telemetry_features(runtime, flags);

        let led = if self.indicator_due(now_ms) {
            self.last_indicator_ms = Some(now_ms);
            let frame = self.indicator.tick(now_ms, &self.status);
            self.led.set_led(frame);
            Some(frame)
        } else {
            None
        };

        let report_sent = self.driver.is_configured()
            && self.scheduler.poll(now_ms, &summary) == ReportDecision::Send
            && self.transmit(now_ms, &summary);

        TickOutcome {
            status: self.status,
            flags,
            report_sent,
            led,
        }
    }

    fn poll_registers(&mut self, now_ms: u64) {
        match self.registers.read_registers() {
            Ok(snapshot) => match self.estimator.update(&snapshot, now_ms) {
                Ok(status) => {
                    self.status = status;
                    self.scheduler.record_read_success();
                }
                Err(PowerError::NoBattery) => {
                    // A valid read of an absent pack: disconnected, but
                    // not a transport problem, so no cadence change.
                    self.status = *self.estimator.last_status();
                }
                Err(err) => {
                    warn!(%err, "estimation failed");
                    self.status.is_connected = false;
                }
            },
            Err(err) => {
                warn!(%err, "register read failed");
                self.status.is_connected = false;
                self.scheduler.record_read_failure();
            }
        }
    }

    /// Keep the host-queryable telemetry features in step with the
    /// summary the interrupt reports carry.
    fn mirror_telemetry_features(&mut self, runtime_s: u16, flags: PresentStatus) {
        let updates: [(u16, Vec<u8>); 4] = [
            (feature_id::REMAINING_CAPACITY, vec![self.status.capacity_pct]),
            (feature_id::RUNTIME_TO_EMPTY, runtime_s.to_le_bytes().to_vec()),
            (feature_id::PRESENT_STATUS, flags.bits().to_le_bytes().to_vec()),
            (feature_id::VOLTAGE, self.status.voltage_mv.to_le_bytes().to_vec()),
        ];
        for (id, bytes) in updates {
            if let Err(err) = self.driver.update_feature(id, &bytes) {
                // Lengths are fixed at registration; this indicates a bug.
                warn!(%err, id, "telemetry feature mirror failed");
            }
        }
    }

    fn transmit(&mut self, now_ms: u64, summary: &PowerSummary) -> bool {
        for frame in encode(summary, self.config.report_layout) {
            if let Err(err) = self.driver.send_report(frame.id, &frame.payload) {
                warn!(%err, id = frame.id, "report transmission failed");
                self.scheduler.mark_transport_failure(now_ms);
                return false;
            }
        }
        self.scheduler.mark_sent(now_ms, summary);
        debug!(
            capacity = summary.capacity_pct,
            runtime_s = summary.runtime_to_empty_s,
            status = summary.status.bits(),
            "power summary sent"
        );
        true
    }

    fn read_due(&self, now_ms: u64) -> bool {
        self.last_read_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.config.read_interval_ms)
    }

    fn indicator_due(&self, now_ms: u64) -> bool {
        self.last_indicator_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= self.config.indicator_interval_ms)
    }

    /// The latest battery status the pipeline worked from.
    pub fn status(&self) -> &BatteryStatus {
        &self.status
    }

    /// The shutdown timer as last written by the host.
    pub fn shutdown_timer(&self) -> &ShutdownTimer {
        &self.timer
    }

    pub fn driver(&self) -> &PowerDeviceDriver<B> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut PowerDeviceDriver<B> {
        &mut self.driver
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.registers
    }

    pub fn led_sink(&self) -> &L {
        &self.led
    }
}
