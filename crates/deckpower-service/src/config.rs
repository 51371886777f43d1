//! Aggregated service configuration.

use deckpower_estimator::EstimatorConfig;
use deckpower_hid_power_device::DescriptorLayout;
use deckpower_indicator::IndicatorConfig;
use deckpower_reporting::{ReportLayout, SchedulerConfig};
use deckpower_status::{RuntimeConfig, ShutdownTimer};
use serde::{Deserialize, Serialize};

/// Strings advertised during enumeration and via string features.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceIdentity {
    pub product: String,
    /// Serial number; empty means the driver derives a placeholder name.
    pub serial: String,
    pub manufacturer: String,
    pub oem_vendor: String,
    /// Battery chemistry string advertised to the host power stack.
    pub chemistry: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            product: "DeckPower UPS".to_string(),
            serial: String::new(),
            manufacturer: "DeckPower".to_string(),
            oem_vendor: "DeckPower".to_string(),
            chemistry: "LiP".to_string(),
        }
    }
}

/// Everything the service needs, one section per component.
///
/// Every section has complete defaults, so `{}` is a valid JSON config
/// and partial files override only what they mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub estimator: EstimatorConfig,
    pub scheduler: SchedulerConfig,
    pub indicator: IndicatorConfig,
    pub runtime: RuntimeConfig,
    /// Initial shutdown-timer values; the host rewrites them at runtime
    /// through the writable feature reports.
    pub shutdown: ShutdownTimer,
    pub report_layout: ReportLayout,
    pub descriptor_layout: DescriptorLayout,
    /// Register poll cadence.
    pub read_interval_ms: u64,
    /// LED refresh cadence.
    pub indicator_interval_ms: u64,
    pub identity: DeviceIdentity,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            estimator: EstimatorConfig::default(),
            scheduler: SchedulerConfig::default(),
            indicator: IndicatorConfig::default(),
            runtime: RuntimeConfig::default(),
            shutdown: ShutdownTimer::default(),
            report_layout: ReportLayout::default(),
            descriptor_layout: DescriptorLayout::default(),
            read_interval_ms: 1_000,
            indicator_interval_ms: 50,
            identity: DeviceIdentity::default(),
        }
    }
}
