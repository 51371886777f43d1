//! Encoding of the power summary into interrupt-report frames.

use deckpower_hid_power_device::consts::report_id;
use deckpower_status::PresentStatus;

/// The three host-visible values every report cycle publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerSummary {
    /// Remaining capacity, 0..=100 percent.
    pub capacity_pct: u8,
    /// Runtime to empty in seconds.
    pub runtime_to_empty_s: u16,
    /// Present-status bitfield.
    pub status: PresentStatus,
}

impl PowerSummary {
    /// A canonical byte image of the summary, used by the scheduler for
    /// change detection. Stable across layouts: the same summary has the
    /// same fingerprint no matter how it is framed on the wire.
    pub fn fingerprint(&self) -> [u8; 5] {
        let rt = self.runtime_to_empty_s.to_le_bytes();
        let st = self.status.bits().to_le_bytes();
        [self.capacity_pct, rt[0], rt[1], st[0], st[1]]
    }
}

/// How the summary is framed on the interrupt endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportLayout {
    /// All three fields in one report under the capacity report id.
    #[default]
    Combined,
    /// One report per field, three ids.
    SplitPerField,
}

/// One interrupt report: id plus payload, id not yet prepended (the
/// driver sends the id byte as its own transfer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFrame {
    pub id: u16,
    pub payload: Vec<u8>,
}

/// Frame a summary for the wire.
///
/// Field order inside the combined frame is capacity, runtime, status,
/// all multi-byte values little-endian. Hosts parse this layout by
/// offset, so it never changes shape.
pub fn encode(summary: &PowerSummary, layout: ReportLayout) -> Vec<ReportFrame> {
    let rt = summary.runtime_to_empty_s.to_le_bytes();
    let st = summary.status.bits().to_le_bytes();
    match layout {
        ReportLayout::Combined => vec![ReportFrame {
            id: report_id::POWER_REMAINING,
            payload: vec![summary.capacity_pct, rt[0], rt[1], st[0], st[1]],
        }],
        ReportLayout::SplitPerField => vec![
            ReportFrame {
                id: report_id::POWER_REMAINING,
                payload: vec![summary.capacity_pct],
            },
            ReportFrame {
                id: report_id::POWER_RUNTIME,
                payload: rt.to_vec(),
            },
            ReportFrame {
                id: report_id::POWER_STATUS,
                payload: st.to_vec(),
            },
        ],
    }
}
