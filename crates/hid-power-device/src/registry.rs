//! Owned storage for HID feature reports.

use deckpower_errors::{PowerError, PowerResult};

/// One feature report: an id, its current bytes and a lock flag.
///
/// Locked reports reject host writes; the device keeps updating them
/// through [`FeatureRegistry::overwrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureReport {
    id: u16,
    data: Vec<u8>,
    locked: bool,
}

impl FeatureReport {
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

/// Insertion-ordered feature-report table.
///
/// Registration happens once per id at startup; the order of first
/// registration is stable and observable through [`FeatureRegistry::iter`].
/// The table is small (a couple dozen entries), so lookup is a linear
/// scan.
#[derive(Debug, Clone, Default)]
pub struct FeatureRegistry {
    reports: Vec<FeatureReport>,
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a feature report, or leave an existing one untouched.
    ///
    /// Returns the report's position in registration order. Registering
    /// an id twice does not overwrite the stored bytes; use
    /// [`FeatureRegistry::overwrite`] for device-side updates.
    pub fn set_feature(&mut self, id: u16, data: &[u8]) -> usize {
        if let Some(pos) = self.position(id) {
            return pos;
        }
        self.reports.push(FeatureReport {
            id,
            data: data.to_vec(),
            locked: false,
        });
        self.reports.len() - 1
    }

    /// Device-side update of an already-registered report.
    ///
    /// The new payload must match the registered length; feature report
    /// sizes are fixed by the descriptor and never change at runtime.
    pub fn overwrite(&mut self, id: u16, data: &[u8]) -> PowerResult<()> {
        let report = self
            .reports
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(PowerError::UnknownReport(id))?;
        if data.len() != report.data.len() {
            return Err(PowerError::violation(format!(
                "feature {:#06x} is {} bytes, got {}",
                id,
                report.data.len(),
                data.len()
            )));
        }
        report.data.copy_from_slice(data);
        Ok(())
    }

    /// Host-side write (SET_REPORT). Locked reports are rejected.
    pub fn write(&mut self, id: u16, data: &[u8]) -> PowerResult<()> {
        let locked = self
            .feature(id)
            .ok_or(PowerError::UnknownReport(id))?
            .is_locked();
        if locked {
            return Err(PowerError::violation(format!(
                "feature {:#06x} is read-only",
                id
            )));
        }
        self.overwrite(id, data)
    }

    pub fn feature(&self, id: u16) -> Option<&FeatureReport> {
        self.reports.iter().find(|r| r.id == id)
    }

    /// Set or clear the host-write lock. Returns false for unknown ids.
    pub fn lock_feature(&mut self, id: u16, locked: bool) -> bool {
        match self.reports.iter_mut().find(|r| r.id == id) {
            Some(report) => {
                report.locked = locked;
                true
            }
            None => false,
        }
    }

    fn position(&self, id: u16) -> Option<usize> {
        self.reports.iter().position(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureReport> {
        self.reports.iter()
    }
}
