//! In-memory log of every photo report generated this process lifetime.
//!
//! The capture surface renders this list filtered to the current project.
//! Reports that were generated but never delivered stay visible here, so the
//! user's data survives a routing failure.  Volatile by design, like the
//! rest of the core.

use std::sync::{Mutex, PoisonError};

use sitewire_shared::model::PhotoReport;
use sitewire_shared::types::ProjectId;

/// Append-only report log, newest first.
pub struct ReportHistory {
    reports: Mutex<Vec<PhotoReport>>,
}

impl ReportHistory {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Record a freshly generated report.
    pub fn record(&self, report: PhotoReport) {
        self.lock().insert(0, report);
    }

    /// Snapshot of all reports, newest first.
    pub fn all(&self) -> Vec<PhotoReport> {
        self.lock().clone()
    }

    /// Snapshot of the reports captured for one project, newest first.
    pub fn for_project(&self, project_id: ProjectId) -> Vec<PhotoReport> {
        self.lock()
            .iter()
            .filter(|r| r.project_id == Some(project_id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PhotoReport>> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ReportHistory {
    fn default() -> Self {
        Self::new()
    }
}
