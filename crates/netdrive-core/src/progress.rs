use crate::drives::DriveRecord;
use crate::engine::{DriveOutcome, RunReport};

/// Trait for reporting reconciliation progress.
///
/// The CLI prints one line per drive; tests and silent runs use `SilentReporter`.
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_run_start(&self, _drive_count: usize) {}
    fn on_drive_complete(&self, _drive: &DriveRecord, _outcome: &DriveOutcome) {}
    fn on_run_complete(&self, _report: &RunReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
