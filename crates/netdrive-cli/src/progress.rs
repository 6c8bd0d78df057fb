use colored::*;
use netdrive_core::{DriveOutcome, DriveRecord, ProgressReporter, RunReport};

/// Prints one line per drive and a closing summary to stderr.
pub struct CliReporter {
    enabled: bool,
}

impl CliReporter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

fn describe(outcome: &DriveOutcome) -> ColoredString {
    match outcome {
        DriveOutcome::Recorded { new_mapping: true } => "new mapping".green(),
        DriveOutcome::Recorded { new_mapping: false } => "seen".green(),
        DriveOutcome::ServerBlacklisted { unmapped: true } => "server blacklisted, unmapped".yellow(),
        DriveOutcome::ShareBlacklisted { unmapped: true } => "share blacklisted, unmapped".yellow(),
        DriveOutcome::ServerBlacklisted { unmapped: false }
        | DriveOutcome::ShareBlacklisted { unmapped: false } => "blacklisted, unmap FAILED".red(),
        DriveOutcome::Duplicate => "duplicate, not recorded".dimmed(),
        DriveOutcome::DnsFailed(reason) => format!("skipped, {}", reason).cyan(),
        DriveOutcome::Malformed(reason) => format!("skipped, {}", reason).cyan(),
        DriveOutcome::Failed(reason) => format!("error, {}", reason).red(),
    }
}

impl ProgressReporter for CliReporter {
    fn on_run_start(&self, drive_count: usize) {
        if self.enabled {
            eprintln!("Reconciling {} mapped drive(s)", drive_count);
        }
    }

    fn on_drive_complete(&self, drive: &DriveRecord, outcome: &DriveOutcome) {
        if self.enabled {
            eprintln!(
                "  {} {:<4} {} ({})",
                "•".dimmed(),
                drive.local_name,
                drive.remote_name,
                describe(outcome)
            );
        }
    }

    fn on_run_complete(&self, report: &RunReport) {
        if !self.enabled {
            return;
        }
        eprintln!(
            "  {} {} recorded ({} new, {} duplicate), {} unmapped, {} skipped, {} failed in {:.2}s",
            "✓".green(),
            format!("{}", report.recorded).green(),
            report.new_mappings,
            report.duplicates,
            format!("{}", report.unmapped).yellow(),
            report.dns_skipped + report.malformed,
            format!("{}", report.failed + report.unmap_failures).red(),
            report.duration.as_secs_f64()
        );
    }
}
