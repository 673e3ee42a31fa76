//! Report aggregation across stages

use repomirror_types::{Report, ReportStatus};
use tracing::debug;

/// Collects the reports of every stage of a run
#[derive(Debug, Default)]
pub struct ReportAggregator {
    report: Report,
}

impl ReportAggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the report of one stage
    pub fn add(&mut self, stage: &str, report: Report) {
        if !report.is_empty() {
            debug!(
                "{}: {} items, {} errors, {} fatal",
                stage,
                report.len(),
                report.count(ReportStatus::Error),
                report.count(ReportStatus::Fatal)
            );
        }
        self.report.append(report);
    }

    /// Whether any stage reported an ERROR or FATAL item so far
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }

    /// The merged report, stably sorted by item name
    pub fn finish(self) -> Report {
        let mut report = self.report;
        report.sort_by_name();
        report
    }
}
