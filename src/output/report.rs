//! End-of-run report
//!
//! Collects the outcome of every task of one run and prints a summary.

use crate::output::OutcomeRecord;
use crate::state::TaskStatus;
use std::time::Duration;

/// Outcomes of a completed crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// One record per destination, in completion order
    pub records: Vec<OutcomeRecord>,

    /// Wall-clock time from dispatch to join
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Number of tasks that finished
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Number of tasks that ended in SUCCESS
    pub fn succeeded(&self) -> usize {
        self.count(TaskStatus::Success)
    }

    /// Number of tasks that ended in FAIL
    pub fn failed(&self) -> usize {
        self.count(TaskStatus::Fail)
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.records.is_empty() {
            return 0.0;
        }
        (self.succeeded() as f64 / self.total() as f64) * 100.0
    }

    /// Records of failed tasks, in completion order
    pub fn failures(&self) -> impl Iterator<Item = &OutcomeRecord> {
        self.records.iter().filter(|r| r.status == TaskStatus::Fail)
    }

    /// Looks up the record for a destination
    pub fn record_for(&self, destination: &str) -> Option<&OutcomeRecord> {
        self.records.iter().find(|r| r.destination == destination)
    }

    fn count(&self, status: TaskStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("\n=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Destinations: {}", report.total());
    println!("  Succeeded: {}", report.succeeded());
    println!("  Failed: {}", report.failed());
    println!("  Elapsed: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if report.failed() > 0 {
        println!("Failures:");
        for record in report.failures() {
            println!("  - {}: {}", record.destination, record.detail);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} destinations captured)",
        report.success_rate(),
        report.succeeded(),
        report.total()
    );
}
