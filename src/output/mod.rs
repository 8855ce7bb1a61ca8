//! Output module for persisting crawl results
//!
//! This module handles:
//! - Writing the markup, screenshot and link list of each rendered page
//! - Appending one outcome line per task to the shared log
//! - Summarizing a finished run

mod artifacts;
mod outcome_log;
mod report;

pub use artifacts::{ArtifactSet, ArtifactWriter, HTML_DIR, IMAGE_DIR, LINKS_DIR};
pub use outcome_log::{OutcomeLog, OutcomeRecord};
pub use report::{print_report, CrawlReport};
