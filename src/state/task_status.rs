/// Final status definitions for crawl tasks
use std::fmt;

/// Represents how a single crawl task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// The page rendered and all three artifacts were written
    Success,

    /// The render failed, timed out, was cancelled, or an artifact write failed
    Fail,
}

impl TaskStatus {
    /// Converts the status to its outcome log representation
    pub fn as_log_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Fail => "FAIL",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_log_str())
    }
}
