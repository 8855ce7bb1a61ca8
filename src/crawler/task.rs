//! Execution of a single crawl task
//!
//! A task renders one destination under a deadline, writes its artifacts
//! if the render succeeded, and appends the outcome to the log. Nothing a
//! task does can fail another task.

use crate::output::{ArtifactWriter, OutcomeLog, OutcomeRecord};
use crate::render::{RenderError, RenderResult, Renderer};
use crate::state::TaskStatus;
use crate::target::Destination;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Detail recorded for a successful task
pub const SUCCESS_DETAIL: &str = "Saved HTML, IMG, URLs";

/// Read-only environment shared by every worker of a run
pub struct TaskContext {
    renderer: Arc<dyn Renderer>,
    writer: ArtifactWriter,
    log: Arc<OutcomeLog>,
    deadline: Duration,
    shutdown: CancellationToken,
}

impl TaskContext {
    /// Creates the environment for a run
    ///
    /// # Arguments
    ///
    /// * `renderer` - Renderer shared by all tasks
    /// * `writer` - Artifact writer for successful renders
    /// * `log` - Outcome log every task appends to
    /// * `deadline` - Time budget for a single render
    /// * `shutdown` - Parent token; each task derives its own child
    pub fn new(
        renderer: Arc<dyn Renderer>,
        writer: ArtifactWriter,
        log: Arc<OutcomeLog>,
        deadline: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            renderer,
            writer,
            log,
            deadline,
            shutdown,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Runs one task to completion and returns its outcome
///
/// # Task Flow
///
/// 1. Render the destination's normalized URL under the deadline
/// 2. On render failure, record FAIL and write nothing
/// 3. On success, write all three artifacts
/// 4. Record SUCCESS, or FAIL if any artifact write failed
/// 5. Append the record to the outcome log
pub async fn execute_task(ctx: &TaskContext, destination: &Destination) -> OutcomeRecord {
    let record = match render_with_deadline(ctx, destination).await {
        Ok(result) => match ctx.writer.write(destination, &result).await {
            Ok(_) => {
                tracing::info!("COMPLETED: {}", destination);
                OutcomeRecord::now(destination, TaskStatus::Success, SUCCESS_DETAIL)
            }
            Err(e) => {
                tracing::warn!("ERROR: {} ({})", destination, e);
                OutcomeRecord::now(destination, TaskStatus::Fail, e.to_string())
            }
        },
        Err(e) => {
            tracing::warn!("ERROR: {} ({})", destination, e);
            OutcomeRecord::now(destination, TaskStatus::Fail, e.to_string())
        }
    };

    ctx.log.record(&record).await;
    record
}

/// Calls the renderer, bounded by the task deadline and the shutdown token
///
/// Dropping the render future is what aborts it, for both the deadline and
/// cancellation. A run that is already shutting down skips the call.
async fn render_with_deadline(
    ctx: &TaskContext,
    destination: &Destination,
) -> Result<RenderResult, RenderError> {
    let token = ctx.shutdown.child_token();
    let render = tokio::time::timeout(ctx.deadline, ctx.renderer.render(destination.url()));

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RenderError::Cancelled),
        outcome = render => outcome.unwrap_or_else(|_| Err(RenderError::Timeout(ctx.deadline))),
    }
}
