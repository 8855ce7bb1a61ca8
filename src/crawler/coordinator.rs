//! Crawler coordinator - run orchestration
//!
//! A run moves through fixed phases:
//! - Init: gate on the anonymity check
//! - Bootstrap: create the output layout and load the target list
//! - Dispatch: start the worker pool and feed it every destination
//! - Drain: workers execute one task at a time until the queue is closed
//! - Join: wait for every worker and return the report

use crate::anonymity::AnonymityCheck;
use crate::config::Config;
use crate::crawler::queue::{job_queue, JobReceiver};
use crate::crawler::task::{execute_task, TaskContext};
use crate::output::{ArtifactWriter, CrawlReport, OutcomeLog, OutcomeRecord};
use crate::render::Renderer;
use crate::target::{load_targets, Destination};
use crate::CrawlError;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    renderer: Arc<dyn Renderer>,
    shutdown: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Validated crawler configuration
    /// * `renderer` - Renderer shared by every worker
    pub fn new(config: Config, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            config: Arc::new(config),
            renderer,
            shutdown: CancellationToken::new(),
        }
    }

    /// Replaces the run's parent cancellation token
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Token that cancels every in-flight and queued task of the run
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Runs a complete crawl
    ///
    /// Nothing touches the filesystem or the renderer unless the anonymity
    /// check passes.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Every destination was attempted
    /// * `Err(CrawlError)` - The run was aborted before dispatch
    pub async fn run(&self, verifier: &dyn AnonymityCheck) -> crate::Result<CrawlReport> {
        tracing::info!("Checking Tor connection via {}", self.config.proxy.address);
        if !verifier.verify().await {
            return Err(CrawlError::VerificationFailed);
        }
        tracing::info!("Tor connection verified");

        let writer = ArtifactWriter::new(&self.config.output.root);
        writer.ensure_layout()?;

        let targets_path = &self.config.output.targets_path;
        let targets = load_targets(targets_path)?;
        if targets.is_empty() {
            return Err(CrawlError::NoTargets {
                path: targets_path.clone(),
            });
        }
        tracing::info!(
            "Loaded {} destinations from {}",
            targets.len(),
            targets_path.display()
        );

        Ok(self.drain(targets, writer).await)
    }

    /// Crawls an explicit list of destinations, skipping the anonymity check
    /// and the target file
    pub async fn crawl_targets(
        &self,
        targets: Vec<Destination>,
    ) -> crate::Result<CrawlReport> {
        let writer = ArtifactWriter::new(&self.config.output.root);
        writer.ensure_layout()?;
        Ok(self.drain(targets, writer).await)
    }

    /// Dispatches every destination to the worker pool and waits for all of
    /// them to finish
    async fn drain(&self, targets: Vec<Destination>, writer: ArtifactWriter) -> CrawlReport {
        let start_time = Instant::now();
        let total = targets.len();
        let worker_count = self.config.crawler.workers;

        let ctx = Arc::new(TaskContext::new(
            self.renderer.clone(),
            writer,
            Arc::new(OutcomeLog::new(&self.config.output.log_path)),
            self.config.crawler.task_timeout(),
            self.shutdown.clone(),
        ));

        let capacity = self.config.crawler.effective_queue_capacity(total);
        let (sender, receiver) = job_queue(capacity);
        let (results_tx, mut results_rx) = mpsc::unbounded_channel();

        tracing::info!(
            "Starting {} workers for {} destinations (deadline {}s)",
            worker_count,
            total,
            ctx.deadline().as_secs()
        );

        let mut workers = Vec::with_capacity(worker_count);
        for id in 1..=worker_count {
            workers.push(tokio::spawn(worker_loop(
                id,
                receiver.clone(),
                ctx.clone(),
                results_tx.clone(),
            )));
        }
        drop(receiver);
        drop(results_tx);

        let producer = tokio::spawn(async move {
            for destination in targets {
                if let Err(destination) = sender.enqueue(destination).await {
                    tracing::error!("Job queue closed early, dropping {}", destination);
                    break;
                }
            }
            sender.close();
        });

        // Ends once every worker has exited and dropped its sender
        let mut records = Vec::with_capacity(total);
        while let Some(record) = results_rx.recv().await {
            records.push(record);

            if records.len() % 10 == 0 {
                let elapsed = start_time.elapsed();
                let rate = records.len() as f64 / elapsed.as_secs_f64();
                tracing::info!(
                    "Progress: {} / {} tasks finished, {:.2} tasks/sec",
                    records.len(),
                    total,
                    rate
                );
            }
        }

        if let Err(e) = producer.await {
            tracing::error!("Job producer failed: {}", e);
        }
        for handle in workers {
            if let Err(e) = handle.await {
                tracing::error!("Worker failed: {}", e);
            }
        }

        let report = CrawlReport {
            records,
            elapsed: start_time.elapsed(),
        };
        tracing::info!(
            "Crawl complete: {} succeeded, {} failed in {:.1}s",
            report.succeeded(),
            report.failed(),
            report.elapsed.as_secs_f64()
        );
        report
    }
}

/// One long-lived worker: executes tasks until the queue is closed and empty
async fn worker_loop(
    id: usize,
    jobs: JobReceiver,
    ctx: Arc<TaskContext>,
    results: mpsc::UnboundedSender<OutcomeRecord>,
) {
    tracing::debug!("Worker {} started", id);
    let mut handled = 0usize;

    while let Some(destination) = jobs.dequeue().await {
        tracing::debug!("Worker {} took {}", id, destination);
        let record = execute_task(&ctx, &destination).await;
        handled += 1;

        if results.send(record).is_err() {
            tracing::warn!("Worker {}: report collector is gone", id);
        }
    }

    tracing::debug!("Worker {} finished after {} tasks", id, handled);
}

/// Runs a complete crawl with a fresh coordinator
///
/// # Arguments
///
/// * `config` - Validated crawler configuration
/// * `verifier` - Anonymity gate checked before any work
/// * `renderer` - Renderer shared by all workers
/// * `shutdown` - Cancelling it ends every in-flight and queued task
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Every destination was attempted
/// * `Err(CrawlError)` - The run was aborted before dispatch
pub async fn run_crawl(
    config: Config,
    verifier: &dyn AnonymityCheck,
    renderer: Arc<dyn Renderer>,
    shutdown: CancellationToken,
) -> crate::Result<CrawlReport> {
    let coordinator = Coordinator::new(config, renderer).with_shutdown(shutdown);
    coordinator.run(verifier).await
}
