//! Crawler module for rendering a fixed list of destinations
//!
//! This module contains the core crawling logic, including:
//! - The bounded job queue shared by the worker pool
//! - Execution of a single task under a deadline
//! - Overall run coordination

mod coordinator;
mod queue;
mod task;

pub use coordinator::{run_crawl, Coordinator};
pub use queue::{job_queue, JobReceiver, JobSender};
pub use task::{execute_task, TaskContext, SUCCESS_DETAIL};
