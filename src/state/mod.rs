//! Task state definitions
//!
//! A task ends in exactly one of two states. The string form is what lands in
//! the outcome log.

mod task_status;

pub use task_status::TaskStatus;
