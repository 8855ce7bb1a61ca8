//! Job queue shared by the worker pool
//!
//! A bounded FIFO of destinations with one producer and many consumers.
//! The producer closes the queue once every destination is enqueued; a
//! worker stops when the queue is closed and empty.

use crate::target::Destination;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Creates a job queue holding at most `capacity` pending destinations
///
/// `capacity` is clamped to at least 1.
pub fn job_queue(capacity: usize) -> (JobSender, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        JobSender { tx },
        JobReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer side of the job queue
#[derive(Debug)]
pub struct JobSender {
    tx: mpsc::Sender<Destination>,
}

impl JobSender {
    /// Enqueues a destination, waiting while the queue is full
    ///
    /// Hands the destination back if every receiver is gone.
    pub async fn enqueue(&self, destination: Destination) -> Result<(), Destination> {
        self.tx.send(destination).await.map_err(|e| e.0)
    }

    /// Closes the queue for writing
    ///
    /// Destinations already enqueued are still delivered.
    pub fn close(self) {
        drop(self.tx);
    }
}

/// Consumer side of the job queue, cloned into every worker
#[derive(Debug, Clone)]
pub struct JobReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Destination>>>,
}

impl JobReceiver {
    /// Takes the next destination
    ///
    /// Waits while the queue is empty and open. Returns None once the queue
    /// is closed and drained.
    pub async fn dequeue(&self) -> Option<Destination> {
        self.rx.lock().await.recv().await
    }
}
