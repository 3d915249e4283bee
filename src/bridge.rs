//! The concurrency bridge between the synchronous intake and the worker.
//!
//! The HTTP handlers must answer within a bounded time, but extraction and
//! delivery can run for minutes. The bridge is a bounded message queue: the
//! intake wraps each accepted event as a [`Job`] and hands it over with a
//! non-blocking `try_send`, returning an acknowledgment immediately. A full
//! queue is an observable, reportable condition ([`RelayError::DispatchFailure`])
//! rather than an unbounded pile of spawned tasks.
//!
//! Dispatch is fire-and-forget: once a job is accepted its outcome is only
//! observable through the log and through messages the worker itself sends
//! over the chat transport — never through the original HTTP response.

use crate::convert::Target;
use crate::error::RelayError;
use tokio::sync::mpsc;

/// One unit of background work.
///
/// A closed set: the worker dispatches with an exhaustive `match`, so an
/// unhandled event kind cannot exist at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Extract a freshly stored upload and cache the snapshot.
    Ingest { caller: String },
    /// Produce and deliver one output format from the cached snapshot.
    Deliver { caller: String, target: Target },
    /// Drop the caller's session and stored upload.
    Reset { caller: String },
}

impl Job {
    /// The caller this job acts for — every job has exactly one.
    pub fn caller(&self) -> &str {
        match self {
            Job::Ingest { caller }
            | Job::Deliver { caller, .. }
            | Job::Reset { caller } => caller,
        }
    }
}

/// Intake-side handle to the task queue.
#[derive(Debug, Clone)]
pub struct Bridge {
    tx: mpsc::Sender<Job>,
}

impl Bridge {
    /// Create the queue; the receiver goes to the single worker task.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Job>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Submit a job without waiting for it to run or complete.
    pub fn dispatch(&self, job: Job) -> Result<(), RelayError> {
        self.tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => RelayError::DispatchFailure,
            mpsc::error::TrySendError::Closed(_) => {
                RelayError::Internal("worker is gone; queue closed".into())
            }
        })
    }
}
