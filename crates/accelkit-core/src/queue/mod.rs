//! Execution queues: how work is submitted to a device.
//!
//! Every queue executes its work in submission order. A blocking queue runs
//! each task before `enqueue` returns; a non-blocking queue returns at once and
//! the caller must [`wait`](Queue::wait) before reading results.

mod blocking;
#[cfg(feature = "cuda")]
mod cuda;
mod non_blocking;

pub use blocking::QueueCpuBlocking;
#[cfg(feature = "cuda")]
pub use cuda::QueueCudaRtNonBlocking;
pub use non_blocking::QueueCpuNonBlocking;

use crate::dev::Device;
use crate::error::{AccError, Result};
use std::any::Any;

/// Submission discipline of a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    /// `enqueue` returns after the work has run.
    Blocking,
    /// `enqueue` returns immediately; `wait` is required.
    NonBlocking,
}

/// A queue bound to one device.
pub trait Queue: Sized + Send + Sync + 'static {
    /// Device the queue submits to.
    type Dev: Device;

    /// Submission discipline.
    const KIND: QueueKind;

    /// Creates a queue on `dev`.
    fn new(dev: &Self::Dev) -> Result<Self>;

    /// Device this queue submits to.
    fn dev(&self) -> &Self::Dev;

    /// Blocks until all submitted work has finished.
    ///
    /// Reports the first failure of any work submitted since the last wait.
    fn wait(&self) -> Result<()>;

    /// Whether no submitted work is outstanding.
    fn is_idle(&self) -> bool;
}

/// A queue that runs host closures.
pub trait TaskQueue: Queue {
    /// Submits `task`. Tasks run in submission order.
    fn enqueue<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static;
}

/// Boxed unit of work for CPU queues.
pub(crate) type Task = Box<dyn FnOnce() + Send + 'static>;

/// Converts a caught panic into an execution error.
pub(crate) fn panic_error(payload: &(dyn Any + Send)) -> AccError {
    let reason = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "task panicked".to_string());
    AccError::execution("queued task", reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_messages() {
        let err = panic_error(&"boom");
        assert_eq!(err, AccError::execution("queued task", "boom"));

        let err = panic_error(&String::from("bad index"));
        assert!(err.to_string().contains("bad index"));

        let err = panic_error(&42u8);
        assert!(err.to_string().contains("task panicked"));
    }
}
