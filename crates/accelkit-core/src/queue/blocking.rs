use super::{panic_error, Queue, QueueKind, TaskQueue};
use crate::dev::DevCpu;
use crate::error::Result;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// CPU queue that runs each task on the calling thread before returning.
#[derive(Debug, Clone)]
pub struct QueueCpuBlocking {
    dev: DevCpu,
}

impl Queue for QueueCpuBlocking {
    type Dev = DevCpu;
    const KIND: QueueKind = QueueKind::Blocking;

    fn new(dev: &DevCpu) -> Result<Self> {
        Ok(Self { dev: *dev })
    }

    fn dev(&self) -> &DevCpu {
        &self.dev
    }

    fn wait(&self) -> Result<()> {
        Ok(())
    }

    fn is_idle(&self) -> bool {
        true
    }
}

impl TaskQueue for QueueCpuBlocking {
    fn enqueue<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        catch_unwind(AssertUnwindSafe(task)).map_err(|p| panic_error(&*p))
    }
}
