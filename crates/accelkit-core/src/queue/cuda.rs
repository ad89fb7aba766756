use super::{Queue, QueueKind};
use crate::dev::DevCuda;
use crate::error::{AccError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Asynchronous queue on the default stream of a CUDA device.
///
/// Kernel launches and device copies return before the device has finished.
/// Callers record each asynchronous submission with [`submitted`](Self::submitted)
/// so that [`is_idle`](Queue::is_idle) can report outstanding work.
#[derive(Debug)]
pub struct QueueCudaRtNonBlocking {
    dev: DevCuda,
    in_flight: AtomicUsize,
}

impl QueueCudaRtNonBlocking {
    /// Records one asynchronous submission.
    pub fn submitted(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }
}

impl Queue for QueueCudaRtNonBlocking {
    type Dev = DevCuda;
    const KIND: QueueKind = QueueKind::NonBlocking;

    fn new(dev: &DevCuda) -> Result<Self> {
        dev.cuda()
            .bind_to_thread()
            .map_err(|e| AccError::resource("CUDA context", e))?;
        Ok(Self {
            dev: dev.clone(),
            in_flight: AtomicUsize::new(0),
        })
    }

    fn dev(&self) -> &DevCuda {
        &self.dev
    }

    fn wait(&self) -> Result<()> {
        self.dev
            .cuda()
            .synchronize()
            .map_err(|e| AccError::execution("synchronize", e))?;
        self.in_flight.store(0, Ordering::Release);
        Ok(())
    }

    fn is_idle(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) == 0
    }
}
