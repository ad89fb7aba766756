use super::{panic_error, Queue, QueueKind, Task, TaskQueue};
use crate::dev::DevCpu;
use crate::error::{AccError, Result};
use parking_lot::{Condvar, Mutex};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Default)]
struct State {
    pending: usize,
    failure: Option<AccError>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    idle: Condvar,
}

/// CPU queue with a dedicated submission worker.
///
/// `enqueue` returns immediately. Tasks run one after another, in submission
/// order, inside a rayon pool sized by the device concurrency, so parallel
/// iterators used by a task spread over that pool. After a task panics the
/// remaining tasks are dropped until the failure is reported by `wait`.
pub struct QueueCpuNonBlocking {
    dev: DevCpu,
    sender: Option<Sender<Task>>,
    worker: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl QueueCpuNonBlocking {
    fn worker_loop(rx: mpsc::Receiver<Task>, pool: rayon::ThreadPool, shared: Arc<Shared>) {
        for task in rx {
            let skip = shared.state.lock().failure.is_some();
            let result = if skip {
                Ok(())
            } else {
                pool.install(|| catch_unwind(AssertUnwindSafe(task)))
            };

            let mut state = shared.state.lock();
            if let Err(payload) = result {
                let err = panic_error(&*payload);
                tracing::warn!(error = %err, "queued task panicked");
                state.failure = Some(err);
            }
            state.pending -= 1;
            if state.pending == 0 {
                shared.idle.notify_all();
            }
        }
    }
}

impl std::fmt::Debug for QueueCpuNonBlocking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueCpuNonBlocking")
            .field("dev", &self.dev)
            .field("pending", &self.shared.state.lock().pending)
            .finish()
    }
}

impl Queue for QueueCpuNonBlocking {
    type Dev = DevCpu;
    const KIND: QueueKind = QueueKind::NonBlocking;

    fn new(dev: &DevCpu) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(dev.concurrency())
            .thread_name(|i| format!("accelkit-worker-{i}"))
            .build()
            .map_err(|e| AccError::resource("CPU thread pool", e))?;

        let (sender, rx) = mpsc::channel::<Task>();
        let shared = Arc::new(Shared::default());
        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("accelkit-queue".to_string())
            .spawn(move || Self::worker_loop(rx, pool, worker_shared))
            .map_err(|e| AccError::resource("CPU queue worker", e))?;

        tracing::debug!(threads = dev.concurrency(), "created non-blocking CPU queue");
        Ok(Self {
            dev: *dev,
            sender: Some(sender),
            worker: Some(worker),
            shared,
        })
    }

    fn dev(&self) -> &DevCpu {
        &self.dev
    }

    fn wait(&self) -> Result<()> {
        let mut state = self.shared.state.lock();
        while state.pending > 0 {
            self.shared.idle.wait(&mut state);
        }
        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn is_idle(&self) -> bool {
        self.shared.state.lock().pending == 0
    }
}

impl TaskQueue for QueueCpuNonBlocking {
    fn enqueue<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| AccError::execution("enqueue", "queue is shut down"))?;

        self.shared.state.lock().pending += 1;
        if sender.send(Box::new(task)).is_err() {
            let mut state = self.shared.state.lock();
            state.pending -= 1;
            if state.pending == 0 {
                self.shared.idle.notify_all();
            }
            return Err(AccError::execution("enqueue", "queue worker has stopped"));
        }
        Ok(())
    }
}

impl Drop for QueueCpuNonBlocking {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
