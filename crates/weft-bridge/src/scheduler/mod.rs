//! Single-threaded affinity scheduler.
//!
//! All component-tree mutation and call bookkeeping must happen on one
//! logical thread, while native callbacks, pipe readers and the event bus
//! deliver work from arbitrary threads. `AffinityScheduler` owns one worker
//! thread draining an unbounded FIFO queue; everything that needs affinity is
//! funneled through [`AffinityScheduler::post`] or [`AffinityScheduler::send`].
//!
//! Failures inside a work item never travel back to the thread that queued
//! it. They are reported through [`AffinityScheduler::on_fault`] listeners
//! (and logged), including for the blocking `send` variant.

mod fault;


use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use tracing::{debug, warn};
use weft_common::BridgeError;

pub use fault::{FaultListener, SchedulerFault};

use fault::Faults;

type Job = Box<dyn FnOnce() -> Result<(), BridgeError> + Send + 'static>;

struct WorkItem {
    job: Job,
    completed: Option<mpsc::SyncSender<()>>,
}

struct Inner {
    name: String,
    queue: Mutex<Option<mpsc::Sender<WorkItem>>>,
    worker_id: ThreadId,
    worker: Mutex<Option<JoinHandle<()>>>,
    faults: Arc<Faults>,
}

impl Inner {
    /// Close the queue and wait for the worker to drain it. Returns `false`
    /// if the queue was already closed.
    fn shutdown(&self) -> bool {
        let sender = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(sender) = sender else {
            return false;
        };
        drop(sender);
        debug!(scheduler = %self.name, "scheduler queue closed");

        // The worker cannot join itself; it exits on its own once drained.
        if thread::current().id() != self.worker_id {
            let handle = self
                .worker
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            if let Some(handle) = handle {
                if handle.join().is_err() {
                    warn!(scheduler = %self.name, "scheduler worker panicked during shutdown");
                }
            }
        }
        true
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Handle to a single worker thread with a blocking FIFO work queue.
///
/// Cloning the handle shares the same worker. The worker is stopped by
/// [`stop`](Self::stop) or when the last handle is dropped.
#[derive(Clone)]
pub struct AffinityScheduler {
    inner: Arc<Inner>,
}

impl AffinityScheduler {
    /// Spawn the worker thread. `name` becomes the OS thread name.
    pub fn new(name: impl Into<String>) -> Result<Self, BridgeError> {
        let name = name.into();
        let (tx, rx) = mpsc::channel::<WorkItem>();
        let faults = Arc::new(Faults::default());

        let worker_faults = Arc::clone(&faults);
        let worker_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                debug!(scheduler = %worker_name, "scheduler worker started");
                while let Ok(item) = rx.recv() {
                    run_job(item.job, &worker_name, &worker_faults);
                    if let Some(done) = item.completed {
                        // The sender may have given up waiting; nothing to do then.
                        let _ = done.send(());
                    }
                }
                debug!(scheduler = %worker_name, "scheduler worker exited");
            })?;

        Ok(Self {
            inner: Arc::new(Inner {
                worker_id: handle.thread().id(),
                name,
                queue: Mutex::new(Some(tx)),
                worker: Mutex::new(Some(handle)),
                faults,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Queue `action` and return immediately.
    pub fn post<F>(&self, action: F) -> Result<(), BridgeError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.try_post(move || {
            action();
            Ok(())
        })
    }

    /// Queue a fallible `action`. An `Err` is reported as a fault.
    pub fn try_post<F>(&self, action: F) -> Result<(), BridgeError>
    where
        F: FnOnce() -> Result<(), BridgeError> + Send + 'static,
    {
        self.enqueue(WorkItem {
            job: Box::new(action),
            completed: None,
        })
    }

    /// Run `action` on the worker and wait for it to finish.
    ///
    /// Called from the worker itself, the action runs inline. A failing
    /// action still returns `Ok(())` here; the failure only reaches the
    /// fault listeners.
    pub fn send<F>(&self, action: F) -> Result<(), BridgeError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.try_send(move || {
            action();
            Ok(())
        })
    }

    /// Fallible variant of [`send`](Self::send).
    pub fn try_send<F>(&self, action: F) -> Result<(), BridgeError>
    where
        F: FnOnce() -> Result<(), BridgeError> + Send + 'static,
    {
        if self.is_closed() {
            return Err(BridgeError::SchedulerClosed);
        }

        if self.check_affinity() {
            run_job(Box::new(action), &self.inner.name, &self.inner.faults);
            return Ok(());
        }

        let (done_tx, done_rx) = mpsc::sync_channel(1);
        self.enqueue(WorkItem {
            job: Box::new(action),
            completed: Some(done_tx),
        })?;
        done_rx.recv().map_err(|_| BridgeError::SchedulerClosed)
    }

    /// Whether the calling thread is this scheduler's worker.
    pub fn check_affinity(&self) -> bool {
        thread::current().id() == self.inner.worker_id
    }

    /// Fail with `AffinityViolation` unless called on the worker.
    pub fn verify_affinity(&self, operation: &str) -> Result<(), BridgeError> {
        if self.check_affinity() {
            Ok(())
        } else {
            Err(BridgeError::AffinityViolation(operation.to_string()))
        }
    }

    /// Register a listener for failures raised by queued actions.
    pub fn on_fault<F>(&self, listener: F)
    where
        F: Fn(&SchedulerFault) + Send + Sync + 'static,
    {
        self.inner.faults.add(Arc::new(listener));
    }

    /// Close the queue. Items already queued still run; later `post` and
    /// `send` calls fail with `SchedulerClosed`. Calling it again is a no-op.
    pub fn stop(&self) {
        if self.inner.shutdown() {
            debug!(scheduler = %self.inner.name, "scheduler stopped");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn enqueue(&self, item: WorkItem) -> Result<(), BridgeError> {
        let queue = self
            .inner
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match queue.as_ref() {
            Some(tx) => tx.send(item).map_err(|_| BridgeError::SchedulerClosed),
            None => Err(BridgeError::SchedulerClosed),
        }
    }
}

impl std::fmt::Debug for AffinityScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AffinityScheduler")
            .field("name", &self.inner.name)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn run_job(job: Job, scheduler: &str, faults: &Faults) {
    match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => faults.report(SchedulerFault::new(scheduler, e.to_string())),
        Err(payload) => faults.report(SchedulerFault::from_panic(scheduler, payload.as_ref())),
    }
}
