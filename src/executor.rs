use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tracing::{error, trace};

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crate::error::{ParallelError, Result};

/// A unit of work handed to an [`Executor`]
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Anything that can run jobs, at some point, on some thread
///
/// The dispatcher builds its own completion handles, so an executor only
/// needs to eventually call the job. Dropping a job without calling it makes
/// the matching handle resolve to [`ParallelError::Disconnected`].
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job);
}

/// Runs every job on a freshly spawned thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SpawnExecutor;

impl Executor for SpawnExecutor {
    fn execute(&self, job: Job) {
        thread::spawn(job);
    }
}

/// A fixed set of worker threads fed from a shared channel
///
/// Dropping the pool closes the queue: already submitted jobs still run, and
/// the worker threads exit once it is empty. Use [`ThreadPool::join`] to wait
/// for that.
pub struct ThreadPool {
    tx: Mutex<Option<Sender<Job>>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    num_threads: usize,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(ParallelError::InvalidThreadCount(num_threads));
        }

        let (tx, rx) = unbounded::<Job>();
        let handles = (0..num_threads)
            .map(|thread_id| {
                let rx = rx.clone();
                thread::Builder::new()
                    .name(format!("line-io-worker-{}", thread_id))
                    .spawn(move || run_worker_thread(rx, thread_id))
            })
            .collect::<std::io::Result<Vec<_>>>()?;

        Ok(Self {
            tx: Mutex::new(Some(tx)),
            handles: Mutex::new(handles),
            num_threads,
        })
    }

    /// Sized to the number of available CPUs
    pub fn with_available_parallelism() -> Result<Self> {
        Self::new(num_cpus::get())
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Closes the queue and waits until every submitted job has run
    pub fn join(&self) {
        self.tx.lock().take();
        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            if handle.join().is_err() {
                error!("Worker thread exited abnormally");
            }
        }
    }
}

impl Executor for ThreadPool {
    fn execute(&self, job: Job) {
        match self.tx.lock().as_ref() {
            Some(tx) => {
                // Workers only leave once the sender is gone
                let _ = tx.send(job);
            }
            None => error!("Job submitted to a joined thread pool was dropped"),
        }
    }
}

/// Internal processing of worker threads
fn run_worker_thread(rx: Receiver<Job>, thread_id: usize) {
    trace!(thread_id, "Worker started");
    while let Ok(job) = rx.recv() {
        // Jobs from the dispatcher catch their own panics; this keeps the
        // worker alive for jobs submitted by anyone else
        if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
            error!(thread_id, "Job panicked");
        }
    }
    trace!(thread_id, "Worker finished");
}
