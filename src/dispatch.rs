//! Turns a partition plan into independently scheduled tasks.

use tracing::{debug, trace, warn};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::config::ReaderConfig;
use crate::error::{ParallelError, Result};
use crate::executor::{Executor, ThreadPool};
use crate::handle::PartitionHandle;
use crate::planner::plan;
use crate::source::LineSource;
use crate::{LineReader, PartitionProcessor};

type PartitionHandles<T> = Vec<PartitionHandle<T>>;

/// Plans `source` and schedules one task per partition
///
/// Each task opens its own stream at the partition's offset, wraps it in a
/// [`LineReader`] capped at `max_lines` and hands it to a clone of
/// `processor`. Handles come back in partition order; tasks may complete in
/// any order.
///
/// Without an executor, a [`ThreadPool`] sized to the available CPUs is
/// created for this call and detached once every task is queued.
///
/// # Errors
///
/// Fails with no task scheduled if `max_lines` is 0 or the planning scan
/// cannot read the source. Failures inside a task, including opening its
/// stream, only resolve that task's handle to an error.
pub fn dispatch<S, P>(
    source: S,
    max_lines: usize,
    processor: P,
    executor: Option<&dyn Executor>,
) -> Result<PartitionHandles<P::Output>>
where
    S: LineSource,
    P: PartitionProcessor<S::Stream>,
{
    let config = ReaderConfig::with_max_lines(max_lines);
    dispatch_shared(Arc::new(source), &config, processor, executor)
}

pub(crate) fn dispatch_shared<S, P>(
    source: Arc<S>,
    config: &ReaderConfig,
    processor: P,
    executor: Option<&dyn Executor>,
) -> Result<PartitionHandles<P::Output>>
where
    S: LineSource,
    P: PartitionProcessor<S::Stream>,
{
    let max_lines = config.max_lines;
    let boundaries = plan(source.as_ref(), max_lines)?;

    let default_pool;
    let executor = match executor {
        Some(executor) => executor,
        None => {
            default_pool = ThreadPool::new(config.num_threads)?;
            &default_pool as &dyn Executor
        }
    };

    debug!(
        partitions = boundaries.len(),
        max_lines, "Dispatching partitions"
    );

    let mut handles = Vec::with_capacity(boundaries.len());
    for (index, &offset) in boundaries.iter().enumerate() {
        let (tx, handle) = PartitionHandle::channel(index);
        let source = Arc::clone(&source);
        let processor = processor.clone();

        executor.execute(Box::new(move || {
            trace!(index, offset, "Partition started");
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                run_partition(source.as_ref(), index, offset, max_lines, processor)
            }))
            .unwrap_or_else(|payload| Err(ParallelError::Panicked(panic_message(payload))));

            match &outcome {
                Ok(_) => trace!(index, "Partition finished"),
                Err(err) => warn!(index, offset, error = %err, "Partition failed"),
            }

            // The caller may have dropped the handle already
            let _ = tx.send(outcome);
        }));

        handles.push(handle);
    }

    Ok(handles)
}

/// Internal processing of a single partition
fn run_partition<S, P>(
    source: &S,
    index: usize,
    offset: u64,
    max_lines: usize,
    mut processor: P,
) -> Result<P::Output>
where
    S: LineSource,
    P: PartitionProcessor<S::Stream>,
{
    let stream = source
        .open_at(offset)
        .map_err(ParallelError::SourceUnavailable)?;
    let reader = LineReader::new(stream, max_lines)?;
    processor
        .process_partition(index, reader)
        .map_err(ParallelError::Processing)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// A source paired with its configuration and, optionally, an executor
///
/// Reusable: every call to [`ParallelLineReader::read_parallel`] plans the
/// source again.
pub struct ParallelLineReader<S> {
    source: Arc<S>,
    config: ReaderConfig,
    executor: Option<Arc<dyn Executor>>,
}

impl<S: LineSource> ParallelLineReader<S> {
    pub fn new(source: S, config: ReaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source: Arc::new(source),
            config,
            executor: None,
        })
    }

    /// Submits every task to `executor` instead of a per-call pool
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Creates a handle for each partition of the source
    pub fn read_parallel<P>(&self, processor: P) -> Result<PartitionHandles<P::Output>>
    where
        P: PartitionProcessor<S::Stream>,
    {
        dispatch_shared(
            Arc::clone(&self.source),
            &self.config,
            processor,
            self.executor.as_deref(),
        )
    }
}
