use crate::dispatch::dispatch;
use crate::error::Result;
use crate::executor::Executor;
use crate::handle::PartitionHandle;
use crate::source::LineSource;
use crate::PartitionProcessor;

/// Extension trait letting any [`LineSource`] fan out over its partitions
pub trait ParallelReader: LineSource + Sized {
    /// Processes every partition of `max_lines` lines on a per-call pool
    fn process_parallel<T>(
        self,
        processor: T,
        max_lines: usize,
    ) -> Result<Vec<PartitionHandle<T::Output>>>
    where
        T: PartitionProcessor<Self::Stream>,
    {
        dispatch(self, max_lines, processor, None)
    }

    /// Processes every partition of `max_lines` lines on `executor`
    fn process_parallel_with<T>(
        self,
        processor: T,
        max_lines: usize,
        executor: &dyn Executor,
    ) -> Result<Vec<PartitionHandle<T::Output>>>
    where
        T: PartitionProcessor<Self::Stream>,
    {
        dispatch(self, max_lines, processor, Some(executor))
    }
}

impl<S: LineSource> ParallelReader for S {}
