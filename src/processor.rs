use anyhow::Result;

use crate::LineReader;

/// Trait implemented for a type that processes one partition of lines
///
/// The processor is cloned once per partition, so each clone only ever sees
/// a single [`LineReader`]. Closures taking `(index, reader)` implement it
/// directly.
pub trait PartitionProcessor<R>: Send + Clone + 'static {
    type Output: Send + 'static;

    /// Called on the reader of partition `index`
    ///
    /// The reader is released when it is dropped, so returning early through
    /// `?` still closes it. Call [`LineReader::close`] to observe failures the
    /// reads did not report.
    fn process_partition(&mut self, index: usize, reader: LineReader<R>) -> Result<Self::Output>;
}

impl<R, F, T> PartitionProcessor<R> for F
where
    F: FnMut(usize, LineReader<R>) -> Result<T> + Send + Clone + 'static,
    T: Send + 'static,
{
    type Output = T;

    fn process_partition(&mut self, index: usize, reader: LineReader<R>) -> Result<T> {
        self(index, reader)
    }
}
