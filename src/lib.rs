//! Partition a line-oriented source into chunks of at most `max_lines` lines
//! and read every chunk in parallel.
//!
//! A single sequential scan ([`plan`]) finds where each partition starts.
//! Every partition then runs as its own task: it opens a fresh stream at its
//! offset, wraps it in a [`LineReader`] that stops after `max_lines` lines and
//! hands it to a [`PartitionProcessor`]. The caller gets one
//! [`PartitionHandle`] per partition, in partition order.
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! use line_io_parallel::{join_all, FileSource, LineReader, ParallelReader};
//!
//! fn count_lines(_index: usize, reader: LineReader<BufReader<File>>) -> anyhow::Result<usize> {
//!     Ok(reader.count())
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let handles = FileSource::new("huge.csv").process_parallel(count_lines, 50_000)?;
//! let mut total = 0;
//! for outcome in join_all(handles) {
//!     total += outcome?;
//! }
//! println!("{} lines", total);
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatch;
mod error;
mod executor;
mod handle;
mod line_reader;
mod planner;
mod processor;
mod reader;
mod source;

pub use config::ReaderConfig;
pub use dispatch::{dispatch, ParallelLineReader};
pub use error::{ParallelError, Result};
pub use executor::{Executor, Job, SpawnExecutor, ThreadPool};
pub use handle::{join_all, PartitionHandle};
pub use line_reader::LineReader;
pub use planner::{plan, plan_partitions, Partition};
pub use processor::PartitionProcessor;
pub use reader::ParallelReader;
pub use source::{FileSource, LineSource, OffsetUnit, ReaderSource};
