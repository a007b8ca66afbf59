use crate::error::{ParallelError, Result};

/// Configuration for parallel line reading.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Maximum lines per partition (default: 10,000).
    pub max_lines: usize,
    /// Worker threads of the default pool (default: available CPUs).
    /// Ignored when an executor is supplied.
    pub num_threads: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_lines: 10_000,
            num_threads: num_cpus::get(),
        }
    }
}

impl ReaderConfig {
    /// Creates a ReaderConfig with the given partition size.
    pub fn with_max_lines(max_lines: usize) -> Self {
        Self {
            max_lines,
            ..Self::default()
        }
    }

    /// Sets the max_lines limit.
    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Sets the size of the default pool.
    pub fn num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_lines == 0 {
            return Err(ParallelError::InvalidMaxLines(self.max_lines));
        }
        if self.num_threads == 0 {
            return Err(ParallelError::InvalidThreadCount(self.num_threads));
        }
        Ok(())
    }
}
