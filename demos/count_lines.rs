use anyhow::{bail, Result};
use line_io_parallel::{join_all, FileSource, LineReader, ParallelLineReader, ReaderConfig};
use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts lines and bytes of each partition, and keeps a global total
#[derive(Clone, Default)]
pub struct LineStats {
    global_bytes: Arc<AtomicUsize>,
}

impl LineStats {
    pub fn get_global_bytes(&self) -> usize {
        self.global_bytes.load(Ordering::Relaxed)
    }

    fn process(&self, reader: LineReader<BufReader<File>>) -> Result<usize> {
        let mut local_bytes = 0;
        let mut lines = 0;
        for line in reader {
            local_bytes += line?.len();
            lines += 1;
        }
        self.global_bytes.fetch_add(local_bytes, Ordering::Relaxed);
        Ok(lines)
    }
}

pub fn main() -> Result<()> {
    let args = std::env::args().collect::<Vec<String>>();
    let path = match args.get(1) {
        Some(path) => path,
        None => bail!("No path provided"),
    };
    let max_lines = match args.get(2) {
        Some(max_lines) => max_lines.parse::<usize>()?,
        None => 10_000,
    };
    let num_threads = match args.get(3) {
        Some(num_threads) => num_threads.parse::<usize>()?,
        None => ReaderConfig::default().num_threads,
    };

    let config = ReaderConfig::with_max_lines(max_lines).num_threads(num_threads);
    let reader = ParallelLineReader::new(FileSource::new(path), config)?;
    let stats = LineStats::default();
    let worker = stats.clone();
    let handles = reader.read_parallel(move |_index: usize, lines: LineReader<BufReader<File>>| {
        worker.process(lines)
    })?;

    let mut total_lines = 0;
    for (index, outcome) in join_all(handles).into_iter().enumerate() {
        let lines = outcome?;
        println!("Partition {}: {} lines", index, lines);
        total_lines += lines;
    }

    println!("Total lines: {}", total_lines);
    println!("Total bytes (without terminators): {}", stats.get_global_bytes());

    Ok(())
}
