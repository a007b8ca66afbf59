use anyhow::{bail, Result};
use line_io_parallel::{join_all, LineReader, ParallelReader, ReaderSource, ThreadPool};
use std::io::{self, BufReader, Read};

type Stream = BufReader<Box<dyn Read + Send>>;

/// Finds the longest line of a partition
fn longest_line(index: usize, reader: LineReader<Stream>) -> Result<(usize, usize, String)> {
    let mut longest = String::new();
    for line in reader {
        let line = line?;
        if line.chars().count() > longest.chars().count() {
            longest = line;
        }
    }
    Ok((index, longest.chars().count(), longest))
}

pub fn main() -> Result<()> {
    let args = std::env::args().collect::<Vec<String>>();
    let path = match args.get(1) {
        Some(path) => path.clone(),
        None => bail!("No path provided"),
    };
    let max_lines = match args.get(2) {
        Some(max_lines) => max_lines.parse::<usize>()?,
        None => 10_000,
    };
    let num_threads = match args.get(3) {
        Some(num_threads) => num_threads.parse::<usize>()?,
        None => 1,
    };

    // Compressed input cannot be seeked, so partitions skip characters
    // from a freshly decompressed stream instead
    let source = ReaderSource::new(move || {
        niffler::send::from_path(&path)
            .map(|(handle, _format)| handle)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    });

    let pool = ThreadPool::new(num_threads)?;
    let handles = source.process_parallel_with(longest_line, max_lines, &pool)?;

    let mut best: Option<(usize, usize, String)> = None;
    for outcome in join_all(handles) {
        let candidate = outcome?;
        if best.as_ref().map_or(true, |b| candidate.1 > b.1) {
            best = Some(candidate);
        }
    }

    match best {
        Some((index, len, line)) => {
            println!("Longest line ({} chars, partition {}): {}", len, index, line)
        }
        None => println!("No lines"),
    }

    Ok(())
}
