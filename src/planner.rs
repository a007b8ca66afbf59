use tracing::debug;

use std::io::BufRead;

use crate::error::{ParallelError, Result};
use crate::source::LineSource;

/// A contiguous run of at most `max_lines` lines of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    /// 0-based position of the partition in the source
    pub index: usize,
    /// Offset of the first line, in the source's [`crate::OffsetUnit`]
    pub start_offset: u64,
    /// Start of the next partition, `None` for the last one
    pub end_offset: Option<u64>,
}

/// Scans `source` once and returns the start offset of every partition
///
/// The list always begins with 0 and is strictly increasing. A new offset is
/// only recorded when a line follows a full partition, so `L` lines yield
/// `ceil(L / max_lines)` offsets, and an empty source yields `[0]`.
pub fn plan<S: LineSource>(source: &S, max_lines: usize) -> Result<Vec<u64>> {
    if max_lines == 0 {
        return Err(ParallelError::InvalidMaxLines(max_lines));
    }

    let unit = source.offset_unit();
    let mut stream = source.open().map_err(ParallelError::SourceUnavailable)?;

    let mut boundaries = vec![0];
    let mut offset = 0u64;
    let mut lines_in_partition = 0usize;
    let mut total_lines = 0u64;
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        if stream.read_until(b'\n', &mut buf)? == 0 {
            break;
        }

        if lines_in_partition == max_lines {
            boundaries.push(offset);
            lines_in_partition = 0;
        }
        lines_in_partition += 1;
        total_lines += 1;
        offset += unit.measure(&buf)?;
    }

    debug!(
        ?unit,
        max_lines,
        total_lines,
        partitions = boundaries.len(),
        "Planned partitions"
    );

    Ok(boundaries)
}

/// Like [`plan`], but pairs each boundary with its index and end offset
pub fn plan_partitions<S: LineSource>(source: &S, max_lines: usize) -> Result<Vec<Partition>> {
    let boundaries = plan(source, max_lines)?;
    Ok(to_partitions(&boundaries))
}

pub(crate) fn to_partitions(boundaries: &[u64]) -> Vec<Partition> {
    boundaries
        .iter()
        .enumerate()
        .map(|(index, &start_offset)| Partition {
            index,
            start_offset,
            end_offset: boundaries.get(index + 1).copied(),
        })
        .collect()
}
