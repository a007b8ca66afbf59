//! Line sources the planner and the dispatcher can open repeatedly.
//!
//! Two kinds of source exist and they address positions differently:
//! [`FileSource`] seeks to a byte offset, [`ReaderSource`] opens a fresh
//! stream and skips a number of characters. Offsets produced by the planner
//! always use the unit of the source they were computed on.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Unit in which a source's offsets are expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetUnit {
    /// Raw bytes, used by seekable files
    Bytes,
    /// Unicode scalar values, used by character streams
    Chars,
}

impl OffsetUnit {
    /// Length of a terminator-inclusive line in this unit
    pub fn measure(self, line: &[u8]) -> io::Result<u64> {
        match self {
            OffsetUnit::Bytes => Ok(line.len() as u64),
            OffsetUnit::Chars => std::str::from_utf8(line)
                .map(|s| s.chars().count() as u64)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        }
    }
}

/// A source of lines that can be opened any number of times
pub trait LineSource: Send + Sync + 'static {
    type Stream: BufRead + Send + 'static;

    /// Unit of the offsets accepted by [`LineSource::open_at`]
    fn offset_unit(&self) -> OffsetUnit;

    /// Opens a fresh stream positioned at the start of the source
    fn open(&self) -> io::Result<Self::Stream>;

    /// Opens a fresh stream positioned at `offset`
    fn open_at(&self, offset: u64) -> io::Result<Self::Stream>;
}

/// A file on disk, positioned by byte seek
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineSource for FileSource {
    type Stream = BufReader<File>;

    fn offset_unit(&self) -> OffsetUnit {
        OffsetUnit::Bytes
    }

    fn open(&self) -> io::Result<Self::Stream> {
        Ok(BufReader::new(File::open(&self.path)?))
    }

    fn open_at(&self, offset: u64) -> io::Result<Self::Stream> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();
        if offset > len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("offset {} is beyond end of file ({} bytes)", offset, len),
            ));
        }
        file.seek(SeekFrom::Start(offset))?;
        Ok(BufReader::new(file))
    }
}

/// A factory of sequential readers, positioned by skipping characters
///
/// The factory is called once for planning and once per partition, and must
/// yield the same content every time.
pub struct ReaderSource<F> {
    factory: F,
}

impl<F, R> ReaderSource<F>
where
    F: Fn() -> io::Result<R> + Send + Sync + 'static,
    R: Read + Send + 'static,
{
    pub fn new(factory: F) -> Self {
        Self { factory }
    }
}

impl<F, R> LineSource for ReaderSource<F>
where
    F: Fn() -> io::Result<R> + Send + Sync + 'static,
    R: Read + Send + 'static,
{
    type Stream = BufReader<R>;

    fn offset_unit(&self) -> OffsetUnit {
        OffsetUnit::Chars
    }

    fn open(&self) -> io::Result<Self::Stream> {
        Ok(BufReader::new((self.factory)()?))
    }

    fn open_at(&self, offset: u64) -> io::Result<Self::Stream> {
        let mut stream = self.open()?;
        let skipped = skip_chars(&mut stream, offset)?;
        if skipped < offset {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "stream ended after {} characters, expected at least {}",
                    skipped, offset
                ),
            ));
        }
        Ok(stream)
    }
}

/// Advances `reader` past `n` UTF-8 encoded characters
///
/// Returns the number of characters actually skipped, which is smaller than
/// `n` only when the stream ends first.
pub fn skip_chars<R: BufRead>(reader: &mut R, n: u64) -> io::Result<u64> {
    let mut remaining = n;
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(n - remaining);
        }

        // Stop right before the first byte that starts character `n + 1`
        let mut stop = None;
        for (i, &byte) in buf.iter().enumerate() {
            if is_char_start(byte) {
                if remaining == 0 {
                    stop = Some(i);
                    break;
                }
                remaining -= 1;
            }
        }

        match stop {
            Some(i) => {
                reader.consume(i);
                return Ok(n);
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

#[inline]
fn is_char_start(byte: u8) -> bool {
    byte & 0xC0 != 0x80
}
