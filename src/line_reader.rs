//! A line reader that stops by itself after a fixed number of lines.

use std::io::{self, BufRead};

use crate::error::{ParallelError, Result};

/// Reads at most `max_lines` lines from a stream already positioned at the
/// start of a partition.
///
/// One line is always buffered ahead so that [`LineReader::has_next`] never
/// blocks. Once the cap is reached the lookahead is dropped even if the
/// stream has more content, and every further read returns `Ok(None)`.
///
/// Lines are returned without their `\n` or `\r\n` terminator.
pub struct LineReader<R> {
    reader: Option<R>,
    max_lines: usize,
    lines_read: usize,
    peek: Option<String>,
    /// Failure met while refilling the lookahead, reported on the next call
    pending: Option<io::Error>,
}

impl<R: BufRead> LineReader<R> {
    /// Wraps `reader` and eagerly reads the first line
    pub fn new(mut reader: R, max_lines: usize) -> Result<Self> {
        if max_lines == 0 {
            return Err(ParallelError::InvalidMaxLines(max_lines));
        }
        let peek = next_line(&mut reader)?;
        Ok(Self {
            reader: Some(reader),
            max_lines,
            lines_read: 0,
            peek,
            pending: None,
        })
    }

    /// Returns true if another line, or an unreported failure, can be read
    pub fn has_next(&self) -> bool {
        self.peek.is_some() || self.pending.is_some()
    }

    /// Returns the next line, or `Ok(None)` once the partition is exhausted
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        if let Some(err) = self.pending.take() {
            return Err(err);
        }
        if self.lines_read >= self.max_lines {
            return Ok(None);
        }
        let Some(line) = self.peek.take() else {
            return Ok(None);
        };

        self.lines_read += 1;
        if self.lines_read < self.max_lines {
            if let Some(reader) = self.reader.as_mut() {
                match next_line(reader) {
                    Ok(next) => self.peek = next,
                    Err(err) => self.pending = Some(err),
                }
            }
        }

        Ok(Some(line))
    }

    /// Like [`LineReader::read_line`], but panics on I/O failure
    ///
    /// # Panics
    ///
    /// Panics if the underlying stream fails. Inside a partition worker the
    /// panic is captured in that partition's handle.
    pub fn read_line_quietly(&mut self) -> Option<String> {
        self.read_line()
            .unwrap_or_else(|err| panic!("failed to read line: {}", err))
    }
}

impl<R> LineReader<R> {
    pub fn max_lines(&self) -> usize {
        self.max_lines
    }

    /// Number of lines returned so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Releases the stream, reporting any failure not yet returned by a read
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        self.peek = None;
        self.reader = None;
        match self.pending.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Releases the stream and ignores any failure
    pub fn close_quietly(&mut self) {
        let _ = self.close();
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_line().transpose()
    }
}

fn next_line<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    fn reader(text: &'static str, max_lines: usize) -> LineReader<Cursor<&'static [u8]>> {
        LineReader::new(Cursor::new(text.as_bytes()), max_lines).unwrap()
    }

    /// Yields `ok` bytes, then fails every read
    struct Failing {
        ok: Cursor<&'static [u8]>,
    }

    impl Read for Failing {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.ok.read(buf)? {
                0 => Err(io::Error::new(io::ErrorKind::Other, "disk on fire")),
                n => Ok(n),
            }
        }
    }

    #[test]
    fn stops_at_max_lines() {
        let mut lr = reader("1\n2\n3\n4\n", 2);
        let mut res = String::new();
        while lr.has_next() {
            res += &lr.read_line().unwrap().unwrap();
        }
        lr.close().unwrap();
        assert_eq!(res, "12");
        assert_eq!(lr.lines_read(), 2);
    }

    #[test]
    fn exhausted_reader_keeps_returning_none() {
        let mut lr = reader("a\nb\n", 1);
        assert_eq!(lr.read_line().unwrap().as_deref(), Some("a"));
        assert!(!lr.has_next());
        for _ in 0..3 {
            assert_eq!(lr.read_line().unwrap(), None);
        }
    }

    #[test]
    fn empty_stream() {
        let mut lr = reader("", 5);
        assert!(!lr.has_next());
        assert_eq!(lr.read_line().unwrap(), None);
        assert_eq!(lr.read_line_quietly(), None);
    }

    #[test]
    fn fewer_lines_than_cap() {
        let lr = reader("x\r\ny", 10);
        let lines: Vec<String> = lr.map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["x", "y"]);
    }

    #[test]
    fn keeps_blank_lines() {
        let lr = reader("\n\nz\n", 3);
        let lines: Vec<String> = lr.map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["", "", "z"]);
    }

    #[test]
    fn zero_cap_is_rejected() {
        let res = LineReader::new(Cursor::new(b"a\n".as_slice()), 0);
        assert!(matches!(res, Err(ParallelError::InvalidMaxLines(0))));
    }

    #[test]
    fn refill_failure_is_reported_on_next_read() {
        let stream = BufReader::with_capacity(2, Failing {
            ok: Cursor::new(&b"a\n"[..]),
        });
        let mut lr = LineReader::new(stream, 5).unwrap();
        assert_eq!(lr.read_line().unwrap().as_deref(), Some("a"));
        assert!(lr.read_line().is_err());
        assert_eq!(lr.read_line().unwrap(), None);
    }

    #[test]
    fn close_reports_unread_failure() {
        let stream = BufReader::with_capacity(2, Failing {
            ok: Cursor::new(&b"a\n"[..]),
        });
        let mut lr = LineReader::new(stream, 5).unwrap();
        lr.read_line().unwrap();
        assert!(lr.close().is_err());
        assert!(lr.close().is_ok());
        assert!(!lr.has_next());
    }

    #[test]
    fn has_next_loop_surfaces_refill_failure() {
        let stream = BufReader::with_capacity(2, Failing {
            ok: Cursor::new(&b"a\n"[..]),
        });
        let mut lr = LineReader::new(stream, 5).unwrap();

        let mut lines = Vec::new();
        let mut failure = None;
        while lr.has_next() {
            match lr.read_line() {
                Ok(line) => lines.extend(line),
                Err(err) => failure = Some(err),
            }
        }
        assert_eq!(lines, vec!["a"]);
        assert_eq!(failure.unwrap().kind(), io::ErrorKind::Other);
        assert!(!lr.has_next());
        assert!(lr.close().is_ok());
    }

    #[test]
    fn has_next_loop_surfaces_invalid_utf8() {
        let mut lr = LineReader::new(Cursor::new(&b"a\n\xff\xfe\nc\n"[..]), 10).unwrap();
        assert!(lr.has_next());
        assert_eq!(lr.read_line().unwrap().as_deref(), Some("a"));
        assert!(lr.has_next());
        let err = lr.read_line().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    #[should_panic(expected = "failed to read line")]
    fn quiet_has_next_loop_panics_on_failure() {
        let stream = BufReader::with_capacity(2, Failing {
            ok: Cursor::new(&b"a\n"[..]),
        });
        let mut lr = LineReader::new(stream, 5).unwrap();
        while lr.has_next() {
            lr.read_line_quietly();
        }
        lr.close_quietly();
    }

    #[test]
    #[should_panic(expected = "failed to read line")]
    fn quiet_read_panics_on_failure() {
        let stream = BufReader::with_capacity(2, Failing {
            ok: Cursor::new(&b"a\n"[..]),
        });
        let mut lr = LineReader::new(stream, 5).unwrap();
        lr.read_line_quietly();
        lr.read_line_quietly();
    }
}
