//! # Line Sources
//!
//! Parsers pull manifest text one trimmed line at a time from a
//! [`LineSource`]. Where the text comes from is up to the source:
//!
//! - [`StrLineSource`] reads an in-memory document
//! - [`ReaderLineSource`] reads any `BufRead`, e.g. an open file
//! - [`BytesLineSource`] reads a buffer returned by a [`ManifestFetcher`]
//!
//! ```rust
//! use m3u8kit::source::{LineSource, StrLineSource};
//!
//! let mut source = StrLineSource::new("#EXTM3U\n  seg0.ts  \n");
//! assert_eq!(source.read_line().as_deref(), Some("#EXTM3U"));
//! assert_eq!(source.read_line().as_deref(), Some("seg0.ts"));
//! assert_eq!(source.read_line(), None);
//! ```
//!
//! Parsers take sources by value, so any handle a source holds is released
//! when the parse returns, whether it finished or stopped early.

use bytes::Bytes;
use log::warn;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::Result;

/// Manifest fetchers for local files and HTTP
pub mod fetch;

pub use fetch::{FsFetcher, HttpFetcher, ManifestFetcher, SchemeFetcher};

/// Ordered supply of manifest lines.
pub trait LineSource {
    /// Next line without surrounding whitespace, or `None` at the end.
    fn read_line(&mut self) -> Option<String>;

    /// Releases the underlying handle. Further reads return `None`.
    fn close(&mut self) {}

    /// Iterator over the remaining lines. The source is closed once the
    /// iterator is exhausted or dropped.
    fn lines(self) -> Lines<Self>
    where
        Self: Sized,
    {
        Lines {
            source: self,
            done: false,
        }
    }
}

/// Iterator returned by [`LineSource::lines`].
#[derive(Debug)]
pub struct Lines<S: LineSource> {
    source: S,
    done: bool,
}

impl<S: LineSource> Iterator for Lines<S> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let line = self.source.read_line();
        if line.is_none() {
            self.source.close();
            self.done = true;
        }
        line
    }
}

impl<S: LineSource> Drop for Lines<S> {
    fn drop(&mut self) {
        if !self.done {
            self.source.close();
        }
    }
}

impl<S: LineSource + ?Sized> LineSource for &mut S {
    fn read_line(&mut self) -> Option<String> {
        (**self).read_line()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

impl<S: LineSource + ?Sized> LineSource for Box<S> {
    fn read_line(&mut self) -> Option<String> {
        (**self).read_line()
    }

    fn close(&mut self) {
        (**self).close()
    }
}

fn clean_line(line: &str) -> String {
    line.trim_start_matches('\u{feff}').trim().to_string()
}

/// Lines of an in-memory manifest.
#[derive(Debug)]
pub struct StrLineSource<'a> {
    lines: Option<std::str::Lines<'a>>,
}

impl<'a> StrLineSource<'a> {
    /// Reads `text` line by line. Both `\n` and `\r\n` end a line.
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: Some(text.lines()),
        }
    }
}

impl LineSource for StrLineSource<'_> {
    fn read_line(&mut self) -> Option<String> {
        self.lines.as_mut()?.next().map(clean_line)
    }

    fn close(&mut self) {
        self.lines = None;
    }
}

/// Lines of a buffered reader. A read error ends the source. Bytes that
/// are not UTF-8 are replaced with U+FFFD, one line at a time.
#[derive(Debug)]
pub struct ReaderLineSource<R> {
    reader: Option<R>,
    buf: Vec<u8>,
}

impl<R: BufRead> ReaderLineSource<R> {
    /// Wraps `reader`. It is dropped when the source is closed.
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
            buf: Vec::new(),
        }
    }
}

impl ReaderLineSource<BufReader<File>> {
    /// Opens a manifest file. Failing to open it is the one fatal case.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn read_line(&mut self) -> Option<String> {
        let reader = self.reader.as_mut()?;
        self.buf.clear();
        match reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.close();
                None
            }
            Ok(_) => Some(clean_line(&String::from_utf8_lossy(&self.buf))),
            Err(e) => {
                warn!("Stopped reading manifest: {}", e);
                self.close();
                None
            }
        }
    }

    fn close(&mut self) {
        self.reader = None;
    }
}

/// Lines of a fetched manifest body.
#[derive(Debug)]
pub struct BytesLineSource {
    data: Bytes,
    pos: usize,
}

impl BytesLineSource {
    /// Fails if the body is not UTF-8.
    pub fn new(data: Bytes) -> Result<Self> {
        std::str::from_utf8(&data)?;
        Ok(Self { data, pos: 0 })
    }
}

impl LineSource for BytesLineSource {
    fn read_line(&mut self) -> Option<String> {
        if self.pos >= self.data.len() {
            return None;
        }
        let rest = &self.data[self.pos..];
        let (line, advance) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        self.pos += advance;
        // Validated in `new`; splitting on '\n' keeps every slice on a char boundary.
        Some(clean_line(&String::from_utf8_lossy(line)))
    }

    fn close(&mut self) {
        self.pos = self.data.len();
    }
}
