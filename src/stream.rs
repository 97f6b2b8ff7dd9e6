//! Line oriented record stream, with checkpoint / restore
//! and a sticky failure state.
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::Path;

use log::{debug, error};

use crate::{
    error::{Error, ParsingError},
    reader::BufferedReader,
    writer::BufferedWriter,
};

/// Longest physical line accepted, end of line excluded
pub const MAX_LINE_LEN: usize = 255;

/// [RecordStream] configuration
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StreamConfig {
    /// When true, [RecordStream::conditional_raise] propagates the
    /// most recent error. Otherwise callers poll [RecordStream::is_failed].
    pub raise_on_failure: bool,
    /// Longest line accepted on read and write
    pub max_line_len: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            raise_on_failure: false,
            max_line_len: MAX_LINE_LEN,
        }
    }
}

impl StreamConfig {
    /// Copies and enables the raise on failure policy
    pub fn with_raise_on_failure(&self) -> Self {
        let mut s = *self;
        s.raise_on_failure = true;
        s
    }
    /// Copies and defines a new line length limit
    pub fn with_max_line_len(&self, max_line_len: usize) -> Self {
        let mut s = *self;
        s.max_line_len = max_line_len;
        s
    }
}

#[derive(Debug, Default)]
struct Checkpoint {
    line_number: usize,
    record_count: usize,
    lines: Vec<String>,
}

/// [RecordStream] reads and writes one physical line ("record") at a time.
/// It counts records, remembers its origin, and offers
/// an explicit checkpoint / restore contract so higher layers may
/// rewind a partially decoded block without leaking partial state.
/// Rewinding works by replaying journaled lines, so any [BufRead]
/// source qualifies, compressed ones included.
#[derive(Debug)]
pub struct RecordStream<S> {
    name: String,
    inner: S,
    config: StreamConfig,
    line_number: usize,
    record_count: usize,
    failed: bool,
    closed: bool,
    last_error: Option<Error>,
    replay: VecDeque<String>,
    checkpoint: Option<Checkpoint>,
}

impl RecordStream<BufferedReader> {
    /// Opens a local file for reading. `.gz` files are supported
    /// with the `flate2` feature.
    pub fn open<P: AsRef<Path>>(path: P, config: StreamConfig) -> Result<Self, Error> {
        let path = path.as_ref();
        let reader = BufferedReader::open(path).map_err(|e| {
            error!("{}: {}", path.display(), e);
            Error::from(e)
        })?;
        Ok(Self::new(&path.to_string_lossy(), reader, config))
    }
}

impl RecordStream<BufferedWriter<File>> {
    /// Creates (or truncates) a local file for writing
    pub fn create<P: AsRef<Path>>(path: P, config: StreamConfig) -> Result<Self, Error> {
        let path = path.as_ref();
        let fd = File::create(path)?;
        Ok(Self::new(
            &path.to_string_lossy(),
            BufferedWriter::plain(fd),
            config,
        ))
    }

    /// Creates (or truncates) a local file for gzip compressed writing
    #[cfg(feature = "flate2")]
    #[cfg_attr(docsrs, doc(cfg(feature = "flate2")))]
    pub fn create_gzip<P: AsRef<Path>>(
        path: P,
        compression_level: u32,
        config: StreamConfig,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        let fd = File::create(path)?;
        Ok(Self::new(
            &path.to_string_lossy(),
            BufferedWriter::gzip(fd, compression_level),
            config,
        ))
    }
}

impl<S> RecordStream<S> {
    /// Wraps any source or sink. Counters start at zero.
    pub fn new(name: &str, inner: S, config: StreamConfig) -> Self {
        Self {
            inner,
            config,
            name: name.to_string(),
            line_number: 0,
            record_count: 0,
            failed: false,
            closed: false,
            last_error: None,
            replay: VecDeque::new(),
            checkpoint: None,
        }
    }

    /// Origin of this stream
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Active configuration
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Number of the last physical line consumed or produced (1 based)
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Number of records successfully read or written
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Sticky failure indicator. Only a fresh stream clears it.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// True once this stream was declared unusable
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Most recently captured error
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Records an error: sets the fail indicator and returns it.
    pub(crate) fn fail(&mut self, e: Error) -> Error {
        debug!("{}: {}", self.name, e);
        self.failed = true;
        self.last_error = Some(e.clone());
        e
    }

    /// Propagates the most recent error, only when configured to raise on failure.
    /// Otherwise this is a no-op and callers should poll [Self::is_failed].
    pub fn conditional_raise(&self) -> Result<(), Error> {
        match (&self.last_error, self.config.raise_on_failure) {
            (Some(e), true) => Err(e.clone()),
            _ => Ok(()),
        }
    }

    /// Saves current position. Any previous checkpoint is dropped.
    pub fn checkpoint(&mut self) {
        self.checkpoint = Some(Checkpoint {
            line_number: self.line_number,
            record_count: self.record_count,
            lines: Vec::new(),
        });
    }

    /// Drops the current checkpoint, once a block was fully consumed
    pub fn commit(&mut self) {
        self.checkpoint = None;
    }

    /// Rewinds to the last checkpoint: lines read since then will be read again.
    /// Without checkpoint the position cannot be trusted anymore and the stream
    /// is closed. The fail indicator is left untouched.
    pub fn restore(&mut self) -> Result<(), Error> {
        match self.checkpoint.take() {
            Some(checkpoint) => {
                for line in checkpoint.lines.into_iter().rev() {
                    self.replay.push_front(line);
                }
                self.line_number = checkpoint.line_number;
                self.record_count = checkpoint.record_count;
                Ok(())
            },
            None => {
                error!("{}: no checkpoint to restore, closing", self.name);
                self.closed = true;
                Err(self.fail(Error::Io("no checkpoint to restore".to_string())))
            },
        }
    }

    /// Releases the underlying source or sink
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn closed_error(&mut self) -> Error {
        self.fail(Error::Io(format!("{} is closed", self.name)))
    }
}

impl<S: BufRead> RecordStream<S> {
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        if let Some(line) = self.replay.pop_front() {
            return Ok(Some(line));
        }
        let mut buf = Vec::with_capacity(128);
        let size = self.inner.read_until(b'\n', &mut buf)?;
        if size == 0 {
            return Ok(None);
        }
        while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
            buf.pop();
        }
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Reads one physical line, end of line removed.
    /// Oversized lines are consumed and reported as [Error::Format].
    /// A clean end of source is reported as [Error::EndOfInput].
    pub fn read_record(&mut self) -> Result<String, Error> {
        if self.closed {
            return Err(self.closed_error());
        }
        let line = match self.next_line() {
            Ok(Some(line)) => line,
            Ok(None) => return Err(self.fail(Error::EndOfInput)),
            Err(e) => return Err(self.fail(e)),
        };
        self.line_number += 1;
        if let Some(checkpoint) = &mut self.checkpoint {
            checkpoint.lines.push(line.clone());
        }
        if line.chars().count() > self.config.max_line_len {
            let e = Error::format(
                ParsingError::LineTooLong(self.config.max_line_len),
                self.line_number,
            );
            return Err(self.fail(e));
        }
        self.record_count += 1;
        Ok(line)
    }
}

impl<S: Write> RecordStream<S> {
    /// Appends one physical line. The end of line is added here.
    pub fn write_record(&mut self, line: &str) -> Result<(), Error> {
        if self.closed {
            return Err(self.closed_error());
        }
        if line.chars().count() > self.config.max_line_len {
            let e = Error::format(
                ParsingError::LineTooLong(self.config.max_line_len),
                self.line_number + 1,
            );
            return Err(self.fail(e));
        }
        if let Err(e) = writeln!(self.inner, "{}", line) {
            return Err(self.fail(e.into()));
        }
        self.line_number += 1;
        self.record_count += 1;
        Ok(())
    }

    /// Flushes the underlying sink
    pub fn flush(&mut self) -> Result<(), Error> {
        if let Err(e) = self.inner.flush() {
            return Err(self.fail(e.into()));
        }
        Ok(())
    }
}
