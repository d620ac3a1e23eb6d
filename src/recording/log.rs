//! Frame log: sequential and random-access storage of frame records
//!
//! A [`FrameLog`] is opened in exactly one [`LogMode`] and moves through an
//! explicit [`LogState`] machine:
//!
//! ```text
//! Closed --open ok--> Ready --close--> Closed
//!    \                  |
//!     open failed       I/O error
//!      \                v
//!       `---------->  Failed --open ok--> Ready
//! ```
//!
//! Once `Failed`, every operation returns [`FrameLogError::NotReady`] without
//! touching storage until `open` succeeds again.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use framelog::{Frame, FrameLayout, FrameLog, LogOptions};
//!
//! fn record_and_replay() -> framelog::Result<()> {
//!     let options = LogOptions::headered(FrameLayout::KINECT_V2);
//!
//!     let mut writer = FrameLog::writer("capture.flog", options)?;
//!     writer.write(&Frame::new(writer.layout()))?;
//!     writer.close()?;
//!
//!     let mut reader = FrameLog::reader("capture.flog", options)?;
//!     println!("{} frames", reader.length()?);
//!     reader.seek_frame(0)?;
//!     while let Some(frame) = reader.next_frame()? {
//!         println!("depth at {}", frame.depth_timestamp);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Performance Notes
//!
//! - One record buffer is reused for every read and write
//! - Seeking is O(1): offsets come from the fixed record size
//! - `size()` queries file metadata and never moves the cursor

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};

use super::format::{FileHeader, HEADER_SIZE, LogFormat, decode_frame, encode_frame};
use crate::provider::{FrameSink, FrameSource};
use crate::types::{Frame, FrameLayout};
use crate::{FrameLogError, Result};

/// Direction a log is opened in. Fixed for the lifetime of one `open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogMode {
    Read,
    Write,
}

impl fmt::Display for LogMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogMode::Read => f.write_str("read"),
            LogMode::Write => f.write_str("write"),
        }
    }
}

/// Lifecycle state of a [`FrameLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogState {
    /// Never opened, or closed explicitly
    Closed,
    /// Open and accepting operations
    Ready,
    /// An open or I/O failure happened; rejects everything until reopened
    Failed,
}

impl fmt::Display for LogState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogState::Closed => f.write_str("closed"),
            LogState::Ready => f.write_str("ready"),
            LogState::Failed => f.write_str("failed"),
        }
    }
}

/// Layout and header policy used when opening a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogOptions {
    /// Layout written to new logs and assumed for headerless ones
    pub layout: FrameLayout,
    pub format: LogFormat,
}

impl LogOptions {
    /// Write a header; require one when reading.
    pub fn headered(layout: FrameLayout) -> Self {
        Self { layout, format: LogFormat::Headered }
    }

    /// No header; `layout` must match what the writer used.
    pub fn legacy(layout: FrameLayout) -> Self {
        Self { layout, format: LogFormat::Legacy }
    }

    /// Use the header when present, fall back to `layout` otherwise.
    pub fn detect(layout: FrameLayout) -> Self {
        Self { layout, format: LogFormat::Detect }
    }
}

#[derive(Debug)]
enum Handle {
    Reader(BufReader<File>),
    Writer(BufWriter<File>),
}

/// Fixed-record-size binary store of [`Frame`]s.
#[derive(Debug)]
pub struct FrameLog {
    options: LogOptions,
    /// Effective layout; a header overrides the one in `options`
    layout: FrameLayout,
    handle: Option<Handle>,
    path: Option<PathBuf>,
    mode: Option<LogMode>,
    state: LogState,
    eof: bool,
    data_start: u64,
    position: u64,
    buffer: Vec<u8>,
}

impl FrameLog {
    /// A closed log. Call [`open`](Self::open) before use.
    pub fn new(options: LogOptions) -> Self {
        Self {
            options,
            layout: options.layout,
            handle: None,
            path: None,
            mode: None,
            state: LogState::Closed,
            eof: false,
            data_start: 0,
            position: 0,
            buffer: Vec::new(),
        }
    }

    /// Open an existing log for reading.
    pub fn reader<P: AsRef<Path>>(path: P, options: LogOptions) -> Result<Self> {
        let mut log = Self::new(options);
        log.open(path, LogMode::Read)?;
        Ok(log)
    }

    /// Create (or truncate) a log for writing.
    pub fn writer<P: AsRef<Path>>(path: P, options: LogOptions) -> Result<Self> {
        let mut log = Self::new(options);
        log.open(path, LogMode::Write)?;
        Ok(log)
    }

    /// Open `path` in `mode`, closing any log already open on this handle.
    ///
    /// On failure the log is left `Failed` with no file name.
    pub fn open<P: AsRef<Path>>(&mut self, path: P, mode: LogMode) -> Result<()> {
        let path = path.as_ref();
        if self.handle.is_some() {
            if let Err(e) = self.close() {
                warn!("Error closing previous log before reopening: {}", e);
            }
        }

        self.path = None;
        self.mode = Some(mode);
        self.eof = false;
        self.position = 0;
        self.data_start = 0;
        self.layout = self.options.layout;

        let opened = match mode {
            LogMode::Read => self.open_reader(path),
            LogMode::Write => self.open_writer(path),
        };

        match opened {
            Ok(handle) => {
                self.handle = Some(handle);
                self.path = Some(path.to_path_buf());
                self.state = LogState::Ready;
                info!(
                    "Opened frame log {} for {} ({}, {} format, {} byte records)",
                    path.display(),
                    mode,
                    self.layout,
                    self.options.format,
                    self.record_size()
                );
                Ok(())
            }
            Err(e) => {
                debug!("Failed to open {} for {}: {}", path.display(), mode, e);
                self.handle = None;
                self.state = LogState::Failed;
                Err(e)
            }
        }
    }

    fn open_reader(&mut self, path: &Path) -> Result<Handle> {
        let file = File::open(path).map_err(|source| FrameLogError::Open {
            path: path.to_path_buf(),
            mode: LogMode::Read,
            source,
        })?;
        let mut reader = BufReader::new(file);

        let headered = match self.options.format {
            LogFormat::Headered => true,
            LogFormat::Legacy => false,
            LogFormat::Detect => {
                let peek = reader.fill_buf().map_err(|e| FrameLogError::io(path, "header detection", e))?;
                FileHeader::has_magic(peek)
            }
        };

        if headered {
            let header = FileHeader::parse_from_reader(&mut reader)?;
            header.validate()?;
            if header.layout != self.options.layout {
                warn!(
                    "{} header declares layout {}, overriding configured {}",
                    path.display(),
                    header.layout,
                    self.options.layout
                );
            }
            self.layout = header.layout;
            self.data_start = u64::from(header.header_len);
            if header.header_len as usize > HEADER_SIZE {
                reader
                    .seek(SeekFrom::Start(self.data_start))
                    .map_err(|e| FrameLogError::io(path, "header skip", e))?;
            }
        } else {
            self.options.layout.validate()?;
            debug!("Reading {} as legacy headerless log", path.display());
        }

        Ok(Handle::Reader(reader))
    }

    fn open_writer(&mut self, path: &Path) -> Result<Handle> {
        self.options.layout.validate()?;
        let file = File::create(path).map_err(|source| FrameLogError::Open {
            path: path.to_path_buf(),
            mode: LogMode::Write,
            source,
        })?;
        let mut writer = BufWriter::new(file);

        if self.options.format != LogFormat::Legacy {
            FileHeader::new(self.layout)
                .write_to(&mut writer)
                .map_err(|e| FrameLogError::io(path, "header write", e))?;
            self.data_start = HEADER_SIZE as u64;
        }

        Ok(Handle::Writer(writer))
    }

    /// Append one record at the write cursor.
    ///
    /// A frame whose buffers do not match [`layout`](Self::layout) is
    /// rejected before anything is written.
    pub fn write(&mut self, frame: &Frame) -> Result<()> {
        self.ensure_ready("write", LogMode::Write)?;
        frame.check_layout(&self.layout)?;

        self.buffer.clear();
        encode_frame(frame, &mut self.buffer);

        let result = match self.handle.as_mut() {
            Some(Handle::Writer(writer)) => writer.write_all(&self.buffer),
            _ => return Err(self.not_ready()),
        };
        if let Err(e) = result {
            return Err(self.fail_io("write", e));
        }

        trace!("Wrote frame {} ({} bytes)", self.position, self.buffer.len());
        self.position += 1;
        Ok(())
    }

    /// Read the record at the read cursor.
    ///
    /// At the end of data this sets [`eof`](Self::eof) and returns
    /// [`FrameLogError::EndOfStream`], or [`FrameLogError::ShortRead`] when
    /// only part of a record remains. Partial records are never returned.
    pub fn read(&mut self) -> Result<Frame> {
        self.ensure_ready("read", LogMode::Read)?;
        if self.eof {
            return Err(FrameLogError::EndOfStream { frame_index: self.position });
        }

        let record_size = self.record_size();
        self.buffer.resize(record_size, 0);

        let result = match self.handle.as_mut() {
            Some(Handle::Reader(reader)) => read_full(reader, &mut self.buffer),
            _ => return Err(self.not_ready()),
        };
        let read = match result {
            Ok(n) => n,
            Err(e) => return Err(self.fail_io("read", e)),
        };

        if read == 0 {
            self.eof = true;
            debug!("End of stream at frame {}", self.position);
            return Err(FrameLogError::EndOfStream { frame_index: self.position });
        }
        if read < record_size {
            self.eof = true;
            warn!(
                "Trailing partial record at frame {}: {} of {} bytes",
                self.position, read, record_size
            );
            return Err(FrameLogError::ShortRead { frame_index: self.position, expected: record_size, read });
        }

        let index = self.position;
        self.position += 1;
        trace!("Read frame {}", index);
        decode_frame(&self.buffer, &self.layout)
    }

    /// Read the next record, mapping a clean end of stream to `Ok(None)`.
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        match self.read() {
            Ok(frame) => Ok(Some(frame)),
            Err(FrameLogError::EndOfStream { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Iterate the remaining records. Stops after the first error.
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { log: self, done: false }
    }

    /// Move the active cursor to record `index`.
    ///
    /// `index == length()` positions at the end (the append point when
    /// writing). Larger indices are rejected. Clears the end-of-stream flag.
    pub fn seek_frame(&mut self, index: u64) -> Result<()> {
        if self.state != LogState::Ready {
            return Err(self.not_ready());
        }

        let length = self.length()?;
        if index > length {
            return Err(FrameLogError::SeekOutOfRange { index, length });
        }

        let offset = index
            .checked_mul(self.record_size() as u64)
            .and_then(|bytes| bytes.checked_add(self.data_start))
            .ok_or_else(|| FrameLogError::parse("Frame seek", "Frame offset calculation overflowed"))?;

        let result = match self.handle.as_mut() {
            Some(Handle::Reader(reader)) => reader.seek(SeekFrom::Start(offset)),
            Some(Handle::Writer(writer)) => writer.seek(SeekFrom::Start(offset)),
            None => return Err(self.not_ready()),
        };
        if let Err(e) = result {
            return Err(self.fail_io("seek", e));
        }

        debug!("Seeked to frame {} (byte offset {})", index, offset);
        self.position = index;
        self.eof = false;
        Ok(())
    }

    /// Number of complete records. A trailing partial record is not counted.
    pub fn length(&mut self) -> Result<u64> {
        let size = self.size()?;
        Ok(size.saturating_sub(self.data_start) / self.record_size() as u64)
    }

    /// Total size of the underlying file in bytes, header included.
    ///
    /// Pending writes are flushed first. The cursor does not move.
    pub fn size(&mut self) -> Result<u64> {
        if self.state != LogState::Ready {
            return Err(self.not_ready());
        }

        let result = match self.handle.as_mut() {
            Some(Handle::Reader(reader)) => reader.get_ref().metadata().map(|m| m.len()),
            Some(Handle::Writer(writer)) => {
                writer.flush().and_then(|_| writer.get_ref().metadata()).map(|m| m.len())
            }
            None => return Err(self.not_ready()),
        };
        result.map_err(|e| self.fail_io("size", e))
    }

    /// Flush and release the file. The log rejects operations until reopened.
    ///
    /// Always leaves the log `Closed`, including after a failure.
    pub fn close(&mut self) -> Result<()> {
        let Some(handle) = self.handle.take() else {
            self.state = LogState::Closed;
            return Ok(());
        };
        self.state = LogState::Closed;

        let path = self.path.clone().unwrap_or_default();
        if let Handle::Writer(mut writer) = handle {
            writer.flush().map_err(|e| FrameLogError::io(&path, "close", e))?;
        }

        info!("Closed frame log {} at frame {}", path.display(), self.position);
        Ok(())
    }

    /// True unless the log is open and healthy.
    pub fn failed(&self) -> bool {
        self.state != LogState::Ready
    }

    /// True once a read has run past the last complete record.
    pub fn eof(&self) -> bool {
        self.eof
    }

    /// Path of the most recent successful open.
    pub fn file_name(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn state(&self) -> LogState {
        self.state
    }

    /// Mode of the most recent open attempt.
    pub fn mode(&self) -> Option<LogMode> {
        self.mode
    }

    /// Effective layout of the open log.
    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    pub fn format(&self) -> LogFormat {
        self.options.format
    }

    pub fn record_size(&self) -> usize {
        self.layout.record_size()
    }

    /// Byte offset of the first record.
    pub fn data_offset(&self) -> u64 {
        self.data_start
    }

    /// Index of the record the cursor is at.
    pub fn position(&self) -> u64 {
        self.position
    }

    fn ensure_ready(&self, operation: &'static str, required: LogMode) -> Result<()> {
        if self.state != LogState::Ready {
            return Err(self.not_ready());
        }
        match self.mode {
            Some(mode) if mode == required => Ok(()),
            Some(mode) => Err(FrameLogError::WrongMode { operation, mode }),
            None => Err(self.not_ready()),
        }
    }

    fn not_ready(&self) -> FrameLogError {
        FrameLogError::NotReady { state: self.state }
    }

    fn fail_io(&mut self, operation: &'static str, source: std::io::Error) -> FrameLogError {
        self.state = LogState::Failed;
        self.handle = None;
        let path = self.path.clone().unwrap_or_default();
        warn!("I/O failure during {} on {}: {}", operation, path.display(), source);
        FrameLogError::io(path, operation, source)
    }
}

impl Drop for FrameLog {
    fn drop(&mut self) {
        if let Some(Handle::Writer(writer)) = self.handle.as_mut() {
            if let Err(e) = writer.flush() {
                warn!("Failed to flush frame log on drop: {}", e);
            }
        }
    }
}

/// Iterator over the remaining records of a read-mode log.
pub struct Frames<'a> {
    log: &'a mut FrameLog,
    done: bool,
}

impl Iterator for Frames<'_> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.log.next_frame().transpose();
        if !matches!(next, Some(Ok(_))) {
            self.done = true;
        }
        next
    }
}

impl FrameSource for FrameLog {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        FrameLog::next_frame(self)
    }

    fn layout(&self) -> FrameLayout {
        self.layout
    }
}

impl FrameSink for FrameLog {
    fn consume(&mut self, frame: &Frame) -> Result<()> {
        self.write(frame)
    }

    fn finish(&mut self) -> Result<()> {
        self.close()
    }
}

/// Fill `buf` from `reader`, stopping early only at end of file.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
