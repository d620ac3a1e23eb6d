//! Replay source over a recorded frame log

use std::ops::Range;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::provider::FrameSource;
use crate::recording::{FrameLog, LogOptions};
use crate::types::{Frame, FrameLayout};
use crate::{FrameLogError, Result};

/// Sensor timestamps count 100ns ticks.
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Replays a frame log, optionally limited to a range of frame indices.
pub struct LogReplay {
    /// Read-mode log
    log: FrameLog,

    /// First frame of the range
    start: u64,

    /// One past the last frame of the range
    end: u64,
}

impl LogReplay {
    /// Open a log and replay all of it
    pub fn new<P: AsRef<Path>>(path: P, options: LogOptions) -> Result<Self> {
        let mut log = FrameLog::reader(path, options)?;
        let total = log.length()?;
        info!("Replaying {} frames of {}", total, log.layout());
        Ok(Self { log, start: 0, end: total })
    }

    /// Limit playback to `range`. The end is clamped to the log length.
    pub fn with_range(mut self, range: Range<u64>) -> Result<Self> {
        let length = self.log.length()?;
        let end = range.end.min(length);
        if range.start > end {
            return Err(FrameLogError::SeekOutOfRange { index: range.start, length });
        }
        self.log.seek_frame(range.start)?;
        self.start = range.start;
        self.end = end;
        debug!("Replay range set to {}..{}", self.start, self.end);
        Ok(self)
    }

    /// Frames in the replay range
    pub fn total_frames(&self) -> u64 {
        self.end - self.start
    }

    /// Absolute index of the next frame to be replayed
    pub fn current_frame(&self) -> u64 {
        self.log.position()
    }

    /// Frames left before the end of the range
    pub fn remaining(&self) -> u64 {
        self.end.saturating_sub(self.log.position())
    }

    /// Seek to an absolute frame index inside the replay range
    pub fn seek_to_frame(&mut self, frame: u64) -> Result<()> {
        if frame < self.start || frame > self.end {
            return Err(FrameLogError::SeekOutOfRange { index: frame, length: self.end });
        }
        self.log.seek_frame(frame)
    }

    /// Depth timestamp span between the first and last frame of the range.
    ///
    /// Reads both frames and restores the cursor afterwards, also on error.
    pub fn duration_ticks(&mut self) -> Result<i64> {
        if self.total_frames() < 2 {
            return Ok(0);
        }
        let resume = self.log.position();
        let span = self.timestamp_span();
        let restored = self.log.seek_frame(resume);
        let span = span?;
        restored?;
        Ok(span)
    }

    fn timestamp_span(&mut self) -> Result<i64> {
        self.log.seek_frame(self.start)?;
        let first = self.log.read()?.depth_timestamp;
        self.log.seek_frame(self.end - 1)?;
        let last = self.log.read()?.depth_timestamp;

        last.checked_sub(first).ok_or_else(|| {
            FrameLogError::parse(
                "Replay duration",
                format!("timestamp span {}..{} overflows i64 ticks", first, last),
            )
        })
    }

    /// [`duration_ticks`](Self::duration_ticks) as wall time
    pub fn duration(&mut self) -> Result<Duration> {
        let ticks = self.duration_ticks()?.max(0) as u64;
        Ok(Duration::from_nanos(ticks.saturating_mul(1_000_000_000 / TICKS_PER_SECOND as u64)))
    }

    /// The underlying log
    pub fn log(&self) -> &FrameLog {
        &self.log
    }

    /// Close the underlying log
    pub fn close(mut self) -> Result<()> {
        self.log.close()
    }
}

impl FrameSource for LogReplay {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.log.position() >= self.end {
            debug!("Reached end of replay range");
            return Ok(None);
        }

        let frame = self.log.next_frame()?;
        trace!("Replayed frame {}/{}", self.log.position(), self.end);
        Ok(frame)
    }

    fn layout(&self) -> FrameLayout {
        self.log.layout()
    }
}
