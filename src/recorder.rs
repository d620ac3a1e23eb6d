//! Recorder pumps frames from a source into a sink

use tracing::{debug, error, info, trace, warn};

use crate::Result;
use crate::provider::{FrameSink, FrameSource};

/// Consecutive source errors tolerated before a recording is aborted.
pub const MAX_CONSECUTIVE_ERRORS: u32 = 10;

/// Outcome of a finished recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordingStats {
    /// Frames handed to the sink
    pub frames: u64,
    /// Source errors that were skipped
    pub source_errors: u32,
}

/// Drains a [`FrameSource`] into a [`FrameSink`].
///
/// Source errors are skipped until [`MAX_CONSECUTIVE_ERRORS`] happen in a
/// row. Sink errors stop the recording immediately.
pub struct Recorder<S, K> {
    source: S,
    sink: K,
    limit: Option<u64>,
}

impl<S, K> Recorder<S, K>
where
    S: FrameSource,
    K: FrameSink,
{
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink, limit: None }
    }

    /// Stop after `frames` frames even if the source has more.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    /// Run until the source ends or the limit is reached, then finish the sink.
    pub fn run(&mut self) -> Result<RecordingStats> {
        info!("Recording started ({})", self.source.layout());
        let mut stats = RecordingStats::default();
        let mut consecutive_errors = 0u32;

        loop {
            if self.limit.is_some_and(|limit| stats.frames >= limit) {
                debug!("Frame limit reached");
                break;
            }

            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => {
                    consecutive_errors = 0;
                    frame
                }
                Ok(None) => {
                    debug!("Source ended");
                    break;
                }
                Err(e) => {
                    consecutive_errors += 1;
                    stats.source_errors += 1;
                    if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                        error!("Too many consecutive source errors ({}), aborting: {}", consecutive_errors, e);
                        return Err(e);
                    }
                    warn!("Source error ({}/{}): {}", consecutive_errors, MAX_CONSECUTIVE_ERRORS, e);
                    continue;
                }
            };

            self.sink.consume(&frame)?;
            stats.frames += 1;
            trace!("Recorded frame {}", stats.frames);
        }

        self.sink.finish()?;
        info!("Recording finished: {} frames, {} source errors skipped", stats.frames, stats.source_errors);
        Ok(stats)
    }

    /// Give back the source and sink.
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }
}
