//! Source and sink traits for frame producers and consumers

use crate::Result;
use crate::types::{Frame, FrameLayout};

/// Trait for frame producers
///
/// Sources abstract over where frames come from: a live sensor, a replayed
/// log, or a synthetic generator.
pub trait FrameSource {
    /// Get the next frame
    ///
    /// Returns:
    /// - `Ok(Some(frame))` - New frame available
    /// - `Ok(None)` - Source ended (normal termination)
    /// - `Err(e)` - Error occurred
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Layout of every frame this source yields
    fn layout(&self) -> FrameLayout;
}

/// Trait for frame consumers (logs, displays, encoders)
pub trait FrameSink {
    /// Consume one frame
    fn consume(&mut self, frame: &Frame) -> Result<()>;

    /// Called once after the last frame
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }

    fn layout(&self) -> FrameLayout {
        (**self).layout()
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn consume(&mut self, frame: &Frame) -> Result<()> {
        (**self).consume(frame)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        (**self).next_frame()
    }

    fn layout(&self) -> FrameLayout {
        (**self).layout()
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn consume(&mut self, frame: &Frame) -> Result<()> {
        (**self).consume(frame)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

/// Collects frames in memory
impl FrameSink for Vec<Frame> {
    fn consume(&mut self, frame: &Frame) -> Result<()> {
        self.push(frame.clone());
        Ok(())
    }
}
