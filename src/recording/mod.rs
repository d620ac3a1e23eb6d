//! Frame log storage
//!
//! This module provides the on-disk record format and the [`FrameLog`]
//! handle that reads and writes it.

pub mod format;
pub mod log;

pub use format::{FileHeader, LogFormat};
pub use log::{FrameLog, Frames, LogMode, LogOptions, LogState};
