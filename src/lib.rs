//! Fixed-record binary logs of depth-camera captures.
//!
//! framelog stores a sequence of [`Frame`]s (depth image, infrared image,
//! timestamps, skeletal bodies and joint projections) as fixed-size records,
//! so any frame can be reached by index in O(1).
//!
//! # Features
//!
//! - **Pinned layout**: every record field has an explicit little-endian, padding-free encoding
//! - **Random access**: seek by frame index, floor-division length, truncation-safe reads
//! - **Explicit failures**: every operation returns a [`Result`]; I/O failures are sticky
//! - **Legacy compatible**: headerless logs with out-of-band layout, or self-describing headers
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use framelog::{Frame, FrameLayout, FrameLog, LogOptions};
//!
//! fn main() -> framelog::Result<()> {
//!     let layout = FrameLayout::KINECT_V2;
//!
//!     let mut log = FrameLog::writer("session.flog", LogOptions::headered(layout))?;
//!     let mut frame = Frame::new(layout);
//!     frame.depth_timestamp = 333_333;
//!     log.write(&frame)?;
//!     log.close()?;
//!
//!     let mut log = FrameLog::reader("session.flog", LogOptions::detect(layout))?;
//!     let last = log.length()? - 1;
//!     log.seek_frame(last)?;
//!     let frame = log.read()?;
//!     println!("last depth frame at tick {}", frame.depth_timestamp);
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Storage
pub mod recording;

// Sources, sinks and pumping
pub mod provider;
pub mod providers;
pub mod recorder;

// Core exports
pub use config::LogConfig;
pub use error::*;
pub use types::{Body, DepthImage, Frame, FrameLayout, HandState, Joint, Point2, TrackingState};

// Storage exports
pub use recording::{FileHeader, FrameLog, Frames, LogFormat, LogMode, LogOptions, LogState};

// Source/sink exports
pub use provider::{FrameSink, FrameSource};
pub use providers::LogReplay;
pub use recorder::{Recorder, RecordingStats};
