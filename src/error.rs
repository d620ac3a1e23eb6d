//! Error types for frame log operations.
//!
//! Every [`FrameLog`](crate::FrameLog) operation returns an explicit
//! [`Result`]. Failures that come from the underlying storage also move the
//! log into a sticky failed state: once a log has failed, every further
//! operation is rejected with [`FrameLogError::NotReady`] until it is opened
//! again.
//!
//! ## Error Categories
//!
//! - **Open Errors**: the path could not be opened in the requested mode
//! - **State Errors**: the log is failed, closed, or in the wrong mode
//! - **Stream Errors**: end of stream and short (truncated) reads
//! - **Format Errors**: bad headers, undecodable records, layout disagreements
//! - **Config Errors**: invalid or unreadable YAML configuration
//!
//! ## Example
//!
//! ```rust
//! use framelog::{FrameLogError, LogState};
//!
//! let error = FrameLogError::NotReady { state: LogState::Failed };
//! assert!(error.is_sticky());
//! for suggestion in error.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::recording::{LogMode, LogState};
use crate::types::FrameLayout;

/// Result type alias for frame log operations.
pub type Result<T, E = FrameLogError> = std::result::Result<T, E>;

/// Main error type for frame log operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FrameLogError {
    #[error("Failed to open frame log {path} for {mode}")]
    Open {
        path: PathBuf,
        mode: LogMode,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame log is not ready (state: {state})")]
    NotReady { state: LogState },

    #[error("Cannot {operation} a frame log opened for {mode}")]
    WrongMode { operation: &'static str, mode: LogMode },

    #[error("End of stream at frame {frame_index}")]
    EndOfStream { frame_index: u64 },

    #[error("Short read at frame {frame_index}: expected {expected} bytes, got {read}")]
    ShortRead { frame_index: u64, expected: usize, read: usize },

    #[error("I/O error during {operation} on {path}")]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame layout mismatch: log expects {expected}, frame has {found}")]
    LayoutMismatch { expected: FrameLayout, found: FrameLayout },

    #[error("Seek to frame {index} is out of range (log has {length} frames)")]
    SeekOutOfRange { index: u64, length: u64 },

    #[error("Invalid frame log header: {details}")]
    Header { details: String },

    #[error("Frame log version mismatch: expected {expected}, found {found}")]
    Version { expected: u32, found: u32 },

    #[error("Parse error in {context}: {details}")]
    Parse { context: String, details: String },

    #[error("Configuration error: {details}")]
    Config { details: String },
}

impl FrameLogError {
    /// Returns whether this error leaves the log in a state that rejects
    /// further operations until it is reopened.
    pub fn is_sticky(&self) -> bool {
        matches!(self, FrameLogError::Open { .. } | FrameLogError::NotReady { .. } | FrameLogError::Io { .. })
    }

    /// Returns whether this error marks the end of readable records.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, FrameLogError::EndOfStream { .. } | FrameLogError::ShortRead { .. })
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            FrameLogError::Open { .. } => vec![
                "Check the file exists and is readable",
                "Check write permissions on the target directory",
                "Reopen the log once the path is valid",
            ],
            FrameLogError::NotReady { .. } => {
                vec!["Reopen the log before reading or writing", "Check the error that caused the failure"]
            }
            FrameLogError::WrongMode { .. } => {
                vec!["Open the log in the mode matching the operation"]
            }
            FrameLogError::EndOfStream { .. } => {
                vec!["Seek back to an earlier frame", "Check length() before reading"]
            }
            FrameLogError::ShortRead { .. } => vec![
                "Discard the trailing partial record",
                "Verify reader and writer agree on the frame layout",
            ],
            FrameLogError::Io { .. } => vec![
                "Ensure sufficient disk space",
                "Check the storage device is still available",
                "Reopen the log",
            ],
            FrameLogError::LayoutMismatch { .. } => vec![
                "Build frames with Frame::new(log.layout())",
                "Verify capture resolution and body/joint counts",
            ],
            FrameLogError::SeekOutOfRange { .. } => vec!["Bound the index by length()"],
            FrameLogError::Header { .. } | FrameLogError::Version { .. } => vec![
                "Open legacy headerless files with LogFormat::Legacy",
                "Update the library to a compatible format version",
            ],
            FrameLogError::Parse { .. } => vec![
                "Verify the file is a frame log",
                "Verify reader and writer agree on the frame layout",
            ],
            FrameLogError::Config { .. } => {
                vec!["Check the YAML configuration syntax", "Ensure all layout dimensions are non-zero"]
            }
        }
    }

    /// Helper constructor for mid-operation I/O errors with path context.
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        FrameLogError::Io { path: path.into(), operation, source }
    }

    /// Helper constructor for parse errors.
    pub fn parse(context: impl Into<String>, details: impl Into<String>) -> Self {
        FrameLogError::Parse { context: context.into(), details: details.into() }
    }

    /// Helper constructor for header errors.
    pub fn header(details: impl Into<String>) -> Self {
        FrameLogError::Header { details: details.into() }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        FrameLogError::Config { details: details.into() }
    }
}

impl From<serde_yaml_ng::Error> for FrameLogError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        FrameLogError::Config { details: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_their_context(
            details in ".*",
            index in 0u64..1_000_000,
            length in 0u64..1_000_000,
            expected in 1usize..100_000,
            read in 0usize..100_000,
        ) {
            let parse = FrameLogError::parse("Body record", details.clone());
            prop_assert!(parse.to_string().contains(&details));

            let seek = FrameLogError::SeekOutOfRange { index, length };
            let msg = seek.to_string();
            prop_assert!(msg.contains(&index.to_string()));
            prop_assert!(msg.contains(&length.to_string()));

            let short = FrameLogError::ShortRead { frame_index: index, expected, read };
            prop_assert!(short.to_string().contains(&expected.to_string()));
            prop_assert!(short.is_end_of_stream());
        }
    }

    #[test]
    fn sticky_classification() {
        let io = FrameLogError::io("/tmp/a.flog", "write", std::io::Error::other("disk full"));
        assert!(io.is_sticky());
        assert!(FrameLogError::NotReady { state: LogState::Closed }.is_sticky());
        assert!(!FrameLogError::EndOfStream { frame_index: 3 }.is_sticky());
        assert!(!FrameLogError::SeekOutOfRange { index: 9, length: 3 }.is_sticky());
    }

    #[test]
    fn io_error_keeps_source() {
        let io = FrameLogError::io("/tmp/a.flog", "read", std::io::Error::other("device gone"));
        let source = std::error::Error::source(&io).expect("Io should carry its source");
        assert_eq!(source.to_string(), "device gone");
    }

    #[test]
    fn every_variant_has_suggestions() {
        let errors = vec![
            FrameLogError::NotReady { state: LogState::Failed },
            FrameLogError::WrongMode { operation: "write", mode: LogMode::Read },
            FrameLogError::EndOfStream { frame_index: 0 },
            FrameLogError::ShortRead { frame_index: 0, expected: 128, read: 5 },
            FrameLogError::LayoutMismatch { expected: FrameLayout::KINECT_V2, found: FrameLayout::new(4, 4, 1, 1) },
            FrameLogError::SeekOutOfRange { index: 4, length: 3 },
            FrameLogError::header("bad magic"),
            FrameLogError::Version { expected: 1, found: 7 },
            FrameLogError::parse("Joint", "bad state"),
            FrameLogError::config("width is zero"),
        ];
        for error in errors {
            assert!(!error.recovery_suggestions().is_empty(), "no suggestions for {error}");
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<FrameLogError>();
    }
}
