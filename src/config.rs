//! YAML configuration for frame logs
//!
//! Headerless logs carry no description of their own layout, so the writer
//! and every reader share it through a small YAML file:
//!
//! ```yaml
//! layout:
//!   width: 512
//!   height: 424
//!   body_count: 6
//!   joint_count: 25
//! format: legacy
//! ```
//!
//! `format` is required. `layout` defaults to the Kinect v2 depth layout.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::recording::{LogFormat, LogOptions};
use crate::types::FrameLayout;
use crate::{FrameLogError, Result};

/// Layout and header policy shared between recorder and readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(default)]
    pub layout: FrameLayout,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn new(layout: FrameLayout, format: LogFormat) -> Self {
        Self { layout, format }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: LogConfig = serde_yaml_ng::from_str(yaml)?;
        config.layout.validate()?;
        debug!("Loaded log config: {} ({})", config.layout, config.format);
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            FrameLogError::config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    pub fn options(&self) -> LogOptions {
        LogOptions { layout: self.layout, format: self.format }
    }
}

impl From<LogConfig> for LogOptions {
    fn from(config: LogConfig) -> Self {
        config.options()
    }
}
