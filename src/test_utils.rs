//! Test utilities for building deterministic frames and scratch logs
//!
//! Used by unit tests and, through the `benchmark` feature, by the benches.

#![cfg(any(test, feature = "benchmark"))]

use std::path::Path;

use crate::provider::FrameSource;
use crate::recording::{FrameLog, LogOptions};
use crate::types::{Frame, FrameLayout, HandState, Point2, TrackingState, Vector3, Vector4};
use crate::{FrameLogError, Result};

/// Sensor frame period in 100ns ticks (30 Hz).
pub const FRAME_PERIOD_TICKS: i64 = 333_333;

/// 4x4 images, one body of one joint: a 128 byte record.
pub fn tiny_layout() -> FrameLayout {
    FrameLayout::new(4, 4, 1, 1)
}

/// Deterministic frame whose every field depends on `seed`.
///
/// Different seeds give different frames; all floats are finite so frames
/// compare equal after a round trip.
pub fn sample_frame(layout: FrameLayout, seed: u64) -> Frame {
    let mut frame = Frame::new(layout);
    let s = seed as usize;

    for (i, v) in frame.depth.samples_mut().iter_mut().enumerate() {
        *v = ((i * 31 + s * 7) % 8000) as u16;
    }
    for (i, v) in frame.infrared.samples_mut().iter_mut().enumerate() {
        *v = ((i * 17 + s * 13) % 65_535) as u16;
    }
    frame.depth_timestamp = seed as i64 * FRAME_PERIOD_TICKS;
    frame.infrared_timestamp = frame.depth_timestamp + 11;

    const HANDS: [HandState; 5] =
        [HandState::Unknown, HandState::NotTracked, HandState::Open, HandState::Closed, HandState::Lasso];
    const STATES: [TrackingState; 3] = [TrackingState::NotTracked, TrackingState::Inferred, TrackingState::Tracked];

    for (b, body) in frame.bodies.iter_mut().enumerate() {
        body.tracked = (b + s) % 2 == 0;
        body.left_hand_state = HANDS[(b + s) % HANDS.len()];
        body.right_hand_state = HANDS[(b + 2 * s + 1) % HANDS.len()];
        body.timestamp = frame.depth_timestamp;
        for (j, joint) in body.joints.iter_mut().enumerate() {
            let base = (b * 100 + j) as f32 * 0.01 + seed as f32;
            joint.position = Vector3 { x: base, y: -base, z: 1.5 + base };
            joint.orientation = Vector4 { x: 0.0, y: 0.5, z: -0.5, w: base };
            joint.state = STATES[(b + j + s) % STATES.len()];
        }
    }
    for (b, row) in frame.joint_projections.iter_mut().enumerate() {
        for (j, point) in row.iter_mut().enumerate() {
            *point = Point2::new((j * 3 + s) as f32 + 0.25, (b * 7 + s) as f32 - 0.5);
        }
    }

    frame
}

/// Write `count` sample frames (seeds `0..count`) and close the log.
pub fn write_log(path: &Path, options: LogOptions, count: u64) -> Result<Vec<Frame>> {
    let mut log = FrameLog::writer(path, options)?;
    let frames: Vec<Frame> = (0..count).map(|seed| sample_frame(options.layout, seed)).collect();
    for frame in &frames {
        log.write(frame)?;
    }
    log.close()?;
    Ok(frames)
}

/// Scratch directory removed on drop.
pub fn scratch_dir() -> std::io::Result<tempfile::TempDir> {
    tempfile::Builder::new().prefix("framelog-").tempdir()
}

/// Frame source standing in for a sensor.
///
/// Yields `count` sample frames; indices listed in `fail_at` produce an
/// error instead of a frame (the index is still consumed).
pub struct SyntheticSource {
    layout: FrameLayout,
    next: u64,
    count: u64,
    fail_at: Vec<u64>,
}

impl SyntheticSource {
    pub fn new(layout: FrameLayout, count: u64) -> Self {
        Self { layout, next: 0, count, fail_at: Vec::new() }
    }

    /// Fail on the given acquisition indices.
    pub fn failing_at(mut self, indices: impl IntoIterator<Item = u64>) -> Self {
        self.fail_at.extend(indices);
        self
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.next >= self.count {
            return Ok(None);
        }
        let index = self.next;
        self.next += 1;
        if self.fail_at.contains(&index) {
            return Err(FrameLogError::parse("Synthetic acquisition", format!("frame {} dropped", index)));
        }
        Ok(Some(sample_frame(self.layout, index)))
    }

    fn layout(&self) -> FrameLayout {
        self.layout
    }
}
