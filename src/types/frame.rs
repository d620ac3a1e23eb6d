//! Frame record type

use super::{Body, DepthImage, FrameLayout};
use crate::{FrameLogError, Result};

/// Image-space projection of a joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One capture instant.
///
/// This is the unit a log stores. Every frame of one log has the same
/// [`FrameLayout`].
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub depth: DepthImage,
    /// Sensor-relative depth timestamp in ticks
    pub depth_timestamp: i64,
    pub infrared: DepthImage,
    /// Sensor-relative infrared timestamp in ticks
    pub infrared_timestamp: i64,
    pub bodies: Vec<Body>,
    /// One row of joint projections per body
    pub joint_projections: Vec<Vec<Point2>>,
}

impl Frame {
    /// Zero-filled frame for `layout`.
    pub fn new(layout: FrameLayout) -> Self {
        let joints = layout.joint_count as usize;
        let bodies = layout.body_count as usize;
        Self {
            depth: DepthImage::zeros(layout.width, layout.height),
            depth_timestamp: 0,
            infrared: DepthImage::zeros(layout.width, layout.height),
            infrared_timestamp: 0,
            bodies: (0..bodies).map(|_| Body::untracked(joints)).collect(),
            joint_projections: vec![vec![Point2::default(); joints]; bodies],
        }
    }

    /// Layout inferred from the depth image and the first body.
    pub fn layout(&self) -> FrameLayout {
        let joint_count = self.bodies.first().map_or(0, |b| b.joints.len());
        FrameLayout::new(
            self.depth.width(),
            self.depth.height(),
            count_u32(self.bodies.len()),
            count_u32(joint_count),
        )
    }

    /// Check that every buffer of this frame fits `layout` exactly.
    pub fn check_layout(&self, layout: &FrameLayout) -> Result<()> {
        let joints = layout.joint_count as usize;
        let consistent = self.depth.width() == layout.width
            && self.depth.height() == layout.height
            && self.infrared.width() == layout.width
            && self.infrared.height() == layout.height
            && self.bodies.len() == layout.body_count as usize
            && self.bodies.iter().all(|b| b.joints.len() == joints)
            && self.joint_projections.len() == layout.body_count as usize
            && self.joint_projections.iter().all(|row| row.len() == joints);

        if consistent {
            Ok(())
        } else {
            Err(FrameLogError::LayoutMismatch { expected: *layout, found: self.layout() })
        }
    }

    /// Bodies whose `tracked` flag is set, with their slot index.
    pub fn tracked_bodies(&self) -> impl Iterator<Item = (usize, &Body)> {
        self.bodies.iter().enumerate().filter(|(_, b)| b.tracked)
    }

    /// Joint projections of body slot `index`.
    pub fn projections(&self, index: usize) -> Option<&[Point2]> {
        self.joint_projections.get(index).map(Vec::as_slice)
    }
}

/// Saturate at `u32::MAX` so an oversized frame never aliases a valid layout.
fn count_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_matches_layout() {
        let layout = FrameLayout::new(4, 3, 2, 5);
        let frame = Frame::new(layout);
        assert_eq!(frame.layout(), layout);
        frame.check_layout(&layout).unwrap();
        assert_eq!(frame.tracked_bodies().count(), 0);
        assert_eq!(frame.projections(1).map(<[Point2]>::len), Some(5));
    }

    #[test]
    fn ragged_joint_rows_are_rejected() {
        let layout = FrameLayout::new(4, 4, 2, 3);
        let mut frame = Frame::new(layout);
        frame.joint_projections[1].pop();
        assert!(matches!(frame.check_layout(&layout), Err(FrameLogError::LayoutMismatch { .. })));

        let mut frame = Frame::new(layout);
        frame.bodies[0].joints.push(Default::default());
        assert!(frame.check_layout(&layout).is_err());
    }

    #[test]
    fn infrared_must_match_depth_dimensions() {
        let layout = FrameLayout::new(4, 4, 1, 1);
        let mut frame = Frame::new(layout);
        frame.infrared = DepthImage::zeros(2, 2);
        assert!(frame.check_layout(&layout).is_err());
    }

    #[test]
    fn oversized_counts_saturate() {
        assert_eq!(count_u32(7), 7);
        assert_eq!(count_u32(u32::MAX as usize), u32::MAX);
        if let Ok(len) = usize::try_from(u64::from(u32::MAX) + 1) {
            assert_eq!(count_u32(len), u32::MAX);
        }
    }

    #[test]
    fn tracked_bodies_skips_stale_slots() {
        let mut frame = Frame::new(FrameLayout::KINECT_V2);
        frame.bodies[2].tracked = true;
        frame.bodies[5].tracked = true;
        let slots: Vec<usize> = frame.tracked_bodies().map(|(i, _)| i).collect();
        assert_eq!(slots, vec![2, 5]);
    }
}
