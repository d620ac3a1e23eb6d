//! Frame layout constants shared by writer and reader

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size in bytes of one serialized joint (position xyz, orientation xyzw, state).
pub const JOINT_RECORD_SIZE: usize = 3 * 4 + 4 * 4 + 1;

/// Size in bytes of the fixed part of a body record (tracked, hands, timestamp).
pub const BODY_FIXED_SIZE: usize = 1 + 1 + 1 + 8;

/// Size in bytes of one serialized joint projection (two f32).
pub const PROJECTION_SIZE: usize = 8;

/// Size in bytes of a serialized timestamp.
pub const TIMESTAMP_SIZE: usize = 8;

/// Largest record a log may declare (256 MiB).
pub const MAX_RECORD_SIZE: usize = 256 * 1024 * 1024;

/// Dimensions every record of one log shares.
///
/// A legacy headerless log carries none of this information, so the writer
/// and the reader must agree on it out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameLayout {
    /// Depth and infrared image width in pixels
    pub width: u32,
    /// Depth and infrared image height in pixels
    pub height: u32,
    /// Body slots per frame
    pub body_count: u32,
    /// Joint slots per body
    pub joint_count: u32,
}

impl FrameLayout {
    /// Native depth resolution of the Kinect v2 sensor, 6 bodies of 25 joints.
    pub const KINECT_V2: FrameLayout = FrameLayout::new(512, 424, 6, 25);

    pub const fn new(width: u32, height: u32, body_count: u32, joint_count: u32) -> Self {
        Self { width, height, body_count, joint_count }
    }

    /// Reject layouts with a zero dimension or a record above [`MAX_RECORD_SIZE`].
    pub fn validate(&self) -> crate::Result<()> {
        let fields = [
            ("width", self.width),
            ("height", self.height),
            ("body_count", self.body_count),
            ("joint_count", self.joint_count),
        ];
        for (name, value) in fields {
            if value == 0 {
                return Err(crate::FrameLogError::Config {
                    details: format!("Frame layout {} must be non-zero", name),
                });
            }
        }
        match self.checked_record_size() {
            Some(size) if size <= MAX_RECORD_SIZE => Ok(()),
            Some(size) => Err(crate::FrameLogError::Config {
                details: format!("Frame layout {} needs {} byte records (max {})", self, size, MAX_RECORD_SIZE),
            }),
            None => Err(crate::FrameLogError::Config {
                details: format!("Frame layout {} overflows the record size", self),
            }),
        }
    }

    /// [`record_size`](Self::record_size), or `None` if it does not fit in `usize`.
    pub fn checked_record_size(&self) -> Option<usize> {
        let width = usize::try_from(self.width).ok()?;
        let height = usize::try_from(self.height).ok()?;
        let bodies = usize::try_from(self.body_count).ok()?;
        let joints = usize::try_from(self.joint_count).ok()?;

        let image = width.checked_mul(height)?.checked_mul(2)?.checked_add(TIMESTAMP_SIZE)?;
        let body = joints.checked_mul(JOINT_RECORD_SIZE)?.checked_add(BODY_FIXED_SIZE)?;
        let projections = bodies.checked_mul(joints)?.checked_mul(PROJECTION_SIZE)?;
        image.checked_mul(2)?.checked_add(bodies.checked_mul(body)?)?.checked_add(projections)
    }

    /// Samples in one depth or infrared image.
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Bytes of one serialized depth or infrared image.
    pub const fn image_bytes(&self) -> usize {
        self.pixel_count() * 2
    }

    /// Bytes of one serialized body.
    pub const fn body_bytes(&self) -> usize {
        BODY_FIXED_SIZE + self.joint_count as usize * JOINT_RECORD_SIZE
    }

    /// Bytes of all joint projections in one record.
    pub const fn projection_bytes(&self) -> usize {
        self.body_count as usize * self.joint_count as usize * PROJECTION_SIZE
    }

    /// Bytes of one complete record on disk.
    ///
    /// Only meaningful for layouts that pass [`validate`](Self::validate).
    pub const fn record_size(&self) -> usize {
        2 * (self.image_bytes() + TIMESTAMP_SIZE)
            + self.body_count as usize * self.body_bytes()
            + self.projection_bytes()
    }
}

impl Default for FrameLayout {
    fn default() -> Self {
        Self::KINECT_V2
    }
}

impl fmt::Display for FrameLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} ({} bodies x {} joints)",
            self.width, self.height, self.body_count, self.joint_count
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiny_layout_record_size() {
        // 32 + 8 + 32 + 8 + (11 + 29) + 8
        let layout = FrameLayout::new(4, 4, 1, 1);
        assert_eq!(layout.body_bytes(), 40);
        assert_eq!(layout.record_size(), 128);
    }

    #[test]
    fn kinect_record_size() {
        let layout = FrameLayout::KINECT_V2;
        assert_eq!(layout.pixel_count(), 217_088);
        assert_eq!(layout.body_bytes(), 11 + 25 * 29);
        assert_eq!(layout.projection_bytes(), 6 * 25 * 8);
        assert_eq!(
            layout.record_size(),
            2 * (217_088 * 2 + 8) + 6 * (11 + 25 * 29) + 6 * 25 * 8
        );
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(FrameLayout::new(0, 4, 1, 1).validate().is_err());
        assert!(FrameLayout::new(4, 4, 1, 0).validate().is_err());
        assert!(FrameLayout::KINECT_V2.validate().is_ok());
    }

    #[test]
    fn checked_record_size_matches_and_catches_overflow() {
        assert_eq!(FrameLayout::KINECT_V2.checked_record_size(), Some(FrameLayout::KINECT_V2.record_size()));
        let huge = FrameLayout::new(u32::MAX, u32::MAX, u32::MAX, u32::MAX);
        assert!(matches!(huge.validate(), Err(crate::FrameLogError::Config { .. })));
    }

    #[test]
    fn oversized_records_are_rejected() {
        // Fits in usize but needs ~8 GiB per record.
        let layout = FrameLayout::new(65_535, 65_535, 1, 1);
        assert!(layout.checked_record_size().is_some_and(|size| size > MAX_RECORD_SIZE));
        assert!(layout.validate().is_err());
    }

    #[test]
    fn display_names_all_dimensions() {
        assert_eq!(FrameLayout::new(4, 3, 2, 1).to_string(), "4x3 (2 bodies x 1 joints)");
    }
}
