//! Core types for frame data representation.
//!
//! This module provides the value types a frame log stores:
//! - [`FrameLayout`] fixes image dimensions and body/joint slot counts
//! - [`Frame`] is one capture instant: depth, infrared, bodies, joint projections
//! - [`Body`] and [`Joint`] hold skeletal tracking data
//! - [`DepthImage`] is a row-major grid of 16-bit samples
//!
//! ## Usage Example
//!
//! ```rust
//! use framelog::types::{Frame, FrameLayout, HandState, Point2};
//!
//! let layout = FrameLayout::new(4, 4, 1, 1);
//! let mut frame = Frame::new(layout);
//! frame.depth.set(1, 2, 1500);
//! frame.bodies[0].tracked = true;
//! frame.bodies[0].left_hand_state = HandState::Closed;
//! frame.joint_projections[0][0] = Point2::new(2.5, 1.0);
//!
//! assert!(frame.check_layout(&layout).is_ok());
//! assert_eq!(frame.tracked_bodies().count(), 1);
//! ```

mod body;
mod frame;
mod image;
mod layout;

pub use body::{Body, HandState, Joint, TrackingState, Vector3, Vector4};
pub use frame::{Frame, Point2};
pub use image::DepthImage;
pub use layout::{BODY_FIXED_SIZE, FrameLayout, JOINT_RECORD_SIZE, MAX_RECORD_SIZE, PROJECTION_SIZE, TIMESTAMP_SIZE};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_layout()(
            width in 1u32..16,
            height in 1u32..16,
            body_count in 1u32..7,
            joint_count in 1u32..26,
        ) -> FrameLayout {
            FrameLayout::new(width, height, body_count, joint_count)
        }
    }

    proptest! {
        #[test]
        fn prop_record_size_is_sum_of_sections(layout in arb_layout()) {
            let sections = layout.image_bytes() * 2
                + TIMESTAMP_SIZE * 2
                + layout.body_count as usize * layout.body_bytes()
                + layout.projection_bytes();
            prop_assert_eq!(layout.record_size(), sections);
        }

        #[test]
        fn prop_new_frame_always_fits_its_layout(layout in arb_layout()) {
            let frame = Frame::new(layout);
            prop_assert!(frame.check_layout(&layout).is_ok());
            prop_assert_eq!(frame.layout(), layout);
            prop_assert_eq!(frame.depth.samples().len(), layout.pixel_count());
        }
    }
}
