//! Skeletal body types

/// Per-joint tracking confidence.
/// Values match the sensor SDK's `TrackingState` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TrackingState {
    #[default]
    NotTracked = 0,
    Inferred = 1,
    Tracked = 2,
}

impl TrackingState {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TrackingState::NotTracked),
            1 => Some(TrackingState::Inferred),
            2 => Some(TrackingState::Tracked),
            _ => None,
        }
    }
}

/// Hand grip state.
/// Values match the sensor SDK's `HandState` numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HandState {
    #[default]
    Unknown = 0,
    NotTracked = 1,
    Open = 2,
    Closed = 3,
    Lasso = 4,
}

impl HandState {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HandState::Unknown),
            1 => Some(HandState::NotTracked),
            2 => Some(HandState::Open),
            3 => Some(HandState::Closed),
            4 => Some(HandState::Lasso),
            _ => None,
        }
    }
}

/// Camera-space position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Joint orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// One skeletal joint.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Joint {
    pub position: Vector3,
    pub orientation: Vector4,
    pub state: TrackingState,
}

/// One tracked-or-untracked skeleton slot.
///
/// When `tracked` is false the remaining fields are stale. They are still
/// stored and read back byte for byte, but carry no meaning.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub tracked: bool,
    pub joints: Vec<Joint>,
    pub left_hand_state: HandState,
    pub right_hand_state: HandState,
    pub timestamp: i64,
}

impl Body {
    /// Untracked body with `joint_count` default joints.
    pub fn untracked(joint_count: usize) -> Self {
        Self { joints: vec![Joint::default(); joint_count], ..Default::default() }
    }

    /// Joints whose own state is `Tracked`.
    pub fn tracked_joints(&self) -> impl Iterator<Item = (usize, &Joint)> {
        self.joints.iter().enumerate().filter(|(_, j)| j.state == TrackingState::Tracked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_bytes_round_trip() {
        for state in [TrackingState::NotTracked, TrackingState::Inferred, TrackingState::Tracked] {
            assert_eq!(TrackingState::from_u8(state as u8), Some(state));
        }
        for hand in [HandState::Unknown, HandState::NotTracked, HandState::Open, HandState::Closed, HandState::Lasso] {
            assert_eq!(HandState::from_u8(hand as u8), Some(hand));
        }
        assert_eq!(TrackingState::from_u8(3), None);
        assert_eq!(HandState::from_u8(5), None);
    }

    #[test]
    fn tracked_joints_filters_by_state() {
        let mut body = Body::untracked(3);
        body.joints[1].state = TrackingState::Tracked;
        body.joints[2].state = TrackingState::Inferred;
        let idx: Vec<usize> = body.tracked_joints().map(|(i, _)| i).collect();
        assert_eq!(idx, vec![1]);
    }
}
