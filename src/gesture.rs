//! Hand gesture input.
//!
//! Hand tracking itself lives outside the engine. What arrives here is either
//! a ready [`GestureFrame`] or the 21 normalized landmarks of one hand, from
//! which [`count_fingers`] and [`hand_center`] derive a frame.
//!
//! Landmark indices follow the usual 21-point hand model: 0 is the wrist,
//! 4/8/12/16/20 are the finger tips, 5/9/13/17 the knuckles (MCP) and
//! 6/10/14/18 the middle joints (PIP). Coordinates are in image space, `[0, 1]`
//! with `y` growing downward.

use crate::{Vec2, Vec3};

/// Landmarks per tracked hand.
pub const LANDMARK_COUNT: usize = 21;
/// Highest finger count a frame can carry.
pub const MAX_FINGERS: u32 = 5;
/// How long a new raw count must persist before [`FingerStabilizer`] accepts it.
pub const FINGER_HYSTERESIS_SECONDS: f32 = 0.1;

const WRIST: usize = 0;
const THUMB_TIP: usize = 4;
const INDEX_MCP: usize = 5;
const MIDDLE_MCP: usize = 9;
const PINKY_MCP: usize = 17;

/// (tip, pip) pairs for index, middle, ring and pinky.
const FINGER_JOINTS: [(usize, usize); 4] = [(8, 6), (12, 10), (16, 14), (20, 18)];

/// Horizontal tip-to-knuckle distance beyond which the thumb counts as extended.
const THUMB_SPREAD: f32 = 0.05;
/// Wrist-to-middle-knuckle span that earns full confidence.
const FULL_CONFIDENCE_SPAN: f32 = 0.15;

/// One frame of gesture input, already clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureFrame {
    /// Extended fingers, `0..=5`. Zero is a fist.
    pub finger_count: u32,
    /// Horizontal hand position in `[-1, 1]`.
    pub x: f32,
    /// Vertical hand position in `[-1, 1]`, positive down.
    pub y: f32,
}

impl GestureFrame {
    /// Build a frame, clamping out-of-range input instead of rejecting it.
    pub fn new(finger_count: i32, x: f32, y: f32) -> Self {
        Self {
            finger_count: finger_count.clamp(0, MAX_FINGERS as i32) as u32,
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    /// Whether the hand is closed.
    #[inline]
    pub fn is_fist(&self) -> bool {
        self.finger_count == 0
    }

    /// Tension strength for this frame: 1 for a fist, 0 for an open hand.
    pub fn compression(&self) -> f32 {
        1.0 - self.finger_count as f32 / MAX_FINGERS as f32
    }

    /// World-space point the tension field pulls toward.
    pub fn world_center(&self) -> Vec3 {
        Vec3::new(self.x * 15.0, 5.0 - self.y * 5.0, 0.0)
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

/// Raw finger count with a size-based confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerCount {
    pub count: u32,
    /// `[0, 1]`, low when the hand is small in frame.
    pub confidence: f32,
}

/// Count extended fingers from one hand's landmarks.
///
/// Returns `None` unless exactly [`LANDMARK_COUNT`] points are given.
pub fn count_fingers(landmarks: &[Vec3]) -> Option<FingerCount> {
    if landmarks.len() != LANDMARK_COUNT {
        return None;
    }
    let lm = landmarks;

    let mut count = 0;
    if (lm[THUMB_TIP].x - lm[INDEX_MCP].x).abs() > THUMB_SPREAD {
        count += 1;
    }
    for (tip, pip) in FINGER_JOINTS {
        if lm[tip].y < lm[pip].y {
            count += 1;
        }
    }

    let span = lm[MIDDLE_MCP].truncate().distance(lm[WRIST].truncate());
    let confidence = (span / FULL_CONFIDENCE_SPAN).min(1.0);

    Some(FingerCount { count, confidence })
}

/// Palm center mapped to `[-1, 1]` on both axes.
///
/// The palm is the mean of the wrist, index knuckle and pinky knuckle.
pub fn hand_center(landmarks: &[Vec3]) -> Option<Vec2> {
    if landmarks.len() != LANDMARK_COUNT {
        return None;
    }
    let palm = (landmarks[WRIST] + landmarks[INDEX_MCP] + landmarks[PINKY_MCP]).truncate() / 3.0;
    Some((palm - Vec2::splat(0.5)) * 2.0)
}

/// Build a clamped frame straight from landmarks.
pub fn frame_from_landmarks(landmarks: &[Vec3]) -> Option<GestureFrame> {
    let fingers = count_fingers(landmarks)?;
    let center = hand_center(landmarks)?;
    Some(GestureFrame::new(fingers.count as i32, center.x, center.y))
}

/// Debounces raw finger counts.
///
/// A changed count is only reported once it has been seen continuously for
/// [`FINGER_HYSTERESIS_SECONDS`] of frame time. Seeing the stable count again
/// cancels a pending change. The first count after construction or
/// [`reset`](Self::reset) is taken as-is.
#[derive(Debug, Clone, Default)]
pub struct FingerStabilizer {
    stable: u32,
    pending_for: f32,
    primed: bool,
}

impl FingerStabilizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this frame's raw count and return the stable one.
    pub fn update(&mut self, raw: u32, dt: f32) -> u32 {
        if !self.primed {
            self.primed = true;
            self.stable = raw;
            return raw;
        }
        if raw == self.stable {
            self.pending_for = 0.0;
            return self.stable;
        }

        self.pending_for += dt;
        if self.pending_for >= FINGER_HYSTERESIS_SECONDS {
            self.stable = raw;
            self.pending_for = 0.0;
        }
        self.stable
    }

    #[inline]
    pub fn stable(&self) -> u32 {
        self.stable
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Open right hand, palm facing the camera, roughly centered.
    fn open_hand() -> Vec<Vec3> {
        let mut lm = vec![Vec3::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
        lm[WRIST] = Vec3::new(0.5, 0.8, 0.0);
        lm[THUMB_TIP] = Vec3::new(0.35, 0.6, 0.0);
        lm[INDEX_MCP] = Vec3::new(0.45, 0.6, 0.0);
        lm[MIDDLE_MCP] = Vec3::new(0.5, 0.6, 0.0);
        lm[PINKY_MCP] = Vec3::new(0.6, 0.62, 0.0);
        for (tip, pip) in FINGER_JOINTS {
            lm[pip] = Vec3::new(0.5, 0.5, 0.0);
            lm[tip] = Vec3::new(0.5, 0.35, 0.0);
        }
        lm
    }

    fn fist() -> Vec<Vec3> {
        let mut lm = open_hand();
        lm[THUMB_TIP] = Vec3::new(0.47, 0.62, 0.0);
        for (tip, pip) in FINGER_JOINTS {
            lm[tip] = Vec3::new(0.5, lm[pip].y + 0.05, 0.0);
        }
        lm
    }

    #[test]
    fn test_frame_clamps() {
        let frame = GestureFrame::new(9, 3.0, -7.0);
        assert_eq!(frame.finger_count, 5);
        assert_eq!(frame.x, 1.0);
        assert_eq!(frame.y, -1.0);

        let frame = GestureFrame::new(-2, f32::NAN, 0.5);
        assert_eq!(frame.finger_count, 0);
        assert_eq!(frame.x, 0.0);
        assert!(frame.is_fist());
    }

    #[test]
    fn test_compression_and_center() {
        assert_eq!(GestureFrame::new(0, 0.0, 0.0).compression(), 1.0);
        assert_eq!(GestureFrame::new(5, 0.0, 0.0).compression(), 0.0);
        assert!((GestureFrame::new(2, 0.0, 0.0).compression() - 0.6).abs() < 1e-6);

        let frame = GestureFrame::new(3, 1.0, -1.0);
        assert_eq!(frame.world_center(), Vec3::new(15.0, 10.0, 0.0));
        let frame = GestureFrame::new(3, -0.5, 1.0);
        assert_eq!(frame.world_center(), Vec3::new(-7.5, 0.0, 0.0));
    }

    #[test]
    fn test_count_fingers() {
        let open = count_fingers(&open_hand()).expect("21 landmarks");
        assert_eq!(open.count, 5);
        assert_eq!(open.confidence, 1.0);

        let closed = count_fingers(&fist()).expect("21 landmarks");
        assert_eq!(closed.count, 0);

        assert!(count_fingers(&[Vec3::ZERO; 5]).is_none());
    }

    #[test]
    fn test_confidence_scales_with_hand_size() {
        let mut lm = open_hand();
        lm[WRIST] = Vec3::new(0.5, 0.675, 0.0);
        let result = count_fingers(&lm).expect("21 landmarks");
        assert!((result.confidence - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_hand_center() {
        let center = hand_center(&open_hand()).expect("21 landmarks");
        // palm = (0.5167, 0.6733)
        assert!((center.x - 0.0333).abs() < 1e-3);
        assert!((center.y - 0.3467).abs() < 1e-3);
        assert!(hand_center(&[]).is_none());
    }

    #[test]
    fn test_frame_from_landmarks() {
        let frame = frame_from_landmarks(&fist()).expect("21 landmarks");
        assert!(frame.is_fist());
    }

    #[test]
    fn test_stabilizer_hysteresis() {
        let mut stab = FingerStabilizer::new();
        assert_eq!(stab.update(0, 0.016), 0);

        // A brief flicker is ignored
        assert_eq!(stab.update(3, 0.05), 0);
        assert_eq!(stab.update(0, 0.05), 0);
        assert_eq!(stab.update(3, 0.05), 0);

        // A sustained change is accepted
        assert_eq!(stab.update(3, 0.06), 3);
        assert_eq!(stab.stable(), 3);

        stab.reset();
        assert_eq!(stab.stable(), 0);
    }

    #[test]
    fn test_stabilizer_adopts_first_count() {
        let mut stab = FingerStabilizer::new();
        assert_eq!(stab.update(5, 0.016), 5);
        assert_eq!(stab.update(0, 0.016), 5);

        stab.reset();
        assert_eq!(stab.update(2, 0.016), 2);
    }
}
