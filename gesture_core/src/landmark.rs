//! Hand landmarks as delivered by the upstream tracker.
//!
//! Coordinates are normalized to the camera frame: `x` and `y` in `[0, 1]`
//! with `y` growing downward, `z` a relative depth where more negative means
//! closer to the sensor.  A complete hand is exactly [`LANDMARK_COUNT`]
//! points in a fixed anatomical order.

use serde::{Deserialize, Serialize};

use crate::error::LandmarkError;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of points in a complete landmark set.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:     usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;

/// Proximal interphalangeal joints of index, middle, ring and pinky.
pub const FINGER_PIPS: [usize; 4] = [6, 10, 14, 18];

/// Tips of index, middle, ring and pinky, paired with [`FINGER_PIPS`].
pub const FINGER_TIPS: [usize; 4] = [8, 12, 16, 20];

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked point.  Serialized as a bare `[x, y, z]` array, the shape
/// trackers export and the replay format reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    /// Distance in the image plane, ignoring depth.
    pub fn planar_distance(&self, other: &Landmark) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Landmark {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Landmark { x, y, z }
    }
}

impl From<Landmark> for [f32; 3] {
    fn from(p: Landmark) -> Self {
        [p.x, p.y, p.z]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Hand: a validated landmark set
// ════════════════════════════════════════════════════════════════════════════

/// A landmark set that passed validation: exactly 21 finite points.
#[derive(Clone, Debug, PartialEq)]
pub struct Hand {
    points: [Landmark; LANDMARK_COUNT],
}

impl Hand {
    pub fn from_points(points: &[Landmark]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount { found: points.len() });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }
        let mut fixed = [Landmark::default(); LANDMARK_COUNT];
        fixed.copy_from_slice(points);
        Ok(Hand { points: fixed })
    }

    /// Landmark at anatomical index `idx` (0–20).
    pub fn point(&self, idx: usize) -> &Landmark {
        &self.points[idx]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    /// Mean image-plane position of all points.
    pub fn centroid(&self) -> (f32, f32) {
        let (sx, sy) = self.points.iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let n = LANDMARK_COUNT as f32;
        (sx / n, sy / n)
    }
}

impl TryFrom<&[Landmark]> for Hand {
    type Error = LandmarkError;

    fn try_from(points: &[Landmark]) -> Result<Self, Self::Error> {
        Hand::from_points(points)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Frame: what the source hands over once per video frame
// ════════════════════════════════════════════════════════════════════════════

/// One upstream frame: either no hand, or a (not yet validated) landmark set.
#[derive(Clone, Debug, PartialEq)]
pub enum Frame {
    NoHand,
    Hand(Vec<Landmark>),
}

impl Frame {
    /// Presence is derived from whether a landmark set was supplied at all,
    /// malformed or not.
    pub fn has_hand(&self) -> bool {
        matches!(self, Frame::Hand(_))
    }
}

impl From<Option<Vec<Landmark>>> for Frame {
    fn from(points: Option<Vec<Landmark>>) -> Self {
        match points {
            Some(p) => Frame::Hand(p),
            None    => Frame::NoHand,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
