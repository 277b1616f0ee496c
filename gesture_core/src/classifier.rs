//! Single-frame pose classification.
//!
//! Rules are tried in a fixed priority order and the first match wins, so a
//! pose that satisfies several rules at once (a pinch with three fingers
//! still raised, say) resolves deterministically:
//!
//! 1. **Pinch**: thumb tip and index tip overlap in the image *and* the
//!    thumb tip is tilted toward the sensor.
//! 2. **Open palm**: enough fingertips sit clearly above their PIP joints.
//! 3. **Fist**: fingertips pulled in close to the wrist relative to the
//!    wrist→index-MCP length of the same frame.
//! 4. Otherwise no gesture.

use std::fmt;

use serde::Serialize;

use crate::config::ClassifierThresholds;
use crate::landmark::{Hand, FINGER_PIPS, FINGER_TIPS, INDEX_MCP, INDEX_TIP, THUMB_TIP, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// GestureLabel
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    #[default]
    None,
    OpenPalm,
    Fist,
    Pinch,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GestureLabel::None     => "none",
            GestureLabel::OpenPalm => "open_palm",
            GestureLabel::Fist     => "fist",
            GestureLabel::Pinch    => "pinch",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == GestureLabel::None
    }
}

impl fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

pub fn classify(hand: &Hand, t: &ClassifierThresholds) -> GestureLabel {
    if is_pinching(hand, t) {
        GestureLabel::Pinch
    } else if extended_fingers(hand, t) >= t.open_palm_fingers {
        GestureLabel::OpenPalm
    } else if is_fist(hand, t) {
        GestureLabel::Fist
    } else {
        GestureLabel::None
    }
}

/// Depth gate keeps a 2-D overlap from an unrelated pose from reading as a pinch.
pub fn is_pinching(hand: &Hand, t: &ClassifierThresholds) -> bool {
    let thumb = hand.point(THUMB_TIP);
    let index = hand.point(INDEX_TIP);
    thumb.planar_distance(index) < t.pinch_distance && thumb.z < t.pinch_depth
}

/// Fingers (of index, middle, ring, pinky) whose tip is at least
/// `extension_margin` above its PIP.  Image y grows downward.
pub fn extended_fingers(hand: &Hand, t: &ClassifierThresholds) -> usize {
    FINGER_TIPS.iter()
        .zip(FINGER_PIPS.iter())
        .filter(|&(&tip, &pip)| hand.point(tip).y < hand.point(pip).y - t.extension_margin)
        .count()
}

pub fn is_fist(hand: &Hand, t: &ClassifierThresholds) -> bool {
    let wrist = hand.point(WRIST);
    let total: f32 = FINGER_TIPS.iter()
        .map(|&tip| hand.point(tip).planar_distance(wrist))
        .sum();
    let average = total / FINGER_TIPS.len() as f32;
    let reference = wrist.planar_distance(hand.point(INDEX_MCP));
    average < reference * t.fist_ratio
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;
    use crate::poses;

    fn hand(points: Vec<Landmark>) -> Hand {
        Hand::from_points(&points).unwrap()
    }

    fn label(points: Vec<Landmark>) -> GestureLabel {
        classify(&hand(points), &ClassifierThresholds::default())
    }

    #[test]
    fn stock_poses() {
        assert_eq!(label(poses::open_palm()), GestureLabel::OpenPalm);
        assert_eq!(label(poses::fist()),      GestureLabel::Fist);
        assert_eq!(label(poses::pinch()),     GestureLabel::Pinch);
        assert_eq!(label(poses::relaxed()),   GestureLabel::None);
    }

    #[test]
    fn pinch_wins_over_open_palm() {
        let h = hand(poses::pinch());
        let t = ClassifierThresholds::default();
        assert!(extended_fingers(&h, &t) >= 3, "pose should also qualify as an open palm");
        assert_eq!(classify(&h, &t), GestureLabel::Pinch);
    }

    #[test]
    fn pinch_wins_over_fist() {
        // Fist with the thumb brought onto the index tip and pushed forward.
        let mut points = poses::fist();
        let index_tip = points[INDEX_TIP];
        points[THUMB_TIP] = Landmark::new(index_tip.x + 0.005, index_tip.y, -0.05);
        let h = hand(points);
        let t = ClassifierThresholds::default();
        assert!(is_fist(&h, &t));
        assert_eq!(classify(&h, &t), GestureLabel::Pinch);
    }

    #[test]
    fn flat_overlap_is_not_a_pinch() {
        assert_eq!(label(poses::flat_pinch()), GestureLabel::OpenPalm);
    }

    #[test]
    fn depth_exactly_at_threshold_is_not_a_pinch() {
        let mut points = poses::pinch();
        points[THUMB_TIP].z = -0.02;
        assert_ne!(label(points), GestureLabel::Pinch);
    }

    #[test]
    fn tip_exactly_at_extension_margin_is_not_extended() {
        let t = ClassifierThresholds::default();
        let mut points = poses::open_palm();
        points[6].y = 0.5;
        points[8].y = points[6].y - t.extension_margin;
        assert_eq!(extended_fingers(&hand(points.clone()), &t), 3);

        points[8].y -= 0.001;
        assert_eq!(extended_fingers(&hand(points), &t), 4);
    }

    #[test]
    fn two_extended_fingers_are_not_an_open_palm() {
        let mut points = poses::open_palm();
        // Drop ring and pinky tips below their PIPs.
        points[16].y = 0.56;
        points[20].y = 0.61;
        let h = hand(points);
        let t = ClassifierThresholds::default();
        assert_eq!(extended_fingers(&h, &t), 2);
        assert_ne!(classify(&h, &t), GestureLabel::OpenPalm);
    }

    #[test]
    fn three_extended_fingers_are_enough() {
        let mut points = poses::open_palm();
        points[20].y = 0.61;
        assert_eq!(label(points), GestureLabel::OpenPalm);
    }

    #[test]
    fn extension_needs_the_full_margin() {
        // Tips 0.01 above their PIPs: raised, but not clearly.
        let h = hand(poses::relaxed());
        assert_eq!(extended_fingers(&h, &ClassifierThresholds::default()), 0);
    }

    #[test]
    fn fist_ratio_is_scale_invariant() {
        let small = poses::scale(&poses::fist(), 0.5, 0.7, 0.5);
        let large = poses::scale(&poses::fist(), 0.5, 0.7, 1.6);
        assert_eq!(label(small), GestureLabel::Fist);
        assert_eq!(label(large), GestureLabel::Fist);
    }

    #[test]
    fn thresholds_are_configurable() {
        let strict = ClassifierThresholds { fist_ratio: 0.3, ..Default::default() };
        assert_eq!(classify(&hand(poses::fist()), &strict), GestureLabel::None);

        let four = ClassifierThresholds { open_palm_fingers: 4, ..Default::default() };
        let mut points = poses::open_palm();
        points[20].y = 0.61;
        assert_ne!(classify(&hand(points), &four), GestureLabel::OpenPalm);
    }

    #[test]
    fn label_names() {
        assert_eq!(GestureLabel::OpenPalm.to_string(), "open_palm");
        assert!(GestureLabel::None.is_none());
        assert!(!GestureLabel::Fist.is_none());
    }
}
