//! Run-length debouncer for per-frame labels.
//!
//! A label is confirmed only after `required` identical, uninterrupted,
//! non-`None` classifications.  Any interruption, a single `None` frame
//! included, starts the count over.  After a confirmation the count resets
//! but the label is remembered, so holding the pose confirms again after
//! another full run.

use crate::classifier::GestureLabel;

#[derive(Debug, Clone)]
pub struct StabilityFilter {
    last_label: GestureLabel,
    consecutive: u32,
    required:    u32,
}

impl StabilityFilter {
    pub fn new(required: u32) -> Self {
        StabilityFilter {
            last_label: GestureLabel::None,
            consecutive: 0,
            required:    required.max(1),
        }
    }

    /// Feed one frame's label; returns the label when its run completes.
    pub fn filter(&mut self, label: GestureLabel) -> Option<GestureLabel> {
        if label.is_none() {
            self.reset();
            return None;
        }

        if label == self.last_label {
            self.consecutive += 1;
        } else {
            self.last_label = label;
            self.consecutive = 1;
        }

        if self.consecutive >= self.required {
            self.consecutive = 0;
            Some(label)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.last_label = GestureLabel::None;
        self.consecutive = 0;
    }

    pub fn last_label(&self) -> GestureLabel { self.last_label }
    pub fn consecutive(&self) -> u32 { self.consecutive }
}

impl Default for StabilityFilter {
    fn default() -> Self {
        StabilityFilter::new(8)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const PALM: GestureLabel = GestureLabel::OpenPalm;
    const FIST: GestureLabel = GestureLabel::Fist;

    fn feed(f: &mut StabilityFilter, label: GestureLabel, n: usize) -> Vec<Option<GestureLabel>> {
        (0..n).map(|_| f.filter(label)).collect()
    }

    #[test]
    fn eighth_identical_frame_confirms() {
        let mut f = StabilityFilter::default();
        let out = feed(&mut f, PALM, 8);
        assert!(out[..7].iter().all(Option::is_none));
        assert_eq!(out[7], Some(PALM));
    }

    #[test]
    fn seven_then_none_never_confirms() {
        let mut f = StabilityFilter::default();
        assert!(feed(&mut f, PALM, 7).iter().all(Option::is_none));
        assert_eq!(f.filter(GestureLabel::None), None);
        assert_eq!((f.last_label(), f.consecutive()), (GestureLabel::None, 0));
        // The run starts from scratch afterwards.
        assert!(feed(&mut f, PALM, 7).iter().all(Option::is_none));
        assert_eq!(f.filter(PALM), Some(PALM));
    }

    #[test]
    fn different_label_restarts_the_run() {
        let mut f = StabilityFilter::default();
        feed(&mut f, PALM, 7);
        assert_eq!(f.filter(FIST), None);
        assert_eq!(f.consecutive(), 1);
        assert!(feed(&mut f, FIST, 6).iter().all(Option::is_none));
        assert_eq!(f.filter(FIST), Some(FIST));
    }

    #[test]
    fn alternating_labels_never_confirm() {
        let mut f = StabilityFilter::default();
        for i in 0..100 {
            let label = if i % 2 == 0 { PALM } else { FIST };
            assert_eq!(f.filter(label), None);
        }
    }

    #[test]
    fn held_pose_reconfirms_after_another_full_run() {
        let mut f = StabilityFilter::default();
        let out = feed(&mut f, PALM, 24);
        let hits: Vec<usize> = out.iter().enumerate()
            .filter(|(_, o)| o.is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![7, 15, 23]);
    }

    #[test]
    fn custom_run_length() {
        let mut f = StabilityFilter::new(3);
        assert_eq!(feed(&mut f, FIST, 3), vec![None, None, Some(FIST)]);
    }
}
