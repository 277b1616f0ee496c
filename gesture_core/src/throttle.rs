//! Wall-clock frame throttle.
//!
//! Not a scheduler: a frame is simply dropped when it arrives sooner than
//! `min_interval` after the last frame that was let through.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct FrameThrottle {
    min_interval: Duration,
    last:         Option<Instant>,
}

impl FrameThrottle {
    pub fn new(min_interval: Duration) -> Self {
        FrameThrottle { min_interval, last: None }
    }

    /// True if the frame at `now` should be processed.
    pub fn admit(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last {
            if now.saturating_duration_since(last) < self.min_interval {
                return false;
            }
        }
        self.last = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration { Duration::from_millis(n) }

    #[test]
    fn drops_frames_closer_than_interval() {
        let t0 = Instant::now();
        let mut th = FrameThrottle::new(ms(50));
        assert!(th.admit(t0));
        assert!(!th.admit(t0 + ms(33)));
        assert!(!th.admit(t0 + ms(49)));
        assert!(th.admit(t0 + ms(50)));
        // Measured from the last admitted frame, not the last seen one.
        assert!(!th.admit(t0 + ms(83)));
        assert!(th.admit(t0 + ms(100)));
    }

    #[test]
    fn camera_at_30fps_yields_about_15_processed() {
        let t0 = Instant::now();
        let mut th = FrameThrottle::new(ms(50));
        let admitted = (0..30u64)
            .filter(|i| th.admit(t0 + Duration::from_micros(i * 33_333)))
            .count();
        assert_eq!(admitted, 15);
    }
}
