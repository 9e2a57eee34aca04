//! Scroll plan math.

use std::time::Duration;

/// Precomputed scroll trajectory for one capture.
///
/// A page shorter than the viewport yields a delta of 0: a static capture
/// for the full duration, which is valid output rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollPlan {
    total_frames: u32,
    fps: u32,
    delta: f64,
    max_offset: f64,
}

impl ScrollPlan {
    pub fn new(page_height: f64, viewport_height: u32, duration_secs: f64, fps: u32) -> Self {
        let total_frames = ((duration_secs * fps as f64).round() as u32).max(1);
        let max_offset = (page_height - viewport_height as f64).max(0.0);
        Self {
            total_frames,
            fps,
            delta: max_offset / total_frames as f64,
            max_offset,
        }
    }

    /// Number of frames to capture.
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Scroll offset for a frame, clamped to the page bottom.
    pub fn offset(&self, frame: u32) -> f64 {
        (frame as f64 * self.delta).min(self.max_offset)
    }

    /// Settle wait between scrolling and screenshotting.
    ///
    /// A fixed `1000/fps` ms heuristic: not a paint-completion guarantee,
    /// kept as documented best-effort behavior.
    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(1000 / self.fps.max(1) as u64)
    }

    /// Whether the page never scrolls.
    pub fn is_static(&self) -> bool {
        self.delta == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count() {
        let plan = ScrollPlan::new(5000.0, 1080, 15.0, 30);
        assert_eq!(plan.total_frames(), 450);
    }

    #[test]
    fn test_short_page_is_static() {
        let plan = ScrollPlan::new(600.0, 1080, 15.0, 30);
        assert!(plan.is_static());
        assert_eq!(plan.total_frames(), 450);
        assert_eq!(plan.offset(0), 0.0);
        assert_eq!(plan.offset(449), 0.0);
    }

    #[test]
    fn test_offsets_clamped_to_page_bottom() {
        let plan = ScrollPlan::new(3000.0, 1080, 10.0, 30);
        let max = 3000.0 - 1080.0;
        assert_eq!(plan.offset(0), 0.0);
        assert!((plan.offset(plan.total_frames() - 1) - max * 299.0 / 300.0).abs() < 1e-6);
        // Past the end stays clamped.
        assert_eq!(plan.offset(plan.total_frames() * 2), max);
    }

    #[test]
    fn test_offsets_monotonic() {
        let plan = ScrollPlan::new(4000.0, 1080, 5.0, 30);
        let mut last = -1.0;
        for i in 0..plan.total_frames() {
            let offset = plan.offset(i);
            assert!(offset >= last);
            last = offset;
        }
    }

    #[test]
    fn test_frame_delay() {
        let plan = ScrollPlan::new(2000.0, 1080, 10.0, 30);
        assert_eq!(plan.frame_delay(), Duration::from_millis(33));
    }
}
