//! Bubble overlay geometry and filter construction.
//!
//! Geometry lives in typed values so it can be tested without touching
//! FFmpeg expression syntax; serialization to the `overlay`/`geq` string
//! happens in one place at the end.

use vsl_models::{BubblePosition, BubbleShape, DisplaySettings};

/// Distance in pixels between the bubble and the frame edge.
pub const OVERLAY_MARGIN: u32 = 30;

/// FFmpeg overlay coordinate expressions for a corner anchor.
///
/// `W`/`H` are the background dimensions and `w`/`h` the bubble's, so the
/// expressions stay valid for any frame size.
pub fn overlay_anchor(position: BubblePosition) -> (String, String) {
    let near = OVERLAY_MARGIN.to_string();
    let far_x = format!("W-w-{OVERLAY_MARGIN}");
    let far_y = format!("H-h-{OVERLAY_MARGIN}");
    match position {
        BubblePosition::BottomRight => (far_x, far_y),
        BubblePosition::BottomLeft => (near.clone(), far_y),
        BubblePosition::TopRight => (far_x, near),
        BubblePosition::TopLeft => (near.clone(), near),
    }
}

/// Circular alpha mask over a square bubble box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleMask {
    /// Edge length of the bubble box in pixels.
    pub size: u32,
}

impl CircleMask {
    pub fn new(size: u32) -> Self {
        Self { size }
    }

    /// Alpha at a pixel: opaque inside the inscribed circle, transparent
    /// outside. Mirrors `geq_alpha_expr` exactly.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        let c = self.size as f64 / 2.0;
        let dx = x as f64 - c;
        let dy = y as f64 - c;
        if dx * dx + dy * dy > c * c {
            0
        } else {
            255
        }
    }

    /// The `geq` alpha expression evaluated per-pixel by FFmpeg.
    pub fn geq_alpha_expr(&self) -> String {
        let s = self.size;
        format!("if(gt(pow(X-{s}/2,2)+pow(Y-{s}/2,2),pow({s}/2,2)),0,255)")
    }
}

/// Build the filter graph that scales, masks, and overlays the intro clip
/// onto the background video.
///
/// Input 0 is the background (website capture), input 1 the intro clip;
/// the composed video stream is labelled `[vout]`.
pub fn bubble_overlay_filter(settings: &DisplaySettings) -> String {
    let (x, y) = overlay_anchor(settings.position);
    let size = settings.bubble_size;
    match settings.shape {
        BubbleShape::Circle => {
            let mask = CircleMask::new(size);
            format!(
                "[1:v]scale={size}:{size},format=rgba,geq=lum='p(X,Y)':a='{alpha}'[bubble];\
                 [0:v][bubble]overlay={x}:{y}[vout]",
                alpha = mask.geq_alpha_expr()
            )
        }
        BubbleShape::Square => {
            format!("[1:v]scale={size}:{size}[bubble];[0:v][bubble]overlay={x}:{y}[vout]")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_corners() {
        assert_eq!(
            overlay_anchor(BubblePosition::BottomRight),
            ("W-w-30".to_string(), "H-h-30".to_string())
        );
        assert_eq!(
            overlay_anchor(BubblePosition::BottomLeft),
            ("30".to_string(), "H-h-30".to_string())
        );
        assert_eq!(
            overlay_anchor(BubblePosition::TopRight),
            ("W-w-30".to_string(), "30".to_string())
        );
        assert_eq!(
            overlay_anchor(BubblePosition::TopLeft),
            ("30".to_string(), "30".to_string())
        );
    }

    #[test]
    fn test_circle_mask_center_opaque() {
        let mask = CircleMask::new(200);
        assert_eq!(mask.alpha_at(100, 100), 255);
    }

    #[test]
    fn test_circle_mask_corners_transparent() {
        let mask = CircleMask::new(200);
        assert_eq!(mask.alpha_at(0, 0), 0);
        assert_eq!(mask.alpha_at(199, 0), 0);
        assert_eq!(mask.alpha_at(0, 199), 0);
        assert_eq!(mask.alpha_at(199, 199), 0);
    }

    #[test]
    fn test_circle_mask_edge() {
        let mask = CircleMask::new(200);
        // On the circle itself (distance == radius) stays opaque.
        assert_eq!(mask.alpha_at(200, 100), 255);
        assert_eq!(mask.alpha_at(100, 0), 255);
        // Just outside along a diagonal is transparent.
        assert_eq!(mask.alpha_at(171, 171), 0);
    }

    #[test]
    fn test_circle_filter_contains_mask() {
        let settings = DisplaySettings {
            bubble_size: 150,
            ..Default::default()
        };
        let filter = bubble_overlay_filter(&settings);
        assert!(filter.contains("scale=150:150"));
        assert!(filter.contains("geq="));
        assert!(filter.contains("overlay=W-w-30:H-h-30"));
        assert!(filter.ends_with("[vout]"));
    }

    #[test]
    fn test_square_filter_has_no_mask() {
        let settings = DisplaySettings {
            shape: BubbleShape::Square,
            position: BubblePosition::TopLeft,
            bubble_size: 250,
            ..Default::default()
        };
        let filter = bubble_overlay_filter(&settings);
        assert!(filter.contains("scale=250:250"));
        assert!(!filter.contains("geq"));
        assert!(filter.contains("overlay=30:30"));
    }
}
