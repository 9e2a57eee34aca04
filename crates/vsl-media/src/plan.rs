//! Composition planning.

use vsl_models::DisplaySettings;

use crate::overlay::bubble_overlay_filter;

/// Fullscreen continuation of the intro clip after the bubble phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FullscreenPhase {
    /// Where in the intro clip the fullscreen phase starts.
    pub start_secs: f64,
}

/// Resolved parameters for one composition: derived from the project
/// settings and the probed intro duration, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositionPlan {
    /// Filter graph for the bubble phase (background + masked intro).
    pub overlay_filter: String,
    /// Bubble phase length: `min(bubble_duration, intro_duration)`.
    pub bubble_secs: f64,
    /// Present only when the intro outlives the bubble phase.
    pub fullscreen: Option<FullscreenPhase>,
}

impl CompositionPlan {
    /// Resolve a plan from display settings and the intro clip duration.
    pub fn resolve(settings: &DisplaySettings, intro_duration: f64) -> Self {
        let bubble_secs = settings.bubble_duration_secs.min(intro_duration);
        let fullscreen = (intro_duration > settings.bubble_duration_secs).then(|| {
            FullscreenPhase {
                start_secs: settings.bubble_duration_secs,
            }
        });

        Self {
            overlay_filter: bubble_overlay_filter(settings),
            bubble_secs,
            fullscreen,
        }
    }

    /// Whether the output is assembled from two clips.
    pub fn needs_concat(&self) -> bool {
        self.fullscreen.is_some()
    }

    /// Total output duration implied by the plan.
    pub fn total_secs(&self, intro_duration: f64) -> f64 {
        match self.fullscreen {
            // Bubble phase + remainder of the intro == full intro length.
            Some(phase) => self.bubble_secs + (intro_duration - phase.start_secs),
            None => self.bubble_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsl_models::{BubblePosition, BubbleShape};

    fn settings(bubble_duration_secs: f64) -> DisplaySettings {
        DisplaySettings {
            position: BubblePosition::BottomLeft,
            shape: BubbleShape::Square,
            bubble_size: 200,
            bubble_duration_secs,
        }
    }

    #[test]
    fn test_long_intro_splits_into_two_phases() {
        // 20s intro with a 5s bubble: 5s overlay + 15s fullscreen.
        let plan = CompositionPlan::resolve(&settings(5.0), 20.0);
        assert!((plan.bubble_secs - 5.0).abs() < f64::EPSILON);
        let phase = plan.fullscreen.expect("fullscreen phase");
        assert!((phase.start_secs - 5.0).abs() < f64::EPSILON);
        assert!(plan.needs_concat());
        assert!((plan.total_secs(20.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_intro_stays_in_bubble() {
        // 3s intro with a 5s bubble window: whole intro in the bubble.
        let plan = CompositionPlan::resolve(&settings(5.0), 3.0);
        assert!((plan.bubble_secs - 3.0).abs() < f64::EPSILON);
        assert!(plan.fullscreen.is_none());
        assert!(!plan.needs_concat());
        assert!((plan.total_secs(3.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_exact_boundary_has_no_fullscreen_phase() {
        let plan = CompositionPlan::resolve(&settings(5.0), 5.0);
        assert!(plan.fullscreen.is_none());
    }
}
