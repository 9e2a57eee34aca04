//! Project display settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Corner of the frame the bubble overlay is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BubblePosition {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl BubblePosition {
    /// Parse a stored position string; unknown values fall back to the
    /// bottom-right corner.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "bottom_left" => Self::BottomLeft,
            "top_right" => Self::TopRight,
            "top_left" => Self::TopLeft,
            _ => Self::BottomRight,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BottomRight => "bottom_right",
            Self::BottomLeft => "bottom_left",
            Self::TopRight => "top_right",
            Self::TopLeft => "top_left",
        }
    }
}

impl fmt::Display for BubblePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape of the bubble overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BubbleShape {
    #[default]
    Circle,
    Square,
}

/// User-facing size presets for the bubble overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    #[default]
    SmallBubble,
    LargeBubble,
}

impl DisplayMode {
    /// Bubble edge length in pixels for this preset.
    pub fn bubble_size(&self) -> u32 {
        match self {
            Self::SmallBubble => 150,
            Self::LargeBubble => 250,
        }
    }
}

/// Resolved overlay settings for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub position: BubblePosition,
    pub shape: BubbleShape,
    /// Bubble edge length in pixels.
    pub bubble_size: u32,
    /// How long the intro plays inside the bubble before going fullscreen.
    pub bubble_duration_secs: f64,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            position: BubblePosition::default(),
            shape: BubbleShape::default(),
            bubble_size: DisplayMode::default().bubble_size(),
            bubble_duration_secs: 5.0,
        }
    }
}

impl DisplaySettings {
    /// Settings derived from a display-mode preset.
    pub fn for_mode(mode: DisplayMode, position: BubblePosition, shape: BubbleShape) -> Self {
        Self {
            position,
            shape,
            bubble_size: mode.bubble_size(),
            ..Default::default()
        }
    }
}

/// The per-project inputs the pipeline consumes: an uploaded intro clip
/// and how to display it over each lead's website capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Path to the uploaded intro video.
    pub intro_video: PathBuf,
    pub settings: DisplaySettings,
}

impl Project {
    pub fn new(name: impl Into<String>, intro_video: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            intro_video: intro_video.into(),
            settings: DisplaySettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: DisplaySettings) -> Self {
        self.settings = settings;
        self
    }
}

/// Normalize a lead's website URL for navigation.
///
/// Imported lead lists frequently carry bare domains; prepend `https://`
/// when no scheme is present.
pub fn normalize_website_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}
