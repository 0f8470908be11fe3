use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::plan::{MIN_SEGMENT_SECONDS, SegmentRule};
use super::render::OverlayStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Videos longer than this (in seconds) use the long segment length
    pub threshold_seconds: f64,
    /// Segment length for long videos
    pub long_segment_seconds: f64,
    /// Segment length for short videos
    pub short_segment_seconds: f64,
    /// Caption font size in pixels
    pub font_size: u32,
    /// Caption text color (any ffmpeg color expression)
    pub font_color: String,
    /// Caption box color, e.g. black@0.5
    pub box_color: String,
    /// Replace existing part files; when false, an existing part fails the run
    pub overwrite: bool,
    /// ffmpeg executable name or path
    pub ffmpeg: String,
    /// ffprobe executable name or path
    pub ffprobe: String,
}

impl Default for SplitConfig {
    fn default() -> Self {
        let rule = SegmentRule::default();
        let style = OverlayStyle::default();
        Self {
            threshold_seconds: rule.threshold_seconds,
            long_segment_seconds: rule.long_segment,
            short_segment_seconds: rule.short_segment,
            font_size: style.font_size,
            font_color: style.font_color,
            box_color: style.box_color,
            overwrite: true,
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl SplitConfig {
    /// Load from `path`, or from the default location when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load_from_path(config_path()?),
        }
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading split config from {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing split config {}", path.display()))?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let valid = |value: f64| value.is_finite() && value > 0.0;
        let valid_length = |value: f64| value.is_finite() && value >= MIN_SEGMENT_SECONDS;

        if !valid(self.threshold_seconds) {
            self.threshold_seconds = defaults.threshold_seconds;
        }
        if !valid_length(self.long_segment_seconds) {
            self.long_segment_seconds = defaults.long_segment_seconds;
        }
        if !valid_length(self.short_segment_seconds) {
            self.short_segment_seconds = defaults.short_segment_seconds;
        }
        if self.font_size == 0 {
            self.font_size = defaults.font_size;
        }
        if self.ffmpeg.trim().is_empty() {
            self.ffmpeg = defaults.ffmpeg;
        }
        if self.ffprobe.trim().is_empty() {
            self.ffprobe = defaults.ffprobe;
        }
        self
    }

    pub fn segment_rule(&self) -> SegmentRule {
        SegmentRule {
            threshold_seconds: self.threshold_seconds,
            long_segment: self.long_segment_seconds,
            short_segment: self.short_segment_seconds,
        }
    }

    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            font_size: self.font_size,
            font_color: self.font_color.clone(),
            box_color: self.box_color.clone(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Unable to determine user config directory")?;
    Ok(config_dir.join("splitparts").join("config.toml"))
}
