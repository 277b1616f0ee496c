//! Pipeline configuration.
//!
//! Every field has a default matching the tuned values the pipeline ships
//! with, so an empty TOML file (or no file at all) gives the stock behaviour.
//!
//! ```toml
//! [classifier]
//! pinch_distance = 0.025
//! fist_ratio     = 0.8
//!
//! [timing]
//! cooldown_ms = 1200
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

// ════════════════════════════════════════════════════════════════════════════
// PipelineConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub classifier: ClassifierThresholds,
    #[serde(default)]
    pub stability:  StabilityConfig,
    #[serde(default)]
    pub timing:     TimingConfig,
}

impl PipelineConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.classifier.validate()?;
        if self.stability.frames == 0 {
            return Err(ConfigError::Invalid("stability.frames must be at least 1".into()));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classifier thresholds
// ════════════════════════════════════════════════════════════════════════════

/// Calibration constants for the pose classifier.
///
/// These are empirically tuned against the normalized output of the hand
/// tracker.  `fist_ratio` compares two same-frame distances and so is
/// independent of hand size; the pinch values are absolute and are not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassifierThresholds {
    /// Thumb-tip to index-tip planar distance below which a pinch is possible.
    #[serde(default = "default_pinch_distance")]
    pub pinch_distance: f32,
    /// Thumb-tip depth must be below this (hand tilted toward the sensor).
    #[serde(default = "default_pinch_depth")]
    pub pinch_depth: f32,
    /// How far above its PIP a fingertip must sit to count as extended.
    #[serde(default = "default_extension_margin")]
    pub extension_margin: f32,
    /// Extended fingers (out of 4) needed for an open palm.
    #[serde(default = "default_open_palm_fingers")]
    pub open_palm_fingers: usize,
    /// Mean wrist→tip distance must be below this fraction of wrist→index MCP.
    #[serde(default = "default_fist_ratio")]
    pub fist_ratio: f32,
}

fn default_pinch_distance() -> f32 { 0.025 }
fn default_pinch_depth() -> f32 { -0.02 }
fn default_extension_margin() -> f32 { 0.02 }
fn default_open_palm_fingers() -> usize { 3 }
fn default_fist_ratio() -> f32 { 0.8 }

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            pinch_distance:    default_pinch_distance(),
            pinch_depth:       default_pinch_depth(),
            extension_margin:  default_extension_margin(),
            open_palm_fingers: default_open_palm_fingers(),
            fist_ratio:        default_fist_ratio(),
        }
    }
}

impl ClassifierThresholds {
    fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("pinch_distance", self.pinch_distance),
            ("pinch_depth", self.pinch_depth),
            ("extension_margin", self.extension_margin),
            ("fist_ratio", self.fist_ratio),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("classifier.{name} must be finite")));
            }
        }
        if self.pinch_distance <= 0.0 {
            return Err(ConfigError::Invalid("classifier.pinch_distance must be positive".into()));
        }
        if self.fist_ratio <= 0.0 {
            return Err(ConfigError::Invalid("classifier.fist_ratio must be positive".into()));
        }
        if self.open_palm_fingers == 0 || self.open_palm_fingers > 4 {
            return Err(ConfigError::Invalid(
                "classifier.open_palm_fingers must be between 1 and 4".into(),
            ));
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Stability
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StabilityConfig {
    /// Consecutive identical labels required to confirm a gesture.
    #[serde(default = "default_stability_frames")]
    pub frames: u32,
}

fn default_stability_frames() -> u32 { 8 }

impl Default for StabilityConfig {
    fn default() -> Self {
        Self { frames: default_stability_frames() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Timing
// ════════════════════════════════════════════════════════════════════════════

/// All intervals are in milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimingConfig {
    /// Frames closer together than this are dropped (~20 fps at 50).
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    /// Global gap enforced between two dispatched commands.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Grace period with no hand before gesture control is "unavailable".
    #[serde(default = "default_absence_grace_ms")]
    pub absence_grace_ms: u64,
    /// How long the "executed" visual is held before returning to idle.
    #[serde(default = "default_executed_hold_ms")]
    pub executed_hold_ms: u64,
    /// Minimum time the "error" visual is shown.
    #[serde(default = "default_error_hold_ms")]
    pub error_hold_ms: u64,
}

fn default_frame_interval_ms() -> u64 { 50 }
fn default_cooldown_ms() -> u64 { 1200 }
fn default_absence_grace_ms() -> u64 { 2500 }
fn default_executed_hold_ms() -> u64 { 800 }
fn default_error_hold_ms() -> u64 { 1200 }

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: default_frame_interval_ms(),
            cooldown_ms:       default_cooldown_ms(),
            absence_grace_ms:  default_absence_grace_ms(),
            executed_hold_ms:  default_executed_hold_ms(),
            error_hold_ms:     default_error_hold_ms(),
        }
    }
}

impl TimingConfig {
    pub fn frame_interval(&self) -> Duration { Duration::from_millis(self.frame_interval_ms) }
    pub fn cooldown(&self)       -> Duration { Duration::from_millis(self.cooldown_ms) }
    pub fn absence_grace(&self)  -> Duration { Duration::from_millis(self.absence_grace_ms) }
    pub fn executed_hold(&self)  -> Duration { Duration::from_millis(self.executed_hold_ms) }
    pub fn error_hold(&self)     -> Duration { Duration::from_millis(self.error_hold_ms) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = PipelineConfig::from_toml("").unwrap();
        assert_eq!(cfg, PipelineConfig::default());
        assert_eq!(cfg.stability.frames, 8);
        assert_eq!(cfg.timing.cooldown(), Duration::from_millis(1200));
        assert_eq!(cfg.classifier.fist_ratio, 0.8);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = PipelineConfig::from_toml(
            "[classifier]\npinch_distance = 0.03\n\n[timing]\ncooldown_ms = 2000\n",
        ).unwrap();
        assert_eq!(cfg.classifier.pinch_distance, 0.03);
        assert_eq!(cfg.classifier.pinch_depth, -0.02);
        assert_eq!(cfg.timing.cooldown_ms, 2000);
        assert_eq!(cfg.timing.absence_grace_ms, 2500);
    }

    #[test]
    fn zero_stability_frames_is_rejected() {
        let err = PipelineConfig::from_toml("[stability]\nframes = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn open_palm_fingers_out_of_range_is_rejected() {
        let err = PipelineConfig::from_toml("[classifier]\nopen_palm_fingers = 5\n").unwrap_err();
        assert!(err.to_string().contains("open_palm_fingers"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = PipelineConfig::from_toml("[timing\ncooldown_ms = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PipelineConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
