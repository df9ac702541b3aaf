//! Tunable movement parameters loaded from TOML.
//!
//! Every field falls back to the matching constant in [`crate::constants`],
//! so an empty document yields the stock behaviour.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    AIR_DRAG, DEFAULT_SAFE_FALL_DISTANCE, DEFAULT_SLIPPERINESS, DEFAULT_STEP_HEIGHT,
    FRICTION_FACTOR, GRAVITY, KNOCKBACK_VERTICAL_CAP, PISTON_CLAMP, SEGMENT_CAPACITY,
    TOUCH_SUBSTEP_CAP,
};

/// Failure loading or validating a [`MotionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The document is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Movement tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// Default gravity attribute for new bodies.
    pub gravity: f64,
    /// Vertical drag for airborne bodies.
    pub air_drag: f64,
    /// Multiplier applied to slipperiness for horizontal drag.
    pub friction_factor: f64,
    /// Slipperiness assumed for ordinary blocks.
    pub default_slipperiness: f32,
    /// Default step height for new bodies.
    pub step_height: f32,
    /// Default safe fall distance for new bodies.
    pub safe_fall_distance: f64,
    /// Default fall damage multiplier for new bodies.
    pub fall_damage_multiplier: f64,
    /// Maximum vertical velocity gained from knockback.
    pub knockback_vertical_cap: f64,
    /// Per-axis per-tick piston displacement cap.
    pub piston_clamp: f64,
    /// Queued traversal segments retained per body.
    pub segment_capacity: usize,
    /// Touch pipeline sub-step budget per segment.
    pub touch_substep_cap: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            air_drag: AIR_DRAG,
            friction_factor: FRICTION_FACTOR,
            default_slipperiness: DEFAULT_SLIPPERINESS,
            step_height: DEFAULT_STEP_HEIGHT,
            safe_fall_distance: DEFAULT_SAFE_FALL_DISTANCE,
            fall_damage_multiplier: 1.0,
            knockback_vertical_cap: KNOCKBACK_VERTICAL_CAP,
            piston_clamp: PISTON_CLAMP,
            segment_capacity: SEGMENT_CAPACITY,
            touch_substep_cap: TOUCH_SUBSTEP_CAP,
        }
    }
}

impl MotionConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed input and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`MotionConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("gravity", self.gravity)?;
        non_negative("air_drag", self.air_drag)?;
        non_negative("friction_factor", self.friction_factor)?;
        non_negative("default_slipperiness", f64::from(self.default_slipperiness))?;
        if self.default_slipperiness == 0.0 {
            return Err(ConfigError::Invalid {
                field: "default_slipperiness",
                reason: "must be positive",
            });
        }
        non_negative("step_height", f64::from(self.step_height))?;
        non_negative("safe_fall_distance", self.safe_fall_distance)?;
        non_negative("fall_damage_multiplier", self.fall_damage_multiplier)?;
        non_negative("knockback_vertical_cap", self.knockback_vertical_cap)?;
        non_negative("piston_clamp", self.piston_clamp)?;
        if self.segment_capacity < 2 {
            return Err(ConfigError::Invalid {
                field: "segment_capacity",
                reason: "must hold at least two segments",
            });
        }
        if self.touch_substep_cap < 1 {
            return Err(ConfigError::Invalid {
                field: "touch_substep_cap",
                reason: "must be at least one",
            });
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: "must be finite and non-negative",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_document_yields_defaults() {
        let config = MotionConfig::from_toml_str("").unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config, MotionConfig::default());
    }

    #[rstest]
    fn overrides_are_applied() {
        let config = MotionConfig::from_toml_str("gravity = 0.04\nsafe_fall_distance = 0.0")
            .unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(config.gravity, 0.04);
        assert_eq!(config.safe_fall_distance, 0.0);
        assert_eq!(config.segment_capacity, SEGMENT_CAPACITY);
    }

    #[rstest]
    #[case("segment_capacity = 1", "segment_capacity")]
    #[case("gravity = -1.0", "gravity")]
    #[case("touch_substep_cap = 0", "touch_substep_cap")]
    #[case("default_slipperiness = 0.0", "default_slipperiness")]
    fn invalid_values_are_rejected(#[case] text: &str, #[case] expected: &str) {
        match MotionConfig::from_toml_str(text) {
            Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
            other => panic!("expected invalid {expected}, got {other:?}"),
        }
    }

    #[rstest]
    fn unknown_keys_fail_to_parse() {
        assert!(matches!(
            MotionConfig::from_toml_str("gravitee = 1.0"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[rstest]
    fn missing_file_reports_path() {
        let err = MotionConfig::load("/nonexistent/tumble.toml");
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }
}
