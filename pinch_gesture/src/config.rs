//! Engine tuning: thresholds, timing windows and coordinate convention.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::GestureError;

/// Which physical gesture arms the discrete `Action` machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTrigger {
    /// Thumb tip to index tip; the control point is the index tip.
    Pinch,
    /// All four fingertips near the wrist; the control point is the wrist.
    Fist,
}

/// Configuration for [`crate::GestureEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb-tip ↔ index-tip distance below which a hand is pinched
    /// (normalized frame units, exclusive).
    pub pinch_threshold: f32,
    /// Fingertip ↔ wrist distance below which all four fingers count as
    /// closed (exclusive).
    pub fist_threshold: f32,
    /// Measure pinch distance in 3D instead of the image plane.
    pub use_depth: bool,
    /// Flip x so points match a mirrored (selfie) display.
    pub mirror_x: bool,
    /// Gesture bound to discrete actions.
    pub action_trigger: ActionTrigger,
    /// How long the trigger must be held before an action fires.
    pub min_hold_ms: u64,
    /// Dead time after a fire during which nothing can arm.
    pub cooldown_ms: u64,
    /// Two fires closer than this make the second one a double action.
    pub double_window_ms: u64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            pinch_threshold:  0.06,
            fist_threshold:   0.15,
            use_depth:        false,
            mirror_x:         true,
            action_trigger:   ActionTrigger::Pinch,
            min_hold_ms:      150,
            cooldown_ms:      300,
            double_window_ms: 500,
        }
    }
}

impl GestureConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn from_json(path: &Path) -> Result<Self, GestureError> {
        let text = std::fs::read_to_string(path).map_err(|source| GestureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg: GestureConfig = serde_json::from_str(&text).map_err(|source| {
            GestureError::Json { path: path.to_path_buf(), source }
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        let in_unit = |v: f32| v.is_finite() && v > 0.0 && v < 1.0;
        if !in_unit(self.pinch_threshold) {
            return Err(GestureError::InvalidConfig(format!(
                "pinch_threshold must be in (0, 1), got {}", self.pinch_threshold
            )));
        }
        if !in_unit(self.fist_threshold) {
            return Err(GestureError::InvalidConfig(format!(
                "fist_threshold must be in (0, 1), got {}", self.fist_threshold
            )));
        }
        if self.double_window_ms == 0 {
            return Err(GestureError::InvalidConfig(
                "double_window_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn min_hold(&self)      -> Duration { Duration::from_millis(self.min_hold_ms) }
    pub fn cooldown(&self)      -> Duration { Duration::from_millis(self.cooldown_ms) }
    pub fn double_window(&self) -> Duration { Duration::from_millis(self.double_window_ms) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(GestureConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: GestureConfig =
            serde_json::from_str(r#"{ "action_trigger": "fist", "cooldown_ms": 400 }"#).unwrap();
        assert_eq!(cfg.action_trigger, ActionTrigger::Fist);
        assert_eq!(cfg.cooldown(), Duration::from_millis(400));
        assert_eq!(cfg.min_hold_ms, 150);
    }

    #[test]
    fn zero_threshold_rejected() {
        let cfg = GestureConfig { pinch_threshold: 0.0, ..GestureConfig::default() };
        assert!(matches!(cfg.validate(), Err(GestureError::InvalidConfig(_))));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = GestureConfig::from_json(Path::new("/nonexistent/glaze.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/glaze.json"));
    }
}
