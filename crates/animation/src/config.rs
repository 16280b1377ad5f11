use std::time::Duration;

use layers::{CirclePaint, FitOptions, LinePaint};
use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Zoom applied when the camera first lands on the departure point.
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Tunables for one animation run.
///
/// Two presets exist: [`AnimationConfig::basic`] reveals one coordinate per
/// 1 ms tick, [`AnimationConfig::extended`] reveals three per zero-delay tick
/// and frames the whole route when done. `Default` is `basic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Coordinates revealed per tick. Must be at least 1.
    pub step: usize,
    /// Delay between ticks in milliseconds; 0 ticks as fast as the executor allows.
    pub tick_interval_ms: u64,
    pub zoom: f64,
    /// When set, the camera frames the full route on completion.
    pub fit_bounds: Option<FitOptions>,
    pub start_marker: CirclePaint,
    pub end_marker: CirclePaint,
    pub line: LinePaint,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::basic()
    }
}

impl AnimationConfig {
    pub fn basic() -> Self {
        Self {
            step: 1,
            tick_interval_ms: 1,
            zoom: DEFAULT_ZOOM,
            fit_bounds: None,
            start_marker: CirclePaint::default(),
            end_marker: CirclePaint::default(),
            line: LinePaint::default(),
        }
    }

    /// Preset used while recording.
    pub fn extended() -> Self {
        Self {
            step: 3,
            tick_interval_ms: 0,
            fit_bounds: Some(FitOptions::default()),
            ..Self::basic()
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), AnimationError> {
        if self.step == 0 {
            return Err(AnimationError::InvalidConfig(
                "step must be at least 1".to_string(),
            ));
        }
        if !self.zoom.is_finite() {
            return Err(AnimationError::InvalidConfig(format!(
                "zoom must be finite, got {}",
                self.zoom
            )));
        }
        Ok(())
    }
}
