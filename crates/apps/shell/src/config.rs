use std::env;
use std::str::FromStr;

use animation::AnimationConfig;
use capture::CaptureConfig;
use serde::{Deserialize, Serialize};

use crate::error::ShellError;

/// What happens after a route is ingested.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Draw the route on the map.
    #[default]
    Animate,
    /// Draw the route while recording the map, then offer the video.
    Record,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "animate" => Ok(Self::Animate),
            "record" => Ok(Self::Record),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub mode: Mode,
    pub animation: AnimationConfig,
    pub capture: CaptureConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self::for_mode(Mode::Animate)
    }
}

impl ShellConfig {
    /// Animate mode uses the basic preset, record mode the extended one.
    pub fn for_mode(mode: Mode) -> Self {
        let animation = match mode {
            Mode::Animate => AnimationConfig::basic(),
            Mode::Record => AnimationConfig::extended(),
        };
        Self {
            mode,
            animation,
            capture: CaptureConfig::default(),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ShellError> {
        let config: Self = serde_json::from_str(raw)?;
        Ok(config)
    }

    /// Preset for `ROUTE_REPLAY_MODE`, with per-field environment overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mode = lookup("ROUTE_REPLAY_MODE")
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let mut config = Self::for_mode(mode);

        let animation = &mut config.animation;
        animation.step = env_var_usize(&lookup, "ROUTE_REPLAY_STEP", animation.step);
        animation.tick_interval_ms =
            env_var_u64(&lookup, "ROUTE_REPLAY_TICK_MS", animation.tick_interval_ms);

        let capture = &mut config.capture;
        capture.fps = env_var_u32(&lookup, "ROUTE_REPLAY_FPS", capture.fps);
        capture.preroll_ms = env_var_u64(&lookup, "ROUTE_REPLAY_PREROLL_MS", capture.preroll_ms);
        capture.postroll_ms =
            env_var_u64(&lookup, "ROUTE_REPLAY_POSTROLL_MS", capture.postroll_ms);
        capture.finalize_timeout_ms = env_var_u64(
            &lookup,
            "ROUTE_REPLAY_FINALIZE_TIMEOUT_MS",
            capture.finalize_timeout_ms,
        );
        config
    }
}

fn env_var_u32(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u32) -> u32 {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_var_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: usize) -> usize {
    lookup(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
