use layers::SurfaceError;

use crate::state::AnimationPhase;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnimationError {
    #[error("invalid animation config: {0}")]
    InvalidConfig(String),
    #[error("animation already started")]
    AlreadyStarted,
    #[error("animation is not running (phase: {0:?})")]
    NotRunning(AnimationPhase),
    #[error("map surface error: {0}")]
    Surface(#[from] SurfaceError),
    #[error("animation cancelled")]
    Cancelled,
    #[error("animation task failed: {0}")]
    Join(String),
}
