use std::time::Duration;

use animation::AnimationError;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("render stream capture is not supported: {0}")]
    Unsupported(String),
    #[error("recorder error: {0}")]
    Recorder(String),
    #[error("recorder did not finalize within {0:?}")]
    RecorderTimeout(Duration),
    #[error("recording cancelled")]
    Cancelled,
    #[error("recorder produced no data")]
    EmptyArtifact,
    #[error("artifact store error: {0}")]
    Store(#[from] std::io::Error),
    #[error(transparent)]
    Animation(#[from] AnimationError),
}
