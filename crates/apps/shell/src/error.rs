use animation::AnimationError;
use capture::CaptureError;
use formats::{IngestError, READ_FAILURE_MESSAGE};

pub const MULTI_FILE_MESSAGE: &str = "You can only upload one GeoJSON.";
pub const ANIMATION_FAILURE_MESSAGE: &str = "The route could not be drawn on the map.";
pub const CAPTURE_FAILURE_MESSAGE: &str = "The recording could not be completed.";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("{0} files dropped, expected one")]
    MultiFile(usize),
    #[error("no file provided")]
    NoFile,
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("invalid shell config: {0}")]
    Config(#[from] serde_json::Error),
    #[error("run task failed: {0}")]
    Task(String),
}

impl ShellError {
    /// Text for the blocking notification shown to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MultiFile(_) => MULTI_FILE_MESSAGE,
            Self::NoFile => READ_FAILURE_MESSAGE,
            Self::Ingest(err) => err.user_message(),
            Self::Animation(_) | Self::Task(_) | Self::Config(_) => ANIMATION_FAILURE_MESSAGE,
            Self::Capture(_) => CAPTURE_FAILURE_MESSAGE,
        }
    }

    /// Cancellation is a normal way for a run to end and is never reported.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Animation(AnimationError::Cancelled)
                | Self::Capture(CaptureError::Cancelled)
                | Self::Capture(CaptureError::Animation(AnimationError::Cancelled))
        )
    }
}
