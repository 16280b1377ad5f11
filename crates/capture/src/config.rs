use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recording parameters. Durations are in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Frame rate requested from the render stream.
    pub fps: u32,
    /// Encoder mime type handed to the recorder.
    pub mime_type: String,
    /// Mime type of the assembled artifact.
    pub container_type: String,
    /// Name offered when the artifact is downloaded.
    pub file_name: String,
    /// Idle map captured before the animation starts.
    pub preroll_ms: u64,
    /// Settled camera and end marker captured after completion.
    pub postroll_ms: u64,
    /// Upper bound on waiting for the recorder to flush after stop.
    pub finalize_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            fps: 120,
            mime_type: "video/webm; codecs=vp9".to_string(),
            container_type: "video/webm".to_string(),
            file_name: "movie.webm".to_string(),
            preroll_ms: 2_000,
            postroll_ms: 10_000,
            finalize_timeout_ms: 30_000,
        }
    }
}

impl CaptureConfig {
    pub fn preroll(&self) -> Duration {
        Duration::from_millis(self.preroll_ms)
    }

    pub fn postroll(&self) -> Duration {
        Duration::from_millis(self.postroll_ms)
    }

    pub fn finalize_timeout(&self) -> Duration {
        Duration::from_millis(self.finalize_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::CaptureConfig;
    use std::time::Duration;

    #[test]
    fn defaults_match_webm_recording() {
        let c = CaptureConfig::default();
        assert_eq!(c.fps, 120);
        assert_eq!(c.file_name, "movie.webm");
        assert_eq!(c.container_type, "video/webm");
        assert!(c.mime_type.contains("vp9"));
        assert_eq!(c.preroll(), Duration::from_secs(2));
        assert_eq!(c.postroll(), Duration::from_secs(10));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let c: CaptureConfig = serde_json::from_str(r#"{"fps": 30, "postroll_ms": 500}"#)
            .expect("config");
        assert_eq!(c.fps, 30);
        assert_eq!(c.postroll(), Duration::from_millis(500));
        assert_eq!(c.preroll_ms, 2_000);
    }
}
