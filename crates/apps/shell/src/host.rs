//! What the shell needs from its host: files, a way to alert the user, and
//! a way to hand over the finished video.

use std::path::PathBuf;

use bytes::Bytes;
use capture::Artifact;
use formats::{ingest, read_route_file, IngestError, Route};
use tracing::{info, warn};

/// One file handed to the shell by a drop or the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileInput {
    Path(PathBuf),
    Bytes { name: String, data: Bytes },
}

impl FileInput {
    pub fn bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    pub async fn read_route(&self) -> Result<Route, IngestError> {
        match self {
            Self::Path(path) => read_route_file(path).await,
            Self::Bytes { data, .. } => ingest(data),
        }
    }
}

/// Blocking user-facing alert.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Offers a finished artifact to the user.
pub trait Downloader: Send + Sync {
    fn download(&self, artifact: &Artifact);
}

/// Notifier for hosts without a UI; messages go to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        warn!(message, "user notification");
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogDownloader;

impl Downloader for LogDownloader {
    fn download(&self, artifact: &Artifact) {
        info!(
            url = %artifact.url,
            file_name = %artifact.file_name,
            bytes = artifact.len(),
            "artifact ready for download"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::FileInput;
    use formats::IngestError;
    use std::path::PathBuf;

    const ROUTE: &str = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}]}"#;

    #[tokio::test]
    async fn bytes_and_paths_ingest_the_same_route() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("route.geojson");
        std::fs::write(&path, ROUTE).expect("write");

        let from_path = FileInput::Path(path).read_route().await.expect("path");
        let from_bytes = FileInput::bytes("route.geojson", ROUTE.as_bytes().to_vec())
            .read_route()
            .await
            .expect("bytes");
        assert_eq!(from_path, from_bytes);
        assert_eq!(from_bytes.len(), 2);
    }

    #[tokio::test]
    async fn missing_path_is_a_read_error() {
        let input = FileInput::Path(PathBuf::from("/definitely/not/here.geojson"));
        assert!(matches!(
            input.read_route().await,
            Err(IngestError::Read(_))
        ));
        assert_eq!(input.name(), "/definitely/not/here.geojson");
    }
}
