use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::CaptureError;

/// The finished recording: every chunk concatenated in arrival order, plus the
/// URL it was published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl Artifact {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Turns assembled bytes into something a host can open or download.
///
/// Implementations must return a non-empty URL on success.
pub trait ArtifactStore: Send + Sync {
    fn publish(&self, file_name: &str, mime_type: &str, bytes: &Bytes)
    -> Result<String, CaptureError>;

    /// Releases a URL handed out by [`publish`](Self::publish). Returns whether
    /// anything was released. Stores whose artifacts belong to the user once
    /// written keep them.
    fn revoke(&self, _url: &str) -> bool {
        false
    }
}

/// In-process store handing out opaque `blob:` URLs.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    blobs: Mutex<HashMap<String, (String, Bytes)>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mime type and bytes behind a published URL.
    pub fn get(&self, url: &str) -> Option<(String, Bytes)> {
        self.blobs.lock().get(url).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

impl ArtifactStore for MemoryArtifactStore {
    fn publish(
        &self,
        _file_name: &str,
        mime_type: &str,
        bytes: &Bytes,
    ) -> Result<String, CaptureError> {
        let url = format!("blob:route-replay/{}", Uuid::new_v4());
        self.blobs
            .lock()
            .insert(url.clone(), (mime_type.to_string(), bytes.clone()));
        debug!(%url, bytes = bytes.len(), "artifact published in memory");
        Ok(url)
    }

    fn revoke(&self, url: &str) -> bool {
        let released = self.blobs.lock().remove(url).is_some();
        if released {
            debug!(%url, "artifact revoked");
        }
        released
    }
}

/// Writes artifacts into a directory and returns `file://` URLs.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ArtifactStore for FileArtifactStore {
    fn publish(
        &self,
        file_name: &str,
        _mime_type: &str,
        bytes: &Bytes,
    ) -> Result<String, CaptureError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "artifact written");
        Ok(format!("file://{}", path.display()))
    }
}
