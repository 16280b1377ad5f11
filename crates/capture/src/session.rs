use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use runtime::{CancelToken, Cancelled};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::recorder::{CaptureSource, Recorder, RecorderEvents, RecorderSignal, StreamOptions};
use crate::store::{Artifact, ArtifactStore};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Recording,
    /// Stop requested; waiting for the recorder to flush.
    Stopped,
    Finalized,
    Failed,
}

impl CaptureState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }
}

/// Read-only view of a session's state that outlives the session itself.
#[derive(Debug, Clone)]
pub struct CaptureMonitor {
    state: Arc<Mutex<CaptureState>>,
}

impl CaptureMonitor {
    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }
}

type Finalized = Result<Artifact, CaptureError>;

/// An active recording.
///
/// Chunks flow from the recorder through one channel into a collector task
/// that assembles and publishes the artifact when the recorder finishes. The
/// result is handed over through a one-shot, so the artifact either appears
/// whole or not at all. Dropping the session without calling
/// [`stop`](Self::stop) stops the recorder and discards everything.
pub struct CaptureSession {
    recorder: Box<dyn Recorder>,
    state: Arc<Mutex<CaptureState>>,
    finalized: oneshot::Receiver<Finalized>,
    collector: JoinHandle<()>,
    finalize_timeout: Duration,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &*self.state.lock())
            .field("finalize_timeout", &self.finalize_timeout)
            .finish_non_exhaustive()
    }
}

/// Acquires a render stream from `source` and starts recording it.
///
/// Must be called from within a tokio runtime; otherwise
/// [`CaptureError::Unsupported`] is returned.
pub fn start_recording<C>(
    source: &mut C,
    config: &CaptureConfig,
    store: Arc<dyn ArtifactStore>,
) -> Result<CaptureSession, CaptureError>
where
    C: CaptureSource + ?Sized,
{
    let handle = Handle::try_current()
        .map_err(|_| CaptureError::Unsupported("no async runtime for the recorder".into()))?;

    let options = StreamOptions {
        fps: config.fps,
        mime_type: config.mime_type.clone(),
    };
    let mut recorder = source.capture_stream(&options)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let (done_tx, done_rx) = oneshot::channel();
    let state = Arc::new(Mutex::new(CaptureState::Recording));
    let assembly = Assembly {
        store,
        file_name: config.file_name.clone(),
        mime_type: config.container_type.clone(),
    };
    let collector = handle.spawn(collect(rx, assembly, state.clone(), done_tx));

    if let Err(err) = recorder.start(RecorderEvents::new(tx)) {
        collector.abort();
        *state.lock() = CaptureState::Failed;
        warn!(error = %err, "recorder failed to start");
        return Err(err);
    }
    info!(fps = options.fps, mime = %options.mime_type, "recording started");

    Ok(CaptureSession {
        recorder,
        state,
        finalized: done_rx,
        collector,
        finalize_timeout: config.finalize_timeout(),
    })
}

impl CaptureSession {
    pub fn state(&self) -> CaptureState {
        *self.state.lock()
    }

    pub fn monitor(&self) -> CaptureMonitor {
        CaptureMonitor {
            state: self.state.clone(),
        }
    }

    /// Stops the recorder and waits for it to finalize.
    ///
    /// Resolves once, after the recorder signals completion and the artifact
    /// has been published. The wait is bounded by the configured finalize
    /// timeout and by `cancel`.
    pub async fn stop(mut self, cancel: &CancelToken) -> Result<Artifact, CaptureError> {
        {
            let mut state = self.state.lock();
            if *state == CaptureState::Recording {
                *state = CaptureState::Stopped;
            }
        }
        if let Err(err) = self.recorder.stop() {
            self.mark_failed();
            warn!(error = %err, "recorder refused to stop");
            return Err(err);
        }
        debug!("stop requested, waiting for recorder to finalize");

        let timeout = self.finalize_timeout;
        let finalized = tokio::time::timeout(timeout, &mut self.finalized);
        match cancel.run_until_cancelled(finalized).await {
            Err(Cancelled) => {
                self.mark_failed();
                Err(CaptureError::Cancelled)
            }
            Ok(Err(_elapsed)) => {
                self.mark_failed();
                warn!(?timeout, "recorder never finalized");
                Err(CaptureError::RecorderTimeout(timeout))
            }
            Ok(Ok(Err(_closed))) => {
                self.mark_failed();
                Err(CaptureError::Recorder(
                    "collector ended before finalizing".into(),
                ))
            }
            Ok(Ok(Ok(outcome))) => {
                match &outcome {
                    Ok(artifact) => {
                        info!(url = %artifact.url, bytes = artifact.len(), "recording finalized")
                    }
                    Err(err) => warn!(error = %err, "recording failed"),
                }
                outcome
            }
        }
    }

    /// Discards the recording.
    pub fn abort(self) {
        debug!(state = ?self.state(), "recording aborted");
    }

    fn mark_failed(&self) {
        let mut state = self.state.lock();
        if !state.is_terminal() {
            *state = CaptureState::Failed;
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        let recording = *self.state.lock() == CaptureState::Recording;
        if recording {
            if let Err(err) = self.recorder.stop() {
                debug!(error = %err, "recorder stop on drop failed");
            }
            self.mark_failed();
        }
        self.collector.abort();
    }
}

struct Assembly {
    store: Arc<dyn ArtifactStore>,
    file_name: String,
    mime_type: String,
}

impl Assembly {
    async fn finish(self, chunks: Vec<Bytes>) -> Finalized {
        let total: usize = chunks.iter().map(Bytes::len).sum();
        if total == 0 {
            return Err(CaptureError::EmptyArtifact);
        }
        let mut buf = BytesMut::with_capacity(total);
        for chunk in &chunks {
            buf.extend_from_slice(chunk);
        }
        let bytes = buf.freeze();

        let Assembly {
            store,
            file_name,
            mime_type,
        } = self;
        let publish_bytes = bytes.clone();
        let (file_name, mime_type, url) = tokio::task::spawn_blocking(move || {
            let url = store.publish(&file_name, &mime_type, &publish_bytes);
            (file_name, mime_type, url)
        })
        .await
        .map_err(|err| CaptureError::Store(std::io::Error::other(err.to_string())))?;
        let url = url?;
        if url.is_empty() {
            return Err(CaptureError::Store(std::io::Error::other(
                "store returned an empty URL",
            )));
        }
        debug!(chunks = chunks.len(), bytes = total, "artifact assembled");
        Ok(Artifact {
            url,
            file_name,
            mime_type,
            bytes,
        })
    }
}

async fn collect(
    mut rx: mpsc::UnboundedReceiver<RecorderSignal>,
    assembly: Assembly,
    state: Arc<Mutex<CaptureState>>,
    done: oneshot::Sender<Finalized>,
) {
    let mut chunks = Vec::new();
    let outcome = loop {
        match rx.recv().await {
            Some(RecorderSignal::Data(chunk)) => {
                if !chunk.is_empty() {
                    chunks.push(chunk);
                }
            }
            Some(RecorderSignal::Finished) => break assembly.finish(chunks).await,
            Some(RecorderSignal::Failed(reason)) => break Err(CaptureError::Recorder(reason)),
            None => {
                break Err(CaptureError::Recorder(
                    "recorder closed without finalizing".into(),
                ));
            }
        }
    };
    *state.lock() = if outcome.is_ok() {
        CaptureState::Finalized
    } else {
        CaptureState::Failed
    };
    let _ = done.send(outcome);
}
