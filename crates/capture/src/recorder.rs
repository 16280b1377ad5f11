use bytes::Bytes;
use tokio::sync::mpsc;

/// What the coordinator asks of a render stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    pub fps: u32,
    pub mime_type: String,
}

#[derive(Debug)]
pub(crate) enum RecorderSignal {
    Data(Bytes),
    Finished,
    Failed(String),
}

/// Callback handle a [`Recorder`] uses to report back.
///
/// Chunks must be sent in the order they should appear in the artifact.
/// After [`finish`](Self::finish) or [`fail`](Self::fail) further calls are
/// ignored. Sends after the session is gone are dropped silently.
#[derive(Debug, Clone)]
pub struct RecorderEvents {
    tx: mpsc::UnboundedSender<RecorderSignal>,
}

impl RecorderEvents {
    pub(crate) fn new(tx: mpsc::UnboundedSender<RecorderSignal>) -> Self {
        Self { tx }
    }

    /// One encoded segment.
    pub fn data(&self, chunk: impl Into<Bytes>) {
        let _ = self.tx.send(RecorderSignal::Data(chunk.into()));
    }

    /// The recorder has flushed everything; the artifact can be assembled.
    pub fn finish(&self) {
        let _ = self.tx.send(RecorderSignal::Finished);
    }

    pub fn fail(&self, reason: impl Into<String>) {
        let _ = self.tx.send(RecorderSignal::Failed(reason.into()));
    }
}

/// An encoder attached to a live render stream.
///
/// `start` begins emitting through the given events handle; `stop` only
/// requests a stop. Finalization is signalled asynchronously with
/// [`RecorderEvents::finish`], possibly after more data.
pub trait Recorder: Send {
    fn start(&mut self, events: RecorderEvents) -> Result<(), crate::CaptureError>;

    fn stop(&mut self) -> Result<(), crate::CaptureError>;
}

/// Anything that can hand out a recorder for its rendering, typically the map
/// surface's canvas.
pub trait CaptureSource {
    fn capture_stream(
        &mut self,
        options: &StreamOptions,
    ) -> Result<Box<dyn Recorder>, crate::CaptureError>;
}
