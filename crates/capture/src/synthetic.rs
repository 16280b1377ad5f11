use std::time::Duration;

use bytes::Bytes;
use layers::HeadlessSurface;
use runtime::{CancelToken, Ticker};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::CaptureError;
use crate::recorder::{CaptureSource, Recorder, RecorderEvents, StreamOptions};

const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];

/// Recorder for surfaces without a real canvas.
///
/// Emits a WebM header on start, one placeholder cluster per timeslice while
/// recording, and a trailing cluster followed by `finish` some time after
/// `stop`. Useful wherever the recording pipeline has to run headless.
#[derive(Debug)]
pub struct SyntheticRecorder {
    options: StreamOptions,
    timeslice: Duration,
    flush_delay: Duration,
    events: Option<RecorderEvents>,
    halt: CancelToken,
    frames: Option<JoinHandle<()>>,
}

impl SyntheticRecorder {
    pub fn new(options: StreamOptions) -> Self {
        Self {
            options,
            timeslice: Duration::from_secs(1),
            flush_delay: Duration::from_millis(50),
            events: None,
            halt: CancelToken::new(),
            frames: None,
        }
    }

    pub fn with_timeslice(mut self, timeslice: Duration) -> Self {
        self.timeslice = timeslice;
        self
    }

    pub fn with_flush_delay(mut self, delay: Duration) -> Self {
        self.flush_delay = delay;
        self
    }
}

fn cluster(index: u64, fps: u32) -> Bytes {
    Bytes::from(format!("cluster:{index}:{fps}fps;"))
}

impl Recorder for SyntheticRecorder {
    fn start(&mut self, events: RecorderEvents) -> Result<(), CaptureError> {
        if self.events.is_some() {
            return Err(CaptureError::Recorder("recorder already started".into()));
        }
        let handle = Handle::try_current()
            .map_err(|_| CaptureError::Unsupported("no async runtime for the recorder".into()))?;

        events.data(Bytes::from_static(&EBML_MAGIC));
        let frame_events = events.clone();
        let halt = self.halt.clone();
        let timeslice = self.timeslice;
        let fps = self.options.fps;
        self.frames = Some(handle.spawn(async move {
            let mut ticker = Ticker::new(timeslice);
            while let Ok(index) = halt.run_until_cancelled(ticker.tick()).await {
                frame_events.data(cluster(index, fps));
            }
        }));
        self.events = Some(events);
        debug!(fps, ?timeslice, "synthetic recorder started");
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        let Some(events) = self.events.take() else {
            return Err(CaptureError::Recorder("recorder is not running".into()));
        };
        let handle = Handle::try_current()
            .map_err(|_| CaptureError::Unsupported("no async runtime for the recorder".into()))?;

        self.halt.cancel();
        let frames = self.frames.take();
        let delay = self.flush_delay;
        let fps = self.options.fps;
        handle.spawn(async move {
            if let Some(frames) = frames {
                let _ = frames.await;
            }
            tokio::time::sleep(delay).await;
            events.data(cluster(u64::MAX, fps));
            events.finish();
        });
        Ok(())
    }
}

impl Drop for SyntheticRecorder {
    fn drop(&mut self) {
        self.halt.cancel();
    }
}

impl CaptureSource for HeadlessSurface {
    fn capture_stream(
        &mut self,
        options: &StreamOptions,
    ) -> Result<Box<dyn Recorder>, CaptureError> {
        Ok(Box::new(SyntheticRecorder::new(options.clone())))
    }
}
