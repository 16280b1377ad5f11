use std::sync::Arc;

use animation::{AnimationConfig, AnimationError, AnimationReport, animate};
use formats::Route;
use layers::{MapSurface, SharedSurface};
use runtime::{CancelToken, Timeline};
use tracing::info;

use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::recorder::CaptureSource;
use crate::session::start_recording;
use crate::store::{Artifact, ArtifactStore};

pub const RECORDING_STARTED: &str = "recording.started";
pub const ANIMATION_STARTED: &str = "animation.started";
pub const ANIMATION_COMPLETED: &str = "animation.completed";
pub const RECORDING_STOPPING: &str = "recording.stopping";
pub const ARTIFACT_READY: &str = "artifact.ready";

/// Result of a recorded run.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    pub artifact: Artifact,
    pub report: AnimationReport,
}

/// Records `route` being animated on `surface`.
///
/// Order: start recording, pre-roll, animate, completion, post-roll, stop.
/// Every phase is appended to `timeline`. On cancellation or any failure the
/// recording is discarded and no artifact is published.
pub async fn record_route<S>(
    route: Route,
    surface: SharedSurface<S>,
    animation: AnimationConfig,
    capture: &CaptureConfig,
    store: Arc<dyn ArtifactStore>,
    cancel: &CancelToken,
    timeline: &Timeline,
) -> Result<Recording, CaptureError>
where
    S: MapSurface + CaptureSource,
{
    let session = start_recording(&mut *surface.lock(), capture, store)?;
    timeline.emit(RECORDING_STARTED, format!("{} fps", capture.fps));

    if cancel.sleep(capture.preroll()).await.is_err() {
        session.abort();
        return Err(CaptureError::Cancelled);
    }

    timeline.emit(ANIMATION_STARTED, format!("{} coordinates", route.len()));
    let completed = timeline.clone();
    let animated = animate(route, surface, animation, cancel.clone(), move || {
        completed.emit(ANIMATION_COMPLETED, "end marker shown")
    })
    .await;
    let report = match animated {
        Ok(report) => report,
        Err(AnimationError::Cancelled) => {
            session.abort();
            return Err(CaptureError::Cancelled);
        }
        Err(err) => {
            session.abort();
            return Err(err.into());
        }
    };

    if cancel.sleep(capture.postroll()).await.is_err() {
        session.abort();
        return Err(CaptureError::Cancelled);
    }

    timeline.emit(RECORDING_STOPPING, format!("{} ticks", report.ticks));
    let artifact = session.stop(cancel).await?;
    timeline.emit(ARTIFACT_READY, artifact.url.clone());
    info!(url = %artifact.url, bytes = artifact.len(), ticks = report.ticks, "route recorded");

    Ok(Recording { artifact, report })
}

#[cfg(test)]
mod tests {
    use super::{
        ANIMATION_COMPLETED, ANIMATION_STARTED, ARTIFACT_READY, RECORDING_STARTED,
        RECORDING_STOPPING, record_route,
    };
    use crate::config::CaptureConfig;
    use crate::error::CaptureError;
    use crate::store::MemoryArtifactStore;
    use animation::{AnimationConfig, AnimationError, END_SOURCE};
    use formats::Route;
    use foundation::LonLat;
    use layers::{HeadlessSurface, share};
    use pretty_assertions::assert_eq;
    use runtime::{CancelToken, Timeline};
    use std::sync::Arc;
    use std::time::Duration;

    fn route(n: usize) -> Route {
        Route::new(
            (0..n)
                .map(|i| LonLat::new(i as f64 * 0.01, 45.0))
                .collect(),
        )
        .expect("route")
    }

    #[tokio::test(start_paused = true)]
    async fn phases_run_in_order_with_pre_and_post_roll() {
        let surface = share(HeadlessSurface::new());
        let store = Arc::new(MemoryArtifactStore::new());
        let timeline = Timeline::new();

        let recording = record_route(
            route(5),
            surface.clone(),
            AnimationConfig::basic(),
            &CaptureConfig::default(),
            store.clone(),
            &CancelToken::new(),
            &timeline,
        )
        .await
        .expect("recording");

        assert_eq!(
            timeline.kinds(),
            vec![
                RECORDING_STARTED,
                ANIMATION_STARTED,
                ANIMATION_COMPLETED,
                RECORDING_STOPPING,
                ARTIFACT_READY
            ]
        );
        let at = |kind| timeline.first_at(kind).expect("event");
        assert_eq!(at(RECORDING_STARTED), Duration::ZERO);
        assert_eq!(at(ANIMATION_STARTED), Duration::from_millis(2_000));
        assert_eq!(at(ANIMATION_COMPLETED), Duration::from_millis(2_005));
        assert_eq!(at(RECORDING_STOPPING), Duration::from_millis(12_005));
        assert!(at(ARTIFACT_READY) > at(RECORDING_STOPPING));

        assert_eq!(recording.report.ticks, 5);
        assert!(recording.artifact.url.starts_with("blob:"));
        assert!(!recording.artifact.is_empty());
        assert_eq!(store.len(), 1);
        assert!(surface.lock().source(END_SOURCE).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_during_preroll_leaves_the_map_untouched() {
        let surface = share(HeadlessSurface::new());
        let store = Arc::new(MemoryArtifactStore::new());
        let timeline = Timeline::new();
        let cancel = CancelToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            trigger.cancel();
        });
        let err = record_route(
            route(5),
            surface.clone(),
            AnimationConfig::basic(),
            &CaptureConfig::default(),
            store.clone(),
            &cancel,
            &timeline,
        )
        .await
        .expect_err("cancelled");

        assert!(matches!(err, CaptureError::Cancelled));
        assert_eq!(timeline.kinds(), vec![RECORDING_STARTED]);
        assert!(surface.lock().commands().is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn animation_failure_discards_the_recording() {
        let surface = share(HeadlessSurface::failing_after(3));
        let store = Arc::new(MemoryArtifactStore::new());
        let timeline = Timeline::new();

        let err = record_route(
            route(5),
            surface,
            AnimationConfig::basic(),
            &CaptureConfig::default(),
            store.clone(),
            &CancelToken::new(),
            &timeline,
        )
        .await
        .expect_err("failure");

        assert!(matches!(
            err,
            CaptureError::Animation(AnimationError::Surface(_))
        ));
        assert!(!timeline.kinds().contains(&ARTIFACT_READY));
        assert!(store.is_empty());
    }
}
