use formats::Route;
use layers::{MapSurface, SharedSurface};
use runtime::{CancelToken, Ticker};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::animator::{AnimationReport, RouteAnimator, TickOutcome};
use crate::config::AnimationConfig;
use crate::error::AnimationError;

/// Runs one animation to completion on the current task.
///
/// `on_complete` fires exactly once, after the end marker is registered and
/// with the surface lock released. It does not fire on cancellation or
/// failure. The ticker is dropped as soon as the run ends, so no tick can
/// follow completion.
pub async fn animate<S, F>(
    route: Route,
    surface: SharedSurface<S>,
    config: AnimationConfig,
    cancel: CancelToken,
    on_complete: F,
) -> Result<AnimationReport, AnimationError>
where
    S: MapSurface,
    F: FnOnce(),
{
    let mut animator = RouteAnimator::new(route, config)?;
    if cancel.is_cancelled() {
        return Err(AnimationError::Cancelled);
    }
    animator.start(&mut *surface.lock())?;

    let mut ticker = Ticker::new(animator.config().tick_interval());
    loop {
        if cancel.run_until_cancelled(ticker.tick()).await.is_err() {
            animator.cancel();
            return Err(AnimationError::Cancelled);
        }

        let outcome = {
            let mut guard = surface.lock();
            animator.tick(&mut *guard)
        };
        match outcome {
            Ok(TickOutcome::Advanced { .. }) => {}
            Ok(TickOutcome::Completed) => {
                drop(ticker);
                on_complete();
                return Ok(animator.report());
            }
            Err(err) => {
                warn!(error = %err, ticks = animator.ticks(), "animation aborted");
                return Err(err);
            }
        }
    }
}

/// A spawned animation run.
#[derive(Debug)]
pub struct AnimationHandle {
    cancel: CancelToken,
    task: JoinHandle<Result<AnimationReport, AnimationError>>,
}

impl AnimationHandle {
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Requests cancellation. The run stops at its next suspension point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) -> Result<AnimationReport, AnimationError> {
        match self.task.await {
            Ok(result) => result,
            Err(err) => Err(AnimationError::Join(err.to_string())),
        }
    }

    /// Cancels and waits for the run to wind down.
    pub async fn shutdown(self) -> Result<AnimationReport, AnimationError> {
        self.cancel();
        self.join().await
    }
}

/// Spawns [`animate`] onto the tokio runtime with a fresh cancel token.
pub fn spawn_animation<S, F>(
    route: Route,
    surface: SharedSurface<S>,
    config: AnimationConfig,
    on_complete: F,
) -> AnimationHandle
where
    S: MapSurface + 'static,
    F: FnOnce() + Send + 'static,
{
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let coords = route.len();
    let task = tokio::spawn(async move {
        let result = animate(route, surface, config, token, on_complete).await;
        if let Ok(report) = &result {
            info!(coords, ticks = report.ticks, "animation task finished");
        }
        result
    });
    AnimationHandle { cancel, task }
}

#[cfg(test)]
mod tests {
    use super::{animate, spawn_animation};
    use crate::animator::{END_SOURCE, LINE_SOURCE};
    use crate::config::AnimationConfig;
    use crate::error::AnimationError;
    use crate::state::AnimationPhase;
    use formats::Route;
    use foundation::LonLat;
    use layers::{HeadlessSurface, share};
    use runtime::CancelToken;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    fn route(n: usize) -> Route {
        Route::new((0..n).map(|i| LonLat::new(i as f64 * 0.01, 35.0)).collect()).expect("route")
    }

    #[tokio::test(start_paused = true)]
    async fn basic_run_ticks_every_millisecond() {
        let surface = share(HeadlessSurface::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        let start = Instant::now();

        let report = animate(
            route(10),
            surface.clone(),
            AnimationConfig::basic(),
            CancelToken::new(),
            move || {
                f.fetch_add(1, Ordering::SeqCst);
            },
        )
        .await
        .expect("animation");

        assert_eq!(report.ticks, 10);
        assert_eq!(report.phase, AnimationPhase::Completed);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::from_millis(10));
        let s = surface.lock();
        assert_eq!(s.source_updates(LINE_SOURCE).len(), 10);
        assert!(s.source(END_SOURCE).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn extended_run_uses_zero_delay_ticks() {
        let surface = share(HeadlessSurface::new());
        let start = Instant::now();
        let report = animate(
            route(10),
            surface,
            AnimationConfig::extended(),
            CancelToken::new(),
            || {},
        )
        .await
        .expect("animation");
        assert_eq!(report.ticks, 4);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_without_completion_callback() {
        let surface = share(HeadlessSurface::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        let cfg = AnimationConfig {
            tick_interval_ms: 100,
            ..AnimationConfig::basic()
        };
        let handle = spawn_animation(route(50), surface.clone(), cfg, move || {
            f.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(350)).await;
        let result = handle.shutdown().await;
        assert_eq!(result, Err(AnimationError::Cancelled));
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        let s = surface.lock();
        assert_eq!(s.source_updates(LINE_SOURCE).len(), 3);
        assert!(s.source(END_SOURCE).is_none());
    }

    #[tokio::test]
    async fn pre_cancelled_token_touches_nothing() {
        let surface = share(HeadlessSurface::new());
        let token = CancelToken::new();
        token.cancel();
        let result = animate(route(3), surface.clone(), AnimationConfig::basic(), token, || {}).await;
        assert_eq!(result, Err(AnimationError::Cancelled));
        assert!(surface.lock().commands().is_empty());
    }

    #[tokio::test]
    async fn surface_failure_ends_the_task() {
        let surface = share(HeadlessSurface::failing_after(7));
        let handle = spawn_animation(route(20), surface, AnimationConfig::extended(), || {});
        let result = handle.join().await;
        assert!(matches!(result, Err(AnimationError::Surface(_))), "{result:?}");
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_touching_the_surface() {
        let surface = share(HeadlessSurface::new());
        let cfg = AnimationConfig {
            step: 0,
            ..AnimationConfig::basic()
        };
        let result = animate(route(3), surface.clone(), cfg, CancelToken::new(), || {}).await;
        assert!(matches!(result, Err(AnimationError::InvalidConfig(_))));
        assert!(surface.lock().commands().is_empty());
    }
}
