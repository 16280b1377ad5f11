use std::sync::Arc;

use animation::{animate, clear_route, AnimationError, AnimationReport};
use capture::{
    record_route, ArtifactStore, CaptureSource, MemoryArtifactStore, Recording,
    ANIMATION_COMPLETED,
};
use formats::Route;
use layers::{wait_loaded, MapSurface, SharedSurface};
use parking_lot::Mutex;
use runtime::{CancelToken, Cancelled, Timeline};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{Mode, ShellConfig};
use crate::error::ShellError;
use crate::host::{Downloader, FileInput, LogDownloader, LogNotifier, Notifier};

/// Which half of the UI is visible.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Upload,
    Map,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// A drag entered the drop zone.
    DragEnter,
    DragLeave,
    /// Files released over the drop zone. Exactly one is accepted.
    DropFiles(Vec<FileInput>),
    /// A file chosen through the file picker.
    SelectFile(FileInput),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Animated(AnimationReport),
    Recorded(Recording),
}

struct ActiveRun {
    cancel: CancelToken,
    task: JoinHandle<Result<RunOutcome, ShellError>>,
}

/// Owns the view state and at most one active run.
///
/// Every accepted upload is ingested before anything on the map changes; a
/// valid route cancels and joins the previous run, releases its recording,
/// and starts a new one. The run waits for the surface to load, then clears
/// what the previous run drew.
pub struct Shell<S> {
    surface: SharedSurface<S>,
    config: ShellConfig,
    notifier: Arc<dyn Notifier>,
    downloader: Arc<dyn Downloader>,
    store: Arc<dyn ArtifactStore>,
    timeline: Timeline,
    view: ViewState,
    highlighted: bool,
    active: Option<ActiveRun>,
    /// URL of the last recording handed to the downloader.
    published: Arc<Mutex<Option<String>>>,
}

impl<S> Shell<S>
where
    S: MapSurface + CaptureSource + 'static,
{
    pub fn new(surface: SharedSurface<S>, config: ShellConfig) -> Self {
        Self {
            surface,
            config,
            notifier: Arc::new(LogNotifier),
            downloader: Arc::new(LogDownloader),
            store: Arc::new(MemoryArtifactStore::new()),
            timeline: Timeline::new(),
            view: ViewState::Upload,
            highlighted: false,
            active: None,
            published: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_downloader(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.downloader = downloader;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = store;
        self
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    /// Whether the drop zone is showing its drag-over highlight.
    pub fn highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn surface(&self) -> &SharedSurface<S> {
        &self.surface
    }

    /// Lifecycle events of every run started by this shell.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|run| !run.task.is_finished())
    }

    /// Applies one user command.
    ///
    /// Rejected uploads have already been reported through the notifier when
    /// this returns an error.
    pub async fn dispatch(&mut self, command: ShellCommand) -> Result<(), ShellError> {
        match command {
            ShellCommand::DragEnter => {
                self.highlighted = true;
                Ok(())
            }
            ShellCommand::DragLeave => {
                self.highlighted = false;
                Ok(())
            }
            ShellCommand::DropFiles(files) => {
                self.highlighted = false;
                self.upload(files).await
            }
            ShellCommand::SelectFile(file) => self.upload(vec![file]).await,
        }
    }

    /// Waits for the active run, if any, and returns how it ended.
    pub async fn wait(&mut self) -> Option<Result<RunOutcome, ShellError>> {
        let run = self.active.take()?;
        Some(join(run).await)
    }

    /// Cancels and joins the active run, if any.
    pub async fn cancel_active(&mut self) {
        if let Some(run) = self.active.take() {
            run.cancel.cancel();
            match join(run).await {
                Err(err) if err.is_cancelled() => debug!("previous run cancelled"),
                Err(err) => debug!(error = %err, "previous run had failed"),
                Ok(_) => debug!("previous run had already finished"),
            }
        }
    }

    async fn upload(&mut self, mut files: Vec<FileInput>) -> Result<(), ShellError> {
        let file = match files.len() {
            0 => return Err(self.reject(ShellError::NoFile)),
            1 => files.remove(0),
            n => return Err(self.reject(ShellError::MultiFile(n))),
        };
        let route = match file.read_route().await {
            Ok(route) => route,
            Err(err) => return Err(self.reject(err.into())),
        };
        info!(file = %file.name(), coords = route.len(), "route ingested");

        self.cancel_active().await;
        self.release_previous();
        self.view = ViewState::Map;
        self.launch(route);
        Ok(())
    }

    fn release_previous(&self) {
        let previous = self.published.lock().take();
        if let Some(url) = previous {
            if self.store.revoke(&url) {
                debug!(%url, "previous recording released");
            }
        }
    }

    fn reject(&self, err: ShellError) -> ShellError {
        warn!(error = %err, "upload rejected");
        self.notifier.notify(err.user_message());
        err
    }

    fn launch(&mut self, route: Route) {
        let cancel = CancelToken::new();
        let token = cancel.clone();
        let surface = self.surface.clone();
        let config = self.config.clone();
        let store = self.store.clone();
        let timeline = self.timeline.clone();
        let notifier = self.notifier.clone();
        let downloader = self.downloader.clone();
        let published = self.published.clone();

        let task = tokio::spawn(async move {
            let outcome = run(route, surface, &config, store, &token, &timeline).await;
            match &outcome {
                Ok(RunOutcome::Recorded(recording)) => {
                    *published.lock() = Some(recording.artifact.url.clone());
                    downloader.download(&recording.artifact);
                }
                Ok(RunOutcome::Animated(_)) => {}
                Err(err) if err.is_cancelled() => {}
                Err(err) => {
                    error!(error = %err, "run failed");
                    notifier.notify(err.user_message());
                }
            }
            outcome
        });
        self.active = Some(ActiveRun { cancel, task });
    }
}

async fn run<S>(
    route: Route,
    surface: SharedSurface<S>,
    config: &ShellConfig,
    store: Arc<dyn ArtifactStore>,
    cancel: &CancelToken,
    timeline: &Timeline,
) -> Result<RunOutcome, ShellError>
where
    S: MapSurface + CaptureSource,
{
    if !surface.lock().is_loaded() {
        info!("waiting for the map to load");
    }
    match cancel.run_until_cancelled(wait_loaded(&surface)).await {
        Err(Cancelled) => return Err(AnimationError::Cancelled.into()),
        Ok(loaded) => loaded.map_err(AnimationError::from)?,
    }
    clear_route(&mut *surface.lock()).map_err(AnimationError::from)?;

    match config.mode {
        Mode::Animate => {
            let completed = timeline.clone();
            let report = animate(
                route,
                surface,
                config.animation.clone(),
                cancel.clone(),
                move || completed.emit(ANIMATION_COMPLETED, "end marker shown"),
            )
            .await?;
            Ok(RunOutcome::Animated(report))
        }
        Mode::Record => {
            let recording = record_route(
                route,
                surface,
                config.animation.clone(),
                &config.capture,
                store,
                cancel,
                timeline,
            )
            .await?;
            Ok(RunOutcome::Recorded(recording))
        }
    }
}

async fn join(run: ActiveRun) -> Result<RunOutcome, ShellError> {
    run.task
        .await
        .map_err(|err| ShellError::Task(err.to_string()))?
}

impl<S> Drop for Shell<S> {
    fn drop(&mut self) {
        if let Some(run) = self.active.take() {
            run.cancel.cancel();
        }
    }
}
