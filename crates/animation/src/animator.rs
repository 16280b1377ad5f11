use formats::{FeatureCollection, Route};
use foundation::LonLat;
use layers::{LayerSpec, MapSurface, SurfaceError};
use tracing::{debug, info, warn};

use crate::config::AnimationConfig;
use crate::error::AnimationError;
use crate::state::{AnimationPhase, AnimationState};

pub const START_SOURCE: &str = "route-start";
pub const START_LAYER: &str = "route-start-marker";
pub const LINE_SOURCE: &str = "route-line";
pub const LINE_LAYER: &str = "route-line-stroke";
pub const END_SOURCE: &str = "route-end";
pub const END_LAYER: &str = "route-end-marker";

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The line grew; `cursor` is the index the camera was centered on.
    Advanced { cursor: usize },
    /// The route is fully walked and the end marker is shown.
    Completed,
}

/// Summary of a finished (or stopped) run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationReport {
    pub ticks: u64,
    pub final_cursor: usize,
    pub route_len: usize,
    pub phase: AnimationPhase,
}

/// Drives the progressive reveal of one route on a map surface.
///
/// The animator never mutates the route; everything that changes lives in
/// [`AnimationState`]. Call [`start`](Self::start) once, then
/// [`tick`](Self::tick) until it reports [`TickOutcome::Completed`].
#[derive(Debug)]
pub struct RouteAnimator {
    route: Route,
    config: AnimationConfig,
    state: AnimationState,
    phase: AnimationPhase,
    ticks: u64,
}

impl RouteAnimator {
    pub fn new(route: Route, config: AnimationConfig) -> Result<Self, AnimationError> {
        config.validate()?;
        let state = AnimationState::new(config.step, config.tick_interval());
        Ok(Self {
            route,
            config,
            state,
            phase: AnimationPhase::Idle,
            ticks: 0,
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn phase(&self) -> AnimationPhase {
        self.phase
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Coordinates currently drawn by the growing line.
    pub fn growing_line(&self) -> &[LonLat] {
        self.route.prefix(self.state.cursor())
    }

    pub fn report(&self) -> AnimationReport {
        AnimationReport {
            ticks: self.ticks,
            final_cursor: self.state.cursor(),
            route_len: self.route.len(),
            phase: self.phase,
        }
    }

    /// Frames the departure point and registers the start marker and the
    /// line source, seeded with the departure coordinate.
    pub fn start<S>(&mut self, surface: &mut S) -> Result<(), AnimationError>
    where
        S: MapSurface + ?Sized,
    {
        if self.phase != AnimationPhase::Idle {
            return Err(AnimationError::AlreadyStarted);
        }
        let first = self.route.first();
        let result = (|| -> Result<(), SurfaceError> {
            surface.set_center(first)?;
            surface.set_zoom(self.config.zoom)?;
            surface.add_source(START_SOURCE, FeatureCollection::point(first))?;
            surface.add_layer(LayerSpec::circle(
                START_LAYER,
                START_SOURCE,
                self.config.start_marker.clone(),
            ))?;
            surface.add_source(LINE_SOURCE, FeatureCollection::line_string(vec![first]))?;
            surface.add_layer(LayerSpec::line(
                LINE_LAYER,
                LINE_SOURCE,
                self.config.line.clone(),
            ))
        })();
        self.guard(result)?;

        self.phase = AnimationPhase::Running;
        info!(
            coords = self.route.len(),
            step = self.state.step(),
            "route animation started"
        );
        Ok(())
    }

    /// Advances one tick.
    ///
    /// Completion is detected before the route is indexed, so the cursor is
    /// never dereferenced past the end.
    pub fn tick<S>(&mut self, surface: &mut S) -> Result<TickOutcome, AnimationError>
    where
        S: MapSurface + ?Sized,
    {
        if self.phase != AnimationPhase::Running {
            return Err(AnimationError::NotRunning(self.phase));
        }
        self.ticks += 1;

        let len = self.route.len();
        if self.state.is_done(len) {
            self.complete(surface)?;
            return Ok(TickOutcome::Completed);
        }

        let cursor = self.state.cursor();
        let center = self.route.coords()[cursor];
        let line = FeatureCollection::line_string(self.route.prefix(cursor).to_vec());
        let result = surface
            .set_center(center)
            .and_then(|()| surface.set_source_data(LINE_SOURCE, line));
        self.guard(result)?;
        debug!(cursor, len, "route animation tick");

        if self.state.advance() >= len {
            self.complete(surface)?;
            return Ok(TickOutcome::Completed);
        }
        Ok(TickOutcome::Advanced { cursor })
    }

    /// Marks the run cancelled. No end marker is drawn.
    pub fn cancel(&mut self) {
        if !self.phase.is_terminal() {
            self.phase = AnimationPhase::Cancelled;
            info!(cursor = self.state.cursor(), "route animation cancelled");
        }
    }

    fn complete<S>(&mut self, surface: &mut S) -> Result<(), AnimationError>
    where
        S: MapSurface + ?Sized,
    {
        // Runs at most once per animator.
        if self.phase != AnimationPhase::Running {
            return Ok(());
        }
        self.phase = AnimationPhase::Completed;

        let last = self.route.last();
        let bounds = self.route.bounds();
        let fit = self.config.fit_bounds;
        let result = (|| -> Result<(), SurfaceError> {
            if let Some(options) = fit {
                surface.fit_bounds(bounds, options)?;
            }
            surface.add_source(END_SOURCE, FeatureCollection::point(last))?;
            surface.add_layer(LayerSpec::circle(
                END_LAYER,
                END_SOURCE,
                self.config.end_marker.clone(),
            ))
        })();
        self.guard(result)?;

        info!(ticks = self.ticks, coords = self.route.len(), "route animation completed");
        Ok(())
    }

    fn guard(&mut self, result: Result<(), SurfaceError>) -> Result<(), AnimationError> {
        result.map_err(|err| {
            warn!(error = %err, cursor = self.state.cursor(), "route animation failed");
            self.phase = AnimationPhase::Failed;
            AnimationError::Surface(err)
        })
    }
}

/// Removes everything a previous run drew, so a new route can be started on
/// the same surface. Missing layers and sources are skipped.
pub fn clear_route<S>(surface: &mut S) -> Result<(), SurfaceError>
where
    S: MapSurface + ?Sized,
{
    for layer in [END_LAYER, LINE_LAYER, START_LAYER] {
        surface.remove_layer(layer)?;
    }
    for source in [END_SOURCE, LINE_SOURCE, START_SOURCE] {
        surface.remove_source(source)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ticks_for;
    use formats::Geometry;
    use layers::{HeadlessSurface, SurfaceCommand};
    use pretty_assertions::assert_eq;

    fn route(n: usize) -> Route {
        Route::new((0..n).map(|i| LonLat::new(i as f64, i as f64)).collect()).expect("route")
    }

    fn line_coords(fc: &FeatureCollection) -> Vec<LonLat> {
        match &fc.features[0].geometry {
            Geometry::LineString(c) => c.clone(),
            other => panic!("expected line, got {other:?}"),
        }
    }

    fn run_to_end(animator: &mut RouteAnimator, surface: &mut HeadlessSurface) -> Vec<usize> {
        let mut cursors = Vec::new();
        loop {
            match animator.tick(surface).expect("tick") {
                TickOutcome::Advanced { cursor } => cursors.push(cursor),
                TickOutcome::Completed => return cursors,
            }
        }
    }

    #[test]
    fn start_registers_markers_and_seeds_line() {
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(route(3), AnimationConfig::basic()).expect("animator");
        a.start(&mut s).expect("start");

        assert_eq!(a.phase(), AnimationPhase::Running);
        assert_eq!(s.layer_ids(), vec![START_LAYER, LINE_LAYER]);
        assert_eq!(s.center(), Some(LonLat::new(0.0, 0.0)));
        assert_eq!(s.zoom(), Some(12.0));
        let seeded = s.source(LINE_SOURCE).expect("line source");
        assert_eq!(line_coords(seeded), vec![LonLat::new(0.0, 0.0)]);
        assert!(s.source(END_SOURCE).is_none());
        assert_eq!(a.start(&mut s), Err(AnimationError::AlreadyStarted));
    }

    #[test]
    fn line_at_cursor_two_excludes_current_coordinate() {
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(route(3), AnimationConfig::basic()).expect("animator");
        a.start(&mut s).expect("start");

        assert_eq!(a.tick(&mut s), Ok(TickOutcome::Advanced { cursor: 0 }));
        assert_eq!(a.tick(&mut s), Ok(TickOutcome::Advanced { cursor: 1 }));
        assert_eq!(a.state().cursor(), 2);
        assert_eq!(a.growing_line(), &[LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)]);

        // The tick at cursor 2 pushes the same prefix and centers on route[2].
        assert_eq!(a.tick(&mut s), Ok(TickOutcome::Completed));
        let updates = s.source_updates(LINE_SOURCE);
        assert_eq!(
            line_coords(updates[2]),
            vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)]
        );
        assert_eq!(s.center_history().last(), Some(&LonLat::new(2.0, 2.0)));
    }

    #[test]
    fn terminates_in_ceil_len_over_step_ticks() {
        for len in 1..25 {
            for step in 1..5 {
                let cfg = AnimationConfig {
                    step,
                    ..AnimationConfig::basic()
                };
                let mut s = HeadlessSurface::new();
                let mut a = RouteAnimator::new(route(len), cfg).expect("animator");
                a.start(&mut s).expect("start");
                let cursors = run_to_end(&mut a, &mut s);

                let expected: Vec<usize> = (0..len).step_by(step).collect();
                assert_eq!(cursors, expected[..expected.len() - 1].to_vec());
                assert_eq!(a.ticks() as usize, ticks_for(len, step), "len={len} step={step}");
                assert_eq!(a.phase(), AnimationPhase::Completed);
                assert!(a.state().cursor() >= len);
            }
        }
    }

    #[test]
    fn single_coordinate_completes_on_first_tick() {
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(route(1), AnimationConfig::extended()).expect("animator");
        a.start(&mut s).expect("start");
        assert_eq!(a.tick(&mut s), Ok(TickOutcome::Completed));
        assert_eq!(a.ticks(), 1);
        assert_eq!(s.layer_ids(), vec![START_LAYER, LINE_LAYER, END_LAYER]);
    }

    #[test]
    fn completion_happens_once_and_draws_end_marker() {
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(route(4), AnimationConfig::basic()).expect("animator");
        a.start(&mut s).expect("start");
        run_to_end(&mut a, &mut s);

        assert_eq!(
            a.tick(&mut s),
            Err(AnimationError::NotRunning(AnimationPhase::Completed))
        );
        let end = s.source(END_SOURCE).expect("end marker");
        assert_eq!(end, &FeatureCollection::point(LonLat::new(3.0, 3.0)));
        let end_layers = s.layer_ids().iter().filter(|id| **id == END_LAYER).count();
        assert_eq!(end_layers, 1);
        assert!(
            !s.commands()
                .iter()
                .any(|c| matches!(c, SurfaceCommand::FitBounds { .. })),
            "basic preset must not fit bounds"
        );
    }

    #[test]
    fn extended_preset_fits_route_before_end_marker() {
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(route(7), AnimationConfig::extended()).expect("animator");
        a.start(&mut s).expect("start");
        let cursors = run_to_end(&mut a, &mut s);
        assert_eq!(cursors, vec![0, 3]);
        assert_eq!(a.ticks(), 3);

        let tail: Vec<&SurfaceCommand> = s.commands().iter().rev().take(3).collect();
        assert!(matches!(tail[2], SurfaceCommand::FitBounds { .. }));
        assert!(matches!(tail[1], SurfaceCommand::AddSource { id, .. } if id == END_SOURCE));
        assert!(matches!(tail[0], SurfaceCommand::AddLayer(l) if l.id == END_LAYER));
        if let SurfaceCommand::FitBounds { bounds, .. } = tail[2] {
            assert_eq!(bounds.min, [0.0, 0.0]);
            assert_eq!(bounds.max, [6.0, 6.0]);
        }
    }

    #[test]
    fn route_is_untouched_by_animation() {
        let r = route(5);
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(r.clone(), AnimationConfig::basic()).expect("animator");
        a.start(&mut s).expect("start");
        run_to_end(&mut a, &mut s);
        assert_eq!(a.route(), &r);
    }

    #[test]
    fn surface_failure_stops_the_run() {
        // Six start commands succeed, the first tick's center move fails.
        let mut s = HeadlessSurface::failing_after(6);
        let mut a = RouteAnimator::new(route(3), AnimationConfig::basic()).expect("animator");
        a.start(&mut s).expect("start");
        assert!(matches!(a.tick(&mut s), Err(AnimationError::Surface(_))));
        assert_eq!(a.phase(), AnimationPhase::Failed);
        assert_eq!(
            a.tick(&mut s),
            Err(AnimationError::NotRunning(AnimationPhase::Failed))
        );
    }

    #[test]
    fn cancel_is_terminal_and_skips_end_marker() {
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(route(5), AnimationConfig::basic()).expect("animator");
        a.start(&mut s).expect("start");
        a.tick(&mut s).expect("tick");
        a.cancel();
        assert_eq!(a.phase(), AnimationPhase::Cancelled);
        assert!(a.tick(&mut s).is_err());
        assert!(s.source(END_SOURCE).is_none());
    }

    #[test]
    fn tick_before_start_is_rejected() {
        let mut s = HeadlessSurface::new();
        let mut a = RouteAnimator::new(route(2), AnimationConfig::basic()).expect("animator");
        assert_eq!(
            a.tick(&mut s),
            Err(AnimationError::NotRunning(AnimationPhase::Idle))
        );
    }

    #[test]
    fn cleared_surface_accepts_a_second_route() {
        let mut s = HeadlessSurface::new();
        let mut first = RouteAnimator::new(route(2), AnimationConfig::basic()).expect("animator");
        first.start(&mut s).expect("start");
        while first.tick(&mut s).expect("tick") != TickOutcome::Completed {}

        clear_route(&mut s).expect("clear");
        assert!(s.layers().is_empty());
        assert!(s.source(LINE_SOURCE).is_none());

        let mut second = RouteAnimator::new(route(3), AnimationConfig::basic()).expect("animator");
        second.start(&mut s).expect("restart");
        assert_eq!(s.layer_ids(), vec![START_LAYER, LINE_LAYER]);
    }

    #[test]
    fn clearing_an_untouched_surface_is_a_no_op() {
        let mut s = HeadlessSurface::new();
        clear_route(&mut s).expect("clear");
        assert!(s.commands().is_empty());
    }
}
