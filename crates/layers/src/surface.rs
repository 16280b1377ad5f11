//! The map surface the route pipeline drives.
//!
//! Hosts (a browser map, a native renderer, the headless recorder in
//! [`crate::headless`]) implement [`MapSurface`]. All calls are synchronous and
//! cheap; callers hold the surface lock only for the duration of a call batch.

use std::sync::Arc;

use formats::FeatureCollection;
use foundation::{LonLat, LonLatBounds};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::layer::LayerSpec;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("unknown source: {0}")]
    UnknownSource(String),
    #[error("source already registered: {0}")]
    DuplicateSource(String),
    #[error("layer already registered: {0}")]
    DuplicateLayer(String),
    #[error("source {source_id} is still used by layer {layer_id}")]
    SourceInUse { source_id: String, layer_id: String },
    #[error("map surface is not loaded")]
    NotLoaded,
    #[error("map backend error: {0}")]
    Backend(String),
}

/// Camera transition used when framing a bounding box.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Screen-space padding around the box, in pixels.
    pub padding_px: f64,
    /// Camera transition duration in milliseconds.
    pub duration_ms: u64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            padding_px: 64.0,
            duration_ms: 1000,
        }
    }
}

pub trait MapSurface: Send {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), SurfaceError>;

    /// Replaces the data of a registered source.
    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError>;

    fn set_center(&mut self, center: LonLat) -> Result<(), SurfaceError>;

    fn set_zoom(&mut self, zoom: f64) -> Result<(), SurfaceError>;

    fn fit_bounds(&mut self, bounds: LonLatBounds, options: FitOptions)
    -> Result<(), SurfaceError>;

    /// Removes a layer. Returns whether it existed.
    fn remove_layer(&mut self, id: &str) -> Result<bool, SurfaceError>;

    /// Removes a source. Layers still using it must be removed first.
    fn remove_source(&mut self, id: &str) -> Result<bool, SurfaceError>;

    /// Whether the surface has loaded and accepts calls.
    fn is_loaded(&self) -> bool {
        true
    }

    /// Load state of the surface. The value turns `true` once it accepts calls
    /// and stays there.
    fn load_state(&self) -> watch::Receiver<bool> {
        watch::channel(true).1
    }
}

/// A surface shared between the animator and the capture coordinator.
pub type SharedSurface<S> = Arc<Mutex<S>>;

pub fn share<S: MapSurface>(surface: S) -> SharedSurface<S> {
    Arc::new(Mutex::new(surface))
}

/// Resolves once `surface` has loaded.
///
/// Fails with [`SurfaceError::NotLoaded`] if the surface stops reporting its
/// load state before it ever loads.
pub async fn wait_loaded<S: MapSurface>(surface: &SharedSurface<S>) -> Result<(), SurfaceError> {
    let mut state = surface.lock().load_state();
    state
        .wait_for(|loaded| *loaded)
        .await
        .map(|_| ())
        .map_err(|_| SurfaceError::NotLoaded)
}
