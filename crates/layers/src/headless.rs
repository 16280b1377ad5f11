use std::collections::BTreeMap;

use formats::FeatureCollection;
use foundation::{LonLat, LonLatBounds};
use tokio::sync::watch;
use tracing::trace;

use crate::layer::LayerSpec;
use crate::surface::{FitOptions, MapSurface, SurfaceError};

/// Every call a [`HeadlessSurface`] has accepted, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    AddSource {
        id: String,
        data: FeatureCollection,
    },
    AddLayer(LayerSpec),
    SetSourceData {
        id: String,
        data: FeatureCollection,
    },
    SetCenter(LonLat),
    SetZoom(f64),
    FitBounds {
        bounds: LonLatBounds,
        options: FitOptions,
    },
    RemoveLayer(String),
    RemoveSource(String),
}

/// In-memory map surface that validates calls and keeps a command log.
///
/// Used wherever no real renderer is attached: tests, dry runs, and the
/// capture pipeline's synthetic recorder.
#[derive(Debug)]
pub struct HeadlessSurface {
    sources: BTreeMap<String, FeatureCollection>,
    layers: Vec<LayerSpec>,
    center: Option<LonLat>,
    zoom: Option<f64>,
    log: Vec<SurfaceCommand>,
    fail_after: Option<usize>,
    loaded: watch::Sender<bool>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            layers: Vec::new(),
            center: None,
            zoom: None,
            log: Vec::new(),
            fail_after: None,
            loaded: watch::channel(true).0,
        }
    }
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call after the first `n` accepted ones fail with a backend error.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// A surface whose style has not loaded yet; every call fails with
    /// [`SurfaceError::NotLoaded`] until [`finish_loading`](Self::finish_loading).
    pub fn loading() -> Self {
        Self {
            loaded: watch::channel(false).0,
            ..Self::default()
        }
    }

    /// Marks the style as loaded and wakes everyone waiting on
    /// [`MapSurface::load_state`].
    pub fn finish_loading(&mut self) {
        self.loaded.send_replace(true);
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.log
    }

    pub fn source(&self, id: &str) -> Option<&FeatureCollection> {
        self.sources.get(id)
    }

    pub fn layers(&self) -> &[LayerSpec] {
        &self.layers
    }

    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn center(&self) -> Option<LonLat> {
        self.center
    }

    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    /// Data pushed to `id` through `set_source_data`, oldest first.
    pub fn source_updates(&self, id: &str) -> Vec<&FeatureCollection> {
        self.log
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::SetSourceData { id: sid, data } if sid == id => Some(data),
                _ => None,
            })
            .collect()
    }

    /// Every center the camera was moved to, oldest first.
    pub fn center_history(&self) -> Vec<LonLat> {
        self.log
            .iter()
            .filter_map(|c| match c {
                SurfaceCommand::SetCenter(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    fn admit(&mut self) -> Result<(), SurfaceError> {
        if !self.is_loaded() {
            return Err(SurfaceError::NotLoaded);
        }
        if let Some(limit) = self.fail_after
            && self.log.len() >= limit
        {
            return Err(SurfaceError::Backend("injected failure".to_string()));
        }
        Ok(())
    }

    fn record(&mut self, command: SurfaceCommand) {
        trace!(?command, "surface command");
        self.log.push(command);
    }
}

impl MapSurface for HeadlessSurface {
    fn add_source(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        self.admit()?;
        if self.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        self.sources.insert(id.to_string(), data.clone());
        self.record(SurfaceCommand::AddSource {
            id: id.to_string(),
            data,
        });
        Ok(())
    }

    fn add_layer(&mut self, layer: LayerSpec) -> Result<(), SurfaceError> {
        self.admit()?;
        if self.layers.iter().any(|l| l.id == layer.id) {
            return Err(SurfaceError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(SurfaceError::UnknownSource(layer.source));
        }
        self.layers.push(layer.clone());
        self.record(SurfaceCommand::AddLayer(layer));
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: FeatureCollection) -> Result<(), SurfaceError> {
        self.admit()?;
        let slot = self
            .sources
            .get_mut(id)
            .ok_or_else(|| SurfaceError::UnknownSource(id.to_string()))?;
        *slot = data.clone();
        self.record(SurfaceCommand::SetSourceData {
            id: id.to_string(),
            data,
        });
        Ok(())
    }

    fn set_center(&mut self, center: LonLat) -> Result<(), SurfaceError> {
        self.admit()?;
        self.center = Some(center);
        self.record(SurfaceCommand::SetCenter(center));
        Ok(())
    }

    fn set_zoom(&mut self, zoom: f64) -> Result<(), SurfaceError> {
        self.admit()?;
        self.zoom = Some(zoom);
        self.record(SurfaceCommand::SetZoom(zoom));
        Ok(())
    }

    fn fit_bounds(
        &mut self,
        bounds: LonLatBounds,
        options: FitOptions,
    ) -> Result<(), SurfaceError> {
        self.admit()?;
        self.center = Some(bounds.center());
        self.record(SurfaceCommand::FitBounds { bounds, options });
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<bool, SurfaceError> {
        self.admit()?;
        let before = self.layers.len();
        self.layers.retain(|l| l.id != id);
        let removed = self.layers.len() != before;
        if removed {
            self.record(SurfaceCommand::RemoveLayer(id.to_string()));
        }
        Ok(removed)
    }

    fn remove_source(&mut self, id: &str) -> Result<bool, SurfaceError> {
        self.admit()?;
        if let Some(layer) = self.layers.iter().find(|l| l.source == id) {
            return Err(SurfaceError::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        let removed = self.sources.remove(id).is_some();
        if removed {
            self.record(SurfaceCommand::RemoveSource(id.to_string()));
        }
        Ok(removed)
    }

    fn is_loaded(&self) -> bool {
        *self.loaded.borrow()
    }

    fn load_state(&self) -> watch::Receiver<bool> {
        self.loaded.subscribe()
    }
}
