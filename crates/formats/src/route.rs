use std::sync::Arc;

use foundation::{LonLat, LonLatBounds};

use crate::geojson::{FeatureCollection, Geometry};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("route must contain at least one coordinate")]
    Empty,
    #[error("coordinate {index} is not a finite lon/lat pair")]
    NonFinite { index: usize },
}

/// A validated, immutable LineString route.
///
/// Always holds at least one finite coordinate. Cloning shares the
/// underlying coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    coords: Arc<[LonLat]>,
}

impl Route {
    pub fn new(coords: Vec<LonLat>) -> Result<Self, RouteError> {
        if coords.is_empty() {
            return Err(RouteError::Empty);
        }
        if let Some(index) = coords.iter().position(|c| !c.is_finite()) {
            return Err(RouteError::NonFinite { index });
        }
        Ok(Self {
            coords: coords.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Never true for a constructed route; present for slice-like symmetry.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn coords(&self) -> &[LonLat] {
        &self.coords
    }

    pub fn get(&self, index: usize) -> Option<LonLat> {
        self.coords.get(index).copied()
    }

    /// Departure coordinate.
    pub fn first(&self) -> LonLat {
        self.coords[0]
    }

    /// Arrival coordinate.
    pub fn last(&self) -> LonLat {
        self.coords[self.coords.len() - 1]
    }

    /// Coordinates `[0, end)`, with `end` clamped to the route length.
    pub fn prefix(&self, end: usize) -> &[LonLat] {
        &self.coords[..end.min(self.coords.len())]
    }

    pub fn bounds(&self) -> LonLatBounds {
        let mut b = LonLatBounds::from_point(self.first());
        for p in self.coords.iter().skip(1) {
            b.extend(*p);
        }
        b
    }

    pub fn to_geometry(&self) -> Geometry {
        Geometry::LineString(self.coords.to_vec())
    }

    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection::single(self.to_geometry())
    }
}
