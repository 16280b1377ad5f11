use crate::coord::LonLat;

/// Axis-aligned lon/lat bounding box.
///
/// `min` is the south-west corner and `max` the north-east corner, both as
/// `[lon, lat]`. Antimeridian-crossing boxes are not modelled.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LonLatBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl LonLatBounds {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        LonLatBounds { min, max }
    }

    /// Degenerate box around a single position.
    pub fn from_point(p: LonLat) -> Self {
        let a = p.to_array();
        LonLatBounds { min: a, max: a }
    }

    /// Smallest box containing every position, or `None` for an empty input.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LonLat>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LonLat) {
        self.min[0] = self.min[0].min(p.lon_deg);
        self.min[1] = self.min[1].min(p.lat_deg);
        self.max[0] = self.max[0].max(p.lon_deg);
        self.max[1] = self.max[1].max(p.lat_deg);
    }

    pub fn south_west(&self) -> LonLat {
        LonLat::from(self.min)
    }

    pub fn north_east(&self) -> LonLat {
        LonLat::from(self.max)
    }

    pub fn center(&self) -> LonLat {
        LonLat::new(
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
        )
    }

    pub fn width_deg(&self) -> f64 {
        (self.max[0] - self.min[0]).max(0.0)
    }

    pub fn height_deg(&self) -> f64 {
        (self.max[1] - self.min[1]).max(0.0)
    }

    pub fn contains(&self, p: LonLat) -> bool {
        p.lon_deg >= self.min[0]
            && p.lon_deg <= self.max[0]
            && p.lat_deg >= self.min[1]
            && p.lat_deg <= self.max[1]
    }
}
