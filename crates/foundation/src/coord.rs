/// A WGS84 position in degrees, ordered the way GeoJSON orders it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl LonLat {
    pub const fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    /// `[lon, lat]`, the GeoJSON position layout.
    pub fn to_array(self) -> [f64; 2] {
        [self.lon_deg, self.lat_deg]
    }

    pub fn is_finite(self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(value: [f64; 2]) -> Self {
        Self::new(value[0], value[1])
    }
}

impl From<(f64, f64)> for LonLat {
    fn from((lon_deg, lat_deg): (f64, f64)) -> Self {
        Self::new(lon_deg, lat_deg)
    }
}
