pub trait Point {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        LatLng { latitude, longitude }
    }
}

impl Point for LatLng {
    fn latitude(&self) -> f64 {
        self.latitude
    }
    fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// GeoJSON positions are `[longitude, latitude, ...]`.
impl Point for [f64] {
    fn latitude(&self) -> f64 {
        self.get(1).copied().unwrap_or(std::f64::NAN)
    }
    fn longitude(&self) -> f64 {
        self.get(0).copied().unwrap_or(std::f64::NAN)
    }
}

impl Point for Vec<f64> {
    fn latitude(&self) -> f64 {
        self.as_slice().latitude()
    }
    fn longitude(&self) -> f64 {
        self.as_slice().longitude()
    }
}
