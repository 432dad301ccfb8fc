use ord_subset::OrdSubsetIterExt;

use crate::{LatLng, Point};

/// Geographic bounding box, `south_west` to `north_east`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Smallest box containing all `points`, `None` for an empty slice.
    ///
    /// Non-finite coordinates are ignored.
    pub fn of<T: Point>(points: &[T]) -> Option<Self> {
        Self::from_points(points.iter().map(|p| LatLng::new(p.latitude(), p.longitude())))
    }

    pub fn from_points<I>(points: I) -> Option<Self> where I: IntoIterator<Item = LatLng> {
        let points = points.into_iter()
            .filter(|p| p.latitude.is_finite() && p.longitude.is_finite())
            .collect::<Vec<_>>();

        let lat_min = points.iter().map(|p| p.latitude).ord_subset_min()?;
        let lat_max = points.iter().map(|p| p.latitude).ord_subset_max()?;
        let lon_min = points.iter().map(|p| p.longitude).ord_subset_min()?;
        let lon_max = points.iter().map(|p| p.longitude).ord_subset_max()?;

        Some(Bounds {
            south_west: LatLng::new(lat_min, lon_min),
            north_east: LatLng::new(lat_max, lon_max),
        })
    }
}
