use std::cell::{Cell, Ref, RefCell};
use std::f64::consts::PI;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::photo::Marker;
use crate::route::Route;
use crate::LatLng;

const TILE_SIZE: f64 = 256.;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Zoom snapping step, matching Leaflet's default `zoomSnap`.
const ZOOM_SNAP: f64 = 1.;
const DEFAULT_MAX_ZOOM: f64 = 18.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    pub center: LatLng,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: f64,
}

/// Stroke parameters for line overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

impl Default for PathStyle {
    fn default() -> Self {
        PathStyle {
            color: "#3388ff".to_owned(),
            weight: 5.,
            opacity: 0.8,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Layer {
    Tiles(TileLayer),
    Route(Route),
    Marker(Marker),
}

/// The shared rendering surface.
///
/// Loaders only ever append layers, so a `&Map` can be handed to several
/// futures polled on the same task. Borrows never outlive a method call.
#[derive(Debug)]
pub struct Map {
    width: f64,
    height: f64,
    min_zoom: f64,
    view: Cell<View>,
    layers: RefCell<Vec<Layer>>,
    fits: RefCell<Vec<Bounds>>,
}

impl Map {
    pub fn new(center: LatLng, zoom: f64, (width, height): (u32, u32)) -> Self {
        Map {
            width: width.into(),
            height: height.into(),
            min_zoom: 0.,
            view: Cell::new(View { center, zoom }),
            layers: RefCell::new(Vec::new()),
            fits: RefCell::new(Vec::new()),
        }
    }

    pub fn view(&self) -> View {
        self.view.get()
    }

    /// Appends a layer and returns its index.
    pub fn add_layer(&self, layer: Layer) -> usize {
        let mut layers = self.layers.borrow_mut();
        layers.push(layer);
        layers.len() - 1
    }

    pub fn layers(&self) -> Ref<'_, [Layer]> {
        Ref::map(self.layers.borrow(), |layers| layers.as_slice())
    }

    pub fn routes(&self) -> Vec<Route> {
        self.layers.borrow().iter()
            .filter_map(|layer| match layer {
                Layer::Route(route) => Some(route.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn markers(&self) -> Vec<Marker> {
        self.layers.borrow().iter()
            .filter_map(|layer| match layer {
                Layer::Marker(marker) => Some(marker.clone()),
                _ => None,
            })
            .collect()
    }

    /// Every bounding box the view was fitted to, oldest first.
    pub fn fits(&self) -> Vec<Bounds> {
        self.fits.borrow().clone()
    }

    fn max_zoom(&self) -> f64 {
        self.layers.borrow().iter()
            .filter_map(|layer| match layer {
                Layer::Tiles(tiles) => Some(tiles.max_zoom),
                _ => None,
            })
            .fold(None, |acc: Option<f64>, z| Some(acc.map_or(z, |acc| acc.max(z))))
            .unwrap_or(DEFAULT_MAX_ZOOM)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.max(self.min_zoom).min(self.max_zoom())
    }

    /// Largest zoom at which `bounds` fits the viewport shrunk by `padding`
    /// pixels on every side.
    pub fn bounds_zoom(&self, bounds: &Bounds, padding: f64) -> f64 {
        let width = (self.width - 2. * padding).max(0.);
        let height = (self.height - 2. * padding).max(0.);

        let (x1, y1) = project(bounds.south_west, 0.);
        let (x2, y2) = project(bounds.north_east, 0.);
        let scale = (width / (x2 - x1).abs()).min(height / (y2 - y1).abs());

        let mut zoom = scale.log2();
        if zoom.is_finite() {
            zoom = (zoom * 100.).round() / 100.;
            zoom = (zoom / ZOOM_SNAP).floor() * ZOOM_SNAP;
        }
        self.clamp_zoom(zoom)
    }

    /// Centers and zooms the view so `bounds` is fully visible.
    pub fn fit_bounds(&self, bounds: &Bounds, padding: f64) -> View {
        let zoom = self.bounds_zoom(bounds, padding);
        let (x1, y1) = project(bounds.south_west, zoom);
        let (x2, y2) = project(bounds.north_east, zoom);
        let center = unproject(((x1 + x2) / 2., (y1 + y2) / 2.), zoom);

        debug!("fitting view to {:?}: center {:?}, zoom {}", bounds, center, zoom);

        self.fits.borrow_mut().push(*bounds);
        let view = View { center, zoom };
        self.view.set(view);
        view
    }
}

/// Spherical Mercator pixel coordinates at `zoom`.
pub fn project(p: LatLng, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = p.latitude.max(-MAX_LATITUDE).min(MAX_LATITUDE).to_radians();
    let x = scale * (p.longitude / 360. + 0.5);
    let y = scale * (0.5 - (PI / 4. + lat / 2.).tan().ln() / (2. * PI));
    (x, y)
}

pub fn unproject((x, y): (f64, f64), zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let longitude = (x / scale - 0.5) * 360.;
    let latitude = (2. * ((0.5 - y / scale) * 2. * PI).exp().atan() - PI / 2.).to_degrees();
    LatLng::new(latitude, longitude)
}
