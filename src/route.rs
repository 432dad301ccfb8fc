use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Position, Value};
use gpx::{Gpx, Waypoint};
use log::{error, info, warn};
use serde_json::json;

use crate::bounds::Bounds;
use crate::canvas::{Layer, Map, PathStyle};
use crate::error::Error;
use crate::fetch::Fetch;
use crate::haversine::path_length;
use crate::{LatLng, Point};

/// The line features of one track file, as drawn on the map.
#[derive(Debug, Clone)]
pub struct Route {
    pub source: String,
    pub features: FeatureCollection,
    pub style: PathStyle,
}

impl Route {
    pub fn lines(&self) -> impl Iterator<Item = &Vec<Position>> {
        self.features.features.iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .flat_map(|geometry| match geometry.value {
                Value::LineString(ref line) => vec![line],
                Value::MultiLineString(ref lines) => lines.iter().collect(),
                _ => vec![],
            })
    }

    pub fn point_count(&self) -> usize {
        self.lines().map(|line| line.len()).sum()
    }

    /// Total length of all lines in kilometers.
    pub fn length(&self) -> f64 {
        self.lines().map(|line| path_length(line)).sum()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.lines()
            .flat_map(|line| line.iter())
            .map(|p| LatLng::new(p.latitude(), p.longitude())))
    }
}

fn position(waypoint: &Waypoint) -> Position {
    let point = waypoint.point();
    match waypoint.elevation {
        Some(elevation) => vec![point.x(), point.y(), elevation],
        None => vec![point.x(), point.y()],
    }
}

fn feature(value: Value, name: Option<&str>, length: Option<f64>) -> Feature {
    let mut properties = JsonObject::new();
    if let Some(name) = name {
        properties.insert("name".to_owned(), json!(name));
    }
    if let Some(length) = length {
        properties.insert("length_km".to_owned(), json!(length));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Converts every track, route and waypoint of `gpx` into a GeoJSON feature.
///
/// A track with a single segment becomes a `LineString`, a track with several
/// segments a `MultiLineString`. Tracks and routes without points are dropped.
pub fn gpx_to_geojson(gpx: &Gpx) -> FeatureCollection {
    let mut features = Vec::new();

    for track in &gpx.tracks {
        let mut segments = track.segments.iter()
            .map(|segment| segment.points.iter().map(position).collect::<Vec<_>>())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>();

        let length = segments.iter().map(|line| path_length(line)).sum();
        let value = match segments.len() {
            0 => continue,
            1 => Value::LineString(segments.remove(0)),
            _ => Value::MultiLineString(segments),
        };
        features.push(feature(value, track.name.as_deref(), Some(length)));
    }

    for route in &gpx.routes {
        let line = route.points.iter().map(position).collect::<Vec<_>>();
        if line.is_empty() {
            continue;
        }
        let length = path_length(&line);
        features.push(feature(Value::LineString(line), route.name.as_deref(), Some(length)));
    }

    for waypoint in &gpx.waypoints {
        features.push(feature(Value::Point(position(waypoint)), waypoint.name.as_deref(), None));
    }

    FeatureCollection { bbox: None, features, foreign_members: None }
}

pub fn is_line(feature: &Feature) -> bool {
    match feature.geometry {
        Some(Geometry { value: Value::LineString(_), .. }) => true,
        Some(Geometry { value: Value::MultiLineString(_), .. }) => true,
        _ => false,
    }
}

/// Keeps the line features, dropping waypoints and anything else.
pub fn line_features(collection: FeatureCollection) -> FeatureCollection {
    FeatureCollection {
        features: collection.features.into_iter().filter(is_line).collect(),
        ..collection
    }
}

pub fn parse_route(path: &str, bytes: &[u8], style: PathStyle) -> Result<Route, Error> {
    let gpx = gpx::read(bytes).map_err(|e| Error::parse(path, e))?;
    info!("{}: {} tracks, {} routes, {} waypoints", path, gpx.tracks.len(), gpx.routes.len(), gpx.waypoints.len());

    let features = line_features(gpx_to_geojson(&gpx));
    if features.features.is_empty() {
        return Err(Error::EmptyRoute { path: path.to_owned() });
    }

    Ok(Route { source: path.to_owned(), features, style })
}

/// Fetches the track file at `path`, draws its lines and fits the view to them.
pub async fn load_route<F: Fetch>(
    map: &Map,
    fetcher: &F,
    path: &str,
    style: PathStyle,
    padding: f64,
) -> Result<Route, Error> {
    let bytes = fetcher.fetch(path).await?;
    let route = parse_route(path, &bytes, style)?;

    info!(
        "{}: {} lines, {} points, {:.2} km",
        path,
        route.features.features.len(),
        route.point_count(),
        route.length()
    );

    map.add_layer(Layer::Route(route.clone()));
    match route.bounds() {
        Some(bounds) => { map.fit_bounds(&bounds, padding); }
        None => warn!("{}: lines have no valid coordinates", path),
    }

    Ok(route)
}

/// Like [`load_route`], but logs failures and leaves the map untouched.
pub async fn try_load_route<F: Fetch>(
    map: &Map,
    fetcher: &F,
    path: &str,
    style: PathStyle,
    padding: f64,
) -> Option<Route> {
    match load_route(map, fetcher, path, style, padding).await {
        Ok(route) => Some(route),
        Err(e @ Error::EmptyRoute { .. }) => {
            warn!("{}", e);
            None
        }
        Err(e) => {
            error!("route not loaded: {}", e);
            None
        }
    }
}
