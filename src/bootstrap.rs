use log::info;

use crate::canvas::{Layer, Map};
use crate::config::Config;
use crate::fetch::Fetch;
use crate::photo::{load_photos, MarkerGroup};
use crate::route::{try_load_route, Route};

/// What the two loaders produced; both may come back empty.
#[derive(Debug)]
pub struct Loaded {
    pub route: Option<Route>,
    pub photos: MarkerGroup,
}

pub fn new_map(config: &Config) -> Map {
    let map = Map::new(config.center(), config.zoom, config.size);
    map.add_layer(Layer::Tiles(config.tiles.clone()));
    map
}

/// Runs the route and photo loaders concurrently against `map` and waits
/// for both.
pub async fn load_all<F: Fetch>(map: &Map, config: &Config, fetcher: &F) -> Loaded {
    let route = try_load_route(map, fetcher, &config.track, config.route_style.clone(), config.padding);
    let photos = load_photos(map, fetcher, &config.photos, config.popup_width, config.padding);

    let (route, photos) = tokio::join!(route, photos);
    info!(
        "map ready: {} route, {} photos",
        if route.is_some() { "with" } else { "without" },
        photos.len()
    );

    Loaded { route, photos }
}

/// Builds the map with its base layer and every overlay the site provides.
pub async fn bootstrap<F: Fetch>(config: &Config, fetcher: &F) -> Map {
    let map = new_map(config);
    load_all(&map, config, fetcher).await;
    map
}
