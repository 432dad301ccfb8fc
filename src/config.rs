use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::canvas::{PathStyle, TileLayer};
use crate::error::Error;
use crate::photo::PhotoManifest;
use crate::LatLng;

pub const CONFIG_FILE: &str = "trailmap.toml";
pub const CONFIG_ENV: &str = "TRAILMAP_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    /// Initial `[latitude, longitude]` of the view.
    pub center: [f64; 2],
    pub zoom: f64,
    /// Viewport size in pixels used for fitting bounds.
    pub size: (u32, u32),
    pub tiles: TileLayer,
    pub track: String,
    pub photos: PhotoManifest,
    pub route_style: PathStyle,
    pub padding: f64,
    pub popup_width: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            title: "Ruta".to_owned(),
            center: [4.598056, -74.076667],
            zoom: 13.,
            size: (1024, 768),
            tiles: TileLayer {
                url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_owned(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors".to_owned(),
                max_zoom: 18.,
            },
            track: "ruta.gpx".to_owned(),
            photos: PhotoManifest::default(),
            route_style: PathStyle::default(),
            padding: 50.,
            popup_width: 300,
        }
    }
}

impl Config {
    pub fn center(&self) -> LatLng {
        LatLng::new(self.center[0], self.center[1])
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Reads the file named by `TRAILMAP_CONFIG`, else `trailmap.toml` when
    /// present, else the built-in defaults.
    pub fn load() -> Result<Self, Error> {
        Self::load_from(env::var_os(CONFIG_ENV).map(PathBuf::from), Path::new("."))
    }

    /// Reads `explicit` when given, else `dir/trailmap.toml` when present.
    ///
    /// A missing `explicit` file is an error; a missing default file is not.
    pub fn load_from(explicit: Option<PathBuf>, dir: &Path) -> Result<Self, Error> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let path = dir.join(CONFIG_FILE);
                if !path.exists() {
                    return Ok(Config::default());
                }
                path
            }
        };

        info!("loading configuration from {}", path.display());
        Self::from_file(path)
    }
}
