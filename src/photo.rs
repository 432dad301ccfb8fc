use std::io::Cursor;

use exif::{Exif, In, Reader, Tag, Value};
use log::{error, info, warn};
use serde::Deserialize;

use crate::bounds::Bounds;
use crate::canvas::{Layer, Map};
use crate::dms::{Axis, Dms, Hemisphere};
use crate::error::Error;
use crate::fetch::Fetch;
use crate::render::popup_html;
use crate::{LatLng, Point};

/// A geotagged photo placed on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: LatLng,
    pub name: String,
    pub image_url: String,
    pub popup: String,
}

impl Point for Marker {
    fn latitude(&self) -> f64 {
        self.position.latitude
    }
    fn longitude(&self) -> f64 {
        self.position.longitude
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PhotoEntry {
    pub path: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl PhotoEntry {
    pub fn new<S: Into<String>>(path: S) -> Self {
        PhotoEntry { path: path.into(), name: None }
    }

    /// Display label, the file name unless one was given.
    pub fn name(&self) -> &str {
        match self.name {
            Some(ref name) => name.as_str(),
            None => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

/// Ordered list of the photos to place on the map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PhotoManifest {
    /// `count` files named by substituting `1..=count` for `{}` in `pattern`.
    Numbered { dir: String, pattern: String, count: u32 },
    List(Vec<PhotoEntry>),
}

impl Default for PhotoManifest {
    fn default() -> Self {
        PhotoManifest::Numbered {
            dir: "Fotos".to_owned(),
            pattern: "imagen{}.jpg".to_owned(),
            count: 9,
        }
    }
}

impl PhotoManifest {
    pub fn entries(&self) -> Vec<PhotoEntry> {
        match self {
            PhotoManifest::Numbered { dir, pattern, count } => (1..=*count)
                .map(|i| {
                    let file = pattern.replace("{}", &i.to_string());
                    if dir.is_empty() {
                        PhotoEntry::new(file)
                    } else {
                        PhotoEntry::new(format!("{}/{}", dir.trim_end_matches('/'), file))
                    }
                })
                .collect(),
            PhotoManifest::List(entries) => entries.clone(),
        }
    }
}

/// Markers collected by one batch, used to fit the view.
#[derive(Debug, Clone, Default)]
pub struct MarkerGroup {
    markers: Vec<Marker>,
}

impl MarkerGroup {
    pub fn push(&mut self, marker: Marker) {
        self.markers.push(marker);
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::of(&self.markers)
    }
}

fn rationals(exif: &Exif, tag: Tag) -> Option<Result<Vec<f64>, Error>> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    Some(match field.value {
        Value::Rational(ref values) => Ok(values.iter().map(|r| r.to_f64()).collect()),
        ref other => Err(Error::InvalidCoordinate(format!("{} is {:?}", tag, other))),
    })
}

fn reference(exif: &Exif, tag: Tag, axis: Axis) -> Option<Result<Hemisphere, Error>> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let c = match field.value {
        Value::Ascii(ref strings) => strings.first().and_then(|s| s.first()).map(|&b| char::from(b))?,
        ref other => return Some(Err(Error::InvalidReference(format!("{} is {:?}", tag, other)))),
    };

    Some(Hemisphere::from_char(c).and_then(|hemisphere| {
        if hemisphere.axis() == axis {
            Ok(hemisphere)
        } else {
            Err(Error::InvalidReference(format!("{} is {}", tag, hemisphere)))
        }
    }))
}

fn coordinate(exif: &Exif, name: &str, axis: Axis) -> Result<f64, Error> {
    let (value, reference_tag, tag_name) = match axis {
        Axis::Latitude => (Tag::GPSLatitude, Tag::GPSLatitudeRef, "GPSLatitudeRef"),
        Axis::Longitude => (Tag::GPSLongitude, Tag::GPSLongitudeRef, "GPSLongitudeRef"),
    };

    let values = rationals(exif, value).ok_or_else(|| Error::MissingGps { name: name.to_owned() })??;
    let hemisphere = reference(exif, reference_tag, axis)
        .ok_or_else(|| Error::MissingReference { name: name.to_owned(), tag: tag_name })??;

    Dms::from_slice(&values)?.to_decimal(hemisphere)
}

/// Reads the GPS position from the EXIF data embedded in `bytes`.
///
/// Both coordinates and both hemisphere references must be present.
pub fn read_position(bytes: &[u8], name: &str) -> Result<LatLng, Error> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Err(Error::MissingGps { name: name.to_owned() }),
        Err(e) => return Err(Error::parse(name, e)),
    };

    if exif.get_field(Tag::GPSLatitude, In::PRIMARY).is_none() ||
        exif.get_field(Tag::GPSLongitude, In::PRIMARY).is_none() {
        return Err(Error::MissingGps { name: name.to_owned() });
    }

    let latitude = coordinate(&exif, name, Axis::Latitude)?;
    let longitude = coordinate(&exif, name, Axis::Longitude)?;

    Ok(LatLng::new(latitude, longitude))
}

/// Fetches one photo and builds its marker from the embedded GPS tags.
pub async fn load_photo<F: Fetch>(fetcher: &F, entry: &PhotoEntry, popup_width: u32) -> Result<Marker, Error> {
    let bytes = fetcher.fetch(&entry.path).await?;
    let position = read_position(&bytes, entry.name())?;
    let image_url = fetcher.url(&entry.path);
    let popup = popup_html(entry.name(), &image_url, popup_width)?;

    Ok(Marker {
        position,
        name: entry.name().to_owned(),
        popup,
        image_url,
    })
}

/// Like [`load_photo`], but a photo that cannot be placed is only logged.
pub async fn try_load_photo<F: Fetch>(fetcher: &F, entry: &PhotoEntry, popup_width: u32) -> Option<Marker> {
    match load_photo(fetcher, entry, popup_width).await {
        Ok(marker) => Some(marker),
        Err(e @ Error::MissingGps { .. }) | Err(e @ Error::MissingReference { .. }) => {
            warn!("{}", e);
            None
        }
        Err(e) => {
            error!("photo {} not placed: {}", entry.path, e);
            None
        }
    }
}

/// Places every photo of `manifest` on the map, one after another, and fits
/// the view to the placed markers.
pub async fn load_photos<F: Fetch>(
    map: &Map,
    fetcher: &F,
    manifest: &PhotoManifest,
    popup_width: u32,
    padding: f64,
) -> MarkerGroup {
    let mut group = MarkerGroup::default();

    for entry in manifest.entries() {
        if let Some(marker) = try_load_photo(fetcher, &entry, popup_width).await {
            map.add_layer(Layer::Marker(marker.clone()));
            group.push(marker);
        }
    }

    match group.bounds() {
        Some(bounds) => {
            info!("placed {} photos", group.len());
            map.fit_bounds(&bounds, padding);
        }
        None => warn!("no photos with GPS data found"),
    }

    group
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn numbered_manifest() {
        let entries = PhotoManifest::default().entries();
        assert_eq!(entries.len(), 9);
        assert_eq!(entries[0].path, "Fotos/imagen1.jpg");
        assert_eq!(entries[0].name(), "imagen1.jpg");
        assert_eq!(entries[8].path, "Fotos/imagen9.jpg");
    }

    #[test]
    fn listed_manifest_keeps_order_and_names() {
        let manifest = PhotoManifest::List(vec![
            PhotoEntry { path: "b.jpg".to_owned(), name: Some("Cumbre".to_owned()) },
            PhotoEntry::new("a.jpg"),
        ]);
        let entries = manifest.entries();
        assert_eq!(entries[0].name(), "Cumbre");
        assert_eq!(entries[1].name(), "a.jpg");
    }

    #[test]
    fn not_an_image() {
        match read_position(b"plain text", "notes.txt") {
            Err(Error::Parse { path, .. }) => assert_eq!(path, "notes.txt"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn group_bounds_cover_markers() {
        let mut group = MarkerGroup::default();
        assert!(group.bounds().is_none());
        for &(lat, lon) in &[(4.70, -74.07), (4.60, -74.10)] {
            group.push(Marker {
                position: LatLng::new(lat, lon),
                name: String::new(),
                image_url: String::new(),
                popup: String::new(),
            });
        }
        let bounds = group.bounds().unwrap();
        assert_eq!(group.len(), 2);
        assert_approx_eq!(bounds.south_west.latitude, 4.60, 1e-12);
        assert_approx_eq!(bounds.north_east.longitude, -74.07, 1e-12);
    }
}
