#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use trailmap::fetch::Fetch;
use trailmap::Error;

pub const TRACK: &str = include_str!("../fixtures/ruta.gpx");
pub const WAYPOINTS: &str = include_str!("../fixtures/waypoints.gpx");
pub const ROUTE: &str = include_str!("../fixtures/rte.gpx");

/// Serves resources from memory and remembers the order they were requested
/// and answered in.
///
/// A path given a latency yields to the scheduler that many times before it
/// answers, so concurrent loaders get to run in between.
#[derive(Default)]
pub struct MemoryFetcher {
    files: HashMap<String, Vec<u8>>,
    latency: HashMap<String, usize>,
    requests: RefCell<Vec<String>>,
    completed: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn with<B: Into<Vec<u8>>>(mut self, path: &str, bytes: B) -> Self {
        self.files.insert(path.to_owned(), bytes.into());
        self
    }

    pub fn delay(mut self, path: &str, yields: usize) -> Self {
        self.latency.insert(path.to_owned(), yields);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Paths in the order their responses, found or not, were delivered.
    pub fn completed(&self) -> Vec<String> {
        self.completed.borrow().clone()
    }
}

impl Fetch for MemoryFetcher {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, Error> {
        self.requests.borrow_mut().push(path.to_owned());
        for _ in 0..self.latency.get(path).copied().unwrap_or(0) {
            tokio::task::yield_now().await;
        }
        self.completed.borrow_mut().push(path.to_owned());

        self.files.get(path).cloned().ok_or_else(|| Error::Load {
            path: path.to_owned(),
            reason: "HTTP 404 Not Found".to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        path.to_owned()
    }
}

/// Gives each of the nine default photos one yield of latency.
pub fn slow_photos(mut fetcher: MemoryFetcher) -> MemoryFetcher {
    for i in 1..=9 {
        fetcher = fetcher.delay(&format!("Fotos/imagen{}.jpg", i), 1);
    }
    fetcher
}

pub enum Gps {
    Ref(u16, char),
    Dms(u16, [u32; 3]),
}

pub const LATITUDE_REF: u16 = 0x0001;
pub const LATITUDE: u16 = 0x0002;
pub const LONGITUDE_REF: u16 = 0x0003;
pub const LONGITUDE: u16 = 0x0004;

const ASCII: u16 = 2;
const SHORT: u16 = 3;
const LONG: u16 = 4;
const RATIONAL: u16 = 5;

fn entry(out: &mut Vec<u8>, tag: u16, typ: u16, count: u32, value: [u8; 4]) {
    out.extend_from_slice(&tag.to_le_bytes());
    out.extend_from_slice(&typ.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    out.extend_from_slice(&value);
}

/// Little-endian TIFF holding the given GPS fields, or only an image width
/// when `fields` is empty.
pub fn tiff(fields: &[Gps]) -> Vec<u8> {
    let mut out = b"II".to_vec();
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());

    out.extend_from_slice(&1u16.to_le_bytes());
    if fields.is_empty() {
        entry(&mut out, 0x0100, SHORT, 1, [64, 0, 0, 0]);
        out.extend_from_slice(&0u32.to_le_bytes());
        return out;
    }

    let gps_offset = 8 + 2 + 12 + 4;
    entry(&mut out, 0x8825, LONG, 1, (gps_offset as u32).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    let mut data_offset = gps_offset + 2 + 12 * fields.len() + 4;
    let mut data = Vec::new();
    out.extend_from_slice(&(fields.len() as u16).to_le_bytes());
    for field in fields {
        match *field {
            Gps::Ref(tag, c) => entry(&mut out, tag, ASCII, 2, [c as u8, 0, 0, 0]),
            Gps::Dms(tag, values) => {
                entry(&mut out, tag, RATIONAL, 3, (data_offset as u32).to_le_bytes());
                for v in &values {
                    data.extend_from_slice(&v.to_le_bytes());
                    data.extend_from_slice(&1u32.to_le_bytes());
                }
                data_offset += 24;
            }
        }
    }
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data);
    out
}

/// Wraps `tiff` in the APP1 segment of a minimal JPEG stream.
pub fn jpeg(tiff: &[u8]) -> Vec<u8> {
    let mut out = vec![0xff, 0xd8, 0xff, 0xe1];
    out.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(tiff);
    out.extend_from_slice(&[0xff, 0xd9]);
    out
}

pub fn geotagged(lat: [u32; 3], lat_ref: char, lon: [u32; 3], lon_ref: char) -> Vec<u8> {
    jpeg(&tiff(&[
        Gps::Ref(LATITUDE_REF, lat_ref),
        Gps::Dms(LATITUDE, lat),
        Gps::Ref(LONGITUDE_REF, lon_ref),
        Gps::Dms(LONGITUDE, lon),
    ]))
}

pub fn untagged() -> Vec<u8> {
    jpeg(&tiff(&[]))
}
