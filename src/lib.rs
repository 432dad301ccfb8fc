extern crate failure;
extern crate ord_subset;

pub mod bootstrap;
pub mod bounds;
pub mod canvas;
pub mod config;
pub mod dms;
pub mod error;
pub mod fetch;
pub mod haversine;
pub mod photo;
pub mod render;
pub mod route;

mod point;

pub use crate::error::Error;
pub use crate::point::{LatLng, Point};
