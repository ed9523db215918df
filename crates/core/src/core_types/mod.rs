//! Core value types

pub mod entity;
pub mod geo;

pub use entity::{Entity, EntityKind, Metrics, Selection};
pub use geo::{directions_url, haversine_km, midpoint, LatLng, EARTH_RADIUS_KM};
