//! Core data models for the facility search pipeline.

pub mod element;
pub mod facility;
pub mod geo;

pub use element::{ElementKind, RawElement};
pub use facility::Facility;
pub use geo::{GeoBbox, GeoPoint};
