//! Place data feeding the panel's markers

pub mod places;

pub use places::{markers_for, Place, PlaceCategory, PlaceFilter, PlaceProvider, StaticPlaces};
