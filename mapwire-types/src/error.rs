//! Error type of the crate.

use thiserror::Error;

/// Error returned when a value cannot be interpreted as one of the crate types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    /// Latitude is outside of `[-90, 90]` or longitude is not finite.
    #[error("invalid coordinate: lng {lng}, lat {lat}")]
    InvalidCoordinate {
        /// Longitude that was given.
        lng: f64,
        /// Latitude that was given.
        lat: f64,
    },
    /// South-west corner of the bounds is north of the north-east one.
    #[error("invalid bounds: south {south} is greater than north {north}")]
    InvertedBounds {
        /// Southern latitude.
        south: f64,
        /// Northern latitude.
        north: f64,
    },
    /// Padding value is negative or not finite.
    #[error("invalid padding value: {0}")]
    InvalidPadding(f64),
}
