use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::TypesError;

/// Geographic coordinate in degrees, longitude first.
///
/// Serializes as a `[lng, lat]` array, which is what GL map engines accept as `LngLatLike`.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct LngLat {
    lng: f64,
    lat: f64,
}

/// Creates a [`LngLat`] from longitude and latitude values without validation.
///
/// ```
/// use mapwire_types::{lnglat, LngLat};
///
/// assert_eq!(lnglat!(85.3, 27.7), LngLat::new(85.3, 27.7));
/// ```
#[macro_export]
macro_rules! lnglat {
    ($lng:expr, $lat:expr) => {
        $crate::LngLat::new($lng, $lat)
    };
}

impl LngLat {
    /// Creates a new coordinate. Values are not checked, use [`LngLat::try_new`] for input that
    /// comes from outside of the program.
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Creates a new coordinate, checking that latitude is in `[-90, 90]` and both values are
    /// finite.
    pub fn try_new(lng: f64, lat: f64) -> Result<Self, TypesError> {
        if !lng.is_finite() || !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(TypesError::InvalidCoordinate { lng, lat });
        }

        Ok(Self { lng, lat })
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude wrapped into `[-180, 180)`.
    pub fn wrap(&self) -> Self {
        let lng = (self.lng + 180.0).rem_euclid(360.0) - 180.0;
        Self { lng, lat: self.lat }
    }
}

impl TryFrom<[f64; 2]> for LngLat {
    type Error = TypesError;

    fn try_from([lng, lat]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::try_new(lng, lat)
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        [value.lng, value.lat]
    }
}

impl Display for LngLat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "LngLat({}, {})", self.lng, self.lat)
    }
}
