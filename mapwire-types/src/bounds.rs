use serde::{Deserialize, Serialize};

use crate::error::TypesError;
use crate::lnglat::LngLat;

/// Geographic bounding box given by its south-west and north-east corners.
///
/// Serializes as `[west, south, east, north]`. The west edge may be greater than the east one
/// for boxes crossing the antimeridian.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct LngLatBounds {
    south_west: LngLat,
    north_east: LngLat,
}

impl LngLatBounds {
    /// Creates bounds from the two corners.
    pub fn new(south_west: LngLat, north_east: LngLat) -> Result<Self, TypesError> {
        if south_west.lat() > north_east.lat() {
            return Err(TypesError::InvertedBounds {
                south: south_west.lat(),
                north: north_east.lat(),
            });
        }

        Ok(Self {
            south_west,
            north_east,
        })
    }

    /// Creates bounds from `west, south, east, north` edges.
    pub fn from_edges(west: f64, south: f64, east: f64, north: f64) -> Result<Self, TypesError> {
        Self::new(LngLat::try_new(west, south)?, LngLat::try_new(east, north)?)
    }

    /// Smallest bounds containing all the given points. Returns `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = LngLat>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut west, mut south, mut east, mut north) =
            (first.lng(), first.lat(), first.lng(), first.lat());
        for point in iter {
            west = west.min(point.lng());
            east = east.max(point.lng());
            south = south.min(point.lat());
            north = north.max(point.lat());
        }

        Some(Self {
            south_west: LngLat::new(west, south),
            north_east: LngLat::new(east, north),
        })
    }

    /// South-west corner.
    pub fn south_west(&self) -> LngLat {
        self.south_west
    }

    /// North-east corner.
    pub fn north_east(&self) -> LngLat {
        self.north_east
    }

    /// Center of the bounds.
    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.south_west.lng() + self.north_east.lng()) / 2.0,
            (self.south_west.lat() + self.north_east.lat()) / 2.0,
        )
    }

    /// Returns true if the point is inside the bounds (edges included).
    pub fn contains(&self, point: &LngLat) -> bool {
        let lat_inside =
            point.lat() >= self.south_west.lat() && point.lat() <= self.north_east.lat();
        let lng_inside = if self.south_west.lng() <= self.north_east.lng() {
            point.lng() >= self.south_west.lng() && point.lng() <= self.north_east.lng()
        } else {
            point.lng() >= self.south_west.lng() || point.lng() <= self.north_east.lng()
        };

        lat_inside && lng_inside
    }
}

impl TryFrom<[f64; 4]> for LngLatBounds {
    type Error = TypesError;

    fn try_from([west, south, east, north]: [f64; 4]) -> Result<Self, Self::Error> {
        Self::from_edges(west, south, east, north)
    }
}

impl From<LngLatBounds> for [f64; 4] {
    fn from(value: LngLatBounds) -> Self {
        [
            value.south_west.lng(),
            value.south_west.lat(),
            value.north_east.lng(),
            value.north_east.lat(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::lnglat;

    #[test]
    fn rejects_inverted_latitudes() {
        assert_eq!(
            LngLatBounds::from_edges(0.0, 10.0, 5.0, 5.0),
            Err(TypesError::InvertedBounds {
                south: 10.0,
                north: 5.0
            })
        );
    }

    #[test]
    fn builds_from_points() {
        let bounds = LngLatBounds::from_points([
            lnglat!(80.08, 30.42),
            lnglat!(88.17, 26.39),
            lnglat!(84.0, 28.0),
        ])
        .expect("non empty");

        assert_eq!(bounds.south_west(), lnglat!(80.08, 26.39));
        assert_eq!(bounds.north_east(), lnglat!(88.17, 30.42));
        assert_relative_eq!(bounds.center().lng(), 84.125);

        assert!(LngLatBounds::from_points([]).is_none());
    }

    #[test]
    fn contains_across_antimeridian() {
        let bounds = LngLatBounds::from_edges(170.0, -10.0, -170.0, 10.0).expect("valid");
        assert!(bounds.contains(&lnglat!(175.0, 0.0)));
        assert!(bounds.contains(&lnglat!(-175.0, 0.0)));
        assert!(!bounds.contains(&lnglat!(0.0, 0.0)));
    }

    #[test]
    fn serializes_as_edges() {
        let bounds: LngLatBounds =
            serde_json::from_str("[80.0884245137, 26.3978980576, 88.1748043151, 30.4227169866]")
                .expect("deserialize");
        assert_relative_eq!(bounds.north_east().lat(), 30.4227169866);

        let bounds = LngLatBounds::from_edges(1.0, 2.0, 3.0, 4.0).expect("valid");
        let json = serde_json::to_string(&bounds).expect("serialize");
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");
    }
}
