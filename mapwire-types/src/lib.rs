//! Plain value types shared between `mapwire` binders and map engine implementations.
//!
//! These types mirror the "like" types accepted by GL map engines (`LngLatLike`,
//! `LngLatBoundsLike`, `PaddingOptions`, feature ids) and serialize into the same JSON shapes,
//! so they can be forwarded to a JavaScript engine verbatim.

mod bounds;
mod error;
mod feature_id;
mod lnglat;
mod padding;
mod point;

pub use bounds::LngLatBounds;
pub use error::TypesError;
pub use feature_id::FeatureId;
pub use lnglat::LngLat;
pub use padding::Padding;
pub use point::ScreenPoint;
