//! Option types passed to the map engine.
//!
//! All option types mirror the JSON objects accepted by GL engines and serialize into them with
//! `serde`, so engine implementations can pass them through without conversion.

use std::time::Duration;

use mapwire_types::{LngLat, LngLatBounds, Padding};
use serde::{Deserialize, Serialize};
use serde_json::Value;

mod control;
mod layer;
mod source;

pub use control::{
    Control, ControlPosition, ControlToggle, DrawControls, DrawOptions, NavigationControlOptions,
    ScaleControlOptions, ScaleUnit,
};
pub use layer::{LayerKind, LayerOptions, LayerSpecification};
pub use source::{
    GeoJsonData, GeoJsonSourceOptions, ImageSourceOptions, RasterSourceOptions, SourceOptions,
    TileSourceOptions,
};

/// JSON object with style properties (paint, layout, feature state, etc.).
pub type PropertyMap = serde_json::Map<String, Value>;

/// Style of the map: either a URL of a style document or an inline style object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MapStyle {
    /// URL of the style document.
    Url(String),
    /// Inline style document.
    Json(Value),
}

impl From<&str> for MapStyle {
    fn from(value: &str) -> Self {
        Self::Url(value.to_string())
    }
}

impl From<String> for MapStyle {
    fn from(value: String) -> Self {
        Self::Url(value)
    }
}

/// Construction options passed to the engine as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineOptions {
    /// Initial center of the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<LngLat>,
    /// Initial zoom level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    /// Initial bounds. Takes precedence over `center` and `zoom` in GL engines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<LngLatBounds>,
    /// Minimum zoom level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    /// Maximum zoom level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    /// If false, no user interaction handlers are attached to the map.
    pub interactive: bool,
    /// Keeps the drawing buffer so that the canvas can be exported.
    pub preserve_drawing_buffer: bool,
    /// Any other engine options.
    #[serde(flatten)]
    pub extra: PropertyMap,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            center: None,
            zoom: None,
            bounds: None,
            min_zoom: None,
            max_zoom: None,
            interactive: true,
            preserve_drawing_buffer: true,
            extra: PropertyMap::new(),
        }
    }
}

/// Configuration of a [`MapCoordinator`](crate::MapCoordinator).
///
/// Everything except the style is read only once, when the engine is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    style: MapStyle,
    #[serde(default)]
    engine: EngineOptions,
    #[serde(default = "control::default_scale_control")]
    scale_control: ControlToggle<ScaleControlOptions>,
    #[serde(default = "control::default_navigation_control")]
    navigation_control: ControlToggle<NavigationControlOptions>,
    #[serde(default)]
    debug: bool,
}

impl MapOptions {
    /// Creates options with the given style and default values for everything else.
    pub fn new(style: impl Into<MapStyle>) -> Self {
        Self {
            style: style.into(),
            engine: EngineOptions::default(),
            scale_control: control::default_scale_control(),
            navigation_control: control::default_navigation_control(),
            debug: false,
        }
    }

    /// Initial style of the map.
    pub fn style(&self) -> &MapStyle {
        &self.style
    }

    /// Sets initial style of the map.
    pub fn with_style(mut self, style: impl Into<MapStyle>) -> Self {
        self.style = style.into();
        self
    }

    /// Engine construction options.
    pub fn engine(&self) -> &EngineOptions {
        &self.engine
    }

    /// Sets engine construction options.
    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    /// Scale control configuration.
    pub fn scale_control(&self) -> &ControlToggle<ScaleControlOptions> {
        &self.scale_control
    }

    /// Shows the scale control at the given position.
    pub fn with_scale_control(
        mut self,
        position: ControlPosition,
        options: ScaleControlOptions,
    ) -> Self {
        self.scale_control = ControlToggle::shown(position, options);
        self
    }

    /// Navigation control configuration.
    pub fn navigation_control(&self) -> &ControlToggle<NavigationControlOptions> {
        &self.navigation_control
    }

    /// Shows the navigation control at the given position.
    pub fn with_navigation_control(
        mut self,
        position: ControlPosition,
        options: NavigationControlOptions,
    ) -> Self {
        self.navigation_control = ControlToggle::shown(position, options);
        self
    }

    /// If true, the coordinator and binders log their diagnostics.
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Enables or disables diagnostics logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enables or disables diagnostics logging.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }
}

/// Options of [`MapEngine::fit_bounds`](crate::engine::MapEngine::fit_bounds).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitBoundsOptions {
    /// Padding around the bounds.
    pub padding: Padding,
    /// Animation duration.
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl Default for FitBoundsOptions {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            duration: DEFAULT_FIT_DURATION,
        }
    }
}

/// Default duration of the bounds fitting animation.
pub const DEFAULT_FIT_DURATION: Duration = Duration::from_millis(200);

/// Options of [`MapEngine::fly_to`](crate::engine::MapEngine::fly_to).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlyToOptions {
    /// Target zoom level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
    /// Target bearing in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearing: Option<f64>,
    /// Target pitch in degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f64>,
    /// Average speed of the animation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Zooming "curve" of the flight path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve: Option<f64>,
    /// Fixed duration of the animation. Overrides `speed` and `curve`.
    #[serde(
        default,
        with = "duration_ms::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub duration: Option<Duration>,
    /// If true, the animation runs even if the user prefers reduced motion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub essential: Option<bool>,
}

/// Popup options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupOptions {
    /// Shows a close button.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_button: Option<bool>,
    /// Closes the popup when the map is clicked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_on_click: Option<bool>,
    /// Closes the popup when the map is moved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_on_move: Option<bool>,
    /// Anchor of the popup relative to its position (e.g. `bottom`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    /// Offset in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
    /// CSS class of the popup container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// CSS max-width of the popup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
}

/// Options of [`MapEngine::add_image`](crate::engine::MapEngine::add_image).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageOptions {
    /// Ratio of image pixels to screen pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_ratio: Option<f64>,
    /// Adds the image as a signed distance field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdf: Option<bool>,
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            duration: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match duration {
                Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
        }
    }
}
