//! Capability surface of the GL map engine.
//!
//! Mapwire never renders anything itself. Everything it does is expressed as calls on a
//! [`MapEngine`], which is implemented over a concrete engine (MapLibre GL, Mapbox GL) by the
//! host application, and as subscriptions to the engine [events](MapEvent).
//!
//! Engine handles behave like JavaScript objects: all methods take `&self` and the
//! implementation is expected to be internally synchronized.

use std::sync::Arc;

use mapwire_types::{LngLat, LngLatBounds, ScreenPoint};
use maybe_sync::{MaybeSend, MaybeSync};
use serde_json::Value;

use crate::error::EngineError;
use crate::options::{
    Control, ControlPosition, FitBoundsOptions, FlyToOptions, GeoJsonData, ImageOptions,
    LayerSpecification, MapOptions, MapStyle, PopupOptions, PropertyMap, SourceOptions,
};

mod event;
mod feature;

pub use event::{DefaultBehavior, DrawEvent, DrawMode, MapEvent, MapEventKind, PointerEvent};
pub use feature::{FeatureTarget, RenderedFeature};

/// Callback subscribed to engine events.
pub type EventListener = Arc<dyn Fn(&MapEvent) -> DefaultBehavior + MaybeSend + MaybeSync>;

/// Single-shot completion of [`MapEngine::load_image`].
pub type ImageLoadCallback = Box<dyn FnOnce(Result<ImageData, EngineError>) + MaybeSend>;

/// Called by the engine when a popup is closed by the user or by the engine itself.
pub type PopupCloseCallback = Arc<dyn Fn() + MaybeSend + MaybeSync>;

/// Identifier of an event subscription.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Identifier of a control added to the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ControlId(pub u64);

/// Identifier of a popup added to the map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PopupId(pub u64);

/// Cursor style of the map canvas.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Engine default cursor.
    #[default]
    Default,
    /// Pointer is over an interactive feature.
    Pointer,
    /// A feature is being dragged.
    Grabbing,
}

impl Cursor {
    /// CSS value of the cursor.
    pub fn as_css(&self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Pointer => "pointer",
            Cursor::Grabbing => "grabbing",
        }
    }
}

/// Decoded RGBA image that can be added to the map style.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    /// Raw bytes of the image, in RGBA order.
    pub bytes: Vec<u8>,
    /// Width and height of the image.
    pub dimensions: (u32, u32),
}

/// Everything the engine needs to show a popup.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupSpec {
    /// Popup options.
    pub options: PopupOptions,
    /// Initial position of the popup.
    pub position: Option<LngLat>,
    /// If true, the popup follows the pointer instead of staying at `position`.
    pub track_pointer: bool,
    /// Host handle of the content rendered inside the popup (e.g. a DOM element id).
    pub content: String,
}

/// Host element the map is rendered into.
pub trait MapContainer: MaybeSend + MaybeSync {
    /// Adds (`enabled == true`) or removes a CSS class on the container element.
    fn toggle_class(&self, class: &str, enabled: bool);
}

/// Creates engine instances.
pub trait EngineProvider {
    /// Engine type created by the provider.
    type Engine: MapEngine + 'static;

    /// Returns false if the environment cannot host the engine (e.g. no GPU context).
    fn is_supported(&self) -> bool;

    /// Constructs a new engine inside the `container` using the initial map options.
    fn create(
        &self,
        container: &Arc<dyn MapContainer>,
        options: &MapOptions,
    ) -> Result<Self::Engine, EngineError>;
}

/// A live instance of a GL map engine.
pub trait MapEngine: MaybeSend + MaybeSync + 'static {
    /// Adds a source to the current style.
    fn add_source(&self, id: &str, options: &SourceOptions) -> Result<(), EngineError>;
    /// Removes a source from the current style.
    fn remove_source(&self, id: &str) -> Result<(), EngineError>;
    /// Replaces the data of a GeoJSON source.
    fn set_source_data(&self, id: &str, data: &GeoJsonData) -> Result<(), EngineError>;

    /// Adds a layer. If `before` is given, the layer is inserted before that layer.
    fn add_layer(&self, layer: &LayerSpecification, before: Option<&str>)
        -> Result<(), EngineError>;
    /// Removes a layer.
    fn remove_layer(&self, id: &str) -> Result<(), EngineError>;
    /// Returns true if the layer exists in the current style.
    fn has_layer(&self, id: &str) -> bool;
    /// Moves a layer before another one, or to the top if `before` is `None`.
    fn move_layer(&self, id: &str, before: Option<&str>) -> Result<(), EngineError>;
    /// Sets a paint property of a layer. `Value::Null` resets the property to its default.
    fn set_paint_property(&self, layer: &str, name: &str, value: &Value)
        -> Result<(), EngineError>;
    /// Sets a layout property of a layer. `Value::Null` resets the property to its default.
    fn set_layout_property(
        &self,
        layer: &str,
        name: &str,
        value: &Value,
    ) -> Result<(), EngineError>;
    /// Sets or clears the filter of a layer.
    fn set_filter(&self, layer: &str, filter: Option<&Value>) -> Result<(), EngineError>;

    /// Merges `state` into the feature state of the target feature.
    fn set_feature_state(&self, target: &FeatureTarget, state: &PropertyMap);
    /// Removes one key (or the whole state if `key` is `None`) of the target feature.
    fn remove_feature_state(&self, target: &FeatureTarget, key: Option<&str>);
    /// Returns features rendered at the point in the given layers, topmost first.
    fn query_rendered_features(&self, point: ScreenPoint, layers: &[String])
        -> Vec<RenderedFeature>;
    /// Returns features of a source (optionally one of its source layers) matching the filter,
    /// whether or not they are currently rendered.
    fn query_source_features(
        &self,
        source: &str,
        source_layer: Option<&str>,
        filter: Option<&Value>,
    ) -> Vec<RenderedFeature>;

    /// Fits the viewport to the bounds.
    fn fit_bounds(&self, bounds: &LngLatBounds, options: &FitBoundsOptions);
    /// Animates the viewport to the given center.
    fn fly_to(&self, center: LngLat, options: &FlyToOptions);
    /// Resizes the canvas to the current container size.
    fn resize(&self);
    /// Replaces the map style. Sources and layers of the old style are discarded.
    fn set_style(&self, style: &MapStyle);

    /// Subscribes to an event.
    fn on(&self, kind: MapEventKind, listener: EventListener) -> ListenerId;
    /// Subscribes to the next occurrence of an event only.
    fn once(&self, kind: MapEventKind, listener: EventListener) -> ListenerId;
    /// Removes a subscription. Unknown ids are ignored.
    fn off(&self, listener: ListenerId);

    /// Adds a control to the map.
    fn add_control(&self, control: &Control, position: ControlPosition) -> ControlId;
    /// Removes a control from the map.
    fn remove_control(&self, control: ControlId);
    /// Replaces the features edited by a draw control.
    fn set_draw_features(
        &self,
        control: ControlId,
        features: &geojson::FeatureCollection,
    ) -> Result<(), EngineError>;

    /// Starts loading an image. `on_complete` is called exactly once.
    fn load_image(&self, url: &str, on_complete: ImageLoadCallback);
    /// Adds an image to the style.
    fn add_image(
        &self,
        name: &str,
        image: &ImageData,
        options: &ImageOptions,
    ) -> Result<(), EngineError>;
    /// Removes an image from the style.
    fn remove_image(&self, name: &str);
    /// Returns true if the style has an image with the given name.
    fn has_image(&self, name: &str) -> bool;

    /// Shows a popup.
    fn add_popup(&self, popup: &PopupSpec, on_close: PopupCloseCallback) -> PopupId;
    /// Moves a popup.
    fn set_popup_position(&self, popup: PopupId, position: LngLat);
    /// Removes a popup.
    fn remove_popup(&self, popup: PopupId);
    /// Returns true if the popup is still shown.
    fn is_popup_open(&self, popup: PopupId) -> bool;

    /// Sets the cursor of the map canvas.
    fn set_cursor(&self, cursor: Cursor);

    /// Destroys the engine instance and releases all its resources.
    fn remove(&self);
}
