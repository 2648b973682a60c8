//! Registry of sources and layers registered by binders in the current map style.
//!
//! The registry is the only place the event dispatcher learns about interactive layers from.
//! Every entry carries a teardown closure that removes the corresponding native objects, so
//! that removing a source can cascade into its layers without the source knowing how the
//! layers were created.

use std::sync::Arc;

use ahash::AHashMap;
use maybe_sync::{MaybeSend, MaybeSync};

mod handlers;
mod store;

pub use handlers::{
    ClickHandler, DragHandler, DraggedFeature, EventPropagation, HoverHandler, LayerHandlers,
    LeaveHandler,
};
pub use store::{RegisteredLayer, RegistryStore, SourceMap};

/// Separator between the source key and the layer key in native ids of managed layers.
pub const LAYER_ID_SEPARATOR: char = '›';

/// Closure that removes the native objects of a registry entry.
pub type Teardown = Arc<dyn Fn() + MaybeSend + MaybeSync>;

/// Native id of a layer.
///
/// Layers of unmanaged sources keep their own key, since they are defined by the style
/// document. Layers of managed sources are namespaced by the source key.
///
/// ```ignore
/// assert_eq!(qualified_layer_id("regions", "fill", true), "regions›fill");
/// assert_eq!(qualified_layer_id("streets", "road", false), "road");
/// ```
pub fn qualified_layer_id(source: &str, layer: &str, managed: bool) -> String {
    if managed {
        format!("{source}{LAYER_ID_SEPARATOR}{layer}")
    } else {
        layer.to_string()
    }
}

/// Registry entry of a layer.
pub struct LayerEntry<E> {
    id: String,
    hoverable: bool,
    handlers: LayerHandlers<E>,
    destroy: Teardown,
}

impl<E> Clone for LayerEntry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            hoverable: self.hoverable,
            handlers: self.handlers.clone(),
            destroy: self.destroy.clone(),
        }
    }
}

impl<E> std::fmt::Debug for LayerEntry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerEntry")
            .field("id", &self.id)
            .field("hoverable", &self.hoverable)
            .field("handlers", &self.handlers)
            .finish()
    }
}

impl<E> LayerEntry<E> {
    /// Creates an entry without handlers.
    pub fn new(id: impl Into<String>, destroy: Teardown) -> Self {
        Self {
            id: id.into(),
            hoverable: false,
            handlers: LayerHandlers::default(),
            destroy,
        }
    }

    /// Layer key (not qualified by the source).
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True if the hovered feature of the layer gets the `hovered` feature-state flag.
    pub fn hoverable(&self) -> bool {
        self.hoverable
    }

    /// Sets the hoverable flag.
    pub fn with_hoverable(mut self, hoverable: bool) -> Self {
        self.hoverable = hoverable;
        self
    }

    /// Event handlers of the layer.
    pub fn handlers(&self) -> &LayerHandlers<E> {
        &self.handlers
    }

    /// Replaces event handlers of the layer.
    pub fn with_handlers(mut self, handlers: LayerHandlers<E>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Removes the native layer and the registry entry.
    pub fn destroy(&self) {
        (self.destroy)()
    }

    /// True if the layer has a click handler.
    pub fn is_clickable(&self) -> bool {
        self.handlers.on_click.is_some()
    }

    /// True if the layer has a double click handler.
    pub fn is_double_clickable(&self) -> bool {
        self.handlers.on_double_click.is_some()
    }

    /// True if features of the layer can be dragged.
    pub fn is_draggable(&self) -> bool {
        self.handlers.on_drag.is_some()
    }

    /// True if hovering the layer shows the pointer cursor.
    pub fn is_pointer_target(&self) -> bool {
        self.is_clickable() || self.is_double_clickable() || self.is_draggable()
    }

    /// True if the layer takes part in hover tracking.
    pub fn is_hover_tracked(&self) -> bool {
        self.hoverable
            || self.handlers.on_mouse_enter.is_some()
            || self.handlers.on_mouse_leave.is_some()
    }
}

/// Registry entry of a source.
pub struct SourceEntry<E> {
    id: String,
    managed: bool,
    destroy: Teardown,
    layers: AHashMap<String, LayerEntry<E>>,
}

impl<E> Clone for SourceEntry<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            managed: self.managed,
            destroy: self.destroy.clone(),
            layers: self.layers.clone(),
        }
    }
}

impl<E> std::fmt::Debug for SourceEntry<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceEntry")
            .field("id", &self.id)
            .field("managed", &self.managed)
            .field("layers", &self.layers)
            .finish()
    }
}

impl<E> SourceEntry<E> {
    /// Creates an entry without layers.
    pub fn new(id: impl Into<String>, managed: bool, destroy: Teardown) -> Self {
        Self {
            id: id.into(),
            managed,
            destroy,
            layers: AHashMap::new(),
        }
    }

    /// Source key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True if the source was added by mapwire (as opposed to defined by the style).
    pub fn managed(&self) -> bool {
        self.managed
    }

    /// Removes the source with all its layers.
    pub fn destroy(&self) {
        (self.destroy)()
    }

    /// Registered layers of the source.
    pub fn layers(&self) -> impl Iterator<Item = &LayerEntry<E>> {
        self.layers.values()
    }

    /// Registered layer with the given key.
    pub fn layer(&self, id: &str) -> Option<&LayerEntry<E>> {
        self.layers.get(id)
    }

    /// Number of registered layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Native id of the layer with the given key.
    pub fn qualified_layer_id(&self, layer: &str) -> String {
        qualified_layer_id(&self.id, layer, self.managed)
    }

    pub(crate) fn layers_mut(&mut self) -> &mut AHashMap<String, LayerEntry<E>> {
        &mut self.layers
    }
}
