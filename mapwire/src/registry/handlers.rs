use std::sync::Arc;

use mapwire_types::FeatureId;
use maybe_sync::{MaybeSend, MaybeSync};

use crate::engine::{FeatureTarget, PointerEvent, RenderedFeature};

/// Whether a click should be delivered to the layers below the current one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum EventPropagation {
    /// Continue with the next layer under the pointer.
    #[default]
    Propagate,
    /// Do not deliver the event to any other layer.
    Stop,
}

/// Feature that is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct DraggedFeature {
    /// Feature id.
    pub id: Option<FeatureId>,
    /// Native id of the layer the feature was picked in.
    pub layer: String,
    /// Source of the feature.
    pub source: String,
    /// Layer inside a vector tile source.
    pub source_layer: Option<String>,
    /// The feature as it was picked when the drag started.
    pub feature: RenderedFeature,
}

impl From<&RenderedFeature> for DraggedFeature {
    fn from(feature: &RenderedFeature) -> Self {
        Self {
            id: feature.id.clone(),
            layer: feature.layer.clone(),
            source: feature.source.clone(),
            source_layer: feature.source_layer.clone(),
            feature: feature.clone(),
        }
    }
}

impl DraggedFeature {
    /// Address of the feature for feature-state operations.
    pub fn target(&self) -> Option<FeatureTarget> {
        self.feature.target()
    }
}

/// Click and double click handler.
pub type ClickHandler<E> =
    Arc<dyn Fn(&RenderedFeature, &PointerEvent, &E) -> EventPropagation + MaybeSend + MaybeSync>;
/// Mouse enter handler.
pub type HoverHandler<E> = Arc<dyn Fn(&RenderedFeature, &PointerEvent, &E) + MaybeSend + MaybeSync>;
/// Mouse leave handler.
pub type LeaveHandler<E> = Arc<dyn Fn(&E) + MaybeSend + MaybeSync>;
/// Drag and drag end handler.
pub type DragHandler<E> = Arc<dyn Fn(&DraggedFeature, &PointerEvent, &E) + MaybeSend + MaybeSync>;

/// Event handlers of a layer.
pub struct LayerHandlers<E> {
    /// Called for every clicked feature of the layer.
    pub on_click: Option<ClickHandler<E>>,
    /// Called for every double clicked feature of the layer.
    pub on_double_click: Option<ClickHandler<E>>,
    /// Called when the pointer enters a feature of the layer.
    pub on_mouse_enter: Option<HoverHandler<E>>,
    /// Called when the pointer leaves the layer.
    pub on_mouse_leave: Option<LeaveHandler<E>>,
    /// Called on every pointer move while a feature of the layer is dragged.
    pub on_drag: Option<DragHandler<E>>,
    /// Called when a drag of a feature of the layer ends or is cancelled.
    pub on_drag_end: Option<DragHandler<E>>,
}

impl<E> Default for LayerHandlers<E> {
    fn default() -> Self {
        Self {
            on_click: None,
            on_double_click: None,
            on_mouse_enter: None,
            on_mouse_leave: None,
            on_drag: None,
            on_drag_end: None,
        }
    }
}

impl<E> Clone for LayerHandlers<E> {
    fn clone(&self) -> Self {
        Self {
            on_click: self.on_click.clone(),
            on_double_click: self.on_double_click.clone(),
            on_mouse_enter: self.on_mouse_enter.clone(),
            on_mouse_leave: self.on_mouse_leave.clone(),
            on_drag: self.on_drag.clone(),
            on_drag_end: self.on_drag_end.clone(),
        }
    }
}

impl<E> std::fmt::Debug for LayerHandlers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerHandlers")
            .field("on_click", &self.on_click.is_some())
            .field("on_double_click", &self.on_double_click.is_some())
            .field("on_mouse_enter", &self.on_mouse_enter.is_some())
            .field("on_mouse_leave", &self.on_mouse_leave.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_drag_end", &self.on_drag_end.is_some())
            .finish()
    }
}

impl<E> LayerHandlers<E> {
    /// No handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the click handler.
    pub fn on_click(
        mut self,
        handler: impl Fn(&RenderedFeature, &PointerEvent, &E) -> EventPropagation
            + MaybeSend
            + MaybeSync
            + 'static,
    ) -> Self {
        self.on_click = Some(Arc::new(handler));
        self
    }

    /// Sets the double click handler.
    pub fn on_double_click(
        mut self,
        handler: impl Fn(&RenderedFeature, &PointerEvent, &E) -> EventPropagation
            + MaybeSend
            + MaybeSync
            + 'static,
    ) -> Self {
        self.on_double_click = Some(Arc::new(handler));
        self
    }

    /// Sets the mouse enter handler.
    pub fn on_mouse_enter(
        mut self,
        handler: impl Fn(&RenderedFeature, &PointerEvent, &E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.on_mouse_enter = Some(Arc::new(handler));
        self
    }

    /// Sets the mouse leave handler.
    pub fn on_mouse_leave(
        mut self,
        handler: impl Fn(&E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.on_mouse_leave = Some(Arc::new(handler));
        self
    }

    /// Sets the drag handler.
    pub fn on_drag(
        mut self,
        handler: impl Fn(&DraggedFeature, &PointerEvent, &E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.on_drag = Some(Arc::new(handler));
        self
    }

    /// Sets the drag end handler.
    pub fn on_drag_end(
        mut self,
        handler: impl Fn(&DraggedFeature, &PointerEvent, &E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.on_drag_end = Some(Arc::new(handler));
        self
    }
}
