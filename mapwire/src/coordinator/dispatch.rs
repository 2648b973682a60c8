//! Routing of engine pointer events to layer handlers.
//!
//! Each event is resolved against a snapshot of the registry taken when the event arrives.
//! Locks are released before any handler is called, so handlers may freely mount and unmount
//! binders.

use mapwire_types::FeatureId;
use serde_json::Value;

use crate::coordinator::context::MapContext;
use crate::engine::{
    Cursor, DefaultBehavior, FeatureTarget, MapEngine, MapEvent, PointerEvent, RenderedFeature,
};
use crate::options::PropertyMap;
use crate::registry::{DraggedFeature, EventPropagation, LayerEntry, RegisteredLayer};

/// Feature-state key set on the hovered feature.
pub const HOVER_STATE: &str = "hovered";

#[derive(Debug, Default)]
pub(crate) struct InteractionState {
    hovered: Option<HoveredFeature>,
    dragged: Option<DraggedFeature>,
}

#[derive(Debug, Clone, PartialEq)]
struct HoveredFeature {
    id: Option<FeatureId>,
    layer: String,
    source: String,
    source_layer: Option<String>,
}

impl HoveredFeature {
    fn new(feature: &RenderedFeature) -> Self {
        Self {
            id: feature.id.clone(),
            layer: feature.layer.clone(),
            source: feature.source.clone(),
            source_layer: feature.source_layer.clone(),
        }
    }

    fn is_same_layer(&self, other: &HoveredFeature) -> bool {
        self.layer == other.layer
            && self.source == other.source
            && self.source_layer == other.source_layer
    }

    fn target(&self) -> Option<FeatureTarget> {
        Some(FeatureTarget {
            source: self.source.clone(),
            source_layer: self.source_layer.clone(),
            id: self.id.clone()?,
        })
    }
}

#[derive(Default)]
struct HoverTransition {
    cleared: Option<HoveredFeature>,
    left: Option<HoveredFeature>,
    entered: Option<HoveredFeature>,
}

pub(crate) fn handle_event<E: MapEngine>(ctx: &MapContext<E>, event: &MapEvent) -> DefaultBehavior {
    let Some(engine) = ctx.engine() else {
        return DefaultBehavior::Allow;
    };

    let dispatcher = Dispatcher {
        ctx,
        engine: &engine,
        layers: ctx.registry().layers(),
    };

    match event {
        MapEvent::Click(pointer) => dispatcher.click(pointer, false),
        MapEvent::DoubleClick(pointer) => dispatcher.click(pointer, true),
        MapEvent::MouseMove(pointer) => dispatcher.mouse_move(pointer),
        MapEvent::MouseDown(pointer) => dispatcher.mouse_down(pointer),
        MapEvent::MouseUp(pointer) => dispatcher.mouse_up(pointer),
        MapEvent::Resize => dispatcher.resize(),
        MapEvent::StyleData | MapEvent::Load | MapEvent::Draw(_) => DefaultBehavior::Allow,
    }
}

/// Forgets hovered and dragged features without calling any handlers. The cursor is reset if a
/// drag was in progress.
pub(crate) fn reset_interaction<E: MapEngine>(ctx: &MapContext<E>, engine: Option<&E>) {
    let previous = std::mem::take(&mut *ctx.shared().interaction.lock());

    if let (Some(_), Some(engine)) = (previous.dragged, engine) {
        engine.set_cursor(Cursor::Default);
    }
}

struct Dispatcher<'a, E> {
    ctx: &'a MapContext<E>,
    engine: &'a E,
    layers: Vec<RegisteredLayer<E>>,
}

impl<E: MapEngine> Dispatcher<'_, E> {
    fn find_layer(&self, native_id: &str) -> Option<&LayerEntry<E>> {
        self.layers
            .iter()
            .find(|layer| layer.qualified_id == native_id)
            .map(|layer| &layer.entry)
    }

    fn hit_test(
        &self,
        pointer: &PointerEvent,
        predicate: impl Fn(&LayerEntry<E>) -> bool,
    ) -> Vec<RenderedFeature> {
        let ids: Vec<String> = self
            .layers
            .iter()
            .filter(|layer| predicate(&layer.entry))
            .map(|layer| layer.qualified_id.clone())
            .collect();

        if ids.is_empty() {
            return vec![];
        }

        self.engine.query_rendered_features(pointer.point, &ids)
    }

    fn take_dragged(&self) -> Option<DraggedFeature> {
        self.ctx.shared().interaction.lock().dragged.take()
    }

    fn end_drag(&self, dragged: &DraggedFeature, pointer: &PointerEvent) {
        let handler = self
            .find_layer(&dragged.layer)
            .and_then(|layer| layer.handlers().on_drag_end.clone());
        if let Some(handler) = handler {
            handler(dragged, pointer, self.engine);
        }

        self.engine.set_cursor(Cursor::Default);
    }

    fn click(&self, pointer: &PointerEvent, double: bool) -> DefaultBehavior {
        if let Some(dragged) = self.take_dragged() {
            if self.ctx.debug() {
                log::debug!("Click cancelled the drag of a feature in `{}`", dragged.layer);
            }
            self.end_drag(&dragged, pointer);
            return DefaultBehavior::Allow;
        }

        let features = if double {
            self.hit_test(pointer, LayerEntry::is_double_clickable)
        } else {
            self.hit_test(pointer, LayerEntry::is_clickable)
        };

        if features.is_empty() && self.ctx.debug() {
            log::debug!("No clickable features at {:?}", pointer.point);
        }

        for feature in &features {
            let handler = self.find_layer(&feature.layer).and_then(|layer| {
                if double {
                    layer.handlers().on_double_click.clone()
                } else {
                    layer.handlers().on_click.clone()
                }
            });

            let Some(handler) = handler else {
                continue;
            };

            if handler(feature, pointer, self.engine) == EventPropagation::Stop {
                break;
            }
        }

        DefaultBehavior::Allow
    }

    fn mouse_down(&self, pointer: &PointerEvent) -> DefaultBehavior {
        if let Some(dragged) = self.take_dragged() {
            self.end_drag(&dragged, pointer);
        }

        let features = self.hit_test(pointer, LayerEntry::is_draggable);
        let Some(feature) = features.first() else {
            if self.ctx.debug() {
                log::debug!("No draggable features at {:?}", pointer.point);
            }
            return DefaultBehavior::Allow;
        };

        if self.ctx.debug() {
            log::debug!("Started dragging a feature in `{}`", feature.layer);
        }

        self.ctx.shared().interaction.lock().dragged = Some(DraggedFeature::from(feature));
        self.engine.set_cursor(Cursor::Grabbing);

        DefaultBehavior::Prevent
    }

    fn mouse_up(&self, pointer: &PointerEvent) -> DefaultBehavior {
        if let Some(dragged) = self.take_dragged() {
            self.end_drag(&dragged, pointer);
        }

        DefaultBehavior::Allow
    }

    fn mouse_move(&self, pointer: &PointerEvent) -> DefaultBehavior {
        let dragged = self.ctx.shared().interaction.lock().dragged.clone();
        if let Some(dragged) = dragged {
            let handler = self
                .find_layer(&dragged.layer)
                .and_then(|layer| layer.handlers().on_drag.clone());
            if let Some(handler) = handler {
                handler(&dragged, pointer, self.engine);
            }

            return DefaultBehavior::Allow;
        }

        let cursor = if self.hit_test(pointer, LayerEntry::is_pointer_target).is_empty() {
            Cursor::Default
        } else {
            Cursor::Pointer
        };
        self.engine.set_cursor(cursor);

        let features = self.hit_test(pointer, LayerEntry::is_hover_tracked);
        let top = features.first();

        let transition = {
            let mut state = self.ctx.shared().interaction.lock();
            let next = top.map(HoveredFeature::new);
            if state.hovered == next {
                return DefaultBehavior::Allow;
            }

            let previous = std::mem::replace(&mut state.hovered, next.clone());
            let left = match (&previous, &next) {
                (Some(previous), Some(next)) if previous.is_same_layer(next) => None,
                (previous, _) => previous.clone(),
            };

            HoverTransition {
                cleared: previous,
                left,
                entered: next,
            }
        };

        self.apply_hover(transition, top, pointer);

        DefaultBehavior::Allow
    }

    fn apply_hover(
        &self,
        transition: HoverTransition,
        feature: Option<&RenderedFeature>,
        pointer: &PointerEvent,
    ) {
        if let Some(target) = transition.cleared.as_ref().and_then(HoveredFeature::target) {
            self.engine.remove_feature_state(&target, Some(HOVER_STATE));
        }

        if let Some(left) = &transition.left {
            let handler = self
                .find_layer(&left.layer)
                .and_then(|layer| layer.handlers().on_mouse_leave.clone());
            if let Some(handler) = handler {
                handler(self.engine);
            }
        }

        let (Some(entered), Some(feature)) = (&transition.entered, feature) else {
            return;
        };

        match entered.target() {
            Some(target) => {
                let mut state = PropertyMap::new();
                state.insert(HOVER_STATE.to_string(), Value::Bool(true));
                self.engine.set_feature_state(&target, &state);
            }
            None => {
                if self.ctx.debug() {
                    log::debug!(
                        "Hovered feature in `{}` has no id, hover state is not set",
                        entered.layer
                    );
                }
            }
        }

        let handler = self
            .find_layer(&entered.layer)
            .and_then(|layer| layer.handlers().on_mouse_enter.clone());
        if let Some(handler) = handler {
            handler(feature, pointer, self.engine);
        }
    }

    fn resize(&self) -> DefaultBehavior {
        if let Some(request) = self.ctx.bounds_request() {
            self.engine.fit_bounds(&request.bounds, &request.options);
        }

        DefaultBehavior::Allow
    }
}
