use std::sync::Arc;

use geojson::{Feature, FeatureCollection};
use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;

use crate::binder::Binding;
use crate::coordinator::MapContext;
use crate::engine::{
    ControlId, DefaultBehavior, DrawEvent, DrawMode, ListenerId, MapEngine, MapEvent, MapEventKind,
};
use crate::options::{Control, ControlPosition, DrawOptions};

/// CSS class added to the map container while the draw control is disabled.
pub const DISABLED_DRAW_CLASS: &str = "disabled-map-draw-control";

/// Handler of draw events carrying features.
pub type DrawFeaturesHandler<E> = Arc<dyn Fn(&[Feature], &E) + MaybeSend + MaybeSync>;
/// Handler of draw mode changes.
pub type DrawModeHandler<E> = Arc<dyn Fn(DrawMode, &E) + MaybeSend + MaybeSync>;

struct DrawHandlers<E> {
    on_create: Option<DrawFeaturesHandler<E>>,
    on_update: Option<DrawFeaturesHandler<E>>,
    on_delete: Option<DrawFeaturesHandler<E>>,
    on_mode_change: Option<DrawModeHandler<E>>,
}

impl<E> Default for DrawHandlers<E> {
    fn default() -> Self {
        Self {
            on_create: None,
            on_update: None,
            on_delete: None,
            on_mode_change: None,
        }
    }
}

/// Adds a shape editor control to the map and keeps its features in sync.
///
/// While disabled, the control shows no features and its events are not delivered.
pub struct DrawBinder<E: MapEngine> {
    context: MapContext<E>,
    options: DrawOptions,
    position: ControlPosition,
    features: Vec<Feature>,
    disabled: bool,
    handlers: Arc<RwLock<DrawHandlers<E>>>,
    control: Option<ControlId>,
    listeners: Vec<ListenerId>,
}

impl<E: MapEngine> DrawBinder<E> {
    /// Creates a binder of a draw control.
    pub fn new(context: MapContext<E>, options: DrawOptions) -> Self {
        Self {
            context,
            options,
            position: ControlPosition::TopRight,
            features: vec![],
            disabled: false,
            handlers: Arc::new(RwLock::new(DrawHandlers::default())),
            control: None,
            listeners: vec![],
        }
    }

    /// Sets the control position.
    pub fn with_position(mut self, position: ControlPosition) -> Self {
        self.position = position;
        self
    }

    /// Sets the initial features.
    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    /// Sets the handler of created features.
    pub fn on_create(
        self,
        handler: impl Fn(&[Feature], &E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.handlers.write().on_create = Some(Arc::new(handler));
        self
    }

    /// Sets the handler of updated features.
    pub fn on_update(
        self,
        handler: impl Fn(&[Feature], &E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.handlers.write().on_update = Some(Arc::new(handler));
        self
    }

    /// Sets the handler of deleted features.
    pub fn on_delete(
        self,
        handler: impl Fn(&[Feature], &E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.handlers.write().on_delete = Some(Arc::new(handler));
        self
    }

    /// Sets the handler of mode changes.
    pub fn on_mode_change(
        self,
        handler: impl Fn(DrawMode, &E) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.handlers.write().on_mode_change = Some(Arc::new(handler));
        self
    }

    /// Replaces the features shown by the control.
    pub fn set_features(&mut self, features: Vec<Feature>) {
        if self.features == features {
            return;
        }

        self.features = features;
        self.push_features();
    }

    /// Disables or enables the control.
    pub fn set_disabled(&mut self, disabled: bool) {
        if self.disabled == disabled {
            return;
        }

        self.disabled = disabled;
        if let (Some(_), Some(engine)) = (self.control, self.context.engine()) {
            if disabled {
                self.unsubscribe(&engine);
            } else {
                self.subscribe(&engine);
            }
        }

        self.push_features();
        self.toggle_class(disabled);
    }

    fn toggle_class(&self, disabled: bool) {
        if let Some(container) = self.context.container() {
            container.toggle_class(DISABLED_DRAW_CLASS, disabled);
        }
    }

    fn push_features(&self) {
        let (Some(control), Some(engine)) = (self.control, self.context.engine()) else {
            return;
        };

        let collection = FeatureCollection {
            bbox: None,
            features: if self.disabled {
                vec![]
            } else {
                self.features.clone()
            },
            foreign_members: None,
        };

        if let Err(err) = engine.set_draw_features(control, &collection) {
            log::error!("Failed to set draw features: {err}");
        }
    }

    fn subscribe(&mut self, engine: &E) {
        for kind in [
            MapEventKind::DrawCreate,
            MapEventKind::DrawUpdate,
            MapEventKind::DrawDelete,
            MapEventKind::DrawModeChange,
        ] {
            let weak = self.context.downgrade();
            let handlers = self.handlers.clone();
            let id = engine.on(
                kind,
                Arc::new(move |event: &MapEvent| {
                    let (Some(context), MapEvent::Draw(event)) = (weak.upgrade(), event) else {
                        return DefaultBehavior::Allow;
                    };
                    let Some(engine) = context.engine() else {
                        return DefaultBehavior::Allow;
                    };

                    let handlers = handlers.read();
                    match event {
                        DrawEvent::Create(features) => {
                            let handler = handlers.on_create.clone();
                            drop(handlers);
                            if let Some(handler) = handler {
                                handler(features, &engine);
                            }
                        }
                        DrawEvent::Update(features) => {
                            let handler = handlers.on_update.clone();
                            drop(handlers);
                            if let Some(handler) = handler {
                                handler(features, &engine);
                            }
                        }
                        DrawEvent::Delete(features) => {
                            let handler = handlers.on_delete.clone();
                            drop(handlers);
                            if let Some(handler) = handler {
                                handler(features, &engine);
                            }
                        }
                        DrawEvent::ModeChange(mode) => {
                            let handler = handlers.on_mode_change.clone();
                            drop(handlers);
                            if let Some(handler) = handler {
                                handler(*mode, &engine);
                            }
                        }
                    }

                    DefaultBehavior::Allow
                }),
            );
            self.listeners.push(id);
        }
    }

    fn unsubscribe(&mut self, engine: &E) {
        for listener in self.listeners.drain(..) {
            engine.off(listener);
        }
    }
}

impl<E: MapEngine> Binding for DrawBinder<E> {
    fn refresh(&mut self) {
        if self.control.is_some() {
            if !self.context.is_map_destroyed() {
                return;
            }

            self.control = None;
            self.listeners.clear();
        }

        let (Some(_), Some(engine)) = (self.context.style(), self.context.engine()) else {
            return;
        };

        if self.context.debug() {
            log::debug!("Adding draw control");
        }

        let control = Control::Draw(self.options.clone());
        self.control = Some(engine.add_control(&control, self.position));
        if !self.disabled {
            self.subscribe(&engine);
        }
        self.push_features();
        self.toggle_class(self.disabled);
    }

    fn unmount(&mut self) {
        let Some(control) = self.control.take() else {
            return;
        };

        if self.context.is_map_destroyed() {
            self.listeners.clear();
            return;
        }

        if let Some(engine) = self.context.engine() {
            self.unsubscribe(&engine);
            engine.remove_control(control);
        }
        self.listeners.clear();
        self.toggle_class(false);
    }
}

impl<E: MapEngine> Drop for DrawBinder<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;

    use super::*;
    use crate::coordinator::MapCoordinator;
    use crate::options::MapOptions;
    use crate::tests::{Call, TestContainer, TestEngine, TestProvider, BASE_STYLE};

    fn point(x: f64, y: f64) -> Feature {
        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![x, y]))),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    fn map_with_container() -> (MapCoordinator<TestProvider>, TestEngine, Arc<TestContainer>) {
        crate::tests::init_logger();
        let engine = TestEngine::default();
        let container = Arc::new(TestContainer::default());
        let mut coordinator =
            MapCoordinator::new(TestProvider::new(engine.clone()), MapOptions::new(BASE_STYLE));
        coordinator.mount(Some(container.clone()));
        engine.fire(MapEvent::StyleData);
        engine.fire(MapEvent::Load);
        engine.clear_calls();

        (coordinator, engine, container)
    }

    #[test]
    fn control_shows_features() {
        let (coordinator, engine, _container) = map_with_container();
        let mut binder = DrawBinder::new(coordinator.context(), DrawOptions::default())
            .with_features(vec![point(1.0, 2.0)]);

        binder.refresh();
        binder.refresh();

        let calls = engine.calls();
        assert_eq!(calls.len(), 2);
        assert_matches!(
            &calls[0],
            Call::AddControl(Control::Draw(_), ControlPosition::TopRight)
        );
        assert_matches!(&calls[1], Call::SetDrawFeatures(_, 1));
    }

    #[test]
    fn disabled_control_hides_features_and_events() {
        let (coordinator, engine, container) = map_with_container();
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let mut binder = DrawBinder::new(coordinator.context(), DrawOptions::default())
            .with_features(vec![point(1.0, 2.0)])
            .on_create(move |features, _| {
                counter.fetch_add(features.len(), Ordering::SeqCst);
            });
        binder.refresh();

        engine.fire(MapEvent::Draw(DrawEvent::Create(vec![point(3.0, 4.0)])));
        assert_eq!(created.load(Ordering::SeqCst), 1);

        engine.clear_calls();
        binder.set_disabled(true);

        assert!(container.has_class(DISABLED_DRAW_CLASS));
        assert_matches!(&engine.calls()[..], [Call::SetDrawFeatures(_, 0)]);
        assert_eq!(engine.listener_count(MapEventKind::DrawCreate), 0);

        engine.fire(MapEvent::Draw(DrawEvent::Create(vec![point(3.0, 4.0)])));
        assert_eq!(created.load(Ordering::SeqCst), 1);

        binder.set_disabled(false);
        assert!(!container.has_class(DISABLED_DRAW_CLASS));
        assert_eq!(engine.listener_count(MapEventKind::DrawCreate), 1);
    }

    #[test]
    fn unmount_removes_control() {
        let (coordinator, engine, _container) = map_with_container();
        let mut binder = DrawBinder::new(coordinator.context(), DrawOptions::default());
        binder.refresh();

        binder.unmount();

        assert_eq!(engine.count(|c| matches!(c, Call::RemoveControl(_))), 1);
        assert_eq!(engine.listener_count(MapEventKind::DrawModeChange), 0);
    }
}
