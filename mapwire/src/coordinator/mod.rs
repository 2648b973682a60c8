//! Lifecycle of a single map instance.
//!
//! A [`MapCoordinator`] owns the engine handle. It creates the engine when the host element is
//! mounted, keeps track of the loaded style, routes pointer events to the layers in the
//! registry and destroys the engine on unmount. Binders access the map through the
//! [`MapContext`] it hands out.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::engine::{
    ControlId, DefaultBehavior, EngineProvider, ListenerId, MapContainer, MapEngine, MapEvent,
    MapEventKind,
};
use crate::error::MapwireError;
use crate::options::{Control, MapOptions, MapStyle};

mod context;
pub(crate) mod dispatch;

pub use context::{BoundsRequest, MapContext, StyleGeneration, WeakMapContext};
pub use dispatch::HOVER_STATE;

use context::MapShared;

/// Lifecycle state of a [`MapCoordinator`].
#[derive(Debug, Clone)]
pub enum CoordinatorState {
    /// The engine was not created yet.
    Unmounted,
    /// The engine exists.
    Mounted,
    /// The engine could not be created. The map renders nothing, binders do nothing.
    Degraded(MapwireError),
    /// The engine was destroyed.
    Destroyed,
}

/// Owner of a map engine instance.
pub struct MapCoordinator<P: EngineProvider> {
    provider: P,
    options: MapOptions,
    shared: Arc<MapShared<P::Engine>>,
    state: CoordinatorState,
    subscriptions: Vec<ListenerId>,
    style_listener: Option<ListenerId>,
    controls: Vec<ControlId>,
}

impl<P: EngineProvider> MapCoordinator<P> {
    /// Creates a coordinator. The engine is not created until [`mount`](Self::mount) is called.
    pub fn new(provider: P, options: MapOptions) -> Self {
        let shared = Arc::new(MapShared::new(options.style().clone(), options.debug()));
        Self {
            provider,
            options,
            shared,
            state: CoordinatorState::Unmounted,
            subscriptions: vec![],
            style_listener: None,
            controls: vec![],
        }
    }

    /// Options the coordinator was created with.
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    /// Context to give to binders.
    pub fn context(&self) -> MapContext<P::Engine> {
        MapContext::from_shared(self.shared.clone())
    }

    /// Creates the engine inside the container.
    ///
    /// Failures are logged and leave the coordinator in the [`CoordinatorState::Degraded`]
    /// state.
    pub fn mount(&mut self, container: Option<Arc<dyn MapContainer>>) {
        if matches!(self.state, CoordinatorState::Mounted) {
            log::warn!("Map is already mounted");
            return;
        }

        if !self.provider.is_supported() {
            log::error!("Map engine is not supported in this environment");
            self.state = CoordinatorState::Degraded(MapwireError::Unsupported);
            return;
        }

        let Some(container) = container else {
            log::error!("No map container found");
            self.state = CoordinatorState::Degraded(MapwireError::MissingContainer);
            return;
        };

        let engine = match self.provider.create(&container, &self.options) {
            Ok(engine) => Arc::new(engine),
            Err(err) => {
                log::error!("Failed to create map engine: {err}");
                self.state = CoordinatorState::Degraded(err.into());
                return;
            }
        };

        if self.options.debug() {
            log::debug!("Map engine created");
        }

        self.shared.destroyed.store(false, Ordering::Release);
        *self.shared.container.write() = Some(container);
        *self.shared.engine.write() = Some(engine.clone());
        {
            let mut style = self.shared.style.write();
            style.loaded = false;
            style.published = None;
        }

        self.add_controls(&engine);
        self.subscribe(&engine);
        self.state = CoordinatorState::Mounted;

        let requested = self.shared.style.read().requested.clone();
        match requested {
            Some(style) if &style != self.options.style() => self.apply_style(&engine, style),
            _ => self.watch_style(&engine, self.options.style().clone()),
        }
    }

    /// Replaces the style of the map.
    ///
    /// All registry entries are dropped, since the engine discards sources and layers of the
    /// previous style. Binders register again once the new style is loaded.
    pub fn set_style(&mut self, style: impl Into<MapStyle>) {
        let style = style.into();
        {
            let mut state = self.shared.style.write();
            if state.requested.as_ref() == Some(&style) {
                return;
            }
            state.requested = Some(style.clone());
        }

        let Some(engine) = self.context().engine() else {
            return;
        };

        self.apply_style(&engine, style);
    }

    /// Destroys the engine. Does nothing if the engine does not exist.
    pub fn unmount(&mut self) {
        let Some(engine) = self.shared.engine.write().take() else {
            return;
        };

        for listener in self.subscriptions.drain(..).chain(self.style_listener.take()) {
            engine.off(listener);
        }

        for control in self.controls.drain(..) {
            engine.remove_control(control);
        }

        self.shared.registry.clear();
        dispatch::reset_interaction(&self.context(), Some(&*engine));
        {
            let mut style = self.shared.style.write();
            style.loaded = false;
            style.published = None;
        }
        self.shared.destroyed.store(true, Ordering::Release);
        *self.shared.container.write() = None;

        if self.options.debug() {
            log::debug!("Removing map");
        }

        engine.remove();
        self.state = CoordinatorState::Destroyed;
    }

    /// Routes an engine event to the registered layers.
    ///
    /// The coordinator subscribes to pointer events itself, so this is only needed for engines
    /// that deliver events through the host instead.
    pub fn handle_event(&self, event: &MapEvent) -> DefaultBehavior {
        dispatch::handle_event(&self.context(), event)
    }

    fn add_controls(&mut self, engine: &P::Engine) {
        let scale = self.options.scale_control();
        if scale.is_shown() {
            self.controls.push(engine.add_control(
                &Control::Scale(scale.options().clone()),
                scale.position(),
            ));
        }

        let navigation = self.options.navigation_control();
        if navigation.is_shown() {
            self.controls.push(engine.add_control(
                &Control::Navigation(navigation.options().clone()),
                navigation.position(),
            ));
        }
    }

    fn subscribe(&mut self, engine: &P::Engine) {
        for kind in MapEventKind::POINTER.into_iter().chain([MapEventKind::Resize]) {
            let weak = self.context().downgrade();
            let id = engine.on(
                kind,
                Arc::new(move |event: &MapEvent| match weak.upgrade() {
                    Some(context) => dispatch::handle_event(&context, event),
                    None => DefaultBehavior::Allow,
                }),
            );
            self.subscriptions.push(id);
        }

        let weak = self.context().downgrade();
        let id = engine.once(
            MapEventKind::Load,
            Arc::new(move |_: &MapEvent| {
                if let Some(context) = weak.upgrade() {
                    context.shared().style.write().loaded = true;
                    if context.debug() {
                        log::debug!("Map is loaded");
                    }
                }
                DefaultBehavior::Allow
            }),
        );
        self.subscriptions.push(id);
    }

    fn apply_style(&mut self, engine: &P::Engine, style: MapStyle) {
        self.shared.registry.clear();
        dispatch::reset_interaction(&self.context(), Some(engine));
        self.shared.style.write().published = None;

        if self.options.debug() {
            log::debug!("Setting map style to {style:?}");
        }

        engine.set_style(&style);
        self.watch_style(engine, style);
    }

    fn watch_style(&mut self, engine: &P::Engine, style: MapStyle) {
        if let Some(listener) = self.style_listener.take() {
            engine.off(listener);
        }

        let weak = self.context().downgrade();
        self.style_listener = Some(engine.once(
            MapEventKind::StyleData,
            Arc::new(move |_: &MapEvent| {
                if let Some(context) = weak.upgrade() {
                    publish_style(&context, style.clone());
                }
                DefaultBehavior::Allow
            }),
        ));
    }
}

impl<P: EngineProvider> Drop for MapCoordinator<P> {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn publish_style<E: MapEngine>(context: &MapContext<E>, style: MapStyle) {
    context.registry().clear();
    dispatch::reset_interaction(context, context.engine().as_deref());

    let mut state = context.shared().style.write();
    state.epoch += 1;
    if context.debug() {
        log::debug!("Style loaded, epoch {}", state.epoch);
    }
    state.published = Some(StyleGeneration::new(state.epoch, style));
}
