use std::sync::Arc;

use serde_json::Value;

use crate::binder::animation::AnimationLoop;
use crate::binder::{AnimationCallback, Binding, FrameScheduler, SourceContext};
use crate::engine::MapEngine;
use crate::options::{LayerOptions, LayerSpecification, PropertyMap};
use crate::registry::{LayerEntry, LayerHandlers};

/// Binds a layer of a source to the map.
///
/// Layers of managed sources are added to the map by the binder. Layers of unmanaged sources are
/// defined by the style and only registered, so that they can receive events.
///
/// Layer type, source layer and zoom range are read once, when the layer is added. Paint,
/// layout and filter are diffed against the last applied values on every update.
pub struct LayerBinder<E: MapEngine> {
    source: SourceContext<E>,
    key: String,
    options: LayerOptions,
    beneath: Option<String>,
    hoverable: bool,
    handlers: LayerHandlers<E>,
    registered: Option<u64>,
    animation: Option<(Arc<dyn FrameScheduler>, AnimationCallback)>,
    animation_loop: Option<AnimationLoop>,
}

impl<E: MapEngine> LayerBinder<E> {
    /// Creates a binder of the layer `key` in the given source.
    pub fn new(source: SourceContext<E>, key: impl Into<String>, options: LayerOptions) -> Self {
        Self {
            source,
            key: key.into(),
            options,
            beneath: None,
            hoverable: false,
            handlers: LayerHandlers::default(),
            registered: None,
            animation: None,
            animation_loop: None,
        }
    }

    /// Inserts the layer below the layer with the given native id.
    pub fn with_beneath(mut self, beneath: impl Into<String>) -> Self {
        self.beneath = Some(beneath.into());
        self
    }

    /// Sets the `hovered` feature-state flag on hovered features.
    pub fn with_hoverable(mut self, hoverable: bool) -> Self {
        self.hoverable = hoverable;
        self
    }

    /// Sets event handlers.
    pub fn with_handlers(mut self, handlers: LayerHandlers<E>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Layer key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Native id of the layer.
    pub fn layer_id(&self) -> String {
        self.source.qualified_layer_id(&self.key)
    }

    /// Replaces event handlers.
    pub fn set_handlers(&mut self, handlers: LayerHandlers<E>) {
        self.handlers = handlers;
        self.push_behaviour();
    }

    /// Enables or disables the `hovered` feature-state flag.
    pub fn set_hoverable(&mut self, hoverable: bool) {
        if self.hoverable == hoverable {
            return;
        }

        self.hoverable = hoverable;
        self.push_behaviour();
    }

    /// Replaces paint properties. Properties missing from `paint` are reset to their defaults.
    pub fn set_paint(&mut self, paint: Option<PropertyMap>) {
        if self.options.paint == paint {
            return;
        }

        let previous = std::mem::replace(&mut self.options.paint, paint);
        if let Some(engine) = self.registered_engine() {
            let id = self.layer_id();
            for (name, value) in changed_properties(previous.as_ref(), self.options.paint.as_ref())
            {
                if let Err(err) = engine.set_paint_property(&id, &name, &value) {
                    log::error!("Failed to set paint property `{name}` of layer `{id}`: {err}");
                }
            }
        }
    }

    /// Replaces layout properties. Properties missing from `layout` are reset to their defaults.
    pub fn set_layout(&mut self, layout: Option<PropertyMap>) {
        if self.options.layout == layout {
            return;
        }

        let previous = std::mem::replace(&mut self.options.layout, layout);
        if let Some(engine) = self.registered_engine() {
            let id = self.layer_id();
            for (name, value) in changed_properties(previous.as_ref(), self.options.layout.as_ref())
            {
                if let Err(err) = engine.set_layout_property(&id, &name, &value) {
                    log::error!("Failed to set layout property `{name}` of layer `{id}`: {err}");
                }
            }
        }
    }

    /// Replaces the filter expression.
    pub fn set_filter(&mut self, filter: Option<Value>) {
        if self.options.filter == filter {
            return;
        }

        self.options.filter = filter;
        if let Some(engine) = self.registered_engine() {
            let id = self.layer_id();
            if let Err(err) = engine.set_filter(&id, self.options.filter.as_ref()) {
                log::error!("Failed to set filter of layer `{id}`: {err}");
            }
        }
    }

    /// Applies changed paint, layout and filter of `options`. Other fields are ignored.
    pub fn update(&mut self, options: LayerOptions) {
        if options.kind != self.options.kind || options.source_layer != self.options.source_layer
        {
            log::warn!(
                "Layer `{}`: type and source layer cannot be changed after creation",
                self.key
            );
        }

        self.set_paint(options.paint);
        self.set_layout(options.layout);
        self.set_filter(options.filter);
    }

    /// Starts updating paint properties on every display frame.
    ///
    /// Replaces the running animation, if any.
    pub fn start_animation(
        &mut self,
        scheduler: Arc<dyn FrameScheduler>,
        callback: AnimationCallback,
    ) {
        self.stop_animation();
        self.animation = Some((scheduler, callback));
        self.run_animation();
    }

    /// Stops the running animation.
    pub fn stop_animation(&mut self) {
        self.animation = None;
        if let Some(animation) = self.animation_loop.take() {
            animation.cancel();
        }
    }

    fn registered_engine(&self) -> Option<Arc<E>> {
        self.registered?;
        if self.source.get_layer(&self.key).is_none() {
            return None;
        }
        self.source.engine()
    }

    fn push_behaviour(&self) {
        if self.registered.is_none() {
            return;
        }

        let hoverable = self.hoverable;
        let handlers = self.handlers.clone();
        self.source.set_layer(&self.key, |layer| {
            layer.map(|layer| {
                layer
                    .clone()
                    .with_hoverable(hoverable)
                    .with_handlers(handlers)
            })
        });
    }

    fn run_animation(&mut self) {
        if self.animation_loop.is_some() || self.registered.is_none() {
            return;
        }

        let Some((scheduler, callback)) = self.animation.clone() else {
            return;
        };

        let source = self.source.downgrade();
        let key = self.key.clone();
        self.animation_loop = Some(AnimationLoop::start(
            scheduler,
            Arc::new(move |timestamp: f64| {
                let Some(source) = source.upgrade() else {
                    return;
                };
                if source.is_map_destroyed() || source.get_layer(&key).is_none() {
                    return;
                }
                let (Some(engine), Some(paint)) = (source.engine(), callback(timestamp)) else {
                    return;
                };

                let id = source.qualified_layer_id(&key);
                for (name, value) in &paint {
                    if let Err(err) = engine.set_paint_property(&id, name, value) {
                        log::error!("Failed to animate `{name}` of layer `{id}`: {err}");
                    }
                }
            }),
        ));
    }

    fn register(&mut self, engine: &E, epoch: u64) {
        let id = self.layer_id();
        if self.source.managed() {
            let specification = LayerSpecification {
                id: id.clone(),
                source: self.source.source_key().to_string(),
                options: self.options.clone(),
            };

            if self.source.map().debug() {
                log::debug!("Adding layer `{id}`");
            }

            if let Err(err) = engine.add_layer(&specification, self.beneath.as_deref()) {
                log::error!("Failed to add layer `{id}`: {err}");
            }
        }

        let weak = self.source.downgrade();
        let key = self.key.clone();
        let destroy = Arc::new(move || {
            if let Some(source) = weak.upgrade() {
                if source.get_layer(&key).is_some() {
                    source.remove_layer(&key);
                }
            }
        });

        let entry = LayerEntry::new(&self.key, destroy)
            .with_hoverable(self.hoverable)
            .with_handlers(self.handlers.clone());
        self.source.set_layer(&self.key, |_| Some(entry));
        self.registered = Some(epoch);
    }
}

impl<E: MapEngine> Binding for LayerBinder<E> {
    fn refresh(&mut self) {
        let (Some(generation), Some(engine)) = (self.source.style(), self.source.engine()) else {
            return;
        };

        if !self.source.is_registered() {
            return;
        }

        if self.registered == Some(generation.epoch()) && self.source.get_layer(&self.key).is_some()
        {
            return;
        }

        self.register(&engine, generation.epoch());
        self.run_animation();
    }

    fn unmount(&mut self) {
        if let Some(animation) = self.animation_loop.take() {
            animation.cancel();
        }

        let Some(epoch) = self.registered.take() else {
            return;
        };

        if self.source.style().map(|s| s.epoch()) != Some(epoch) {
            return;
        }

        if self.source.get_layer(&self.key).is_some() {
            self.source.remove_layer(&self.key);
        }
    }
}

impl<E: MapEngine> Drop for LayerBinder<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Properties that differ between `previous` and `next`. Removed properties are reset with
/// `null`.
fn changed_properties(
    previous: Option<&PropertyMap>,
    next: Option<&PropertyMap>,
) -> Vec<(String, Value)> {
    let mut changed = vec![];
    if let Some(previous) = previous {
        for name in previous.keys() {
            if next.map_or(true, |next| !next.contains_key(name)) {
                changed.push((name.clone(), Value::Null));
            }
        }
    }

    if let Some(next) = next {
        for (name, value) in next {
            if previous.and_then(|previous| previous.get(name)) != Some(value) {
                changed.push((name.clone(), value.clone()));
            }
        }
    }

    changed
}
