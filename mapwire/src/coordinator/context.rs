use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use mapwire_types::LngLatBounds;
use parking_lot::{Mutex, RwLock};

use crate::coordinator::dispatch::InteractionState;
use crate::engine::{MapContainer, MapEngine};
use crate::options::{FitBoundsOptions, MapStyle};
use crate::registry::{RegistryStore, SourceEntry};

/// A loaded style, identified by the number of style loads that happened before it.
///
/// Every time the style is (re)loaded, the epoch increases. Binders remember the epoch they
/// registered in, and register again when it changes.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleGeneration {
    epoch: u64,
    style: MapStyle,
}

impl StyleGeneration {
    pub(crate) fn new(epoch: u64, style: MapStyle) -> Self {
        Self { epoch, style }
    }

    /// Style load counter.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The loaded style.
    pub fn style(&self) -> &MapStyle {
        &self.style
    }
}

/// Last bounds fitted by a bounds binder, reapplied when the map is resized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BoundsRequest {
    /// Bounds to fit.
    pub bounds: LngLatBounds,
    /// Fit options.
    pub options: FitBoundsOptions,
}

#[derive(Debug, Default)]
pub(crate) struct StyleState {
    pub(crate) requested: Option<MapStyle>,
    pub(crate) published: Option<StyleGeneration>,
    pub(crate) loaded: bool,
    pub(crate) epoch: u64,
}

pub(crate) struct MapShared<E> {
    pub(crate) engine: RwLock<Option<Arc<E>>>,
    pub(crate) container: RwLock<Option<Arc<dyn MapContainer>>>,
    pub(crate) registry: RegistryStore<E>,
    pub(crate) style: RwLock<StyleState>,
    pub(crate) destroyed: AtomicBool,
    pub(crate) bounds: Mutex<Option<BoundsRequest>>,
    pub(crate) interaction: Mutex<InteractionState>,
    pub(crate) debug: bool,
}

impl<E> MapShared<E> {
    pub(crate) fn new(style: MapStyle, debug: bool) -> Self {
        Self {
            engine: RwLock::new(None),
            container: RwLock::new(None),
            registry: RegistryStore::new(),
            style: RwLock::new(StyleState {
                requested: Some(style),
                ..Default::default()
            }),
            destroyed: AtomicBool::new(false),
            bounds: Mutex::new(None),
            interaction: Mutex::new(InteractionState::default()),
            debug,
        }
    }
}

/// Handle through which binders access the map.
///
/// The context is cheap to clone. Closures stored in the engine or in the registry must hold a
/// [`WeakMapContext`] instead, so that the map can be dropped.
pub struct MapContext<E> {
    shared: Arc<MapShared<E>>,
}

impl<E> Clone for MapContext<E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// Weak version of [`MapContext`].
pub struct WeakMapContext<E> {
    shared: Weak<MapShared<E>>,
}

impl<E> Clone for WeakMapContext<E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<E> WeakMapContext<E> {
    /// Returns the context if the map still exists.
    pub fn upgrade(&self) -> Option<MapContext<E>> {
        self.shared.upgrade().map(|shared| MapContext { shared })
    }
}

impl<E: MapEngine> MapContext<E> {
    pub(crate) fn from_shared(shared: Arc<MapShared<E>>) -> Self {
        Self { shared }
    }

    pub(crate) fn shared(&self) -> &MapShared<E> {
        &self.shared
    }

    /// Weak handle to the same map.
    pub fn downgrade(&self) -> WeakMapContext<E> {
        WeakMapContext {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Engine handle, if the map is mounted.
    pub fn engine(&self) -> Option<Arc<E>> {
        self.shared.engine.read().clone()
    }

    /// Container the map is rendered into, if the map is mounted.
    pub fn container(&self) -> Option<Arc<dyn MapContainer>> {
        self.shared.container.read().clone()
    }

    /// The loaded style.
    ///
    /// Returns `None` until the engine is fully ready and a style has been loaded, and while a
    /// new style is loading.
    pub fn style(&self) -> Option<StyleGeneration> {
        let style = self.shared.style.read();
        if style.loaded {
            style.published.clone()
        } else {
            None
        }
    }

    /// True if binders can register sources and layers.
    pub fn is_ready(&self) -> bool {
        self.style().is_some()
    }

    /// True if the engine instance has been destroyed.
    ///
    /// All native objects are gone with the engine, so teardown code must not call it.
    pub fn is_map_destroyed(&self) -> bool {
        self.shared.destroyed.load(Ordering::Acquire)
    }

    /// Whether diagnostics logging is enabled.
    pub fn debug(&self) -> bool {
        self.shared.debug
    }

    /// Registry of sources and layers.
    pub fn registry(&self) -> &RegistryStore<E> {
        &self.shared.registry
    }

    /// True if a source with the given key is registered.
    pub fn is_source_defined(&self, id: &str) -> bool {
        self.shared.registry.is_defined(id)
    }

    /// Registry entry of a source.
    pub fn get_source(&self, id: &str) -> Option<SourceEntry<E>> {
        self.shared.registry.get(id)
    }

    /// Adds or replaces a source entry.
    pub fn set_source(&self, entry: SourceEntry<E>) {
        self.shared.registry.set(entry);
    }

    /// Removes a source: destroys its layers first, then the registry entry, then the native
    /// source if mapwire added it.
    pub fn remove_source(&self, id: &str) {
        let Some(source) = self.get_source(id) else {
            if self.debug() {
                log::debug!("Source `{id}` is not registered, nothing to remove");
            }
            return;
        };

        for layer in source.layers() {
            layer.destroy();
        }

        self.shared.registry.remove(id);

        if !source.managed() || self.is_map_destroyed() {
            return;
        }

        let Some(engine) = self.engine() else {
            return;
        };

        if self.debug() {
            log::debug!("Removing source `{id}`");
        }

        if let Err(err) = engine.remove_source(id) {
            log::error!("Failed to remove source `{id}`: {err}");
        }
    }

    /// Last bounds fitted by a bounds binder.
    pub fn bounds_request(&self) -> Option<BoundsRequest> {
        *self.shared.bounds.lock()
    }

    /// Stores the bounds to reapply on resize.
    pub fn set_bounds_request(&self, request: Option<BoundsRequest>) {
        *self.shared.bounds.lock() = request;
    }
}
