use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::error::MapwireError;
use crate::registry::{LayerEntry, SourceEntry};

/// Sources of the registry by key.
pub type SourceMap<E> = AHashMap<String, SourceEntry<E>>;

/// A layer with the source it belongs to.
pub struct RegisteredLayer<E> {
    /// Native id of the layer.
    pub qualified_id: String,
    /// Source key.
    pub source: String,
    /// Layer entry.
    pub entry: LayerEntry<E>,
}

struct Versioned<E> {
    version: u64,
    sources: Arc<SourceMap<E>>,
}

/// Copy-on-write store of registry entries.
///
/// Readers get immutable snapshots, so a snapshot taken before a write never observes it.
/// Every write produces a new snapshot and bumps the [`version`](RegistryStore::version).
pub struct RegistryStore<E> {
    state: RwLock<Versioned<E>>,
}

impl<E> Default for RegistryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> RegistryStore<E> {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Versioned {
                version: 0,
                sources: Arc::new(AHashMap::new()),
            }),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<SourceMap<E>> {
        self.state.read().sources.clone()
    }

    /// Number of writes made to the registry so far.
    pub fn version(&self) -> u64 {
        self.state.read().version
    }

    /// Source entry with the given key.
    pub fn get(&self, id: &str) -> Option<SourceEntry<E>> {
        self.state.read().sources.get(id).cloned()
    }

    /// True if a source with the given key is registered.
    pub fn is_defined(&self, id: &str) -> bool {
        self.state.read().sources.contains_key(id)
    }

    /// True if no sources are registered.
    pub fn is_empty(&self) -> bool {
        self.state.read().sources.is_empty()
    }

    /// Adds or replaces a source entry.
    pub fn set(&self, entry: SourceEntry<E>) {
        self.update(|sources| {
            sources.insert(entry.id().to_string(), entry);
        });
    }

    /// Removes a source entry with all its layers.
    pub fn remove(&self, id: &str) -> Option<SourceEntry<E>> {
        let mut removed = None;
        self.update(|sources| removed = sources.remove(id));
        removed
    }

    /// Adds, replaces or removes a layer entry of a registered source.
    ///
    /// `update` gets the current entry of the layer and returns the new one, or `None` to remove
    /// the layer. It is called with the registry locked and must not access the registry.
    pub fn set_layer(
        &self,
        source_id: &str,
        layer_id: &str,
        update: impl FnOnce(Option<&LayerEntry<E>>) -> Option<LayerEntry<E>>,
    ) -> Result<(), MapwireError> {
        let mut state = self.state.write();
        let Some(source) = state.sources.get(source_id) else {
            return Err(MapwireError::SourceNotFound(source_id.to_string()));
        };

        let next = update(source.layer(layer_id));
        let mut sources = (*state.sources).clone();
        if let Some(source) = sources.get_mut(source_id) {
            match next {
                Some(layer) => {
                    source.layers_mut().insert(layer_id.to_string(), layer);
                }
                None => {
                    source.layers_mut().remove(layer_id);
                }
            }
        }

        state.sources = Arc::new(sources);
        state.version += 1;

        Ok(())
    }

    /// Removes all entries without calling their teardown closures.
    pub fn clear(&self) {
        self.update(|sources| sources.clear());
    }

    /// All registered layers, with their native ids.
    pub fn layers(&self) -> Vec<RegisteredLayer<E>> {
        let snapshot = self.snapshot();
        snapshot
            .values()
            .flat_map(|source| {
                source.layers().map(|layer| RegisteredLayer {
                    qualified_id: source.qualified_layer_id(layer.id()),
                    source: source.id().to_string(),
                    entry: layer.clone(),
                })
            })
            .collect()
    }

    fn update(&self, f: impl FnOnce(&mut SourceMap<E>)) {
        let mut state = self.state.write();
        let mut sources = (*state.sources).clone();
        f(&mut sources);
        state.sources = Arc::new(sources);
        state.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;

    use super::*;
    use crate::registry::{LayerHandlers, Teardown};

    fn noop() -> Teardown {
        Arc::new(|| {})
    }

    #[test]
    fn snapshot_is_not_affected_by_writes() {
        let store = RegistryStore::<()>::new();
        store.set(SourceEntry::new("regions", true, noop()));

        let before = store.snapshot();
        let version = store.version();
        store.remove("regions");

        assert!(before.contains_key("regions"));
        assert!(!store.is_defined("regions"));
        assert!(store.version() > version);
    }

    #[test]
    fn set_layer_patches_existing_entry() {
        let store = RegistryStore::<()>::new();
        store.set(SourceEntry::new("regions", true, noop()));
        store
            .set_layer("regions", "fill", |_| Some(LayerEntry::new("fill", noop())))
            .expect("source exists");

        store
            .set_layer("regions", "fill", |layer| {
                layer.map(|layer| {
                    layer
                        .clone()
                        .with_hoverable(true)
                        .with_handlers(LayerHandlers::new().on_mouse_leave(|_| {}))
                })
            })
            .expect("source exists");

        let source = store.get("regions").expect("registered");
        let layer = source.layer("fill").expect("registered");
        assert!(layer.hoverable());
        assert!(layer.handlers().on_mouse_leave.is_some());
    }

    #[test]
    fn set_layer_requires_source() {
        let store = RegistryStore::<()>::new();
        let result = store.set_layer("regions", "fill", |_| Some(LayerEntry::new("fill", noop())));
        assert_matches!(result, Err(MapwireError::SourceNotFound(id)) if id == "regions");
    }

    #[test]
    fn removing_layer() {
        let store = RegistryStore::<()>::new();
        store.set(SourceEntry::new("regions", true, noop()));
        for id in ["fill", "line"] {
            store
                .set_layer("regions", id, |_| Some(LayerEntry::new(id, noop())))
                .expect("source exists");
        }

        store
            .set_layer("regions", "fill", |_| None)
            .expect("source exists");

        let source = store.get("regions").expect("registered");
        assert_eq!(source.layer_count(), 1);
        assert!(source.layer("line").is_some());
    }

    #[test]
    fn clear_does_not_call_teardown() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let store = RegistryStore::<()>::new();
        store.set(SourceEntry::new(
            "regions",
            true,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        ));

        store.clear();

        assert!(store.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn layers_are_flattened_with_native_ids() {
        let store = RegistryStore::<()>::new();
        store.set(SourceEntry::new("regions", true, noop()));
        store.set(SourceEntry::new("composite", false, noop()));
        store
            .set_layer("regions", "fill", |_| Some(LayerEntry::new("fill", noop())))
            .expect("source exists");
        store
            .set_layer("composite", "road", |_| Some(LayerEntry::new("road", noop())))
            .expect("source exists");

        let mut ids: Vec<_> = store
            .layers()
            .into_iter()
            .map(|layer| (layer.qualified_id, layer.source))
            .collect();
        ids.sort();

        assert_eq!(
            ids,
            vec![
                ("regions›fill".to_string(), "regions".to_string()),
                ("road".to_string(), "composite".to_string()),
            ]
        );
    }
}
