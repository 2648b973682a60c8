use std::sync::Arc;

use serde_json::Value;

use crate::binder::Binding;
use crate::coordinator::{MapContext, StyleGeneration, WeakMapContext};
use crate::engine::{MapEngine, RenderedFeature};
use crate::error::MapwireError;
use crate::options::{GeoJsonData, SourceOptions};
use crate::registry::{qualified_layer_id, LayerEntry, SourceEntry};

/// Binds a source to the map.
///
/// A managed source is added to the map by the binder. An unmanaged source is already defined by
/// the style; the binder only registers it so that its layers can be bound.
pub struct SourceBinder<E: MapEngine> {
    context: MapContext<E>,
    key: String,
    options: Option<SourceOptions>,
    data: Option<GeoJsonData>,
    registered: Option<u64>,
}

impl<E: MapEngine> SourceBinder<E> {
    /// Binder of a source added by mapwire. Source options cannot be changed later.
    pub fn managed(context: MapContext<E>, key: impl Into<String>, options: SourceOptions) -> Self {
        Self {
            context,
            key: key.into(),
            options: Some(options),
            data: None,
            registered: None,
        }
    }

    /// Binder of a source defined by the map style.
    pub fn unmanaged(context: MapContext<E>, key: impl Into<String>) -> Self {
        Self {
            context,
            key: key.into(),
            options: None,
            data: None,
            registered: None,
        }
    }

    /// Sets initial GeoJSON data.
    pub fn with_geojson(mut self, data: GeoJsonData) -> Self {
        self.data = Some(data);
        self
    }

    /// Source key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// True if the source is added by mapwire.
    pub fn is_managed(&self) -> bool {
        self.options.is_some()
    }

    /// Context for binding layers of the source. `None` until the source is registered for the
    /// current style.
    pub fn context(&self) -> Option<SourceContext<E>> {
        if !self.is_owner() {
            return None;
        }

        Some(SourceContext {
            map: self.context.clone(),
            key: self.key.clone(),
            managed: self.is_managed(),
        })
    }

    /// Replaces GeoJSON data of the source.
    pub fn set_geojson(&mut self, data: GeoJsonData) {
        if self.data.as_ref() == Some(&data) {
            return;
        }

        self.data = Some(data);

        if !self.is_managed() {
            log::warn!("Cannot set data of unmanaged source `{}`", self.key);
            return;
        }

        if !self.is_owner() {
            return;
        }

        let (Some(engine), Some(data)) = (self.context.engine(), &self.data) else {
            return;
        };

        if self.context.debug() {
            log::debug!("Setting data of source `{}`", self.key);
        }

        if let Err(err) = engine.set_source_data(&self.key, data) {
            log::error!("Failed to set data of source `{}`: {err}", self.key);
        }
    }

    fn is_owner(&self) -> bool {
        let epoch = self.context.style().map(|style| style.epoch());
        self.registered.is_some()
            && self.registered == epoch
            && self.context.is_source_defined(&self.key)
    }

    fn creation_options(&self) -> Option<SourceOptions> {
        let options = self.options.as_ref()?;
        let Some(data) = &self.data else {
            return Some(options.clone());
        };

        match options.with_geojson_data(data.clone()) {
            Some(options) => Some(options),
            None => {
                log::warn!(
                    "Source `{}` is not a GeoJSON source, data is ignored",
                    self.key
                );
                Some(options.clone())
            }
        }
    }

    fn register(&mut self, engine: &E, generation: &StyleGeneration) {
        if let Some(options) = self.creation_options() {
            if self.context.debug() {
                log::debug!("Adding source `{}`", self.key);
            }

            if let Err(err) = engine.add_source(&self.key, &options) {
                log::error!("Failed to add source `{}`: {err}", self.key);
            }
        }

        let weak = self.context.downgrade();
        let key = self.key.clone();
        let destroy = Arc::new(move || {
            if let Some(context) = weak.upgrade() {
                context.remove_source(&key);
            }
        });

        self.context
            .set_source(SourceEntry::new(&self.key, self.is_managed(), destroy));
        self.registered = Some(generation.epoch());
    }
}

impl<E: MapEngine> Binding for SourceBinder<E> {
    fn refresh(&mut self) {
        let (Some(generation), Some(engine)) = (self.context.style(), self.context.engine()) else {
            return;
        };

        let defined = self.context.is_source_defined(&self.key);
        if self.registered == Some(generation.epoch()) && defined {
            return;
        }

        if defined {
            self.registered = None;
            log::error!("{}", MapwireError::DuplicateSource(self.key.clone()));
            return;
        }

        self.register(&engine, &generation);
    }

    fn unmount(&mut self) {
        let Some(epoch) = self.registered.take() else {
            return;
        };

        if self.context.style().map(|s| s.epoch()) != Some(epoch) {
            return;
        }

        if let Some(entry) = self.context.get_source(&self.key) {
            entry.destroy();
        }
    }
}

impl<E: MapEngine> Drop for SourceBinder<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Handle through which layer binders access their source.
pub struct SourceContext<E> {
    map: MapContext<E>,
    key: String,
    managed: bool,
}

impl<E> Clone for SourceContext<E> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            key: self.key.clone(),
            managed: self.managed,
        }
    }
}

/// Weak version of [`SourceContext`].
pub struct WeakSourceContext<E> {
    map: WeakMapContext<E>,
    key: String,
    managed: bool,
}

impl<E> Clone for WeakSourceContext<E> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
            key: self.key.clone(),
            managed: self.managed,
        }
    }
}

impl<E> WeakSourceContext<E> {
    /// Returns the context if the map still exists.
    pub fn upgrade(&self) -> Option<SourceContext<E>> {
        Some(SourceContext {
            map: self.map.upgrade()?,
            key: self.key.clone(),
            managed: self.managed,
        })
    }
}

impl<E: MapEngine> SourceContext<E> {
    /// Map context.
    pub fn map(&self) -> &MapContext<E> {
        &self.map
    }

    /// Weak handle to the same source.
    pub fn downgrade(&self) -> WeakSourceContext<E> {
        WeakSourceContext {
            map: self.map.downgrade(),
            key: self.key.clone(),
            managed: self.managed,
        }
    }

    /// Source key.
    pub fn source_key(&self) -> &str {
        &self.key
    }

    /// True if the source is added by mapwire.
    pub fn managed(&self) -> bool {
        self.managed
    }

    /// Engine handle, if the map is mounted.
    pub fn engine(&self) -> Option<Arc<E>> {
        self.map.engine()
    }

    /// The loaded style.
    pub fn style(&self) -> Option<StyleGeneration> {
        self.map.style()
    }

    /// True if the engine has been destroyed.
    pub fn is_map_destroyed(&self) -> bool {
        self.map.is_map_destroyed()
    }

    /// True if the source is still registered.
    pub fn is_registered(&self) -> bool {
        self.map.is_source_defined(&self.key)
    }

    /// Native id of a layer of the source.
    pub fn qualified_layer_id(&self, layer: &str) -> String {
        qualified_layer_id(&self.key, layer, self.managed)
    }

    /// Features of the source matching the filter, rendered or not. Empty while the map is not
    /// mounted.
    pub fn query_features(
        &self,
        source_layer: Option<&str>,
        filter: Option<&Value>,
    ) -> Vec<RenderedFeature> {
        match self.engine() {
            Some(engine) if !self.is_map_destroyed() => {
                engine.query_source_features(&self.key, source_layer, filter)
            }
            _ => Vec::new(),
        }
    }

    /// Registry entry of a layer of the source.
    pub fn get_layer(&self, layer: &str) -> Option<LayerEntry<E>> {
        self.map.get_source(&self.key)?.layer(layer).cloned()
    }

    /// Adds, patches or removes a layer entry.
    ///
    /// See [`RegistryStore::set_layer`](crate::registry::RegistryStore::set_layer).
    pub fn set_layer(
        &self,
        layer: &str,
        update: impl FnOnce(Option<&LayerEntry<E>>) -> Option<LayerEntry<E>>,
    ) {
        if let Err(err) = self.map.registry().set_layer(&self.key, layer, update) {
            log::error!("Failed to register layer `{layer}`: {err}");
        }
    }

    /// Removes a layer: the native layer if the source is managed, then the registry entry.
    pub fn remove_layer(&self, layer: &str) {
        let Some(source) = self.map.get_source(&self.key) else {
            log::error!("{}", MapwireError::SourceNotFound(self.key.clone()));
            return;
        };

        if source.layer(layer).is_none() {
            log::error!(
                "{}",
                MapwireError::LayerNotFound {
                    source_id: self.key.clone(),
                    layer_id: layer.to_string(),
                }
            );
            return;
        }

        if self.managed && !self.is_map_destroyed() {
            if let Some(engine) = self.engine() {
                let id = self.qualified_layer_id(layer);
                if self.map.debug() {
                    log::debug!("Removing layer `{id}`");
                }
                if let Err(err) = engine.remove_layer(&id) {
                    log::error!("Failed to remove layer `{id}`: {err}");
                }
            }
        }

        self.set_layer(layer, |_| None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::MapCoordinator;
    use crate::engine::MapEvent;
    use crate::options::GeoJsonSourceOptions;
    use crate::tests::{ready_map, Call, TestContainer, TestEngine, TestProvider, BASE_STYLE};
    use crate::MapOptions;

    fn regions() -> GeoJsonData {
        GeoJsonData::Url("https://data.example.com/regions.json".into())
    }

    #[test]
    fn managed_source_is_added_with_data() {
        let (coordinator, engine) = ready_map();
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson())
                .with_geojson(regions());

        source.refresh();

        assert_eq!(
            engine.calls(),
            vec![Call::AddSource(
                "regions".into(),
                SourceOptions::GeoJson(GeoJsonSourceOptions {
                    data: Some(regions()),
                    ..Default::default()
                })
            )]
        );
        assert!(coordinator.context().is_source_defined("regions"));
        assert!(source.context().is_some());
    }

    #[test]
    fn waits_for_ready_map() {
        let engine = TestEngine::default();
        let mut coordinator =
            MapCoordinator::new(TestProvider::new(engine.clone()), MapOptions::new(BASE_STYLE));
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());

        source.refresh();
        assert!(source.context().is_none());

        coordinator.mount(Some(Arc::new(TestContainer::default())));
        engine.fire(MapEvent::StyleData);
        source.refresh();
        assert!(source.context().is_none());

        engine.fire(MapEvent::Load);
        source.refresh();
        assert!(source.context().is_some());
        assert_eq!(engine.count(|c| matches!(c, Call::AddSource(..))), 1);
    }

    #[test]
    fn refresh_is_idempotent() {
        let (coordinator, engine) = ready_map();
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());

        source.refresh();
        source.refresh();

        assert_eq!(engine.count(|c| matches!(c, Call::AddSource(..))), 1);
    }

    #[test]
    fn unmanaged_source_is_only_registered() {
        let (coordinator, engine) = ready_map();
        let mut source = SourceBinder::unmanaged(coordinator.context(), "composite");

        source.refresh();
        assert!(coordinator.context().is_source_defined("composite"));

        source.unmount();
        assert!(!coordinator.context().is_source_defined("composite"));
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn duplicate_source_keeps_first_registration() {
        let (coordinator, engine) = ready_map();
        let mut first =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());
        let mut second =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());

        first.refresh();
        second.refresh();

        assert_eq!(engine.count(|c| matches!(c, Call::AddSource(..))), 1);
        assert!(first.context().is_some());
        assert!(second.context().is_none());

        second.unmount();
        assert!(coordinator.context().is_source_defined("regions"));
    }

    #[test]
    fn duplicate_registered_first_after_style_swap_wins() {
        let (mut coordinator, engine) = ready_map();
        let mut first =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());
        let mut second = SourceBinder::unmanaged(coordinator.context(), "regions");
        first.refresh();
        second.refresh();

        coordinator.set_style("https://style.example.com/dark.json");
        engine.fire(MapEvent::StyleData);
        second.refresh();
        first.refresh();
        engine.clear_calls();

        assert!(first.context().is_none());
        let owner = second.context().expect("second binder owns the source");
        assert!(!owner.managed());

        first.set_geojson(regions());
        first.unmount();

        assert!(engine.calls().is_empty());
        assert!(coordinator.context().is_source_defined("regions"));
    }

    #[test]
    fn failed_add_still_registers() {
        let (coordinator, engine) = ready_map();
        engine.fail_add_source("regions");
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());

        source.refresh();

        assert!(coordinator.context().is_source_defined("regions"));
    }

    #[test]
    fn data_update_is_pushed_once() {
        let (coordinator, engine) = ready_map();
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson())
                .with_geojson(regions());
        source.refresh();
        engine.clear_calls();

        let next = GeoJsonData::Url("https://data.example.com/regions-v2.json".into());
        source.set_geojson(next.clone());
        source.set_geojson(next.clone());

        assert_eq!(
            engine.calls(),
            vec![Call::SetSourceData("regions".into(), next)]
        );
    }

    #[test]
    fn unmount_removes_native_source() {
        let (coordinator, engine) = ready_map();
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());
        source.refresh();
        engine.clear_calls();

        source.unmount();
        source.unmount();

        assert_eq!(engine.calls(), vec![Call::RemoveSource("regions".into())]);
        assert!(coordinator.context().registry().is_empty());
    }

    #[test]
    fn unmount_after_map_destroyed_skips_engine() {
        let (mut coordinator, engine) = ready_map();
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());
        source.refresh();

        coordinator.unmount();
        engine.clear_calls();
        source.unmount();

        assert!(engine.calls().is_empty());
    }

    #[test]
    fn registers_again_after_style_swap() {
        let (mut coordinator, engine) = ready_map();
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());
        source.refresh();

        coordinator.set_style("https://style.example.com/dark.json");
        source.refresh();
        assert!(source.context().is_none());

        engine.fire(MapEvent::StyleData);
        source.refresh();

        assert!(source.context().is_some());
        assert_eq!(engine.count(|c| matches!(c, Call::AddSource(..))), 2);
        assert_eq!(engine.count(|c| matches!(c, Call::RemoveSource(_))), 0);
    }

    #[test]
    fn query_features_is_scoped_to_source() {
        let (coordinator, engine) = ready_map();
        let mut source =
            SourceBinder::managed(coordinator.context(), "regions", SourceOptions::geojson());
        source.refresh();
        engine.set_hits(vec![
            RenderedFeature::new("regions›fill", "regions").with_id(1u64),
            RenderedFeature::new("roads›line", "roads").with_id(2u64),
        ]);

        let context = source.context().expect("registered source");
        let features = context.query_features(None, None);

        assert_eq!(features.len(), 1);
        assert_eq!(features[0].source, "regions");
    }
}
