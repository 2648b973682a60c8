use ahash::AHashMap;
use mapwire_types::FeatureId;
use serde_json::Value;

use crate::binder::{Binding, SourceContext};
use crate::engine::{FeatureTarget, MapEngine};
use crate::options::PropertyMap;

/// Value of the feature-state key for one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureAttribute {
    /// Feature id.
    pub id: FeatureId,
    /// State value.
    pub value: Value,
}

impl FeatureAttribute {
    /// Creates a new attribute.
    pub fn new(id: impl Into<FeatureId>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }
}

struct Applied {
    epoch: u64,
    source_layer: Option<String>,
    attributes: Vec<FeatureAttribute>,
}

/// Keeps one feature-state key of source features in sync with a list of attributes.
///
/// Only the differences are sent to the engine: features that disappeared from the list get the
/// key removed, features with a new or changed value get it set.
pub struct FeatureStateBinder<E: MapEngine> {
    source: SourceContext<E>,
    key: String,
    source_layer: Option<String>,
    attributes: Vec<FeatureAttribute>,
    applied: Option<Applied>,
}

impl<E: MapEngine> FeatureStateBinder<E> {
    /// Creates a binder of the feature-state `key` in the given source.
    pub fn new(source: SourceContext<E>, key: impl Into<String>) -> Self {
        Self {
            source,
            key: key.into(),
            source_layer: None,
            attributes: vec![],
            applied: None,
        }
    }

    /// Sets the source layer of the features.
    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    /// Sets the attributes.
    pub fn with_attributes(mut self, attributes: Vec<FeatureAttribute>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Replaces the attributes.
    pub fn set_attributes(&mut self, attributes: Vec<FeatureAttribute>) {
        if self.attributes == attributes {
            return;
        }

        self.attributes = attributes;
        self.sync();
    }

    /// Changes the source layer. The state is moved to features of the new source layer.
    pub fn set_source_layer(&mut self, source_layer: Option<String>) {
        if self.source_layer == source_layer {
            return;
        }

        self.source_layer = source_layer;
        self.sync();
    }

    fn target(&self, source_layer: &Option<String>, id: &FeatureId) -> FeatureTarget {
        FeatureTarget {
            source: self.source.source_key().to_string(),
            source_layer: source_layer.clone(),
            id: id.clone(),
        }
    }

    fn set(&self, engine: &E, attribute: &FeatureAttribute) {
        let mut state = PropertyMap::new();
        state.insert(self.key.clone(), attribute.value.clone());
        engine.set_feature_state(&self.target(&self.source_layer, &attribute.id), &state);
    }

    fn remove(&self, engine: &E, source_layer: &Option<String>, id: &FeatureId) {
        engine.remove_feature_state(&self.target(source_layer, id), Some(&self.key));
    }

    fn sync(&mut self) {
        let (Some(generation), Some(engine)) = (self.source.style(), self.source.engine()) else {
            return;
        };

        if !self.source.is_registered() {
            return;
        }

        match self.applied.take() {
            Some(applied) if applied.epoch == generation.epoch() => {
                if applied.source_layer == self.source_layer {
                    let previous: AHashMap<&FeatureId, &Value> = applied
                        .attributes
                        .iter()
                        .map(|a| (&a.id, &a.value))
                        .collect();
                    let current: AHashMap<&FeatureId, &Value> = self
                        .attributes
                        .iter()
                        .map(|a| (&a.id, &a.value))
                        .collect();

                    for attribute in &applied.attributes {
                        if !current.contains_key(&attribute.id) {
                            self.remove(&engine, &applied.source_layer, &attribute.id);
                        }
                    }

                    for attribute in &self.attributes {
                        if previous.get(&attribute.id) != Some(&&attribute.value) {
                            self.set(&engine, attribute);
                        }
                    }
                } else {
                    for attribute in &applied.attributes {
                        self.remove(&engine, &applied.source_layer, &attribute.id);
                    }
                    for attribute in &self.attributes {
                        self.set(&engine, attribute);
                    }
                }
            }
            _ => {
                for attribute in &self.attributes {
                    self.set(&engine, attribute);
                }
            }
        }

        self.applied = Some(Applied {
            epoch: generation.epoch(),
            source_layer: self.source_layer.clone(),
            attributes: self.attributes.clone(),
        });
    }
}

impl<E: MapEngine> Binding for FeatureStateBinder<E> {
    fn refresh(&mut self) {
        let current_epoch = self.source.style().map(|s| s.epoch());
        if self.applied.as_ref().map(|a| a.epoch) == current_epoch {
            return;
        }

        self.sync();
    }

    fn unmount(&mut self) {
        let Some(applied) = self.applied.take() else {
            return;
        };

        if self.source.is_map_destroyed()
            || !self.source.is_registered()
            || self.source.style().map(|s| s.epoch()) != Some(applied.epoch)
        {
            return;
        }

        let Some(engine) = self.source.engine() else {
            return;
        };

        for attribute in &applied.attributes {
            self.remove(&engine, &applied.source_layer, &attribute.id);
        }
    }
}

impl<E: MapEngine> Drop for FeatureStateBinder<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::binder::SourceBinder;
    use crate::options::{SourceOptions, TileSourceOptions};
    use crate::tests::{ready_map, Call};

    fn state(key: &str, value: Value) -> PropertyMap {
        let mut state = PropertyMap::new();
        state.insert(key.to_string(), value);
        state
    }

    fn target(id: u64, source_layer: Option<&str>) -> FeatureTarget {
        FeatureTarget {
            source: "admin".into(),
            source_layer: source_layer.map(str::to_string),
            id: FeatureId::Number(id),
        }
    }

    #[test]
    fn only_differences_are_sent() {
        let (coordinator, engine) = ready_map();
        let mut source = SourceBinder::managed(
            coordinator.context(),
            "admin",
            SourceOptions::Vector(TileSourceOptions::default()),
        );
        source.refresh();
        engine.clear_calls();

        let context = source.context().expect("registered");
        let mut binder = FeatureStateBinder::new(context, "population")
            .with_source_layer("regions")
            .with_attributes(vec![
                FeatureAttribute::new(1u64, 100),
                FeatureAttribute::new(2u64, 200),
            ]);
        binder.refresh();
        binder.refresh();
        assert_eq!(engine.calls().len(), 2);
        engine.clear_calls();

        binder.set_attributes(vec![
            FeatureAttribute::new(2u64, 250),
            FeatureAttribute::new(3u64, 300),
        ]);

        assert_eq!(
            engine.calls(),
            vec![
                Call::RemoveFeatureState(target(1, Some("regions")), Some("population".into())),
                Call::SetFeatureState(target(2, Some("regions")), state("population", json!(250))),
                Call::SetFeatureState(target(3, Some("regions")), state("population", json!(300))),
            ]
        );
    }

    #[test]
    fn source_layer_change_moves_state() {
        let (coordinator, engine) = ready_map();
        let mut source = SourceBinder::managed(
            coordinator.context(),
            "admin",
            SourceOptions::Vector(TileSourceOptions::default()),
        );
        source.refresh();

        let mut binder = FeatureStateBinder::new(source.context().expect("registered"), "selected")
            .with_source_layer("regions")
            .with_attributes(vec![FeatureAttribute::new(1u64, true)]);
        binder.refresh();
        engine.clear_calls();

        binder.set_source_layer(Some("districts".into()));

        assert_eq!(
            engine.calls(),
            vec![
                Call::RemoveFeatureState(target(1, Some("regions")), Some("selected".into())),
                Call::SetFeatureState(target(1, Some("districts")), state("selected", json!(true))),
            ]
        );
    }

    #[test]
    fn unmount_removes_state() {
        let (coordinator, engine) = ready_map();
        let mut source = SourceBinder::managed(
            coordinator.context(),
            "admin",
            SourceOptions::Vector(TileSourceOptions::default()),
        );
        source.refresh();

        let mut binder = FeatureStateBinder::new(source.context().expect("registered"), "selected")
            .with_attributes(vec![FeatureAttribute::new(1u64, true)]);
        binder.refresh();
        engine.clear_calls();

        binder.unmount();
        binder.unmount();

        assert_eq!(
            engine.calls(),
            vec![Call::RemoveFeatureState(target(1, None), Some("selected".into()))]
        );
    }

    #[test]
    fn unmount_after_map_destroyed_skips_engine() {
        let (mut coordinator, engine) = ready_map();
        let mut source = SourceBinder::managed(
            coordinator.context(),
            "admin",
            SourceOptions::Vector(TileSourceOptions::default()),
        );
        source.refresh();
        let mut binder = FeatureStateBinder::new(source.context().expect("registered"), "selected")
            .with_attributes(vec![FeatureAttribute::new(1u64, true)]);
        binder.refresh();

        coordinator.unmount();
        engine.clear_calls();
        binder.unmount();

        assert!(engine.calls().is_empty());
    }
}
