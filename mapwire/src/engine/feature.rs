use mapwire_types::FeatureId;

use crate::options::PropertyMap;

/// A feature returned by [`MapEngine::query_rendered_features`](super::MapEngine::query_rendered_features).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFeature {
    /// Feature id, if the source provides one.
    pub id: Option<FeatureId>,
    /// Native id of the layer the feature was rendered in.
    pub layer: String,
    /// Source the feature belongs to.
    pub source: String,
    /// Layer inside a vector tile source.
    pub source_layer: Option<String>,
    /// Feature properties.
    pub properties: PropertyMap,
    /// Feature geometry.
    pub geometry: Option<geojson::Geometry>,
}

impl RenderedFeature {
    /// Creates a feature without id, properties or geometry.
    pub fn new(layer: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: None,
            layer: layer.into(),
            source: source.into(),
            source_layer: None,
            properties: PropertyMap::new(),
            geometry: None,
        }
    }

    /// Sets the feature id.
    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the source layer.
    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    /// Address of the feature for feature-state operations. `None` if the feature has no id.
    pub fn target(&self) -> Option<FeatureTarget> {
        Some(FeatureTarget {
            source: self.source.clone(),
            source_layer: self.source_layer.clone(),
            id: self.id.clone()?,
        })
    }
}

/// Address of a feature for feature-state operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FeatureTarget {
    /// Source of the feature.
    pub source: String,
    /// Layer inside a vector tile source.
    pub source_layer: Option<String>,
    /// Feature id.
    pub id: FeatureId,
}
