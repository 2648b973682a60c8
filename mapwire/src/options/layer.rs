use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::options::PropertyMap;

/// Type of a style layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    /// Filled polygons.
    Fill,
    /// Lines.
    Line,
    /// Icons and labels.
    Symbol,
    /// Circles.
    Circle,
    /// Heatmap.
    Heatmap,
    /// Extruded polygons.
    FillExtrusion,
    /// Raster tiles.
    Raster,
    /// Hillshading from elevation tiles.
    Hillshade,
}

/// Options of a style layer, without its id and source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LayerOptions {
    /// Layer type.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Layer of a vector tile source to render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_layer: Option<String>,
    /// Minimum zoom level the layer is visible at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    /// Maximum zoom level the layer is visible at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    /// Paint properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paint: Option<PropertyMap>,
    /// Layout properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<PropertyMap>,
    /// Filter expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    /// Arbitrary metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl LayerOptions {
    /// Options of a layer of the given type.
    pub fn new(kind: LayerKind) -> Self {
        Self {
            kind,
            source_layer: None,
            minzoom: None,
            maxzoom: None,
            paint: None,
            layout: None,
            filter: None,
            metadata: None,
        }
    }

    /// Sets the source layer.
    pub fn with_source_layer(mut self, source_layer: impl Into<String>) -> Self {
        self.source_layer = Some(source_layer.into());
        self
    }

    /// Sets one paint property.
    pub fn with_paint_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.paint
            .get_or_insert_with(PropertyMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets one layout property.
    pub fn with_layout_property(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.layout
            .get_or_insert_with(PropertyMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets the filter expression.
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Sets the zoom range the layer is visible at.
    pub fn with_zoom_range(mut self, minzoom: Option<f64>, maxzoom: Option<f64>) -> Self {
        self.minzoom = minzoom;
        self.maxzoom = maxzoom;
        self
    }
}

/// Full definition of a layer, as passed to [`MapEngine::add_layer`](crate::engine::MapEngine::add_layer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpecification {
    /// Native layer id.
    pub id: String,
    /// Source id.
    pub source: String,
    /// Layer options.
    #[serde(flatten)]
    pub options: LayerOptions,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn layer_specification_serialization() {
        let spec = LayerSpecification {
            id: "regions›fill".into(),
            source: "regions".into(),
            options: LayerOptions::new(LayerKind::FillExtrusion)
                .with_source_layer("buildings")
                .with_paint_property("fill-extrusion-color", "#aaa")
                .with_zoom_range(Some(14.0), None),
        };

        let value = serde_json::to_value(&spec).expect("serializable");
        assert_eq!(
            value,
            json!({
                "id": "regions›fill",
                "source": "regions",
                "type": "fill-extrusion",
                "source-layer": "buildings",
                "minzoom": 14.0,
                "paint": {"fill-extrusion-color": "#aaa"},
            })
        );
    }

    #[test]
    fn layer_options_deserialization() {
        let options: LayerOptions = serde_json::from_value(json!({
            "type": "line",
            "layout": {"line-cap": "round"},
            "filter": ["==", "kind", "road"],
        }))
        .expect("valid options");

        assert_eq!(options.kind, LayerKind::Line);
        assert_eq!(options.filter, Some(json!(["==", "kind", "road"])));
        assert_eq!(
            options.layout.and_then(|l| l.get("line-cap").cloned()),
            Some(json!("round"))
        );
    }
}
