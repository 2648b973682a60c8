use mapwire_types::LngLat;
use serde::{Deserialize, Serialize};

/// Data of a GeoJSON source: a URL or an inline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeoJsonData {
    /// URL of a GeoJSON document.
    Url(String),
    /// Inline GeoJSON.
    Inline(geojson::GeoJson),
}

impl From<geojson::GeoJson> for GeoJsonData {
    fn from(value: geojson::GeoJson) -> Self {
        Self::Inline(value)
    }
}

impl From<geojson::FeatureCollection> for GeoJsonData {
    fn from(value: geojson::FeatureCollection) -> Self {
        Self::Inline(geojson::GeoJson::FeatureCollection(value))
    }
}

/// Options of a GeoJSON source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoJsonSourceOptions {
    /// Source data. Usually set through the binder rather than here.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GeoJsonData>,
    /// Clusters point features.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<bool>,
    /// Cluster radius in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_radius: Option<f64>,
    /// Maximum zoom level to cluster points on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_max_zoom: Option<f64>,
    /// Property used as the feature id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promote_id: Option<String>,
    /// Assigns generated ids to features without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generate_id: Option<bool>,
    /// Douglas-Peucker simplification tolerance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    /// Tile buffer size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer: Option<u32>,
    /// Maximum zoom level tiles are generated for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
}

/// Options of a vector tile source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileSourceOptions {
    /// URL of a TileJSON document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Tile URL templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles: Option<Vec<String>>,
    /// Minimum zoom level of the tiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    /// Maximum zoom level of the tiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    /// Attribution shown in the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    /// Property used as the feature id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promote_id: Option<String>,
}

/// Options of a raster or raster-dem source.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterSourceOptions {
    /// URL of a TileJSON document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Tile URL templates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiles: Option<Vec<String>>,
    /// Size of a tile in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_size: Option<u32>,
    /// Minimum zoom level of the tiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minzoom: Option<f64>,
    /// Maximum zoom level of the tiles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxzoom: Option<f64>,
    /// Attribution shown in the map.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
}

/// Options of an image source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSourceOptions {
    /// URL of the image.
    pub url: String,
    /// Corners of the image: top left, top right, bottom right, bottom left.
    pub coordinates: [LngLat; 4],
}

/// Options of a source, tagged by the source type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SourceOptions {
    /// GeoJSON source.
    #[serde(rename = "geojson")]
    GeoJson(GeoJsonSourceOptions),
    /// Vector tiles.
    Vector(TileSourceOptions),
    /// Raster tiles.
    Raster(RasterSourceOptions),
    /// Elevation tiles.
    RasterDem(RasterSourceOptions),
    /// Georeferenced image.
    Image(ImageSourceOptions),
}

impl SourceOptions {
    /// GeoJSON source without data.
    pub fn geojson() -> Self {
        Self::GeoJson(GeoJsonSourceOptions::default())
    }

    /// Returns a copy of the options with `data` set, if these are GeoJSON options.
    ///
    /// Returns `None` for other source types.
    pub fn with_geojson_data(&self, data: GeoJsonData) -> Option<Self> {
        match self {
            SourceOptions::GeoJson(options) => Some(SourceOptions::GeoJson(GeoJsonSourceOptions {
                data: Some(data),
                ..options.clone()
            })),
            _ => None,
        }
    }
}
