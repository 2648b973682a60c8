//! Test doubles for the engine, its provider, the container and the frame scheduler.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mapwire_types::{LngLat, LngLatBounds, ScreenPoint};
use parking_lot::Mutex;
use serde_json::Value;

use crate::binder::{FrameCallback, FrameHandle, FrameScheduler};
use crate::coordinator::MapCoordinator;
use crate::engine::{
    ControlId, Cursor, DefaultBehavior, EngineProvider, EventListener, FeatureTarget, ImageData,
    ImageLoadCallback, ListenerId, MapContainer, MapEngine, MapEvent, MapEventKind,
    PopupCloseCallback, PopupId, PopupSpec, RenderedFeature,
};
use crate::error::EngineError;
use crate::options::{
    Control, ControlPosition, FitBoundsOptions, FlyToOptions, GeoJsonData, ImageOptions,
    LayerSpecification, MapOptions, MapStyle, PropertyMap, SourceOptions,
};

pub(crate) const BASE_STYLE: &str = "https://style.example.com/base.json";

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A mounted map with a loaded style.
pub(crate) fn ready_map() -> (MapCoordinator<TestProvider>, TestEngine) {
    init_logger();
    let engine = TestEngine::default();
    let mut coordinator = MapCoordinator::new(
        TestProvider::new(engine.clone()),
        MapOptions::new(BASE_STYLE).with_debug(true),
    );
    coordinator.mount(Some(Arc::new(TestContainer::default())));
    engine.fire(MapEvent::StyleData);
    engine.fire(MapEvent::Load);
    engine.clear_calls();

    (coordinator, engine)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    AddSource(String, SourceOptions),
    RemoveSource(String),
    SetSourceData(String, GeoJsonData),
    AddLayer(LayerSpecification, Option<String>),
    RemoveLayer(String),
    MoveLayer(String, Option<String>),
    SetPaint(String, String, Value),
    SetLayout(String, String, Value),
    SetFilter(String, Option<Value>),
    SetFeatureState(FeatureTarget, PropertyMap),
    RemoveFeatureState(FeatureTarget, Option<String>),
    FitBounds(LngLatBounds, FitBoundsOptions),
    FlyTo(LngLat, FlyToOptions),
    Resize,
    SetStyle(MapStyle),
    AddControl(Control, ControlPosition),
    RemoveControl(ControlId),
    SetDrawFeatures(ControlId, usize),
    LoadImage(String),
    AddImage(String),
    RemoveImage(String),
    AddPopup(PopupId, PopupSpec),
    SetPopupPosition(PopupId, LngLat),
    RemovePopup(PopupId),
    SetCursor(Cursor),
    Remove,
}

struct Listener {
    id: ListenerId,
    kind: MapEventKind,
    once: bool,
    callback: EventListener,
}

struct TestPopup {
    id: PopupId,
    open: bool,
    on_close: PopupCloseCallback,
}

#[derive(Default)]
struct EngineState {
    calls: Mutex<Vec<Call>>,
    listeners: Mutex<Vec<Listener>>,
    hits: Mutex<Vec<RenderedFeature>>,
    layers: Mutex<Vec<String>>,
    images: Mutex<Vec<String>>,
    pending_images: Mutex<Vec<(String, ImageLoadCallback)>>,
    popups: Mutex<Vec<TestPopup>>,
    failing_sources: Mutex<Vec<String>>,
    next_id: AtomicU64,
}

/// Engine that records every call.
///
/// Layers are kept in rendering order (bottom to top). Rendered features are set with
/// [`TestEngine::set_hits`] and filtered by the layers of each query.
#[derive(Clone, Default)]
pub(crate) struct TestEngine {
    state: Arc<EngineState>,
}

impl TestEngine {
    fn record(&self, call: Call) {
        self.state.calls.lock().push(call);
    }

    fn next_id(&self) -> u64 {
        self.state.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.calls.lock().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.state.calls.lock().clear();
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.state.calls.lock().iter().filter(|c| predicate(c)).count()
    }

    /// Features under the pointer, topmost first.
    pub(crate) fn set_hits(&self, hits: Vec<RenderedFeature>) {
        *self.state.hits.lock() = hits;
    }

    pub(crate) fn layer_order(&self) -> Vec<String> {
        self.state.layers.lock().clone()
    }

    pub(crate) fn fail_add_source(&self, id: &str) {
        self.state.failing_sources.lock().push(id.to_string());
    }

    pub(crate) fn fire(&self, event: MapEvent) -> DefaultBehavior {
        let kind = event.kind();
        let callbacks: Vec<EventListener> = {
            let mut listeners = self.state.listeners.lock();
            let callbacks = listeners
                .iter()
                .filter(|l| l.kind == kind)
                .map(|l| l.callback.clone())
                .collect();
            listeners.retain(|l| !(l.kind == kind && l.once));
            callbacks
        };

        let mut result = DefaultBehavior::Allow;
        for callback in callbacks {
            if callback(&event) == DefaultBehavior::Prevent {
                result = DefaultBehavior::Prevent;
            }
        }

        result
    }

    pub(crate) fn listener_count(&self, kind: MapEventKind) -> usize {
        self.state
            .listeners
            .lock()
            .iter()
            .filter(|l| l.kind == kind)
            .count()
    }

    pub(crate) fn complete_image(&self, url: &str, result: Result<ImageData, EngineError>) {
        let callback = {
            let mut pending = self.state.pending_images.lock();
            let index = pending
                .iter()
                .position(|(pending_url, _)| pending_url == url)
                .expect("image is loading");
            pending.remove(index).1
        };

        callback(result);
    }

    pub(crate) fn close_popup(&self, id: PopupId) {
        let on_close = {
            let mut popups = self.state.popups.lock();
            let popup = popups
                .iter_mut()
                .find(|p| p.id == id)
                .expect("popup exists");
            popup.open = false;
            popup.on_close.clone()
        };

        on_close();
    }

    fn add_listener(&self, kind: MapEventKind, callback: EventListener, once: bool) -> ListenerId {
        let id = ListenerId(self.next_id());
        self.state.listeners.lock().push(Listener {
            id,
            kind,
            once,
            callback,
        });
        id
    }
}

impl MapEngine for TestEngine {
    fn add_source(&self, id: &str, options: &SourceOptions) -> Result<(), EngineError> {
        self.record(Call::AddSource(id.to_string(), options.clone()));
        if self.state.failing_sources.lock().iter().any(|s| s == id) {
            return Err(EngineError::new("addSource", "invalid source"));
        }
        Ok(())
    }

    fn remove_source(&self, id: &str) -> Result<(), EngineError> {
        self.record(Call::RemoveSource(id.to_string()));
        Ok(())
    }

    fn set_source_data(&self, id: &str, data: &GeoJsonData) -> Result<(), EngineError> {
        self.record(Call::SetSourceData(id.to_string(), data.clone()));
        Ok(())
    }

    fn add_layer(
        &self,
        layer: &LayerSpecification,
        before: Option<&str>,
    ) -> Result<(), EngineError> {
        self.record(Call::AddLayer(layer.clone(), before.map(str::to_string)));
        let mut layers = self.state.layers.lock();
        let index = before
            .and_then(|before| layers.iter().position(|l| l == before))
            .unwrap_or(layers.len());
        layers.insert(index, layer.id.clone());
        Ok(())
    }

    fn remove_layer(&self, id: &str) -> Result<(), EngineError> {
        self.record(Call::RemoveLayer(id.to_string()));
        self.state.layers.lock().retain(|l| l != id);
        Ok(())
    }

    fn has_layer(&self, id: &str) -> bool {
        self.state.layers.lock().iter().any(|l| l == id)
    }

    fn move_layer(&self, id: &str, before: Option<&str>) -> Result<(), EngineError> {
        self.record(Call::MoveLayer(id.to_string(), before.map(str::to_string)));
        let mut layers = self.state.layers.lock();
        layers.retain(|l| l != id);
        let index = before
            .and_then(|before| layers.iter().position(|l| l == before))
            .unwrap_or(layers.len());
        layers.insert(index, id.to_string());
        Ok(())
    }

    fn set_paint_property(
        &self,
        layer: &str,
        name: &str,
        value: &Value,
    ) -> Result<(), EngineError> {
        self.record(Call::SetPaint(layer.into(), name.into(), value.clone()));
        Ok(())
    }

    fn set_layout_property(
        &self,
        layer: &str,
        name: &str,
        value: &Value,
    ) -> Result<(), EngineError> {
        self.record(Call::SetLayout(layer.into(), name.into(), value.clone()));
        Ok(())
    }

    fn set_filter(&self, layer: &str, filter: Option<&Value>) -> Result<(), EngineError> {
        self.record(Call::SetFilter(layer.into(), filter.cloned()));
        Ok(())
    }

    fn set_feature_state(&self, target: &FeatureTarget, state: &PropertyMap) {
        self.record(Call::SetFeatureState(target.clone(), state.clone()));
    }

    fn remove_feature_state(&self, target: &FeatureTarget, key: Option<&str>) {
        self.record(Call::RemoveFeatureState(
            target.clone(),
            key.map(str::to_string),
        ));
    }

    fn query_rendered_features(
        &self,
        _point: ScreenPoint,
        layers: &[String],
    ) -> Vec<RenderedFeature> {
        self.state
            .hits
            .lock()
            .iter()
            .filter(|f| layers.contains(&f.layer))
            .cloned()
            .collect()
    }

    fn query_source_features(
        &self,
        source: &str,
        source_layer: Option<&str>,
        _filter: Option<&Value>,
    ) -> Vec<RenderedFeature> {
        self.state
            .hits
            .lock()
            .iter()
            .filter(|f| f.source == source)
            .filter(|f| source_layer.is_none() || f.source_layer.as_deref() == source_layer)
            .cloned()
            .collect()
    }

    fn fit_bounds(&self, bounds: &LngLatBounds, options: &FitBoundsOptions) {
        self.record(Call::FitBounds(*bounds, *options));
    }

    fn fly_to(&self, center: LngLat, options: &FlyToOptions) {
        self.record(Call::FlyTo(center, options.clone()));
    }

    fn resize(&self) {
        self.record(Call::Resize);
    }

    fn set_style(&self, style: &MapStyle) {
        self.record(Call::SetStyle(style.clone()));
        self.state.layers.lock().clear();
        self.state.images.lock().clear();
    }

    fn on(&self, kind: MapEventKind, listener: EventListener) -> ListenerId {
        self.add_listener(kind, listener, false)
    }

    fn once(&self, kind: MapEventKind, listener: EventListener) -> ListenerId {
        self.add_listener(kind, listener, true)
    }

    fn off(&self, listener: ListenerId) {
        self.state.listeners.lock().retain(|l| l.id != listener);
    }

    fn add_control(&self, control: &Control, position: ControlPosition) -> ControlId {
        self.record(Call::AddControl(control.clone(), position));
        ControlId(self.next_id())
    }

    fn remove_control(&self, control: ControlId) {
        self.record(Call::RemoveControl(control));
    }

    fn set_draw_features(
        &self,
        control: ControlId,
        features: &geojson::FeatureCollection,
    ) -> Result<(), EngineError> {
        self.record(Call::SetDrawFeatures(control, features.features.len()));
        Ok(())
    }

    fn load_image(&self, url: &str, on_complete: ImageLoadCallback) {
        self.record(Call::LoadImage(url.to_string()));
        self.state
            .pending_images
            .lock()
            .push((url.to_string(), on_complete));
    }

    fn add_image(
        &self,
        name: &str,
        _image: &ImageData,
        _options: &ImageOptions,
    ) -> Result<(), EngineError> {
        self.record(Call::AddImage(name.to_string()));
        self.state.images.lock().push(name.to_string());
        Ok(())
    }

    fn remove_image(&self, name: &str) {
        self.record(Call::RemoveImage(name.to_string()));
        self.state.images.lock().retain(|i| i != name);
    }

    fn has_image(&self, name: &str) -> bool {
        self.state.images.lock().iter().any(|i| i == name)
    }

    fn add_popup(&self, popup: &PopupSpec, on_close: PopupCloseCallback) -> PopupId {
        let id = PopupId(self.next_id());
        self.record(Call::AddPopup(id, popup.clone()));
        self.state.popups.lock().push(TestPopup {
            id,
            open: true,
            on_close,
        });
        id
    }

    fn set_popup_position(&self, popup: PopupId, position: LngLat) {
        self.record(Call::SetPopupPosition(popup, position));
    }

    fn remove_popup(&self, popup: PopupId) {
        self.record(Call::RemovePopup(popup));
        if let Some(p) = self.state.popups.lock().iter_mut().find(|p| p.id == popup) {
            p.open = false;
        }
    }

    fn is_popup_open(&self, popup: PopupId) -> bool {
        self.state
            .popups
            .lock()
            .iter()
            .any(|p| p.id == popup && p.open)
    }

    fn set_cursor(&self, cursor: Cursor) {
        self.record(Call::SetCursor(cursor));
    }

    fn remove(&self) {
        self.record(Call::Remove);
    }
}

pub(crate) struct TestProvider {
    engine: TestEngine,
    supported: bool,
    failure: Option<String>,
}

impl TestProvider {
    pub(crate) fn new(engine: TestEngine) -> Self {
        Self {
            engine,
            supported: true,
            failure: None,
        }
    }

    pub(crate) fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(TestEngine::default())
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(TestEngine::default())
        }
    }
}

impl EngineProvider for TestProvider {
    type Engine = TestEngine;

    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(
        &self,
        _container: &Arc<dyn MapContainer>,
        _options: &MapOptions,
    ) -> Result<TestEngine, EngineError> {
        match &self.failure {
            Some(message) => Err(EngineError::new("Map", message.as_str())),
            None => Ok(self.engine.clone()),
        }
    }
}

#[derive(Default)]
pub(crate) struct TestContainer {
    classes: Mutex<Vec<String>>,
}

impl TestContainer {
    pub(crate) fn has_class(&self, class: &str) -> bool {
        self.classes.lock().iter().any(|c| c == class)
    }
}

impl MapContainer for TestContainer {
    fn toggle_class(&self, class: &str, enabled: bool) {
        let mut classes = self.classes.lock();
        classes.retain(|c| c != class);
        if enabled {
            classes.push(class.to_string());
        }
    }
}

/// Frame scheduler driven by the test.
#[derive(Default)]
pub(crate) struct ManualFrames {
    pending: Mutex<Vec<(FrameHandle, FrameCallback)>>,
    next_id: AtomicU64,
}

impl ManualFrames {
    /// Runs all callbacks requested before the call.
    pub(crate) fn tick(&self, timestamp: f64) {
        let pending = std::mem::take(&mut *self.pending.lock());
        for (_, callback) in pending {
            callback(timestamp);
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        let handle = FrameHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.pending.lock().push((handle, callback));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.pending.lock().retain(|(h, _)| *h != handle);
    }
}
