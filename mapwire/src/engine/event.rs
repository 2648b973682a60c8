use mapwire_types::{LngLat, ScreenPoint};

/// Kinds of engine events mapwire subscribes to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    /// `click`
    Click,
    /// `dblclick`
    DoubleClick,
    /// `mousemove`
    MouseMove,
    /// `mousedown`
    MouseDown,
    /// `mouseup`
    MouseUp,
    /// `resize`
    Resize,
    /// `styledata`: the style finished loading.
    StyleData,
    /// `load`: the engine is fully ready.
    Load,
    /// `draw.create`
    DrawCreate,
    /// `draw.update`
    DrawUpdate,
    /// `draw.delete`
    DrawDelete,
    /// `draw.modechange`
    DrawModeChange,
}

impl MapEventKind {
    /// Name of the event in GL engines.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapEventKind::Click => "click",
            MapEventKind::DoubleClick => "dblclick",
            MapEventKind::MouseMove => "mousemove",
            MapEventKind::MouseDown => "mousedown",
            MapEventKind::MouseUp => "mouseup",
            MapEventKind::Resize => "resize",
            MapEventKind::StyleData => "styledata",
            MapEventKind::Load => "load",
            MapEventKind::DrawCreate => "draw.create",
            MapEventKind::DrawUpdate => "draw.update",
            MapEventKind::DrawDelete => "draw.delete",
            MapEventKind::DrawModeChange => "draw.modechange",
        }
    }

    /// Pointer events the coordinator listens to.
    pub const POINTER: [MapEventKind; 5] = [
        MapEventKind::Click,
        MapEventKind::DoubleClick,
        MapEventKind::MouseMove,
        MapEventKind::MouseDown,
        MapEventKind::MouseUp,
    ];
}

/// Position of the pointer at the moment of an event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerEvent {
    /// Pixel position on the canvas.
    pub point: ScreenPoint,
    /// Geographic position under the pointer.
    pub lng_lat: LngLat,
}

impl PointerEvent {
    /// Creates a new pointer event.
    pub fn new(point: ScreenPoint, lng_lat: LngLat) -> Self {
        Self { point, lng_lat }
    }
}

/// Mode of a draw control.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawMode {
    /// `simple_select`
    SimpleSelect,
    /// `direct_select`
    DirectSelect,
    /// `draw_point`
    DrawPoint,
    /// `draw_line_string`
    DrawLineString,
    /// `draw_polygon`
    DrawPolygon,
}

/// Event emitted by a draw control.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEvent {
    /// Features were drawn.
    Create(Vec<geojson::Feature>),
    /// Features were modified.
    Update(Vec<geojson::Feature>),
    /// Features were deleted.
    Delete(Vec<geojson::Feature>),
    /// Draw mode changed.
    ModeChange(DrawMode),
}

/// Event delivered by the engine to subscribed listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A click on the canvas.
    Click(PointerEvent),
    /// A double click on the canvas.
    DoubleClick(PointerEvent),
    /// Pointer moved over the canvas.
    MouseMove(PointerEvent),
    /// A mouse button was pressed.
    MouseDown(PointerEvent),
    /// A mouse button was released.
    MouseUp(PointerEvent),
    /// The canvas was resized.
    Resize,
    /// The style finished loading.
    StyleData,
    /// The engine is fully ready.
    Load,
    /// Draw control event.
    Draw(DrawEvent),
}

impl MapEvent {
    /// Kind of the event.
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::Click(_) => MapEventKind::Click,
            MapEvent::DoubleClick(_) => MapEventKind::DoubleClick,
            MapEvent::MouseMove(_) => MapEventKind::MouseMove,
            MapEvent::MouseDown(_) => MapEventKind::MouseDown,
            MapEvent::MouseUp(_) => MapEventKind::MouseUp,
            MapEvent::Resize => MapEventKind::Resize,
            MapEvent::StyleData => MapEventKind::StyleData,
            MapEvent::Load => MapEventKind::Load,
            MapEvent::Draw(DrawEvent::Create(_)) => MapEventKind::DrawCreate,
            MapEvent::Draw(DrawEvent::Update(_)) => MapEventKind::DrawUpdate,
            MapEvent::Draw(DrawEvent::Delete(_)) => MapEventKind::DrawDelete,
            MapEvent::Draw(DrawEvent::ModeChange(_)) => MapEventKind::DrawModeChange,
        }
    }
}

/// Value returned by an [`EventListener`](super::EventListener) telling the engine whether its
/// own handling of the gesture (e.g. panning) should run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DefaultBehavior {
    /// Engine default handling runs.
    #[default]
    Allow,
    /// Engine default handling is suppressed for this gesture.
    Prevent,
}
