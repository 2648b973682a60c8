use std::sync::Arc;

use mapwire_types::LngLat;
use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;

use crate::binder::Binding;
use crate::coordinator::MapContext;
use crate::engine::{MapEngine, PopupId, PopupSpec};
use crate::options::PopupOptions;

type HideHandler = Arc<dyn Fn() + MaybeSend + MaybeSync>;

/// Shows a popup with host-rendered content.
///
/// Popup options and pointer tracking are read when the popup is created. The popup is created
/// again every time it is unhidden.
pub struct PopupBinder<E: MapEngine> {
    context: MapContext<E>,
    content: String,
    options: PopupOptions,
    track_pointer: bool,
    coordinates: Option<LngLat>,
    hidden: bool,
    on_hide: Arc<RwLock<Option<HideHandler>>>,
    popup: Option<PopupId>,
}

impl<E: MapEngine> PopupBinder<E> {
    /// Creates a binder of a popup showing `content` (a host handle, e.g. a DOM element id).
    pub fn new(context: MapContext<E>, content: impl Into<String>, options: PopupOptions) -> Self {
        Self {
            context,
            content: content.into(),
            options,
            track_pointer: false,
            coordinates: None,
            hidden: false,
            on_hide: Arc::new(RwLock::new(None)),
            popup: None,
        }
    }

    /// Makes the popup follow the pointer.
    pub fn with_track_pointer(mut self, track_pointer: bool) -> Self {
        self.track_pointer = track_pointer;
        self
    }

    /// Sets the position of the popup.
    pub fn with_coordinates(mut self, coordinates: LngLat) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    /// Sets the handler called when the engine closes the popup.
    pub fn with_on_hide(self, handler: impl Fn() + MaybeSend + MaybeSync + 'static) -> Self {
        *self.on_hide.write() = Some(Arc::new(handler));
        self
    }

    /// Id of the popup in the engine, if it is shown.
    pub fn popup_id(&self) -> Option<PopupId> {
        self.popup
    }

    /// Moves the popup. Ignored while the popup tracks the pointer.
    pub fn set_coordinates(&mut self, coordinates: LngLat) {
        if self.coordinates == Some(coordinates) {
            return;
        }

        self.coordinates = Some(coordinates);
        if self.track_pointer {
            return;
        }

        if let (Some(popup), Some(engine)) = (self.popup, self.context.engine()) {
            engine.set_popup_position(popup, coordinates);
        }
    }

    /// Hides or shows the popup.
    pub fn set_hidden(&mut self, hidden: bool) {
        if self.hidden == hidden {
            return;
        }

        self.hidden = hidden;
        if hidden {
            self.remove();
        } else {
            self.refresh();
        }
    }

    /// Replaces the handler called when the engine closes the popup.
    pub fn set_on_hide(&mut self, handler: Option<HideHandler>) {
        *self.on_hide.write() = handler;
    }

    fn remove(&mut self) {
        let Some(popup) = self.popup.take() else {
            return;
        };

        if self.context.is_map_destroyed() {
            return;
        }

        if let Some(engine) = self.context.engine() {
            if engine.is_popup_open(popup) {
                engine.remove_popup(popup);
            }
        }
    }
}

impl<E: MapEngine> Binding for PopupBinder<E> {
    fn refresh(&mut self) {
        if self.hidden || self.popup.is_some() {
            return;
        }

        let Some(engine) = self.context.engine() else {
            return;
        };

        let spec = PopupSpec {
            options: self.options.clone(),
            position: self.coordinates,
            track_pointer: self.track_pointer,
            content: self.content.clone(),
        };

        let on_hide = self.on_hide.clone();
        self.popup = Some(engine.add_popup(
            &spec,
            Arc::new(move || {
                let handler = on_hide.read().clone();
                if let Some(handler) = handler {
                    handler();
                }
            }),
        ));
    }

    fn unmount(&mut self) {
        self.remove();
    }
}

impl<E: MapEngine> Drop for PopupBinder<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}
