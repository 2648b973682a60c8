use crate::binder::Binding;
use crate::coordinator::MapContext;
use crate::engine::MapEngine;

/// Size and position of the map container element.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ContainerRect {
    /// Left edge in pixels.
    pub x: f64,
    /// Top edge in pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

/// Resizes the map canvas when the container element changes its size.
///
/// The host feeds observed container rectangles (usually from a debounced resize observer) into
/// [`ContainerBinder::observe`].
pub struct ContainerBinder<E: MapEngine> {
    context: MapContext<E>,
    last: Option<ContainerRect>,
}

impl<E: MapEngine> ContainerBinder<E> {
    /// Creates a binder.
    pub fn new(context: MapContext<E>) -> Self {
        Self {
            context,
            last: None,
        }
    }

    /// Reports the current container rectangle.
    pub fn observe(&mut self, rect: ContainerRect) {
        if self.last == Some(rect) {
            return;
        }

        self.last = Some(rect);
        if let Some(engine) = self.context.engine() {
            engine.resize();
        }
    }
}

impl<E: MapEngine> Binding for ContainerBinder<E> {
    fn refresh(&mut self) {}

    fn unmount(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{ready_map, Call};

    #[test]
    fn resizes_on_change() {
        let (coordinator, engine) = ready_map();
        let mut binder = ContainerBinder::new(coordinator.context());
        let rect = ContainerRect {
            width: 800.0,
            height: 600.0,
            ..Default::default()
        };

        binder.observe(rect);
        binder.observe(rect);
        binder.observe(ContainerRect {
            height: 400.0,
            ..rect
        });

        assert_eq!(engine.calls(), vec![Call::Resize, Call::Resize]);
    }
}
