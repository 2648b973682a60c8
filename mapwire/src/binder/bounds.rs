use std::time::Duration;

use mapwire_types::{LngLatBounds, Padding};

use crate::binder::Binding;
use crate::coordinator::{BoundsRequest, MapContext};
use crate::engine::MapEngine;
use crate::options::{FitBoundsOptions, DEFAULT_FIT_DURATION};

/// Fits the viewport to bounds whenever the bounds or the padding change.
///
/// The last fitted bounds are remembered by the map and fitted again after every resize.
pub struct BoundsBinder<E: MapEngine> {
    context: MapContext<E>,
    bounds: Option<LngLatBounds>,
    padding: Padding,
    duration: Duration,
    applied: Option<(LngLatBounds, Padding)>,
}

impl<E: MapEngine> BoundsBinder<E> {
    /// Binder without bounds, zero padding and the default animation duration.
    pub fn new(context: MapContext<E>) -> Self {
        Self {
            context,
            bounds: None,
            padding: Padding::default(),
            duration: DEFAULT_FIT_DURATION,
            applied: None,
        }
    }

    /// Sets the bounds.
    pub fn with_bounds(mut self, bounds: LngLatBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Sets the padding.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the animation duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Changes the bounds and fits them. `None` keeps the viewport where it is.
    pub fn set_bounds(&mut self, bounds: Option<LngLatBounds>) {
        self.bounds = bounds;
        self.refresh();
    }

    /// Changes the padding and fits the bounds again.
    pub fn set_padding(&mut self, padding: Padding) {
        self.padding = padding;
        self.refresh();
    }

    /// Changes the animation duration. Takes effect on the next fit.
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }
}

impl<E: MapEngine> Binding for BoundsBinder<E> {
    fn refresh(&mut self) {
        let Some(engine) = self.context.engine() else {
            self.applied = None;
            return;
        };

        let Some(bounds) = self.bounds else {
            return;
        };

        if self.applied == Some((bounds, self.padding)) {
            return;
        }

        let request = BoundsRequest {
            bounds,
            options: FitBoundsOptions {
                padding: self.padding,
                duration: self.duration,
            },
        };

        if self.context.debug() {
            log::debug!("Fitting bounds {bounds:?}");
        }

        self.context.set_bounds_request(Some(request));
        engine.fit_bounds(&request.bounds, &request.options);
        self.applied = Some((bounds, self.padding));
    }

    fn unmount(&mut self) {
        self.applied = None;
    }
}
