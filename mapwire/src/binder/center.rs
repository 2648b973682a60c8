use mapwire_types::LngLat;

use crate::binder::Binding;
use crate::coordinator::MapContext;
use crate::engine::MapEngine;
use crate::options::FlyToOptions;

/// Flies to the center whenever it changes.
pub struct CenterBinder<E: MapEngine> {
    context: MapContext<E>,
    center: Option<LngLat>,
    options: FlyToOptions,
    applied: Option<LngLat>,
}

impl<E: MapEngine> CenterBinder<E> {
    /// Binder without a center.
    pub fn new(context: MapContext<E>) -> Self {
        Self {
            context,
            center: None,
            options: FlyToOptions::default(),
            applied: None,
        }
    }

    /// Sets the center.
    pub fn with_center(mut self, center: LngLat) -> Self {
        self.center = Some(center);
        self
    }

    /// Sets the flight options.
    pub fn with_options(mut self, options: FlyToOptions) -> Self {
        self.options = options;
        self
    }

    /// Changes the center and flies to it.
    pub fn set_center(&mut self, center: Option<LngLat>) {
        self.center = center;
        self.refresh();
    }

    /// Changes the flight options. Takes effect on the next flight.
    pub fn set_options(&mut self, options: FlyToOptions) {
        self.options = options;
    }
}

impl<E: MapEngine> Binding for CenterBinder<E> {
    fn refresh(&mut self) {
        let Some(engine) = self.context.engine() else {
            self.applied = None;
            return;
        };

        let Some(center) = self.center else {
            return;
        };

        if self.applied == Some(center) {
            return;
        }

        engine.fly_to(center, &self.options);
        self.applied = Some(center);
    }

    fn unmount(&mut self) {
        self.applied = None;
    }
}

#[cfg(test)]
mod tests {
    use mapwire_types::lnglat;

    use super::*;
    use crate::tests::{ready_map, Call};

    #[test]
    fn flies_on_change_only() {
        let (coordinator, engine) = ready_map();
        let options = FlyToOptions {
            zoom: Some(9.0),
            ..Default::default()
        };
        let mut binder = CenterBinder::new(coordinator.context())
            .with_center(lnglat!(13.4, 52.5))
            .with_options(options.clone());

        binder.refresh();
        binder.refresh();
        binder.set_options(FlyToOptions::default());
        binder.set_center(Some(lnglat!(2.35, 48.85)));
        binder.set_center(None);

        assert_eq!(
            engine.calls(),
            vec![
                Call::FlyTo(lnglat!(13.4, 52.5), options),
                Call::FlyTo(lnglat!(2.35, 48.85), FlyToOptions::default()),
            ]
        );
    }
}
