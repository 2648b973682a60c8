use crate::binder::Binding;
use crate::coordinator::MapContext;
use crate::engine::MapEngine;

/// Reorders layers of the map, bottom to top.
///
/// Layers that do not exist in the map are skipped. The ordering is applied again whenever the
/// registry changes, so layers mounted after the binder end up in place too.
pub struct OrderBinder<E: MapEngine> {
    context: MapContext<E>,
    ordering: Vec<String>,
    applied: Option<(Vec<String>, u64)>,
}

impl<E: MapEngine> OrderBinder<E> {
    /// Creates a binder with the native layer ids, bottom to top.
    pub fn new(context: MapContext<E>, ordering: Vec<String>) -> Self {
        Self {
            context,
            ordering,
            applied: None,
        }
    }

    /// Replaces the ordering.
    pub fn set_ordering(&mut self, ordering: Vec<String>) {
        if self.ordering == ordering {
            return;
        }

        self.ordering = ordering;
        self.refresh();
    }
}

impl<E: MapEngine> Binding for OrderBinder<E> {
    fn refresh(&mut self) {
        let Some(engine) = self.context.engine() else {
            self.applied = None;
            return;
        };

        let version = self.context.registry().version();
        if let Some((ordering, applied_version)) = &self.applied {
            if *ordering == self.ordering && *applied_version == version {
                return;
            }
        }

        let present: Vec<&String> = self
            .ordering
            .iter()
            .filter(|id| engine.has_layer(id))
            .collect();

        for (i, lower) in present.iter().enumerate() {
            for upper in &present[i + 1..] {
                if let Err(err) = engine.move_layer(lower.as_str(), Some(upper.as_str())) {
                    log::error!("Failed to move layer `{lower}`: {err}");
                }
            }
        }

        self.applied = Some((self.ordering.clone(), version));
    }

    fn unmount(&mut self) {
        self.applied = None;
    }
}
