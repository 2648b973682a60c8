//! Mapwire is a declarative binding layer for GL map engines such as MapLibre GL and Mapbox GL.
//!
//! The engine is an imperative object: sources and layers are added and removed one call at a
//! time, and user interaction is delivered as raw pointer events. Mapwire lets a host UI describe
//! the map as a tree of elements instead, and keeps the engine in sync with that tree as it
//! changes.
//!
//! # Main components
//!
//! * [`MapCoordinator`] owns the engine instance. It creates the engine in the host container,
//!   watches style loading, destroys the engine on unmount and routes pointer events (click,
//!   double click, hover, drag) to the layers that declared handlers for them.
//! * [`RegistryStore`](registry::RegistryStore) keeps track of every source and layer bound to
//!   the current style, together with the closures that tear them down.
//! * [`binders`](binder) translate element properties into engine calls. [`SourceBinder`] and
//!   [`LayerBinder`] register sources and layers; the auxiliary binders fit bounds, fly to a
//!   center, sync feature state, show popups, add images, host a draw control and order layers.
//!
//! The engine itself is abstracted by the [`MapEngine`] trait, implemented by the host over a
//! concrete engine binding.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use mapwire::engine::{EngineProvider, MapContainer};
//! # fn run<P: EngineProvider>(provider: P, container: Arc<dyn MapContainer>) {
//! use mapwire::binder::{Binding, LayerBinder, SourceBinder};
//! use mapwire::options::{LayerKind, LayerOptions, SourceOptions};
//! use mapwire::{MapCoordinator, MapOptions};
//!
//! let mut map = MapCoordinator::new(provider, MapOptions::new("https://tiles.example.com/style.json"));
//! map.mount(Some(container));
//!
//! let mut source = SourceBinder::managed(map.context(), "regions", SourceOptions::geojson());
//! source.refresh();
//!
//! if let Some(context) = source.context() {
//!     let mut fill = LayerBinder::new(context, "fill", LayerOptions::new(LayerKind::Fill));
//!     fill.refresh();
//! }
//! # }
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod binder;
mod coordinator;
pub mod engine;
pub mod error;
pub mod options;
pub mod registry;

#[cfg(test)]
pub(crate) mod tests;

pub use binder::{Binding, LayerBinder, SourceBinder, SourceContext};
pub use coordinator::{
    BoundsRequest, CoordinatorState, MapContext, MapCoordinator, StyleGeneration,
    WeakMapContext, HOVER_STATE,
};
pub use engine::{EngineProvider, MapEngine};
pub use error::{EngineError, MapwireError};
pub use mapwire_types;
pub use options::{MapOptions, MapStyle};
