//! Binders translate declarative properties into imperative engine calls.
//!
//! A binder is created by the host when the corresponding element appears in the tree. The host
//! calls [`Binding::refresh`] after every render pass (or whenever the map context may have
//! changed) and [`Binding::unmount`] when the element is removed. Property setters apply their
//! changes immediately if the map is ready, otherwise on the next refresh.
//!
//! Binders never fail: engine errors are logged and the binder continues in a degraded state.

mod animation;
mod bounds;
mod center;
mod container;
mod draw;
mod feature_state;
mod image;
mod layer;
mod order;
mod popup;
mod source;

pub use animation::{AnimationCallback, FrameCallback, FrameHandle, FrameScheduler};
pub use bounds::BoundsBinder;
pub use center::CenterBinder;
pub use container::{ContainerBinder, ContainerRect};
pub use draw::{DrawBinder, DrawFeaturesHandler, DrawModeHandler, DISABLED_DRAW_CLASS};
pub use feature_state::{FeatureAttribute, FeatureStateBinder};
pub use image::{ImageBinder, ImageLoadHandler, ImageSource};
pub use layer::LayerBinder;
pub use order::OrderBinder;
pub use popup::PopupBinder;
pub use source::{SourceBinder, SourceContext, WeakSourceContext};

/// Common lifecycle of binders.
pub trait Binding {
    /// Brings the engine in sync with the binder properties.
    ///
    /// Must be cheap when nothing changed: it is called after every render pass.
    fn refresh(&mut self);

    /// Removes everything the binder added to the map. Calling it twice is a no-op.
    fn unmount(&mut self);
}
