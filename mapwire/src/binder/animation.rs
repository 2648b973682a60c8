use std::sync::Arc;

use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::Mutex;

use crate::options::PropertyMap;

/// Callback of a single animation frame. Gets the frame timestamp in milliseconds.
pub type FrameCallback = Box<dyn FnOnce(f64) + MaybeSend>;

/// Computes paint properties for a frame timestamp. `None` leaves the layer unchanged.
pub type AnimationCallback = Arc<dyn Fn(f64) -> Option<PropertyMap> + MaybeSend + MaybeSync>;

/// Handle of a requested frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Display refresh scheduler (`requestAnimationFrame` in browsers).
pub trait FrameScheduler: MaybeSend + MaybeSync {
    /// Calls `callback` before the next repaint.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle;
    /// Cancels a requested frame. Unknown handles are ignored.
    fn cancel_frame(&self, handle: FrameHandle);
}

type FrameFn = Arc<dyn Fn(f64) + MaybeSend + MaybeSync>;

#[derive(Default)]
struct LoopState {
    handle: Option<FrameHandle>,
    cancelled: bool,
}

/// Calls a function on every frame until cancelled.
pub(crate) struct AnimationLoop {
    scheduler: Arc<dyn FrameScheduler>,
    state: Arc<Mutex<LoopState>>,
}

impl AnimationLoop {
    pub(crate) fn start(scheduler: Arc<dyn FrameScheduler>, on_frame: FrameFn) -> Self {
        let state = Arc::new(Mutex::new(LoopState::default()));
        request_next(scheduler.clone(), state.clone(), on_frame);
        Self { scheduler, state }
    }

    pub(crate) fn cancel(&self) {
        let handle = {
            let mut state = self.state.lock();
            state.cancelled = true;
            state.handle.take()
        };

        if let Some(handle) = handle {
            self.scheduler.cancel_frame(handle);
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn request_next(
    scheduler: Arc<dyn FrameScheduler>,
    state: Arc<Mutex<LoopState>>,
    on_frame: FrameFn,
) {
    let next_scheduler = scheduler.clone();
    let next_state = state.clone();
    let handle = scheduler.request_frame(Box::new(move |timestamp| {
        if next_state.lock().cancelled {
            return;
        }

        on_frame(timestamp);
        request_next(next_scheduler, next_state, on_frame);
    }));

    let mut state = state.lock();
    if state.cancelled {
        drop(state);
        scheduler.cancel_frame(handle);
    } else {
        state.handle = Some(handle);
    }
}
