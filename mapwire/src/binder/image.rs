use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use maybe_sync::{MaybeSend, MaybeSync};

use crate::binder::Binding;
use crate::coordinator::MapContext;
use crate::engine::{ImageData, MapEngine};
use crate::error::{EngineError, MapwireError};
use crate::options::ImageOptions;

/// Called with the image name and `true` when the image is added, `false` when it is removed.
pub type ImageLoadHandler = Arc<dyn Fn(&str, bool) + MaybeSend + MaybeSync>;

/// Where the image comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Image is loaded by the engine from the URL.
    Url(String),
    /// Decoded image.
    Data(ImageData),
}

/// Adds a named image to the map style.
///
/// The binder only removes an image it added itself. If an image with the same name already
/// exists, the binder does nothing.
pub struct ImageBinder<E: MapEngine> {
    context: MapContext<E>,
    name: String,
    source: ImageSource,
    options: ImageOptions,
    on_load: Option<ImageLoadHandler>,
    registered: Option<u64>,
    token: Option<Arc<AtomicBool>>,
    owned: Arc<AtomicBool>,
}

impl<E: MapEngine> ImageBinder<E> {
    /// Creates a binder of the image `name`.
    pub fn new(context: MapContext<E>, name: impl Into<String>, source: ImageSource) -> Self {
        Self {
            context,
            name: name.into(),
            source,
            options: ImageOptions::default(),
            on_load: None,
            registered: None,
            token: None,
            owned: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the image options.
    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the load handler.
    pub fn with_on_load(
        mut self,
        handler: impl Fn(&str, bool) + MaybeSend + MaybeSync + 'static,
    ) -> Self {
        self.on_load = Some(Arc::new(handler));
        self
    }

    /// True if the image was added by this binder and is still in the style.
    pub fn is_loaded(&self) -> bool {
        self.owned.load(Ordering::Acquire)
    }

    fn invalidate(&mut self) {
        if let Some(token) = self.token.take() {
            token.store(false, Ordering::Release);
        }
        self.owned.store(false, Ordering::Release);
    }
}

fn add_image<E: MapEngine>(
    engine: &E,
    name: &str,
    image: &ImageData,
    options: &ImageOptions,
    owned: &AtomicBool,
    on_load: Option<&ImageLoadHandler>,
) {
    if engine.has_image(name) {
        log::error!("{}", MapwireError::DuplicateImage(name.to_string()));
        return;
    }

    if let Err(err) = engine.add_image(name, image, options) {
        log::error!("Failed to add image `{name}`: {err}");
        return;
    }

    owned.store(true, Ordering::Release);
    if let Some(on_load) = on_load {
        on_load(name, true);
    }
}

impl<E: MapEngine> Binding for ImageBinder<E> {
    fn refresh(&mut self) {
        let (Some(generation), Some(engine)) = (self.context.style(), self.context.engine()) else {
            return;
        };

        let epoch = generation.epoch();
        if self.registered == Some(epoch) {
            return;
        }

        self.invalidate();
        self.registered = Some(epoch);

        if engine.has_image(&self.name) {
            log::error!("{}", MapwireError::DuplicateImage(self.name.clone()));
            return;
        }

        match &self.source {
            ImageSource::Data(image) => add_image(
                &*engine,
                &self.name,
                image,
                &self.options,
                &self.owned,
                self.on_load.as_ref(),
            ),
            ImageSource::Url(url) => {
                let token = Arc::new(AtomicBool::new(true));
                self.token = Some(token.clone());

                let weak = self.context.downgrade();
                let name = self.name.clone();
                let options = self.options.clone();
                let owned = self.owned.clone();
                let on_load = self.on_load.clone();

                if self.context.debug() {
                    log::debug!("Loading image `{name}` from {url}");
                }

                engine.load_image(
                    url,
                    Box::new(move |result: Result<ImageData, EngineError>| {
                        if !token.load(Ordering::Acquire) {
                            return;
                        }

                        let Some(context) = weak.upgrade() else {
                            return;
                        };

                        if context.is_map_destroyed()
                            || context.style().map(|s| s.epoch()) != Some(epoch)
                        {
                            return;
                        }

                        let image = match result {
                            Ok(image) => image,
                            Err(err) => {
                                log::error!("Failed to load image `{name}`: {err}");
                                return;
                            }
                        };

                        if let Some(engine) = context.engine() {
                            add_image(&*engine, &name, &image, &options, &owned, on_load.as_ref());
                        }
                    }),
                );
            }
        }
    }

    fn unmount(&mut self) {
        let was_owned = self.is_loaded();
        let registered = self.registered.take();
        self.invalidate();

        if !was_owned || self.context.is_map_destroyed() {
            return;
        }

        if self.context.style().map(|s| s.epoch()) != registered {
            return;
        }

        let Some(engine) = self.context.engine() else {
            return;
        };

        if engine.has_image(&self.name) {
            engine.remove_image(&self.name);
        }

        if let Some(on_load) = &self.on_load {
            on_load(&self.name, false);
        }
    }
}

impl<E: MapEngine> Drop for ImageBinder<E> {
    fn drop(&mut self) {
        self.unmount();
    }
}
