//! Error types used by the crate.

use thiserror::Error;

/// Failure reported by a map engine call.
///
/// Engines implemented over a JavaScript runtime usually convert the thrown exception into the
/// message.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{operation} failed: {message}")]
pub struct EngineError {
    operation: String,
    message: String,
}

impl EngineError {
    /// Creates a new error for the given engine operation.
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Name of the engine operation that failed (e.g. `addSource`).
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Error description given by the engine.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Mapwire error type.
///
/// None of these errors is ever propagated into the declarative tree: binders and the
/// coordinator log them and continue in a degraded state.
#[derive(Debug, Clone, Error)]
pub enum MapwireError {
    /// The environment cannot host a GL map (e.g. no WebGL context).
    #[error("map engine is not supported in this environment")]
    Unsupported,
    /// The map was mounted without a container element.
    #[error("no map container found")]
    MissingContainer,
    /// A call to the map engine failed.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// Source is not present in the registry.
    #[error("no source named `{0}`")]
    SourceNotFound(String),
    /// Layer is not present in the registry.
    #[error("no layer named `{layer_id}` in source `{source_id}`")]
    LayerNotFound {
        /// Source the layer was looked up in.
        source_id: String,
        /// Layer identity.
        layer_id: String,
    },
    /// Another binder already registered a source with the same identity.
    #[error("source `{0}` is already registered")]
    DuplicateSource(String),
    /// An image with the same name is already added to the map style.
    #[error("an image with name `{0}` already exists")]
    DuplicateImage(String),
}
