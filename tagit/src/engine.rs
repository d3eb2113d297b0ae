//! Marker tracking engine contract.
//!
//! The engine is an external collaborator: it owns image recognition and the
//! capture pipeline. The scan controller only needs to start and stop it,
//! observe the stream bound to its video element, and receive its per-slot
//! events.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::camera::StreamWatch;
use crate::level::Level;
use crate::BoxFuture;

/// Error reported by a tracking engine call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    /// Create an engine error from a message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Events emitted by the tracking engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Assets are loaded and the engine can be started.
    Loaded,
    /// A marker slot was recognized.
    Found(u32),
    /// A previously recognized marker slot is no longer tracked.
    Lost(u32),
    /// The engine failed while running.
    Failed(String),
}

/// A marker tracking engine instance.
pub trait TrackingEngine: Send + Sync {
    /// Start capture and tracking.
    fn start(&self) -> BoxFuture<'_, Result<(), EngineError>>;

    /// Stop capture and tracking.
    fn stop(&self) -> BoxFuture<'_, Result<(), EngineError>>;

    /// Watch over the stream attached to the engine's video element.
    fn video_stream(&self) -> StreamWatch;
}

/// A freshly constructed engine and its event channel.
pub struct EngineParts {
    /// The engine instance.
    pub engine: Arc<dyn TrackingEngine>,
    /// Events from the engine, in emission order.
    pub events: mpsc::UnboundedReceiver<EngineEvent>,
}

impl std::fmt::Debug for EngineParts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineParts").finish_non_exhaustive()
    }
}

/// Constructs one engine per level.
pub trait EngineFactory: Send + Sync {
    /// Create an engine tracking `level`'s markers from the asset at
    /// `asset_url`.
    fn create(&self, level: &Level, asset_url: &str) -> Result<EngineParts, EngineError>;
}
