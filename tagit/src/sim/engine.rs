//! Simulated tracking engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::camera::SimStream;
use crate::camera::{MediaStream, StreamWatch};
use crate::engine::{EngineError, EngineEvent, EngineFactory, EngineParts, TrackingEngine};
use crate::level::Level;
use crate::BoxFuture;

/// When a simulated engine attaches a live stream to its video element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
    /// Every start binds a stream.
    Always,
    /// No start ever binds a stream.
    Never,
    /// Starts bind from the n-th start onward (1-based).
    FromStart(usize),
}

impl BindMode {
    fn binds_on(&self, start: usize) -> bool {
        match self {
            BindMode::Always => true,
            BindMode::Never => false,
            BindMode::FromStart(n) => start >= *n,
        }
    }
}

/// In-process tracking engine driven by explicit event calls.
pub struct SimEngine {
    bind: BindMode,
    stream: watch::Sender<Option<Arc<dyn MediaStream>>>,
    events: mpsc::UnboundedSender<EngineEvent>,
    start_failure: Mutex<Option<String>>,
    stop_failure: Mutex<Option<String>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

impl std::fmt::Debug for SimEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimEngine")
            .field("bind", &self.bind)
            .field("starts", &self.start_count())
            .field("stops", &self.stop_count())
            .finish_non_exhaustive()
    }
}

impl SimEngine {
    /// Create an engine and the parts a controller consumes.
    pub fn new(bind: BindMode) -> (Arc<Self>, EngineParts) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (stream, _) = watch::channel(None);
        let engine = Arc::new(Self {
            bind,
            stream,
            events: events_tx,
            start_failure: Mutex::new(None),
            stop_failure: Mutex::new(None),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        });
        let parts = EngineParts {
            engine: engine.clone(),
            events: events_rx,
        };
        (engine, parts)
    }

    /// Make subsequent starts fail with `reason` (`None` to clear).
    pub fn set_start_failure(&self, reason: Option<&str>) {
        *self.start_failure.lock() = reason.map(str::to_string);
    }

    /// Make subsequent stops fail with `reason` (`None` to clear).
    pub fn set_stop_failure(&self, reason: Option<&str>) {
        *self.stop_failure.lock() = reason.map(str::to_string);
    }

    /// Emit an arbitrary event.
    pub fn emit(&self, event: EngineEvent) {
        debug!(?event, "Simulated engine event");
        // The controller may already be gone.
        let _ = self.events.send(event);
    }

    /// Report the marker asset as loaded.
    pub fn loaded(&self) {
        self.emit(EngineEvent::Loaded);
    }

    /// Report marker slot `index` as recognized.
    pub fn found(&self, index: u32) {
        self.emit(EngineEvent::Found(index));
    }

    /// Report marker slot `index` as lost.
    pub fn lost(&self, index: u32) {
        self.emit(EngineEvent::Lost(index));
    }

    /// Report a runtime failure.
    pub fn fail(&self, reason: &str) {
        self.emit(EngineEvent::Failed(reason.to_string()));
    }

    /// Number of `start` calls so far.
    pub fn start_count(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    /// Number of `stop` calls so far.
    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    /// The stream currently attached to the video element.
    pub fn current_stream(&self) -> Option<Arc<dyn MediaStream>> {
        self.stream.borrow().clone()
    }
}

impl TrackingEngine for SimEngine {
    fn start(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async move {
            let n = self.starts.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(reason) = self.start_failure.lock().clone() {
                return Err(EngineError::new(reason));
            }
            if self.bind.binds_on(n) {
                let stream: Arc<dyn MediaStream> =
                    Arc::new(SimStream::new(format!("sim-engine-{}", n)));
                self.stream.send_replace(Some(stream));
            }
            Ok(())
        })
    }

    fn stop(&self) -> BoxFuture<'_, Result<(), EngineError>> {
        Box::pin(async move {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if let Some(reason) = self.stop_failure.lock().clone() {
                return Err(EngineError::new(reason));
            }
            Ok(())
        })
    }

    fn video_stream(&self) -> StreamWatch {
        self.stream.subscribe()
    }
}

/// Creates [`SimEngine`]s and remembers them so callers can drive events.
#[derive(Debug)]
pub struct SimEngineFactory {
    bind: BindMode,
    created: Mutex<Vec<Arc<SimEngine>>>,
}

impl SimEngineFactory {
    /// A factory whose engines report `Loaded` as soon as they are created.
    pub fn new(bind: BindMode) -> Self {
        Self {
            bind,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Every engine created so far, oldest first.
    pub fn engines(&self) -> Vec<Arc<SimEngine>> {
        self.created.lock().clone()
    }

    /// The most recently created engine.
    pub fn last(&self) -> Option<Arc<SimEngine>> {
        self.created.lock().last().cloned()
    }
}

impl EngineFactory for SimEngineFactory {
    fn create(&self, level: &Level, asset_url: &str) -> Result<EngineParts, EngineError> {
        debug!(level = level.id(), asset_url, "Creating simulated engine");
        let (engine, parts) = SimEngine::new(self.bind);
        engine.loaded();
        self.created.lock().push(engine);
        Ok(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_from_second_start() {
        let (engine, _parts) = SimEngine::new(BindMode::FromStart(2));
        engine.start().await.unwrap();
        assert!(engine.current_stream().is_none());
        engine.start().await.unwrap();
        assert!(engine.current_stream().unwrap().is_live());
        assert_eq!(engine.start_count(), 2);
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (engine, mut parts) = SimEngine::new(BindMode::Always);
        engine.loaded();
        engine.found(1);
        engine.lost(1);
        assert_eq!(parts.events.recv().await, Some(EngineEvent::Loaded));
        assert_eq!(parts.events.recv().await, Some(EngineEvent::Found(1)));
        assert_eq!(parts.events.recv().await, Some(EngineEvent::Lost(1)));
    }

    #[tokio::test]
    async fn test_stop_failure() {
        let (engine, _parts) = SimEngine::new(BindMode::Always);
        engine.set_stop_failure(Some("busy"));
        assert_eq!(engine.stop().await, Err(EngineError::new("busy")));
        engine.set_stop_failure(None);
        assert!(engine.stop().await.is_ok());
        assert_eq!(engine.stop_count(), 2);
    }
}
