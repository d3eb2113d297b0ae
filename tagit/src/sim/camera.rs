//! Simulated camera platform and asset host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::camera::{AssetProbe, CameraPlatform, MediaStream, PlatformCameraError};
use crate::error::ScanError;
use crate::BoxFuture;

/// A stream whose tracks can be stopped exactly like a real one.
#[derive(Debug)]
pub struct SimStream {
    id: String,
    live: AtomicBool,
}

impl SimStream {
    /// Create a live stream.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            live: AtomicBool::new(true),
        }
    }
}

impl MediaStream for SimStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop_tracks(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

/// Simulated camera platform.
#[derive(Debug)]
pub struct SimCamera {
    capable: bool,
    failure: Option<PlatformCameraError>,
    requests: AtomicUsize,
    last: Mutex<Option<Arc<SimStream>>>,
}

impl SimCamera {
    fn with(capable: bool, failure: Option<PlatformCameraError>) -> Self {
        Self {
            capable,
            failure,
            requests: AtomicUsize::new(0),
            last: Mutex::new(None),
        }
    }

    /// A device with a working camera.
    pub fn available() -> Self {
        Self::with(true, None)
    }

    /// A device without camera capture support.
    pub fn unsupported() -> Self {
        Self::with(false, None)
    }

    /// A device whose stream requests fail with `error`.
    pub fn failing(error: PlatformCameraError) -> Self {
        Self::with(true, Some(error))
    }

    /// Number of stream requests made so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// The most recently granted stream.
    pub fn last_stream(&self) -> Option<Arc<SimStream>> {
        self.last.lock().clone()
    }
}

impl CameraPlatform for SimCamera {
    fn has_camera_capability(&self) -> bool {
        self.capable
    }

    fn request_stream(&self) -> BoxFuture<'_, Result<Arc<dyn MediaStream>, PlatformCameraError>> {
        Box::pin(async move {
            let n = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(err) = &self.failure {
                return Err(err.clone());
            }
            let stream = Arc::new(SimStream::new(format!("sim-camera-{}", n)));
            *self.last.lock() = Some(Arc::clone(&stream));
            Ok(stream as Arc<dyn MediaStream>)
        })
    }
}

/// Simulated asset host answering every check with a fixed HTTP status.
#[derive(Debug)]
pub struct SimAssetProbe {
    status: u16,
    checks: AtomicUsize,
}

impl SimAssetProbe {
    /// Every asset is reachable.
    pub fn ok() -> Self {
        Self::status(200)
    }

    /// Every check answers `status`.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            checks: AtomicUsize::new(0),
        }
    }

    /// Number of checks made so far.
    pub fn check_count(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

impl AssetProbe for SimAssetProbe {
    fn check<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<(), ScanError>> {
        Box::pin(async move {
            self.checks.fetch_add(1, Ordering::SeqCst);
            if (200..300).contains(&self.status) {
                Ok(())
            } else {
                Err(ScanError::AssetUnreachable {
                    url: url.to_string(),
                    reason: format!("HTTP {}", self.status),
                })
            }
        })
    }
}
