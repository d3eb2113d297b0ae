//! Camera resource manager.
//!
//! Obtains exclusive use of the device camera for a scan, confirms the device
//! and deployment can support it, and guarantees the stream is released.
//!
//! # Lifecycle
//!
//! ```text
//! probe() ──► acquire_once() ──► engine.start() ──► verify_stream_bound()
//!   │              │                                        │
//!   │              └── primes the permission prompt         └── false: retry once
//!   └── capability + asset, before any permission prompt
//!
//! release()  (any time, idempotent)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::asset::AssetProbe;
use super::platform::{CameraPlatform, StreamWatch};
use crate::error::ScanError;

/// Owns the camera-facing side of one scan controller.
pub struct CameraResourceManager {
    platform: Arc<dyn CameraPlatform>,
    assets: Arc<dyn AssetProbe>,
    asset_url: String,
    engine_stream: StreamWatch,
}

impl std::fmt::Debug for CameraResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraResourceManager")
            .field("asset_url", &self.asset_url)
            .finish_non_exhaustive()
    }
}

impl CameraResourceManager {
    /// Create a manager for one engine instance.
    ///
    /// # Arguments
    ///
    /// * `platform` - Host camera access
    /// * `assets` - Reachability check for the marker asset
    /// * `asset_url` - URL of the engine's marker descriptor
    /// * `engine_stream` - Watch over the stream bound to the engine
    pub fn new(
        platform: Arc<dyn CameraPlatform>,
        assets: Arc<dyn AssetProbe>,
        asset_url: impl Into<String>,
        engine_stream: StreamWatch,
    ) -> Self {
        Self {
            platform,
            assets,
            asset_url: asset_url.into(),
            engine_stream,
        }
    }

    /// URL checked by [`probe`](Self::probe).
    pub fn asset_url(&self) -> &str {
        &self.asset_url
    }

    /// Confirm the device has a camera API and the marker asset is reachable.
    ///
    /// Never requests camera permission.
    ///
    /// # Errors
    ///
    /// [`ScanError::UnsupportedDevice`] or [`ScanError::AssetUnreachable`].
    pub async fn probe(&self) -> Result<(), ScanError> {
        if !self.platform.has_camera_capability() {
            warn!("Camera capability API is absent");
            return Err(ScanError::UnsupportedDevice);
        }

        self.assets.check(&self.asset_url).await.inspect_err(|e| {
            warn!(url = %self.asset_url, error = %e, "Tracking asset unreachable");
        })?;

        debug!(url = %self.asset_url, "Camera probe passed");
        Ok(())
    }

    /// Request a stream once and stop it straight away.
    ///
    /// This primes the permission prompt on platforms that only grant the
    /// engine's own capture after an explicit, gesture-triggered request.
    ///
    /// # Errors
    ///
    /// The platform error mapped to [`ScanError`].
    pub async fn acquire_once(&self) -> Result<(), ScanError> {
        let stream = self.platform.request_stream().await.map_err(|e| {
            warn!(error = %e, "Camera acquisition failed");
            ScanError::from(e)
        })?;

        stream.stop_tracks();
        debug!(stream = stream.id(), "Camera permission primed");
        Ok(())
    }

    /// Wait up to `timeout` for the engine to have a live stream attached.
    pub async fn verify_stream_bound(&self, timeout: Duration) -> bool {
        wait_for_live_stream(self.engine_stream.clone(), timeout).await
    }

    /// Stop every track of the stream attached to the engine, if any.
    ///
    /// Safe to call when nothing is active. Returns whether a stream was
    /// found.
    pub fn release(&self) -> bool {
        let stream = self.engine_stream.borrow().clone();
        match stream {
            Some(stream) => {
                stream.stop_tracks();
                info!(stream = stream.id(), "Camera stream released");
                true
            }
            None => {
                debug!("No camera stream attached, nothing to release");
                false
            }
        }
    }
}

/// Await a live stream on `stream`, bounded by `timeout`.
///
/// Returns `false` on timeout or if the engine side of the watch is gone.
pub async fn wait_for_live_stream(mut stream: StreamWatch, timeout: Duration) -> bool {
    let bound = stream.wait_for(|s| s.as_ref().is_some_and(|s| s.is_live()));
    match tokio::time::timeout(timeout, bound).await {
        Ok(Ok(_)) => true,
        Ok(Err(_)) => {
            debug!("Engine stream watch closed before a stream was bound");
            false
        }
        Err(_) => false,
    }
}
