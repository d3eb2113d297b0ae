//! Error taxonomy for the scan lifecycle.
//!
//! Every variant is recoverable from the application's point of view: the
//! controller catches it where it occurs, surfaces [`ScanError::status_message`]
//! through the presentation adapter and leaves the start control enabled.

use thiserror::Error;

/// Result type for scan lifecycle operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that can occur while starting, running or stopping a scan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// The platform has no camera capability API at all.
    #[error("camera capability is not available on this device")]
    UnsupportedDevice,

    /// The tracking engine's marker descriptor could not be fetched.
    #[error("tracking asset {url} is unreachable: {reason}")]
    AssetUnreachable { url: String, reason: String },

    /// The user (or a platform policy) refused camera access.
    #[error("camera permission was denied")]
    PermissionDenied,

    /// No camera matching the request exists.
    #[error("no camera was found")]
    NoCameraFound,

    /// Any other camera acquisition failure.
    #[error("camera error: {0}")]
    Camera(String),

    /// The tracking engine rejected `start()`.
    #[error("tracking engine failed to start: {0}")]
    EngineStart(String),

    /// The tracking engine reported a failure while running.
    #[error("tracking engine failed: {0}")]
    EngineFailure(String),

    /// The engine reported success but no live stream was ever attached.
    #[error("camera stream was not bound to the tracking engine")]
    StreamNotBound,

    /// The tracking engine rejected `stop()`. Reported, never propagated.
    #[error("tracking engine failed to stop: {0}")]
    EngineStop(String),

    /// A start was requested before the engine finished loading.
    #[error("tracking engine is not loaded yet")]
    NotReady,

    /// The controller task is gone.
    #[error("scan controller has shut down")]
    ControllerClosed,
}

impl ScanError {
    /// User-facing status line for this error.
    pub fn status_message(&self) -> String {
        match self {
            ScanError::UnsupportedDevice => {
                "This device does not support camera access.".to_string()
            }
            ScanError::AssetUnreachable { .. } => {
                "Card data could not be loaded. Check the installation.".to_string()
            }
            ScanError::PermissionDenied => {
                "Camera permission denied. Allow camera access and try again.".to_string()
            }
            ScanError::NoCameraFound => "No camera was found on this device.".to_string(),
            ScanError::Camera(reason) => format!("Camera error: {}", reason),
            ScanError::EngineStart(_) | ScanError::EngineFailure(_) => {
                "Scanning could not start. Try again.".to_string()
            }
            ScanError::StreamNotBound => {
                "The camera did not start. Press Start to try again.".to_string()
            }
            ScanError::EngineStop(_) => "Scanning stopped with an error.".to_string(),
            ScanError::NotReady => "Still loading, please wait…".to_string(),
            ScanError::ControllerClosed => "Scanning is not available.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_unreachable_display() {
        let err = ScanError::AssetUnreachable {
            url: "http://localhost/level-1.mind".to_string(),
            reason: "HTTP 404".to_string(),
        };
        assert!(err.to_string().contains("level-1.mind"));
        assert!(err.to_string().contains("HTTP 404"));
    }

    #[test]
    fn test_status_messages_are_not_empty() {
        let errors = [
            ScanError::UnsupportedDevice,
            ScanError::PermissionDenied,
            ScanError::NoCameraFound,
            ScanError::StreamNotBound,
            ScanError::EngineStop("boom".to_string()),
            ScanError::NotReady,
        ];
        for err in errors {
            assert!(!err.status_message().is_empty(), "{:?}", err);
        }
    }
}
