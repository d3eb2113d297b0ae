//! Camera platform abstraction.
//!
//! The host environment (a browser, a mobile shell, a test double) owns the
//! actual capture device. These traits are the narrow surface the scan
//! lifecycle needs from it.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::error::ScanError;
use crate::BoxFuture;

/// A live camera stream.
pub trait MediaStream: Send + Sync {
    /// Identifier for logs.
    fn id(&self) -> &str;

    /// Whether at least one track is still delivering frames.
    fn is_live(&self) -> bool;

    /// Stop every track of the stream. Must be idempotent.
    fn stop_tracks(&self);
}

/// Watch over the stream bound to the tracking engine's video element.
///
/// `None` while no stream is attached.
pub type StreamWatch = watch::Receiver<Option<Arc<dyn MediaStream>>>;

/// Camera acquisition failure as reported by the platform.
///
/// Variants follow the platform's error names so hosts can map their native
/// errors with [`PlatformCameraError::from_name`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformCameraError {
    /// `NotAllowedError`: the user or policy refused access.
    #[error("camera access not allowed")]
    NotAllowed,

    /// `SecurityError`: access blocked by the security context.
    #[error("camera access blocked by security policy")]
    Security,

    /// `NotFoundError`: no device of the requested kind.
    #[error("no camera device found")]
    NotFound,

    /// `OverconstrainedError`: no device satisfies the constraints.
    #[error("no camera satisfies the requested constraints")]
    Overconstrained,

    /// `NotReadableError`: the device exists but cannot be opened.
    #[error("camera is in use by another application")]
    NotReadable,

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

impl PlatformCameraError {
    /// Map a platform error name (and message) to a variant.
    pub fn from_name(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "PermissionDeniedError" => Self::NotAllowed,
            "SecurityError" => Self::Security,
            "NotFoundError" | "DevicesNotFoundError" => Self::NotFound,
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => Self::Overconstrained,
            "NotReadableError" | "TrackStartError" => Self::NotReadable,
            _ if message.is_empty() => Self::Other(name.to_string()),
            _ => Self::Other(format!("{}: {}", name, message)),
        }
    }
}

impl From<PlatformCameraError> for ScanError {
    fn from(e: PlatformCameraError) -> Self {
        match e {
            PlatformCameraError::NotAllowed | PlatformCameraError::Security => {
                ScanError::PermissionDenied
            }
            PlatformCameraError::NotFound | PlatformCameraError::Overconstrained => {
                ScanError::NoCameraFound
            }
            other => ScanError::Camera(other.to_string()),
        }
    }
}

/// Access to the device camera.
pub trait CameraPlatform: Send + Sync {
    /// Whether the camera capability API exists at all.
    fn has_camera_capability(&self) -> bool;

    /// Request a camera stream. May prompt the user for permission.
    fn request_stream(&self) -> BoxFuture<'_, Result<Arc<dyn MediaStream>, PlatformCameraError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_maps_known_errors() {
        assert_eq!(
            PlatformCameraError::from_name("NotAllowedError", "denied"),
            PlatformCameraError::NotAllowed
        );
        assert_eq!(
            PlatformCameraError::from_name("OverconstrainedError", ""),
            PlatformCameraError::Overconstrained
        );
        assert_eq!(
            PlatformCameraError::from_name("AbortError", "aborted"),
            PlatformCameraError::Other("AbortError: aborted".to_string())
        );
    }

    #[test]
    fn test_scan_error_mapping() {
        assert_eq!(
            ScanError::from(PlatformCameraError::Security),
            ScanError::PermissionDenied
        );
        assert_eq!(
            ScanError::from(PlatformCameraError::NotFound),
            ScanError::NoCameraFound
        );
        assert!(matches!(
            ScanError::from(PlatformCameraError::NotReadable),
            ScanError::Camera(msg) if msg.contains("in use")
        ));
    }
}
