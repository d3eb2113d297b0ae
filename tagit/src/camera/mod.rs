//! Camera resource management.
//!
//! This module provides the traits a host implements to give the scan
//! lifecycle access to the device camera, the reachability check for the
//! tracking engine's marker asset, and the [`CameraResourceManager`] that
//! sequences them.

mod asset;
mod manager;
mod platform;

pub use asset::{asset_url, AssetProbe, ReqwestAssetProbe, DEFAULT_ASSET_TIMEOUT_SECS};
pub use manager::{wait_for_live_stream, CameraResourceManager};
pub use platform::{CameraPlatform, MediaStream, PlatformCameraError, StreamWatch};
