//! Tag-it-AR - Scan lifecycle for augmented-reality HTML flashcards
//!
//! This library mediates between an external marker-tracking engine and an
//! external presentation layer. Physical cards carry markers; when the engine
//! recognizes one, the matching HTML demonstration is dispatched to the
//! presentation layer, and when the card disappears the default content is
//! restored after a short debounce.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  Loaded/Found/Lost   ┌───────────────────────┐
//! │ TrackingEngine   │ ───────────────────► │    ScanController     │
//! │ (external)       │ ◄─────────────────── │    (actor task)       │
//! └──────────────────┘   start()/stop()     │                       │
//!                                           │  ScanSession          │
//! ┌──────────────────┐  probe/acquire/      │  reset timer          │
//! │ CameraResource   │ ◄─────────────────── │  stream verification  │
//! │ Manager          │  verify/release      └──────────┬────────────┘
//! └──────────────────┘                                 │ content, status
//!                                                      ▼
//!                                           ┌───────────────────────┐
//!                                           │ PresentationAdapter   │
//!                                           │ (external)            │
//!                                           └───────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tagit::level::level_one;
//! use tagit::session::{ControllerParts, ScanController, ScanTimings, StopReason};
//!
//! let handle = ScanController::spawn(ControllerParts {
//!     level: Arc::new(level_one()),
//!     engine: engine_parts,
//!     camera: camera_platform,
//!     assets: asset_probe,
//!     asset_url: "https://cards.example.org/level-1.mind".to_string(),
//!     presenter,
//!     timings: ScanTimings::default(),
//! });
//!
//! handle.start().await?;
//! // ... markers are dispatched to the presenter ...
//! handle.stop(StopReason::User).await;
//! handle.shutdown().await;
//! ```

use std::future::Future;
use std::pin::Pin;

pub mod camera;
pub mod config;
pub mod engine;
pub mod error;
pub mod level;
pub mod logging;
pub mod navigation;
pub mod presentation;
pub mod quiz;
pub mod session;
pub mod sim;

pub use error::{ScanError, ScanResult};

/// Crate version, shown in CLI banners.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boxed future type for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
