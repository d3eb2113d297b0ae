//! Simulated collaborators.
//!
//! In-process stand-ins for the camera platform, the asset host, the
//! tracking engine and the presentation layer. They drive the CLI's
//! `simulate` command and the crate's tests.

mod camera;
mod engine;
mod presenter;

pub use camera::{SimAssetProbe, SimCamera, SimStream};
pub use engine::{BindMode, SimEngine, SimEngineFactory};
pub use presenter::{PresenterState, RecordingPresenter};
