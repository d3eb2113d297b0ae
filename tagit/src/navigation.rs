//! Screen navigation.
//!
//! The app has three screens. The [`Navigator`] owns at most one scan
//! controller: opening a level tears down the previous controller before
//! the next engine is constructed, and leaving the scan screen stops any
//! running scan.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::camera::{asset_url, AssetProbe, CameraPlatform};
use crate::engine::EngineFactory;
use crate::error::ScanError;
use crate::level::Level;
use crate::presentation::PresentationAdapter;
use crate::session::{ControllerParts, ScanController, ScanControllerHandle, ScanTimings, StopReason};

/// App screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Scan,
    Quiz,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::Home => "home",
            Screen::Scan => "scan",
            Screen::Quiz => "quiz",
        };
        f.write_str(name)
    }
}

/// Collaborators shared by every controller the navigator creates.
#[derive(Clone)]
pub struct ScanDependencies {
    pub engines: Arc<dyn EngineFactory>,
    pub camera: Arc<dyn CameraPlatform>,
    pub assets: Arc<dyn AssetProbe>,
    /// Base URL level asset paths are resolved against.
    pub asset_base_url: String,
    pub presenter: Arc<dyn PresentationAdapter>,
    pub timings: ScanTimings,
}

/// Tracks the visible screen and the single active scan controller.
pub struct Navigator {
    deps: ScanDependencies,
    screen: Screen,
    controller: Option<ScanControllerHandle>,
}

impl Navigator {
    pub fn new(deps: ScanDependencies) -> Self {
        Self {
            deps,
            screen: Screen::Home,
            controller: None,
        }
    }

    /// The visible screen.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// The active controller, if a level is open.
    pub fn controller(&self) -> Option<&ScanControllerHandle> {
        self.controller.as_ref()
    }

    /// Switch screens. Leaving the scan screen stops scanning.
    pub async fn go(&mut self, screen: Screen) {
        if screen != Screen::Scan {
            self.interrupt(StopReason::Navigation).await;
        }
        debug!(from = %self.screen, to = %screen, "Navigating");
        self.screen = screen;
    }

    /// Stop a running scan without leaving the screen, e.g. when the page
    /// is hidden or the device is rotated.
    pub async fn interrupt(&self, reason: StopReason) {
        if let Some(controller) = &self.controller {
            controller.stop(reason).await;
        }
    }

    /// Open `level` on the scan screen.
    ///
    /// Any previous controller is shut down first, releasing its camera and
    /// discarding its engine.
    ///
    /// # Errors
    ///
    /// [`ScanError::EngineStart`] if the engine cannot be constructed.
    pub async fn open_level(&mut self, level: Arc<Level>) -> Result<&ScanControllerHandle, ScanError> {
        if let Some(previous) = self.controller.take() {
            debug!(level = previous.level().id(), "Shutting down previous controller");
            previous.shutdown().await;
        }

        let url = asset_url(&self.deps.asset_base_url, level.asset_path());
        let engine = self
            .deps
            .engines
            .create(&level, &url)
            .map_err(|e| ScanError::EngineStart(e.0))?;

        info!(level = level.id(), asset_url = %url, "Opening level");
        let handle = ScanController::spawn(ControllerParts {
            level,
            engine,
            camera: Arc::clone(&self.deps.camera),
            assets: Arc::clone(&self.deps.assets),
            asset_url: url,
            presenter: Arc::clone(&self.deps.presenter),
            timings: self.deps.timings,
        });

        self.screen = Screen::Scan;
        Ok(self.controller.insert(handle))
    }
}
