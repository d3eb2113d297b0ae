//! Messages into and out of the scan controller.

use tokio::sync::oneshot;

use super::state::ScanState;
use crate::error::ScanError;
use crate::level::{ContentKey, MarkerSlot};
use crate::presentation::ControlState;

/// Why a scan is being stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The user pressed stop.
    User,
    /// The device was rotated into an unsupported orientation.
    Orientation,
    /// The page or app became hidden.
    Visibility,
    /// The user left the scan screen.
    Navigation,
    /// The controller is shutting down.
    Shutdown,
    /// A failure ended the session.
    Failure,
}

/// Commands accepted by the controller task.
#[derive(Debug)]
pub(crate) enum Command {
    Start {
        reply: oneshot::Sender<Result<(), ScanError>>,
    },
    Stop {
        reason: StopReason,
        reply: oneshot::Sender<()>,
    },
}

/// Broadcast notifications for consumers of a running scan (e.g. the quiz).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A session started.
    Started,
    /// Content for a slot was dispatched to the presentation layer.
    Dispatched { slot: MarkerSlot },
    /// The remembered slot was lost; reset pending.
    ResetArmed { slot: MarkerSlot },
    /// Default content was restored after a lost marker.
    Reset,
    /// The session stopped.
    Stopped { reason: StopReason },
    /// A failure was surfaced.
    Failed(ScanError),
}

/// Point-in-time view of the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerSnapshot {
    pub state: ScanState,
    pub controls: ControlState,
    /// Content key currently shown, if any.
    pub detected: Option<ContentKey>,
    /// The most recent surfaced failure.
    pub last_error: Option<ScanError>,
}

impl ControllerSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            state: ScanState::Idle,
            controls: ScanState::Idle.controls(),
            detected: None,
            last_error: None,
        }
    }
}
