//! Scan controller states.
//!
//! ```text
//! Idle --Loaded--> Loading --probe ok--> Ready --start--> Starting --ok--> Scanning
//!                     │                    ▲                  │             │  ▲
//!                probe failed              │                failed      Found  Lost+reset
//!                     ▼                    │                  ▼             ▼  │
//!              StoppingOrFailed ◄──────────┴── stop ─── StoppingOrFailed ◄─ Found
//! ```

use crate::presentation::ControlState;

/// Lifecycle state of a scan controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for the tracking engine to load.
    Idle,
    /// Engine loaded, probing device and assets.
    Loading,
    /// Ready to start.
    Ready,
    /// Acquiring the camera and starting the engine.
    Starting,
    /// Running, no marker recognized.
    Scanning,
    /// Running, a marker is recognized (or its reset is pending).
    Found,
    /// Stopping, or a failure ended the last attempt.
    StoppingOrFailed,
}

impl ScanState {
    /// Whether a scan session is live.
    pub fn is_running(&self) -> bool {
        matches!(self, ScanState::Scanning | ScanState::Found)
    }

    /// Whether a start command may be accepted.
    pub fn can_start(&self) -> bool {
        matches!(self, ScanState::Ready | ScanState::StoppingOrFailed)
    }

    /// Start/stop controls for this state.
    pub fn controls(&self) -> ControlState {
        match self {
            ScanState::Idle | ScanState::Loading => ControlState::LOCKED,
            ScanState::Ready | ScanState::StoppingOrFailed => ControlState::IDLE,
            ScanState::Starting | ScanState::Scanning | ScanState::Found => ControlState::RUNNING,
        }
    }

    /// Short label for logs and terminal display.
    pub fn display_status(&self) -> &'static str {
        match self {
            ScanState::Idle => "Idle",
            ScanState::Loading => "Loading",
            ScanState::Ready => "Ready",
            ScanState::Starting => "Starting",
            ScanState::Scanning => "Scanning",
            ScanState::Found => "Found",
            ScanState::StoppingOrFailed => "Stopped",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controls_never_both_enabled() {
        for state in [
            ScanState::Idle,
            ScanState::Loading,
            ScanState::Ready,
            ScanState::Starting,
            ScanState::Scanning,
            ScanState::Found,
            ScanState::StoppingOrFailed,
        ] {
            let c = state.controls();
            assert!(!(c.start_enabled && c.stop_enabled), "{:?}", state);
        }
    }

    #[test]
    fn test_failed_state_allows_retry() {
        assert!(ScanState::StoppingOrFailed.can_start());
        assert_eq!(ScanState::StoppingOrFailed.controls(), ControlState::IDLE);
        assert!(!ScanState::Loading.can_start());
        assert!(!ScanState::Found.can_start());
    }
}
