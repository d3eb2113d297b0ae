//! Scan session lifecycle.
//!
//! - [`ScanState`] - controller states and the controls they imply
//! - [`ScanSession`] - the pure found/lost/reset bookkeeping of one run
//! - [`ScanController`] - the task driving the lifecycle
//! - [`ScanControllerHandle`] - commands, snapshots and events

mod config;
mod controller;
mod events;
mod model;
mod state;

pub use config::{
    ScanTimings, DEFAULT_RESET_DELAY, DEFAULT_RETRY_PAUSE, DEFAULT_VERIFY_DELAY,
    DEFAULT_VERIFY_TIMEOUT,
};
pub use controller::{
    ControllerParts, ScanController, ScanControllerHandle, COMMAND_CHANNEL_CAPACITY,
    EVENT_CHANNEL_CAPACITY,
};
pub use events::{ControllerSnapshot, ScanEvent, StopReason};
pub use model::{LostOutcome, ScanSession};
pub use state::ScanState;
