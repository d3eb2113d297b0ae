//! Scan session controller.
//!
//! The [`ScanController`] is a single long-running task that owns the scan
//! lifecycle for one level on one screen. Every input (user commands, engine
//! events, stream verification outcomes and the reset timer) is handled one
//! at a time in the task's loop, so no transition can interleave with
//! another.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        ScanController                            │
//! │                                                                  │
//! │  Command ───────────► start / stop                               │
//! │  EngineEvent ───────► Loaded / Found / Lost / Failed             │
//! │  VerifyOutcome ─────► bound? ── no ──► retry once ──► fail       │
//! │  reset deadline ────► restore default content                    │
//! │                                                                  │
//! │            │ snapshot (watch)        │ ScanEvent (broadcast)     │
//! └────────────┼─────────────────────────┼───────────────────────────┘
//!              ▼                         ▼
//!       ScanControllerHandle        subscribers (quiz, CLI)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tagit::session::{ControllerParts, ScanController, StopReason};
//!
//! let handle = ScanController::spawn(parts);
//! handle.start().await?;
//! handle.stop(StopReason::User).await;
//! handle.shutdown().await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::ScanTimings;
use super::events::{Command, ControllerSnapshot, ScanEvent, StopReason};
use super::model::{LostOutcome, ScanSession};
use super::state::ScanState;
use crate::camera::{AssetProbe, CameraPlatform, CameraResourceManager};
use crate::engine::{EngineError, EngineEvent, EngineParts, TrackingEngine};
use crate::error::ScanError;
use crate::level::Level;
use crate::presentation::{status, PresentationAdapter};

/// Capacity of the command channel.
pub const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Capacity of the scan event broadcast channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Everything a controller needs, supplied once at construction.
pub struct ControllerParts {
    /// The level being scanned.
    pub level: Arc<Level>,
    /// Engine instance and its events, owned by this controller.
    pub engine: EngineParts,
    /// Host camera access.
    pub camera: Arc<dyn CameraPlatform>,
    /// Reachability check for the level asset.
    pub assets: Arc<dyn AssetProbe>,
    /// Resolved URL of the level asset.
    pub asset_url: String,
    /// Receiver of user-visible output.
    pub presenter: Arc<dyn PresentationAdapter>,
    /// Timing constants.
    pub timings: ScanTimings,
}

/// Result of one stream binding check.
#[derive(Debug, Clone, Copy)]
struct VerifyOutcome {
    generation: u64,
    attempt: u8,
    bound: bool,
}

/// The scan lifecycle task. Constructed only through [`ScanController::spawn`].
pub struct ScanController {
    level: Arc<Level>,
    engine: Arc<dyn TrackingEngine>,
    camera: Arc<CameraResourceManager>,
    presenter: Arc<dyn PresentationAdapter>,
    timings: ScanTimings,

    state: ScanState,
    session: Option<ScanSession>,
    last_error: Option<ScanError>,

    /// Incremented on every successful start; stale verification outcomes
    /// carry an older value.
    generation: u64,
    verification: Option<JoinHandle<()>>,
    verify_tx: mpsc::UnboundedSender<VerifyOutcome>,

    snapshot_tx: watch::Sender<ControllerSnapshot>,
    events_tx: broadcast::Sender<ScanEvent>,
}

impl ScanController {
    /// Spawn a controller task on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn spawn(parts: ControllerParts) -> ScanControllerHandle {
        let ControllerParts {
            level,
            engine,
            camera,
            assets,
            asset_url,
            presenter,
            timings,
        } = parts;
        let EngineParts {
            engine,
            events: engine_events,
        } = engine;

        let camera = Arc::new(CameraResourceManager::new(
            camera,
            assets,
            asset_url,
            engine.video_stream(),
        ));

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (verify_tx, verify_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ControllerSnapshot::initial());
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let shutdown = CancellationToken::new();

        let controller = Self {
            level: Arc::clone(&level),
            engine,
            camera,
            presenter,
            timings,
            state: ScanState::Idle,
            session: None,
            last_error: None,
            generation: 0,
            verification: None,
            verify_tx,
            snapshot_tx,
            events_tx: events_tx.clone(),
        };

        let task = tokio::spawn(controller.run(
            command_rx,
            engine_events,
            verify_rx,
            shutdown.clone(),
        ));

        ScanControllerHandle {
            level,
            commands: command_tx,
            snapshot: snapshot_rx,
            events: events_tx,
            shutdown,
            task: Some(task),
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut engine_events: mpsc::UnboundedReceiver<EngineEvent>,
        mut verify_rx: mpsc::UnboundedReceiver<VerifyOutcome>,
        shutdown: CancellationToken,
    ) {
        info!(
            level = self.level.id(),
            markers = self.level.marker_count(),
            "Scan controller starting"
        );
        self.show_defaults();
        self.presenter.set_status(status::LOADING);
        self.set_state(ScanState::Idle);

        loop {
            let reset_deadline = self.session.as_ref().and_then(ScanSession::pending_reset);

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    debug!("Scan controller shutdown requested");
                    break;
                }

                Some(command) = commands.recv() => {
                    self.handle_command(command).await;
                }

                Some(outcome) = verify_rx.recv() => {
                    self.handle_verification(outcome).await;
                }

                Some(event) = engine_events.recv() => {
                    self.handle_engine_event(event).await;
                }

                _ = tokio::time::sleep_until(reset_deadline.unwrap_or_else(Instant::now)),
                    if reset_deadline.is_some() =>
                {
                    self.fire_reset();
                }
            }
        }

        if self.state.is_running() {
            self.stop_session(StopReason::Shutdown).await;
        }
        self.cancel_verification();
        info!(level = self.level.id(), "Scan controller stopped");
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { reply } => {
                let result = self.start().await;
                let _ = reply.send(result);
            }
            Command::Stop { reason, reply } => {
                self.stop(reason).await;
                let _ = reply.send(());
            }
        }
    }

    async fn start(&mut self) -> Result<(), ScanError> {
        if self.state.is_running() || self.state == ScanState::Starting {
            debug!(state = ?self.state, "Start ignored, already scanning");
            return Ok(());
        }
        if !self.state.can_start() {
            debug!(state = ?self.state, "Start rejected, engine not ready");
            return Err(ScanError::NotReady);
        }

        self.set_state(ScanState::Starting);
        self.presenter.set_status(status::OPENING_CAMERA);
        self.presenter.set_hint(status::HINT_AIM);

        if let Err(e) = self.launch().await {
            self.set_state(ScanState::StoppingOrFailed);
            self.camera.release();
            self.show_defaults();
            self.surface(e.clone());
            return Err(e);
        }

        self.generation += 1;
        self.session = Some(ScanSession::begin(self.timings.reset_delay));
        self.last_error = None;
        self.set_state(ScanState::Scanning);
        self.presenter.set_status(status::SCANNING);
        self.schedule_verification(0, self.timings.verify_delay);
        self.broadcast(ScanEvent::Started);

        info!(
            level = self.level.id(),
            generation = self.generation,
            "Scan session started"
        );
        Ok(())
    }

    /// Probe, prime the camera permission, then start the engine.
    async fn launch(&self) -> Result<(), ScanError> {
        self.camera.probe().await?;
        self.camera.acquire_once().await?;
        self.engine
            .start()
            .await
            .map_err(|e| ScanError::EngineStart(e.0))?;
        Ok(())
    }

    async fn stop(&mut self, reason: StopReason) {
        if !self.state.is_running() {
            debug!(state = ?self.state, ?reason, "Stop ignored, not scanning");
            return;
        }

        self.stop_session(reason).await;
        self.set_state(ScanState::Ready);
        self.presenter.set_status(status::STOPPED);
        self.presenter.set_hint(status::HINT_RESTART);
    }

    /// Tear down the live session. Leaves the controller in
    /// `StoppingOrFailed`; callers decide where it settles.
    async fn stop_session(&mut self, reason: StopReason) {
        self.set_state(ScanState::StoppingOrFailed);
        self.cancel_verification();

        if let Some(mut session) = self.session.take() {
            session.end();
        }

        if let Err(e) = self.engine.stop().await {
            self.report_stop_failure(e);
        }

        self.camera.release();
        self.show_defaults();
        self.publish();
        self.broadcast(ScanEvent::Stopped { reason });

        info!(level = self.level.id(), ?reason, "Scan session stopped");
    }

    /// Engine stop errors are reported but never change the outcome.
    fn report_stop_failure(&self, error: EngineError) {
        let err = ScanError::EngineStop(error.0);
        warn!(error = %err, "Tracking engine stop failed");
        self.presenter.notify(&err.to_string());
        self.broadcast(ScanEvent::Failed(err));
    }

    /// Stop the live session because of `error` and surface it.
    async fn fail_session(&mut self, error: ScanError) {
        self.stop_session(StopReason::Failure).await;
        self.surface(error);
    }

    // -------------------------------------------------------------------------
    // Engine events
    // -------------------------------------------------------------------------

    async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Loaded => self.on_loaded().await,
            EngineEvent::Found(index) => self.on_found(index),
            EngineEvent::Lost(index) => self.on_lost(index),
            EngineEvent::Failed(reason) => self.on_engine_failed(reason).await,
        }
    }

    async fn on_loaded(&mut self) {
        if self.state != ScanState::Idle {
            debug!(state = ?self.state, "Duplicate engine loaded event ignored");
            return;
        }

        self.set_state(ScanState::Loading);
        match self.camera.probe().await {
            Ok(()) => {
                self.set_state(ScanState::Ready);
                self.presenter.set_status(status::READY);
                info!(level = self.level.id(), "Tracking engine loaded, ready to scan");
            }
            Err(e) => {
                self.set_state(ScanState::StoppingOrFailed);
                self.surface(e);
            }
        }
    }

    fn on_found(&mut self, index: u32) {
        if !self.state.is_running() {
            debug!(slot = index, state = ?self.state, "Found ignored, not scanning");
            return;
        }

        let Some(slot) = self.level.slot(index).cloned() else {
            debug!(slot = index, "Found ignored, no content mapped for slot");
            return;
        };
        let Some(content) = self.level.render(&slot.content_key) else {
            debug!(slot = index, key = %slot.content_key, "Found ignored, no template for key");
            return;
        };

        if let Some(session) = self.session.as_mut() {
            session.on_found(slot.clone());
        }

        let label = slot.content_key.tag_label();
        self.presenter.set_detected(Some(&label));
        self.presenter.set_status(&format!("Detected: {}", label));
        self.presenter.set_hint(self.level.hint(&slot.content_key));
        self.presenter.render_content(&content.html);
        self.presenter.render_source(&content.source);
        self.set_state(ScanState::Found);

        debug!(slot = index, key = %slot.content_key, "Content dispatched");
        self.broadcast(ScanEvent::Dispatched { slot });
    }

    fn on_lost(&mut self, index: u32) {
        if !self.state.is_running() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.on_lost(index, Instant::now()) {
            LostOutcome::Ignored => {
                debug!(slot = index, "Lost ignored, not the recognized slot");
            }
            LostOutcome::ResetArmed { slot, .. } => {
                self.presenter.set_status(&format!(
                    "Card lost, returning in {}…",
                    format_delay(self.timings.reset_delay)
                ));
                debug!(slot = index, "Reset armed");
                self.broadcast(ScanEvent::ResetArmed { slot });
            }
        }
    }

    async fn on_engine_failed(&mut self, reason: String) {
        let err = ScanError::EngineFailure(reason);
        if self.state.is_running() {
            self.fail_session(err).await;
        } else {
            // An engine that never loaded stays unstartable.
            self.surface(err);
        }
    }

    fn fire_reset(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.fire_reset(Instant::now()) {
            return;
        }

        self.show_defaults();
        self.presenter.set_status(status::SCANNING);
        self.set_state(ScanState::Scanning);
        debug!("Default content restored after lost marker");
        self.broadcast(ScanEvent::Reset);
    }

    // -------------------------------------------------------------------------
    // Stream verification
    // -------------------------------------------------------------------------

    fn schedule_verification(&mut self, attempt: u8, delay: Duration) {
        self.cancel_verification();

        let camera = Arc::clone(&self.camera);
        let timeout = self.timings.verify_timeout;
        let generation = self.generation;
        let tx = self.verify_tx.clone();

        self.verification = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let bound = camera.verify_stream_bound(timeout).await;
            let _ = tx.send(VerifyOutcome {
                generation,
                attempt,
                bound,
            });
        }));
    }

    fn cancel_verification(&mut self) {
        if let Some(task) = self.verification.take() {
            task.abort();
        }
    }

    async fn handle_verification(&mut self, outcome: VerifyOutcome) {
        if outcome.generation != self.generation || !self.state.is_running() {
            debug!(
                generation = outcome.generation,
                "Stale stream verification ignored"
            );
            return;
        }
        self.verification = None;

        if outcome.bound {
            info!(attempt = outcome.attempt, "Camera stream bound to tracking engine");
            return;
        }

        if outcome.attempt > 0 {
            warn!("Camera stream still not bound after retry");
            self.fail_session(ScanError::StreamNotBound).await;
            return;
        }

        warn!(
            timeout_ms = self.timings.verify_timeout.as_millis() as u64,
            "Camera stream not bound, restarting tracking engine once"
        );
        if let Err(e) = self.engine.stop().await {
            self.report_stop_failure(e);
        }
        tokio::time::sleep(self.timings.retry_pause).await;

        if let Err(e) = self.engine.start().await {
            self.fail_session(ScanError::EngineStart(e.0)).await;
            return;
        }
        self.schedule_verification(1, Duration::ZERO);
    }

    // -------------------------------------------------------------------------
    // Output
    // -------------------------------------------------------------------------

    fn show_defaults(&self) {
        let default = self.level.default_content();
        self.presenter.set_detected(None);
        self.presenter.render_content(&default.content.html);
        self.presenter.render_source(&default.content.source);
        self.presenter.set_hint(&default.hint);
    }

    fn surface(&mut self, error: ScanError) {
        warn!(error = %error, state = ?self.state, "Scan failure");
        self.presenter.set_status(&error.status_message());
        self.presenter.notify(&error.to_string());
        self.last_error = Some(error.clone());
        self.publish();
        self.broadcast(ScanEvent::Failed(error));
    }

    fn set_state(&mut self, state: ScanState) {
        if self.state != state {
            debug!(from = ?self.state, to = ?state, "Scan state transition");
        }
        self.state = state;
        self.presenter.set_controls(state.controls());
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(ControllerSnapshot {
            state: self.state,
            controls: self.state.controls(),
            detected: self
                .session
                .as_ref()
                .and_then(|s| s.last_recognized())
                .map(|slot| slot.content_key.clone()),
            last_error: self.last_error.clone(),
        });
    }

    fn broadcast(&self, event: ScanEvent) {
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }
}

fn format_delay(delay: Duration) -> String {
    if delay.subsec_millis() == 0 {
        format!("{}s", delay.as_secs())
    } else {
        format!("{:.1}s", delay.as_secs_f64())
    }
}

/// Handle to a running [`ScanController`].
///
/// Dropping the handle shuts the controller down; the task still runs its
/// stop path and releases the camera.
pub struct ScanControllerHandle {
    level: Arc<Level>,
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<ControllerSnapshot>,
    events: broadcast::Sender<ScanEvent>,
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for ScanControllerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanControllerHandle")
            .field("level", &self.level.id())
            .field("snapshot", &*self.snapshot.borrow())
            .finish_non_exhaustive()
    }
}

impl ScanControllerHandle {
    /// The level this controller scans.
    pub fn level(&self) -> &Arc<Level> {
        &self.level
    }

    /// Start scanning.
    ///
    /// A no-op when already scanning.
    ///
    /// # Errors
    ///
    /// The failure that ended the start attempt. The controller has already
    /// surfaced it and re-enabled the start control.
    pub async fn start(&self) -> Result<(), ScanError> {
        let (reply, rx) = oneshot::channel();
        self.commands
            .send(Command::Start { reply })
            .await
            .map_err(|_| ScanError::ControllerClosed)?;
        rx.await.map_err(|_| ScanError::ControllerClosed)?
    }

    /// Stop scanning. A no-op when not scanning; never fails.
    pub async fn stop(&self, reason: StopReason) {
        let (reply, rx) = oneshot::channel();
        if self
            .commands
            .send(Command::Stop { reason, reply })
            .await
            .is_err()
        {
            debug!("Stop requested after controller shut down");
            return;
        }
        let _ = rx.await;
    }

    /// Current controller snapshot.
    pub fn snapshot(&self) -> ControllerSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Watch snapshots as they change.
    pub fn watch_snapshot(&self) -> watch::Receiver<ControllerSnapshot> {
        self.snapshot.clone()
    }

    /// Subscribe to scan events.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanEvent> {
        self.events.subscribe()
    }

    /// Shut the controller down and wait for it to release its resources.
    pub async fn shutdown(mut self) {
        self.shutdown.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Scan controller task ended abnormally");
            }
        }
    }
}

impl Drop for ScanControllerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::level_one;
    use crate::sim::{BindMode, RecordingPresenter, SimAssetProbe, SimCamera, SimEngine};

    fn spawn_with(
        bind: BindMode,
    ) -> (ScanControllerHandle, Arc<SimEngine>, Arc<RecordingPresenter>) {
        let (engine, parts) = SimEngine::new(bind);
        let presenter = Arc::new(RecordingPresenter::new());
        let handle = ScanController::spawn(ControllerParts {
            level: Arc::new(level_one()),
            engine: parts,
            camera: Arc::new(SimCamera::available()),
            assets: Arc::new(SimAssetProbe::ok()),
            asset_url: "http://localhost/level-1.mind".to_string(),
            presenter: presenter.clone(),
            timings: ScanTimings::default(),
        });
        (handle, engine, presenter)
    }

    async fn wait_state(handle: &ScanControllerHandle, state: ScanState) {
        let mut rx = handle.watch_snapshot();
        rx.wait_for(|s| s.state == state).await.unwrap();
    }

    #[test]
    fn test_format_delay() {
        assert_eq!(format_delay(Duration::from_secs(2)), "2s");
        assert_eq!(format_delay(Duration::from_millis(1500)), "1.5s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_before_loaded_is_rejected() {
        let (handle, _engine, _) = spawn_with(BindMode::Always);
        assert_eq!(handle.start().await, Err(ScanError::NotReady));
        assert_eq!(handle.snapshot().state, ScanState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_noop() {
        let (handle, engine, _) = spawn_with(BindMode::Always);
        engine.loaded();
        wait_state(&handle, ScanState::Ready).await;

        handle.start().await.unwrap();
        handle.start().await.unwrap();
        assert_eq!(engine.start_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_verification_retry() {
        let (handle, engine, _) = spawn_with(BindMode::Never);
        engine.loaded();
        wait_state(&handle, ScanState::Ready).await;

        handle.start().await.unwrap();
        handle.stop(StopReason::User).await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(engine.start_count(), 1);
        assert_eq!(handle.snapshot().state, ScanState::Ready);
        assert!(handle.snapshot().last_error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_failure_while_scanning() {
        let (handle, engine, presenter) = spawn_with(BindMode::Always);
        engine.loaded();
        wait_state(&handle, ScanState::Ready).await;
        handle.start().await.unwrap();

        engine.fail("tracker crashed");
        wait_state(&handle, ScanState::StoppingOrFailed).await;

        let snapshot = handle.snapshot();
        assert_eq!(
            snapshot.last_error,
            Some(ScanError::EngineFailure("tracker crashed".to_string()))
        );
        assert_eq!(engine.stop_count(), 1);
        assert!(presenter.state().controls.start_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_engine_failure_before_loaded_stays_idle() {
        let (handle, engine, _) = spawn_with(BindMode::Always);
        let mut rx = handle.watch_snapshot();

        engine.fail("model missing");
        rx.wait_for(|s| s.last_error.is_some()).await.unwrap();

        assert_eq!(handle.snapshot().state, ScanState::Idle);
        assert_eq!(handle.start().await, Err(ScanError::NotReady));
        assert_eq!(engine.start_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_stop_failure_is_reported() {
        let (handle, engine, presenter) = spawn_with(BindMode::FromStart(2));
        engine.loaded();
        wait_state(&handle, ScanState::Ready).await;
        let mut events = handle.subscribe();

        handle.start().await.unwrap();
        engine.set_stop_failure(Some("stuck"));
        tokio::time::sleep(Duration::from_secs(4)).await;

        assert_eq!(engine.start_count(), 2);
        assert_eq!(engine.stop_count(), 1);
        assert_eq!(handle.snapshot().state, ScanState::Scanning);

        let mut reported = false;
        while let Ok(event) = events.try_recv() {
            if event == ScanEvent::Failed(ScanError::EngineStop("stuck".to_string())) {
                reported = true;
            }
        }
        assert!(reported);
        assert!(presenter
            .state()
            .notifications
            .iter()
            .any(|n| n.contains("stuck")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_releases_camera() {
        let (handle, engine, _) = spawn_with(BindMode::Always);
        engine.loaded();
        wait_state(&handle, ScanState::Ready).await;
        handle.start().await.unwrap();

        let stream = engine.current_stream().unwrap();
        assert!(stream.is_live());

        handle.shutdown().await;
        assert!(!stream.is_live());
        assert_eq!(engine.stop_count(), 1);
    }
}
