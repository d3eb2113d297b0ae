//! The live scan session.
//!
//! `ScanSession` is the pure part of the controller: it remembers the last
//! recognized slot and the pending reset deadline, and decides which found
//! and lost events matter. It performs no I/O, so its invariants can be
//! tested with plain instants.

use std::time::Duration;

use tokio::time::Instant;

use crate::level::MarkerSlot;

/// What a lost event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LostOutcome {
    /// The event was for another slot, or nothing is recognized.
    Ignored,
    /// The reset timer is armed for the remembered slot.
    ResetArmed { slot: MarkerSlot, deadline: Instant },
}

/// One active camera + tracking run.
///
/// Created by the controller on a successful start and dropped on stop.
#[derive(Debug)]
pub struct ScanSession {
    last_recognized: Option<MarkerSlot>,
    pending_reset: Option<Instant>,
    reset_delay: Duration,
}

impl ScanSession {
    pub(crate) fn begin(reset_delay: Duration) -> Self {
        Self {
            last_recognized: None,
            pending_reset: None,
            reset_delay,
        }
    }

    /// The slot most recently dispatched.
    pub fn last_recognized(&self) -> Option<&MarkerSlot> {
        self.last_recognized.as_ref()
    }

    /// Deadline of the pending reset, if armed.
    pub fn pending_reset(&self) -> Option<Instant> {
        self.pending_reset
    }

    /// Record a recognized slot. Always cancels a pending reset.
    pub fn on_found(&mut self, slot: MarkerSlot) {
        self.pending_reset = None;
        self.last_recognized = Some(slot);
    }

    /// Record a lost slot.
    ///
    /// Only the remembered slot arms (or re-arms) the reset timer.
    pub fn on_lost(&mut self, index: u32, now: Instant) -> LostOutcome {
        match &self.last_recognized {
            Some(slot) if slot.index == index => {
                let deadline = now + self.reset_delay;
                self.pending_reset = Some(deadline);
                LostOutcome::ResetArmed {
                    slot: slot.clone(),
                    deadline,
                }
            }
            _ => LostOutcome::Ignored,
        }
    }

    /// Apply the pending reset if its deadline has passed.
    ///
    /// Returns `true` when the session went back to "nothing recognized".
    pub fn fire_reset(&mut self, now: Instant) -> bool {
        match self.pending_reset {
            Some(deadline) if now >= deadline => {
                self.pending_reset = None;
                self.last_recognized = None;
                true
            }
            _ => false,
        }
    }

    /// End the session, clearing all pending state.
    pub fn end(&mut self) {
        self.pending_reset = None;
        self.last_recognized = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DELAY: Duration = Duration::from_millis(2000);

    fn slot(index: u32) -> MarkerSlot {
        MarkerSlot::new(index, format!("k{}", index).as_str())
    }

    #[test]
    fn test_found_then_lost_arms_reset() {
        let now = Instant::now();
        let mut session = ScanSession::begin(DELAY);
        session.on_found(slot(0));

        let outcome = session.on_lost(0, now);
        assert_eq!(
            outcome,
            LostOutcome::ResetArmed {
                slot: slot(0),
                deadline: now + DELAY
            }
        );
        assert_eq!(session.pending_reset(), Some(now + DELAY));
    }

    #[test]
    fn test_lost_for_other_slot_is_ignored() {
        let now = Instant::now();
        let mut session = ScanSession::begin(DELAY);
        session.on_found(slot(0));

        assert_eq!(session.on_lost(1, now), LostOutcome::Ignored);
        assert!(session.pending_reset().is_none());
        assert_eq!(session.last_recognized(), Some(&slot(0)));
    }

    #[test]
    fn test_found_cancels_pending_reset() {
        let now = Instant::now();
        let mut session = ScanSession::begin(DELAY);
        session.on_found(slot(0));
        session.on_lost(0, now);
        session.on_found(slot(1));

        assert!(session.pending_reset().is_none());
        assert!(!session.fire_reset(now + DELAY * 2));
        assert_eq!(session.last_recognized(), Some(&slot(1)));
    }

    #[test]
    fn test_reset_fires_only_after_deadline() {
        let now = Instant::now();
        let mut session = ScanSession::begin(DELAY);
        session.on_found(slot(0));
        session.on_lost(0, now);

        assert!(!session.fire_reset(now + Duration::from_millis(1999)));
        assert!(session.fire_reset(now + DELAY));
        assert!(session.last_recognized().is_none());
        // Lost after reset refers to nothing.
        assert_eq!(session.on_lost(0, now + DELAY), LostOutcome::Ignored);
    }

    #[test]
    fn test_repeated_lost_rearms() {
        let now = Instant::now();
        let mut session = ScanSession::begin(DELAY);
        session.on_found(slot(0));
        session.on_lost(0, now);
        session.on_lost(0, now + Duration::from_millis(1500));

        assert!(!session.fire_reset(now + DELAY));
        assert!(session.fire_reset(now + Duration::from_millis(3500)));
    }

    #[test]
    fn test_end_clears_everything() {
        let now = Instant::now();
        let mut session = ScanSession::begin(DELAY);
        session.on_found(slot(0));
        session.on_lost(0, now);
        session.end();

        assert!(session.pending_reset().is_none());
        assert!(session.last_recognized().is_none());
    }

    #[derive(Debug, Clone)]
    enum Step {
        Found(u32),
        Lost(u32),
        Wait(u64),
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![
            (0u32..3).prop_map(Step::Found),
            (0u32..3).prop_map(Step::Lost),
            (0u64..3000).prop_map(Step::Wait),
        ]
    }

    proptest! {
        /// The pending reset exists exactly when the last relevant event was
        /// a lost for the remembered slot, and settled content is the last
        /// dispatched slot unless its lost event outlived the debounce.
        #[test]
        fn prop_settled_slot_matches_last_dispatch(steps in prop::collection::vec(step(), 0..40)) {
            let start = Instant::now();
            let mut now = start;
            let mut session = ScanSession::begin(DELAY);

            let mut shown: Option<u32> = None;
            let mut lost_at: Option<Instant> = None;

            for step in steps {
                match step {
                    Step::Found(i) => {
                        session.on_found(slot(i));
                        shown = Some(i);
                        lost_at = None;
                    }
                    Step::Lost(i) => {
                        if shown == Some(i) {
                            lost_at = Some(now);
                        }
                        session.on_lost(i, now);
                    }
                    Step::Wait(ms) => {
                        now += Duration::from_millis(ms);
                        let due = lost_at.is_some_and(|t| now >= t + DELAY);
                        if due {
                            shown = None;
                            lost_at = None;
                        }
                        prop_assert_eq!(session.fire_reset(now), due);
                    }
                }
                prop_assert_eq!(session.pending_reset().is_some(), lost_at.is_some());
                prop_assert_eq!(session.last_recognized().map(|s| s.index), shown);
            }

            // Settle.
            let settled = now + DELAY;
            session.fire_reset(settled);
            let expected = if lost_at.is_some() { None } else { shown };
            prop_assert_eq!(session.last_recognized().map(|s| s.index), expected);
        }
    }
}
