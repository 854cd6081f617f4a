//! Debounce state machine for the discrete action gesture.
//!
//! ```text
//!            signal                   deadline reached
//!   Idle ───────────► Arming ───────────────────────► (fire) ──► Cooldown
//!    ▲                  │ signal drops                              │
//!    │◄─────────────────┘                                           │ until reached
//!    │◄───────────────────────── signal off ─────────────────────────┤
//!    │                                                               │ signal still on
//!    └──────────────── release ◄──── Latched ◄───────────────────────┘
//! ```
//!
//! Deadlines are plain [`Instant`]s compared against the frame timestamp, so
//! cancelling a pending hold is just leaving the `Arming` state; nothing can
//! fire late.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::event::{GestureEvent, Point2};

/// State of one hand slot's action machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    /// Trigger held; fires at `deadline` if still held.
    Arming { deadline: Instant },
    /// Just fired; nothing arms before `until`. `released` records whether
    /// the trigger dropped at any point since the fire.
    Cooldown { until: Instant, released: bool },
    /// Cooldown over but the trigger was never released.
    Latched,
}

/// Timing windows for one machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceTiming {
    pub min_hold:      Duration,
    pub cooldown:      Duration,
    pub double_window: Duration,
}

/// Arm / fire / cooldown machine for a single hand slot.
#[derive(Clone, Debug)]
pub struct DebounceMachine {
    slot:      usize,
    timing:    DebounceTiming,
    state:     DebounceState,
    last_fire: Option<Instant>,
}

impl DebounceMachine {
    pub fn new(slot: usize, timing: DebounceTiming) -> Self {
        DebounceMachine { slot, timing, state: DebounceState::Idle, last_fire: None }
    }

    pub fn state(&self) -> DebounceState { self.state }
    pub fn last_fire(&self) -> Option<Instant> { self.last_fire }

    pub fn is_arming(&self) -> bool {
        matches!(self.state, DebounceState::Arming { .. })
    }

    pub fn cooldown_active(&self) -> bool {
        matches!(self.state, DebounceState::Cooldown { .. })
    }

    /// Advance with this frame's raw trigger signal. Returns the fired action,
    /// if any.
    pub fn update(&mut self, now: Instant, signal: bool, point: Point2) -> Option<GestureEvent> {
        // Expire the cooldown first so a frame landing exactly on its end can
        // arm again.
        if let DebounceState::Cooldown { until, released } = self.state {
            let released = released || !signal;
            if now >= until {
                self.state = if released { DebounceState::Idle } else { DebounceState::Latched };
                debug!(slot = self.slot, state = ?self.state, "cooldown over");
            } else {
                self.state = DebounceState::Cooldown { until, released };
            }
        }

        match self.state {
            DebounceState::Cooldown { .. } => None,

            DebounceState::Latched => {
                if !signal { self.state = DebounceState::Idle; }
                None
            }

            DebounceState::Idle => {
                if !signal { return None; }
                let deadline = now + self.timing.min_hold;
                self.state = DebounceState::Arming { deadline };
                debug!(slot = self.slot, "arming");
                self.try_fire(now, deadline, point)
            }

            DebounceState::Arming { deadline } => {
                if !signal {
                    debug!(slot = self.slot, "released before hold elapsed");
                    self.state = DebounceState::Idle;
                    return None;
                }
                self.try_fire(now, deadline, point)
            }
        }
    }

    fn try_fire(&mut self, now: Instant, deadline: Instant, point: Point2) -> Option<GestureEvent> {
        if now < deadline { return None; }

        let double = self.last_fire
            .map(|prev| now.saturating_duration_since(prev) < self.timing.double_window)
            .unwrap_or(false);
        self.last_fire = Some(now);
        self.state = DebounceState::Cooldown {
            until:    now + self.timing.cooldown,
            released: false,
        };

        info!(slot = self.slot, double, x = point.x, y = point.y, "action fired");
        Some(GestureEvent::Action { point, double })
    }

    /// The hand left the frame.
    ///
    /// Only a pending hold is cancelled. A running cooldown keeps its deadline
    /// and `Latched` stays latched: a detector that drops one frame in the
    /// middle of a held pinch has not seen a release. `last_fire` survives
    /// too, so a quick re-entry can still complete a double action.
    pub fn hand_lost(&mut self) {
        if let DebounceState::Arming { .. } = self.state {
            debug!(slot = self.slot, "hand lost while arming");
            self.state = DebounceState::Idle;
        }
    }

    /// Another interpretation (two-hand pinch) owns the frame. Pending holds
    /// are cancelled; a held trigger must be released before it can arm again.
    pub fn suppress(&mut self, signal: bool) {
        match self.state {
            DebounceState::Cooldown { .. } => {}
            _ if signal => self.state = DebounceState::Latched,
            _ => self.state = DebounceState::Idle,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const P: Point2 = Point2::new(0.5, 0.5);

    fn timing(hold: u64, cooldown: u64, window: u64) -> DebounceTiming {
        DebounceTiming {
            min_hold:      Duration::from_millis(hold),
            cooldown:      Duration::from_millis(cooldown),
            double_window: Duration::from_millis(window),
        }
    }

    fn ms(t0: Instant, n: u64) -> Instant { t0 + Duration::from_millis(n) }

    fn fired(ev: &Option<GestureEvent>) -> Option<bool> {
        match ev {
            Some(GestureEvent::Action { double, .. }) => Some(*double),
            _ => None,
        }
    }

    #[test]
    fn exact_hold_fires_once() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(150, 300, 500));
        assert!(m.update(t0, true, P).is_none());
        assert!(m.is_arming());
        assert_eq!(fired(&m.update(ms(t0, 150), true, P)), Some(false));
        assert!(m.cooldown_active());
        assert!(m.update(ms(t0, 200), true, P).is_none());
    }

    #[test]
    fn short_hold_never_fires() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(150, 300, 500));
        assert!(m.update(t0, true, P).is_none());
        assert!(m.update(ms(t0, 149), true, P).is_none());
        assert!(m.update(ms(t0, 160), false, P).is_none());
        assert_eq!(m.state(), DebounceState::Idle);
        assert!(m.last_fire().is_none());
    }

    #[test]
    fn continuous_hold_fires_once_then_latches() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(150, 300, 500));
        let fires = (0..=60)
            .filter_map(|i| m.update(ms(t0, i * 33), true, P))
            .count();
        assert_eq!(fires, 1);
        assert_eq!(m.state(), DebounceState::Latched);
        m.update(ms(t0, 2100), false, P);
        assert_eq!(m.state(), DebounceState::Idle);
    }

    #[test]
    fn double_inside_window() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(0, 300, 500));
        assert_eq!(fired(&m.update(t0, true, P)), Some(false));
        m.update(ms(t0, 100), false, P);
        assert_eq!(fired(&m.update(ms(t0, 300), true, P)), Some(true));
    }

    #[test]
    fn single_at_window_boundary() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(0, 300, 500));
        m.update(t0, true, P);
        m.update(ms(t0, 100), false, P);
        assert_eq!(fired(&m.update(ms(t0, 500), true, P)), Some(false));
    }

    #[test]
    fn cooldown_ignores_toggling() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(0, 300, 500));
        m.update(t0, true, P);
        for (i, on) in [(50, false), (60, true), (70, false), (80, true), (299, true)] {
            assert!(m.update(ms(t0, i), on, P).is_none());
            assert!(m.cooldown_active());
        }
    }

    #[test]
    fn hand_loss_cancels_pending_hold() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(150, 300, 500));
        m.update(t0, true, P);
        m.hand_lost();
        // A fresh hold starts from the next frame, not from t0.
        assert!(m.update(ms(t0, 150), true, P).is_none());
        assert!(m.update(ms(t0, 299), true, P).is_none());
        assert_eq!(fired(&m.update(ms(t0, 300), true, P)), Some(false));
    }

    #[test]
    fn hand_loss_keeps_cooldown_and_latch() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(0, 300, 500));
        m.update(t0, true, P);
        m.hand_lost();
        assert_eq!(
            m.state(),
            DebounceState::Cooldown { until: ms(t0, 300), released: false },
        );

        // Still held when the cooldown ends: latched, and a lost frame
        // does not count as the release.
        assert!(m.update(ms(t0, 300), true, P).is_none());
        assert_eq!(m.state(), DebounceState::Latched);
        m.hand_lost();
        assert_eq!(m.state(), DebounceState::Latched);
        assert!(m.update(ms(t0, 400), true, P).is_none());
    }

    #[test]
    fn suppress_latches_held_trigger() {
        let t0 = Instant::now();
        let mut m = DebounceMachine::new(0, timing(150, 300, 500));
        m.update(t0, true, P);
        m.suppress(true);
        assert_eq!(m.state(), DebounceState::Latched);
        assert!(m.update(ms(t0, 400), true, P).is_none());
    }
}
