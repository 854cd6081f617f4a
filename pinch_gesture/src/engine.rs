//! `GestureEngine`: the per-frame entry point.
//!
//! Owns every piece of state that lives across frames: one debounce machine
//! per hand slot, the two-hand tracker and the previous frame's signals.
//! The host calls [`GestureEngine::process_frame`] once per captured frame,
//! in capture order, and forwards the returned events.

use std::time::Instant;

use tracing::warn;

use crate::classifier::{classify, HandSignal};
use crate::config::GestureConfig;
use crate::debounce::{DebounceMachine, DebounceTiming};
use crate::event::GestureEvent;
use crate::hover::hover_event;
use crate::landmarks::{HandFrame, MAX_HANDS};
use crate::two_hand::TwoHandTracker;

pub struct GestureEngine {
    config:       GestureConfig,
    machines:     [DebounceMachine; MAX_HANDS],
    two_hand:     TwoHandTracker,
    last_signals: [HandSignal; MAX_HANDS],
    last_frame:   Option<Instant>,
}

impl GestureEngine {
    pub fn new(config: GestureConfig) -> Self {
        let timing = DebounceTiming {
            min_hold:      config.min_hold(),
            cooldown:      config.cooldown(),
            double_window: config.double_window(),
        };
        GestureEngine {
            config,
            machines:     [DebounceMachine::new(0, timing), DebounceMachine::new(1, timing)],
            two_hand:     TwoHandTracker::new(),
            last_signals: [HandSignal::LOST; MAX_HANDS],
            last_frame:   None,
        }
    }

    pub fn config(&self) -> &GestureConfig { &self.config }

    /// Signals computed for the most recent accepted frame, for overlays.
    pub fn last_signals(&self) -> &[HandSignal; MAX_HANDS] { &self.last_signals }

    pub fn machine(&self, slot: usize) -> Option<&DebounceMachine> { self.machines.get(slot) }

    pub fn two_hand_active(&self) -> bool { self.two_hand.is_active() }

    /// Interpret one frame.
    ///
    /// Event order within a frame: the two-hand event (if any), then actions
    /// by slot, then hover.
    pub fn process_frame(&mut self, frame: &HandFrame) -> Vec<GestureEvent> {
        let now = frame.timestamp;
        if let Some(prev) = self.last_frame {
            if now < prev {
                warn!("frame timestamp went backwards; frame dropped");
                return Vec::new();
            }
        }
        self.last_frame = Some(now);

        let mut signals = [HandSignal::LOST; MAX_HANDS];
        for (slot, signal) in signals.iter_mut().enumerate() {
            if let Some(hand) = frame.hand(slot) {
                *signal = classify(hand, &self.config);
            }
        }

        let mut events = Vec::new();
        if let Some(ev) = self.two_hand.update(&signals) {
            events.push(ev);
        }

        let trigger = self.config.action_trigger;
        let two_hand_active = self.two_hand.is_active();
        for (machine, signal) in self.machines.iter_mut().zip(signals.iter()) {
            if !signal.detected {
                machine.hand_lost();
            } else if two_hand_active {
                machine.suppress(signal.triggered(trigger));
            } else if let Some(ev) = machine.update(now, signal.triggered(trigger), signal.point_for(trigger)) {
                events.push(ev);
            }
        }

        if let Some(ev) = hover_event(&signals, two_hand_active) {
            events.push(ev);
        }

        self.last_signals = signals;
        events
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
