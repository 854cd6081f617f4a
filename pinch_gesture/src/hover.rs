//! Continuous hover channel.

use crate::classifier::HandSignal;
use crate::event::GestureEvent;

/// Hover for this frame, if any.
///
/// Emitted while exactly one hand is present, it is pinched, and no two-hand
/// gesture owns the frame. It does not look at the debounce machine, so a
/// hover keeps flowing while an action arms, fires or cools down.
pub fn hover_event(signals: &[HandSignal; 2], two_hand_active: bool) -> Option<GestureEvent> {
    if two_hand_active { return None; }

    let detected = signals.iter().filter(|s| s.detected).count();
    if detected != 1 { return None; }

    let hand = signals.iter().find(|s| s.detected)?;
    if !hand.is_pinched || !hand.pinch_point.is_finite() { return None; }

    Some(GestureEvent::Hover { point: hand.pinch_point })
}
