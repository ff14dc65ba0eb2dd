// Lightshift Tap / Hold Arbiter
// Decides tap or hold for mod-tap and layer-tap keys, buffering later events

use smallvec::SmallVec;

use crate::engine::Lightshift;
use crate::keycode::Keycode;
use crate::policy::ShiftPolicy;
use crate::record::{timer_elapsed, KeyRecord};

/// One key event travelling through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Keycode seen when the event arrived
    pub keycode: Keycode,
    pub record: KeyRecord,
}

/// Per-key timing decisions the arbiter asks for
pub trait TapHoldTiming {
    fn tapping_term(&self, keycode: Keycode, record: &KeyRecord) -> u16;
    fn permissive_hold(&self, keycode: Keycode) -> bool;
}

impl<P: ShiftPolicy, const N: usize> TapHoldTiming for Lightshift<P, N> {
    fn tapping_term(&self, keycode: Keycode, record: &KeyRecord) -> u16 {
        self.term_for(keycode, record)
    }

    fn permissive_hold(&self, keycode: Keycode) -> bool {
        Lightshift::permissive_hold(self, keycode)
    }
}

/// Holds at most one undecided tap / hold key, plus every event that
/// arrived after it.
///
/// A pending key becomes a tap when released before its term runs out and a
/// hold once `timer_elapsed(now, pressed_at) >= term`. The term is asked for
/// again on every check. Resolved events come out in arrival order; a
/// buffered tap / hold press becomes the next pending key.
#[derive(Debug, Clone, Default)]
pub struct TapHoldArbiter {
    pending: Option<KeyEvent>,
    waiting: SmallVec<[KeyEvent; 8]>,
    permissive_hold: bool,
}

impl TapHoldArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also resolve as hold when another key is pressed and released inside
    /// the pending key, where the timing allows it
    pub fn with_permissive_hold(mut self, enabled: bool) -> Self {
        self.permissive_hold = enabled;
        self
    }

    /// The undecided key, if any
    pub fn pending(&self) -> Option<&KeyEvent> {
        self.pending.as_ref()
    }

    /// Events held back behind the pending key
    pub fn waiting(&self) -> &[KeyEvent] {
        &self.waiting
    }

    /// Resolve a pending key whose term has run out by `now`
    pub fn tick<T: TapHoldTiming + ?Sized>(&mut self, now: u16, timing: &T, out: &mut Vec<KeyEvent>) {
        while self.term_expired(now, timing) {
            self.resolve(false, timing, out);
        }
    }

    /// Accept a newly arrived (or replayed) event
    pub fn feed<T: TapHoldTiming + ?Sized>(&mut self, event: KeyEvent, timing: &T, out: &mut Vec<KeyEvent>) {
        self.tick(event.record.time, timing, out);

        let Some(pending) = self.pending else {
            if event.record.pressed && event.keycode.is_tap_hold() {
                self.pending = Some(event);
            } else {
                out.push(event);
            }
            return;
        };

        if !event.record.pressed && event.record.key == pending.record.key {
            // released inside its term
            self.resolve(true, timing, out);
            let release = event.record.with_tap_count(1);
            self.feed(KeyEvent { record: release, ..event }, timing, out);
            return;
        }

        let nested_release = !event.record.pressed
            && self
                .waiting
                .iter()
                .any(|waiting| waiting.record.pressed && waiting.record.key == event.record.key);
        self.waiting.push(event);

        if nested_release && self.permissive_hold && timing.permissive_hold(pending.keycode) {
            self.resolve(false, timing, out);
        }
    }

    fn term_expired<T: TapHoldTiming + ?Sized>(&self, now: u16, timing: &T) -> bool {
        match &self.pending {
            Some(pending) => {
                let term = timing.tapping_term(pending.keycode, &pending.record);
                timer_elapsed(now, pending.record.time) >= term
            }
            None => false,
        }
    }

    fn resolve<T: TapHoldTiming + ?Sized>(&mut self, tap: bool, timing: &T, out: &mut Vec<KeyEvent>) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        let tap_count = if tap { 1 } else { 0 };
        out.push(KeyEvent {
            record: pending.record.with_tap_count(tap_count),
            ..pending
        });

        let waiting = std::mem::take(&mut self.waiting);
        for event in waiting {
            self.feed(event, timing, out);
        }
    }
}
