// Lightshift Simulator
// Deterministic host pipeline: early hook, tap / hold arbiter, late hook, action

pub mod arbiter;
pub mod keyboard;
pub mod trace;

use std::fmt;

pub use arbiter::{KeyEvent, TapHoldArbiter, TapHoldTiming};
pub use keyboard::{char_for, SimKeyboard};
pub use trace::{parse_trace, TraceError, TraceEvent};

use crate::config::{Layer, LightshiftConfig};
use crate::engine::Lightshift;
use crate::host::KeymapLookup;
use crate::keycode::Mods;
use crate::policy::{DefaultPolicy, ShiftPolicy};
use crate::record::{KeyPos, KeyRecord};
use crate::state::ShiftState;

/// Tracked shifts after one physical event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventReport {
    pub time: u16,
    pub key: KeyPos,
    pub pressed: bool,
    pub shifts: Vec<(KeyPos, ShiftState)>,
    pub output: String,
}

impl fmt::Display for EventReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = if self.pressed { "down" } else { "up" };
        write!(f, "{:>5} {:<4} {:<5}", self.time, action, self.key.to_string())?;
        if self.shifts.is_empty() {
            write!(f, " -")?;
        }
        for (key, state) in &self.shifts {
            write!(f, " [{}: {}]", key, state)?;
        }
        write!(f, " {:?}", self.output)
    }
}

/// Keyboard pipeline driving a [`Lightshift`] engine the way firmware does
#[derive(Debug, Clone)]
pub struct Simulator<P: ShiftPolicy = DefaultPolicy> {
    engine: Lightshift<P>,
    keyboard: SimKeyboard,
    arbiter: TapHoldArbiter,
    now: u16,
    reports: Vec<EventReport>,
}

impl Simulator {
    pub fn new(config: LightshiftConfig, layers: Vec<Layer>) -> Self {
        Self::with_policy(config, layers, DefaultPolicy)
    }

    /// Simulator for a loaded keyboard configuration
    #[cfg(feature = "config")]
    pub fn from_config(config: crate::config::KeyboardConfig) -> Self {
        Self::new(config.engine, config.layers)
    }
}

impl<P: ShiftPolicy> Simulator<P> {
    pub fn with_policy(config: LightshiftConfig, layers: Vec<Layer>, policy: P) -> Self {
        Self {
            engine: Lightshift::with_policy(config, policy),
            keyboard: SimKeyboard::new(layers),
            arbiter: TapHoldArbiter::new(),
            now: 0,
            reports: Vec::new(),
        }
    }

    /// Also resolve mod-taps as holds on nested taps, for keys the engine
    /// allows it
    pub fn with_permissive_hold(mut self, enabled: bool) -> Self {
        self.arbiter = self.arbiter.with_permissive_hold(enabled);
        self
    }

    pub fn press(&mut self, key: KeyPos, time: u16) {
        self.event(KeyRecord::press(key, time));
    }

    pub fn release(&mut self, key: KeyPos, time: u16) {
        self.event(KeyRecord::release(key, time));
    }

    /// Advance the clock, resolving any pending key whose term has run out
    pub fn tick(&mut self, now: u16) {
        self.now = now;
        let mut resolved = Vec::new();
        self.arbiter.tick(now, &self.engine, &mut resolved);
        self.process(resolved);
    }

    /// Play a parsed trace; times are taken modulo the 16-bit clock
    pub fn run_trace(&mut self, events: &[TraceEvent]) {
        for event in events {
            let time = event.time as u16;
            if event.pressed {
                self.press(event.key, time);
            } else {
                self.release(event.key, time);
            }
        }
    }

    fn event(&mut self, record: KeyRecord) {
        self.tick(record.time);

        let keycode = self.keyboard.keycode_at(record.key);
        self.engine.on_early_event(keycode, &record, &self.keyboard);

        let mut resolved = Vec::new();
        self.arbiter
            .feed(KeyEvent { keycode, record }, &self.engine, &mut resolved);
        self.process(resolved);

        self.reports.push(EventReport {
            time: record.time,
            key: record.key,
            pressed: record.pressed,
            shifts: self
                .engine
                .registry()
                .iter()
                .map(|shift| (shift.key, shift.state))
                .collect(),
            output: self.keyboard.output().to_string(),
        });
    }

    fn process(&mut self, events: Vec<KeyEvent>) {
        for event in events {
            let record = event.record;
            // held keys keep the keycode they were processed with
            let keycode = if record.pressed {
                self.keyboard.press_key(record.key)
            } else {
                self.keyboard.release_key(record.key)
            };
            self.engine.on_late_event(keycode, &record, &mut self.keyboard);
            self.keyboard.apply(keycode, &record);
        }
    }

    /// Text typed so far
    pub fn output(&self) -> &str {
        self.keyboard.output()
    }

    pub fn mods(&self) -> Mods {
        crate::host::Host::mods(&self.keyboard)
    }

    pub fn now(&self) -> u16 {
        self.now
    }

    pub fn engine(&self) -> &Lightshift<P> {
        &self.engine
    }

    pub fn keyboard(&self) -> &SimKeyboard {
        &self.keyboard
    }

    pub fn arbiter(&self) -> &TapHoldArbiter {
        &self.arbiter
    }

    /// One report per physical event, in order
    pub fn reports(&self) -> &[EventReport] {
        &self.reports
    }

    /// Shift state of a position right now
    pub fn state_of(&self, key: KeyPos) -> ShiftState {
        self.engine.registry().state_of(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::{mod_tap, KC_I, KC_S, KC_T, MOD_LSFT};

    const S: KeyPos = KeyPos::new(0, 1);
    const T: KeyPos = KeyPos::new(0, 3);
    const I: KeyPos = KeyPos::new(0, 7);

    fn simulator() -> Simulator {
        let mut row = vec![crate::keycode::KC_NO; 10];
        row[1] = mod_tap(MOD_LSFT, KC_S);
        row[3] = KC_T;
        row[7] = KC_I;
        let config = LightshiftConfig {
            board: crate::handedness::BoardGeometry::new(1, 10, false),
            ..LightshiftConfig::default()
        };
        Simulator::new(config, vec![Layer::from_rows(vec![row])])
    }

    #[test]
    fn test_roll_types_lowercase() {
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(I, 40);
        sim.release(S, 70);
        sim.release(I, 90);
        assert_eq!(sim.output(), "si");
        assert_eq!(sim.engine().registry().active_count(), 0);
    }

    #[test]
    fn test_reports_follow_events() {
        let mut sim = simulator();
        sim.press(S, 0);
        sim.press(T, 30);
        let reports = sim.reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].shifts, vec![(S, ShiftState::Unresolved)]);
        assert_eq!(reports[1].shifts, vec![(S, ShiftState::ExtendedTt)]);
        assert!(reports[1].to_string().contains("EXTENDED TT"));
    }
}
