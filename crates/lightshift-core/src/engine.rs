// Lightshift Engine
// Entry points the host key pipeline calls for every key event

use crate::config::LightshiftConfig;
use crate::dropshift::clear_any_double_shift;
use crate::handedness::{Hand, HandednessResolver};
use crate::host::{Host, KeymapLookup};
use crate::keycode::Keycode;
use crate::policy::{DefaultPolicy, ShiftPolicy};
use crate::record::{KeyPos, KeyRecord};
use crate::state::{ShiftRegistry, MAX_TRACKED_SHIFTS};
use crate::term::{self, Terms};
use crate::tracking::{track_early, track_late};

/// Home-row shift disambiguation engine.
///
/// The host must call, for every physical key event and in this order:
///
/// 1. [`on_early_event`](Self::on_early_event) on arrival, before its own
///    tap / hold arbitration;
/// 2. [`term_for`](Self::term_for) as often as it likes while a tap / hold
///    decision is pending;
/// 3. [`on_late_event`](Self::on_late_event) once the event has been
///    released by the arbiter, with the tap count filled in.
///
/// Skipping either stage leaves tracked shifts in stale states.
///
/// ```
/// use lightshift_core::engine::Lightshift;
/// use lightshift_core::config::LightshiftConfig;
/// use lightshift_core::keycode::{mod_tap, KC_S, MOD_LSFT};
/// use lightshift_core::record::{KeyPos, KeyRecord};
///
/// let engine = Lightshift::new(LightshiftConfig::default());
/// let press = KeyRecord::press(KeyPos::new(1, 3), 0);
/// assert_eq!(engine.term_for(mod_tap(MOD_LSFT, KC_S), &press), 150);
/// ```
#[derive(Debug, Clone)]
pub struct Lightshift<P: ShiftPolicy = DefaultPolicy, const N: usize = MAX_TRACKED_SHIFTS> {
    registry: ShiftRegistry<N>,
    terms: Terms,
    resolver: HandednessResolver,
    dropshift: bool,
    policy: P,
}

impl Lightshift {
    /// Engine with the default policy and capacity
    pub fn new(config: LightshiftConfig) -> Self {
        Self::with_policy(config, DefaultPolicy)
    }
}

impl<P: ShiftPolicy, const N: usize> Lightshift<P, N> {
    /// Engine with custom handedness / dropshift decisions
    pub fn with_policy(config: LightshiftConfig, policy: P) -> Self {
        Self {
            registry: ShiftRegistry::new(),
            terms: config.terms,
            resolver: HandednessResolver::new(config.board, config.hand_layout),
            dropshift: config.dropshift,
            policy,
        }
    }

    /// Tapping term for a pending tap / hold key; no side effects
    pub fn term_for(&self, keycode: Keycode, record: &KeyRecord) -> u16 {
        term::calculate_term(&self.registry, &self.terms, keycode, record)
    }

    /// Early stage, before tap / hold arbitration
    pub fn on_early_event<K: KeymapLookup + ?Sized>(
        &mut self,
        keycode: Keycode,
        record: &KeyRecord,
        keymap: &K,
    ) {
        track_early(
            &mut self.registry,
            &self.resolver,
            &self.policy,
            keycode,
            record,
            keymap,
        );
    }

    /// Late stage, after tap / hold arbitration. A no-op while dropshift is
    /// disabled.
    pub fn on_late_event<H: Host + ?Sized>(&mut self, keycode: Keycode, record: &KeyRecord, host: &mut H) {
        if !self.dropshift {
            return;
        }
        clear_any_double_shift(&mut self.registry, &self.policy, keycode, record, host);
        track_late(&mut self.registry, &self.policy, keycode, record, &*host);
    }

    /// Should permissive hold apply to this key?
    pub fn permissive_hold(&self, keycode: Keycode) -> bool {
        term::permissive_hold(keycode)
    }

    /// Should chordal hold apply to this tap / hold key?
    pub fn chordal_hold(&self, tap_hold_keycode: Keycode) -> bool {
        term::chordal_hold(tap_hold_keycode)
    }

    pub fn flow_tap_term(&self, keycode: Keycode, prev_keycode: Keycode) -> u16 {
        term::flow_tap_term(&self.terms, keycode, prev_keycode)
    }

    /// Hand a position is typed with
    pub fn handedness(&self, key: KeyPos) -> Hand {
        self.resolver.resolve(key, &self.policy)
    }

    pub fn registry(&self) -> &ShiftRegistry<N> {
        &self.registry
    }

    pub fn terms(&self) -> &Terms {
        &self.terms
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn dropshift_enabled(&self) -> bool {
        self.dropshift
    }

    pub fn set_dropshift(&mut self, enabled: bool) {
        self.dropshift = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keycode::{mod_tap, Mods, KC_I, KC_NO, KC_S, KC_T, MOD_LSFT};
    use crate::policy::FnPolicy;
    use crate::state::ShiftState;

    const S: KeyPos = KeyPos::new(1, 3);
    const I: KeyPos = KeyPos::new(1, 9);

    struct TestHost {
        mods: Mods,
    }

    impl KeymapLookup for TestHost {
        fn keycode_at(&self, key: KeyPos) -> Keycode {
            match key {
                S => mod_tap(MOD_LSFT, KC_S),
                I => KC_I,
                _ => KC_NO,
            }
        }
    }

    impl Host for TestHost {
        fn mods(&self) -> Mods {
            self.mods
        }

        fn unregister_mods(&mut self, mods: Mods) {
            self.mods.remove(mods);
        }
    }

    #[test]
    fn test_term_does_not_mutate() {
        let mut engine = Lightshift::new(LightshiftConfig::default());
        let host = TestHost { mods: Mods::empty() };
        let shift = mod_tap(MOD_LSFT, KC_S);
        let press = KeyRecord::press(S, 0);

        engine.on_early_event(shift, &press, &host);
        let first = engine.term_for(shift, &press);
        let second = engine.term_for(shift, &press);
        assert_eq!(first, second);
        assert_eq!(engine.registry().state_of(S), ShiftState::Unresolved);
    }

    #[test]
    fn test_disabled_dropshift_skips_late_stage() {
        let config = LightshiftConfig {
            dropshift: false,
            ..LightshiftConfig::default()
        };
        let mut engine = Lightshift::new(config);
        let mut host = TestHost { mods: Mods::empty() };
        let shift = mod_tap(MOD_LSFT, KC_S);
        let press = KeyRecord::press(S, 0);

        engine.on_early_event(shift, &press, &host);
        engine.on_late_event(shift, &press, &mut host);
        assert_eq!(engine.registry().state_of(S), ShiftState::Unresolved);

        engine.set_dropshift(true);
        engine.on_late_event(shift, &press, &mut host);
        assert_eq!(engine.registry().state_of(S), ShiftState::SingleShifting);
    }

    #[test]
    fn test_policy_handedness() {
        fn everything_left(_key: KeyPos) -> Option<Hand> {
            Some(Hand::Left)
        }

        let policy = FnPolicy {
            handedness: Some(everything_left),
            ..FnPolicy::default()
        };
        let mut engine: Lightshift<FnPolicy> = Lightshift::with_policy(LightshiftConfig::default(), policy);
        let host = TestHost { mods: Mods::empty() };
        assert_eq!(engine.handedness(I), Hand::Left);

        // I is on the right of the board, but the policy says left
        engine.on_early_event(mod_tap(MOD_LSFT, KC_S), &KeyRecord::press(S, 0), &host);
        engine.on_early_event(KC_I, &KeyRecord::press(I, 40), &host);
        assert_eq!(engine.registry().state_of(S), ShiftState::ExtendedTt);
        assert_eq!(engine.term_for(mod_tap(MOD_LSFT, KC_S), &KeyRecord::press(S, 0)), u16::MAX);
    }

    #[test]
    fn test_introspection_hooks() {
        let engine = Lightshift::new(LightshiftConfig::default());
        let shift = mod_tap(MOD_LSFT, KC_S);
        assert!(!engine.permissive_hold(shift));
        assert!(!engine.chordal_hold(shift));
        assert!(engine.permissive_hold(KC_T));
        assert_eq!(engine.flow_tap_term(shift, KC_T), 0);
    }
}
