// Lightshift Tracking
// Two-stage shift state machine driven by key events
//
//                       INACTIVE
//                          |
//                    [early] shift pressed
//                          v
//     +-------------- UNRESOLVED ---------------+
//     |                    |                    |
//     |       [early] opp-hand / same-hand    [early] released (tap)
//     |            v                 v          |
//     |      LIGHTSHIFT TT      EXTENDED TT     |
//     |        |      |              |          |
//     |      term  [early]        [early]       |
//     |     expiry released       released      |
//     v        v      |              v          |
//   SINGLE SHIFTING   |      RELEASED, EXTENDED |
//     |       |       |              |          |
//  consumed released  |        [early] next     |
//     v       |       |            event        |
//   DOUBLE SHIFTING   |              |          |
//     |        |      |              |          |
//  disallowed released|              |          |
//     v        v      v              v          v
//                       INACTIVE
//
// [early] transitions run before tap / hold arbitration, everything else
// after it. EXTENDED TT can also become SINGLE SHIFTING if a short custom
// extended term expires.

use log::debug;

use crate::handedness::{Hand, HandednessResolver};
use crate::host::{Host, KeymapLookup};
use crate::keycode::{Keycode, QK_LAYER_LOCK};
use crate::policy::ShiftPolicy;
use crate::record::KeyRecord;
use crate::state::{ShiftRegistry, ShiftState};

/// Is this a layer or modifier key, not counting mod-tap / layer-tap keys?
///
/// For the early stage, where tap / hold keys are still undecided.
pub fn is_layer_or_mod_early(keycode: Keycode) -> bool {
    keycode.is_modifier() || keycode.is_layer_range() || keycode == QK_LAYER_LOCK
}

/// Is this a layer or modifier key, including held mod-tap / layer-tap keys?
///
/// Only meaningful in the late stage, once the tap count is known.
pub fn is_layer_or_mod(keycode: Keycode, record: &KeyRecord) -> bool {
    is_layer_or_mod_early(keycode) || (keycode.is_tap_hold() && record.tap_count == 0)
}

/// Early stage: new presses, handedness decisions, releases of non-held
/// shifts
pub fn track_early<P, K, const N: usize>(
    registry: &mut ShiftRegistry<N>,
    resolver: &HandednessResolver,
    policy: &P,
    keycode: Keycode,
    record: &KeyRecord,
    keymap: &K,
) where
    P: ShiftPolicy + ?Sized,
    K: KeymapLookup + ?Sized,
{
    // RELEASED, EXTENDED has outlived the event it was kept for
    for key in registry.positions_in(ShiftState::ReleasedExtended) {
        registry.set_state(key, ShiftState::Inactive, keymap);
    }

    if !record.pressed {
        release_non_held_shift(registry, record, keymap);
    }

    decide_tapping_term(registry, resolver, policy, keycode, record, keymap);

    if record.pressed && keycode.is_lightshift() {
        registry.set_state(record.key, ShiftState::Unresolved, keymap);
    }
}

fn release_non_held_shift<K: KeymapLookup + ?Sized, const N: usize>(
    registry: &mut ShiftRegistry<N>,
    record: &KeyRecord,
    keymap: &K,
) {
    // the arbiter decides later in the cycle, so an extended shift keeps its
    // term for one more event
    match registry.state_of(record.key) {
        ShiftState::ExtendedTt => {
            registry.set_state(record.key, ShiftState::ReleasedExtended, keymap)
        }
        ShiftState::Unresolved | ShiftState::LightshiftTt => {
            registry.set_state(record.key, ShiftState::Inactive, keymap)
        }
        _ => {}
    }
}

fn decide_tapping_term<P, K, const N: usize>(
    registry: &mut ShiftRegistry<N>,
    resolver: &HandednessResolver,
    policy: &P,
    keycode: Keycode,
    record: &KeyRecord,
    keymap: &K,
) where
    P: ShiftPolicy + ?Sized,
    K: KeymapLookup + ?Sized,
{
    if !record.pressed || is_layer_or_mod_early(keycode) {
        return;
    }

    let hand = resolver.resolve(record.key, policy);
    for key in registry.positions_in(ShiftState::Unresolved) {
        let shift_hand = resolver.resolve(key, policy);
        // unknown on either side counts as same hand
        let same_or_unknown =
            hand == Hand::Unknown || shift_hand == Hand::Unknown || hand.same_as(shift_hand);
        let state = if same_or_unknown {
            ShiftState::ExtendedTt
        } else {
            ShiftState::LightshiftTt
        };
        registry.set_state(key, state, keymap);
    }
}

/// Late stage: hold promotion, single consumption, releases of held shifts
pub fn track_late<P, H, const N: usize>(
    registry: &mut ShiftRegistry<N>,
    policy: &P,
    keycode: Keycode,
    record: &KeyRecord,
    host: &H,
) where
    P: ShiftPolicy + ?Sized,
    H: Host + ?Sized,
{
    // held shifts stop here rather than early, so every key they may have
    // shifted has been processed
    if !record.pressed && registry.state_of(record.key).is_held() {
        registry.set_state(record.key, ShiftState::Inactive, host);
    }

    consume_single_shifts(registry, policy, keycode, record, host);

    if keycode.is_lightshift() && record.pressed && record.tap_count == 0 {
        match registry.state_of(record.key) {
            ShiftState::Unresolved | ShiftState::LightshiftTt | ShiftState::ExtendedTt => {
                registry.set_state(record.key, ShiftState::SingleShifting, host)
            }
            _ => {}
        }
    }
}

fn consume_single_shifts<P, H, const N: usize>(
    registry: &mut ShiftRegistry<N>,
    policy: &P,
    keycode: Keycode,
    record: &KeyRecord,
    host: &H,
) where
    P: ShiftPolicy + ?Sized,
    H: Host + ?Sized,
{
    if !record.pressed
        || is_layer_or_mod(keycode, record)
        || !policy.consume_single(keycode, record)
    {
        return;
    }

    for key in registry.positions_in(ShiftState::SingleShifting) {
        debug!("Single consumed by {}", keycode);
        registry.set_state(key, ShiftState::DoubleShifting, host);
    }
}
