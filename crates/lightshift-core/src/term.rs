// Lightshift Terms
// Per-key tapping term decisions and tap / hold introspection hooks

use serde::Deserialize;

use crate::keycode::{Keycode, KC_COMMA, KC_DOT, KC_SEMICOLON, KC_SLASH, KC_SPACE};
use crate::record::KeyRecord;
use crate::state::ShiftRegistry;

/// Short term for shift keys before an opposite-hand key
pub const DEFAULT_LIGHTSHIFT_TERM: u16 = 150;

/// Same-hand term; the maximum makes a hold practically impossible
pub const DEFAULT_EXTENDED_TERM: u16 = u16::MAX;

/// Term for every other tap / hold key
pub const TAPPING_TERM: u16 = 200;

/// Tapping terms in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Terms {
    pub lightshift: u16,
    pub extended: u16,
    pub default: u16,
    /// Flow tap is off unless set
    pub flow_tap: Option<u16>,
}

impl Default for Terms {
    fn default() -> Self {
        Self {
            lightshift: DEFAULT_LIGHTSHIFT_TERM,
            extended: DEFAULT_EXTENDED_TERM,
            default: TAPPING_TERM,
            flow_tap: None,
        }
    }
}

/// Tapping term for a key event.
///
/// Extended while the key is tracked as EXTENDED TT or RELEASED, EXTENDED;
/// otherwise the lightshift term for shift-capable keys and the default term
/// for everything else. Pure: repeated calls with no intervening event give
/// the same answer.
pub fn calculate_term<const N: usize>(
    registry: &ShiftRegistry<N>,
    terms: &Terms,
    keycode: Keycode,
    record: &KeyRecord,
) -> u16 {
    if registry.uses_extended_term(record.key) {
        return terms.extended;
    }
    if keycode.is_lightshift() {
        return terms.lightshift;
    }
    terms.default
}

/// Permissive hold would turn `s`-`i` rolls into holds; off for shift keys
pub fn permissive_hold(keycode: Keycode) -> bool {
    !keycode.is_lightshift()
}

/// Chordal hold, off for shift keys so handedness is decided here instead
pub fn chordal_hold(tap_hold_keycode: Keycode) -> bool {
    !tap_hold_keycode.is_lightshift()
}

/// Keys that take part in flow tap: letters and common prose punctuation
pub fn is_flow_tap_key(keycode: Keycode) -> bool {
    let tap = keycode.tap_keycode();
    tap.is_alpha() || matches!(tap, KC_SPACE | KC_DOT | KC_COMMA | KC_SEMICOLON | KC_SLASH)
}

/// Flow tap term; shift keys never use flow tap
pub fn flow_tap_term(terms: &Terms, keycode: Keycode, prev_keycode: Keycode) -> u16 {
    if keycode.is_lightshift() {
        return 0;
    }
    match terms.flow_tap {
        Some(term) if is_flow_tap_key(keycode) && is_flow_tap_key(prev_keycode) => term,
        _ => 0,
    }
}
