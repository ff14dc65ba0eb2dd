// Lightshift Dropshift
// Drops an already-consumed shift before it double-shifts a letter

use log::debug;

use crate::host::Host;
use crate::keycode::{Keycode, Mods, KC_NO};
use crate::policy::ShiftPolicy;
use crate::record::KeyRecord;
use crate::state::{ShiftRegistry, ShiftState};
use crate::tracking::is_layer_or_mod;

/// Is this keypress a letter (A-Z)?
///
/// Mod-tap and layer-tap keys count by their tap keycode once resolved as a
/// tap (`tap_count == 1`).
pub fn is_letter(keycode: Keycode, record: &KeyRecord) -> bool {
    let keycode = if record.tap_count == 1 {
        keycode.tap_keycode()
    } else {
        keycode
    };
    keycode.is_alpha()
}

/// Default: letters consume the single shift
pub fn default_consume_single(keycode: Keycode, record: &KeyRecord) -> bool {
    is_letter(keycode, record)
}

/// Default: everything except letters may be shifted again
pub fn default_allow_double(keycode: Keycode, record: &KeyRecord) -> bool {
    !is_letter(keycode, record)
}

/// Are any modifiers other than shift active (a shortcut in progress)?
pub fn non_shift_mods_active(mods: Mods) -> bool {
    !mods.difference(Mods::SHIFT).is_empty()
}

/// 8-bit mask of the modifiers a mod-tap keycode holds
pub fn modtap_mods(keycode: Keycode) -> Mods {
    Mods::from_mods5(keycode.mod_tap_mods())
}

/// Clear the modifiers a mod-tap keycode holds, e.g. `LSFT_T(KC_S)` clears
/// left shift
pub fn clear_modtap_mods<H: Host + ?Sized>(host: &mut H, keycode: Keycode) {
    host.unregister_mods(modtap_mods(keycode));
    debug!("{} - Cleared", keycode);
}

/// Stop tracking the first DOUBLE SHIFTING entry and return its keycode, or
/// `KC_NO` if there is none
pub fn set_double_inactive<H: Host + ?Sized, const N: usize>(
    registry: &mut ShiftRegistry<N>,
    keycode: Keycode,
    host: &H,
) -> Keycode {
    let Some(shift) = registry
        .iter()
        .find(|shift| shift.state == ShiftState::DoubleShifting)
        .copied()
    else {
        return KC_NO;
    };

    debug!("Shift dropped by disallowed {} double", keycode);
    registry.set_state(shift.key, ShiftState::Inactive, host);
    shift.keycode
}

/// Drop a consumed shift if this keypress may not be double shifted.
///
/// Nothing happens for releases, layer / modifier keys, keys the policy
/// allows to double, or while a non-shift modifier is held. Only the first
/// DOUBLE SHIFTING entry is dropped per event.
pub fn clear_any_double_shift<P, H, const N: usize>(
    registry: &mut ShiftRegistry<N>,
    policy: &P,
    keycode: Keycode,
    record: &KeyRecord,
    host: &mut H,
) where
    P: ShiftPolicy + ?Sized,
    H: Host + ?Sized,
{
    if !record.pressed
        || is_layer_or_mod(keycode, record)
        || policy.allow_double(keycode, record)
        || non_shift_mods_active(host.mods())
    {
        return;
    }

    let shift_keycode = set_double_inactive(registry, keycode, &*host);
    if shift_keycode != KC_NO {
        clear_modtap_mods(host, shift_keycode);
    }
}
