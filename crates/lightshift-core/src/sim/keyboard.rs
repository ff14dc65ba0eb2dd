// Lightshift Simulated Keyboard
// Layers, modifier state and typed output of a simulated host

use smallvec::SmallVec;

use crate::config::Layer;
use crate::host::{Host, KeymapLookup};
use crate::keycode::{Keycode, Mods, KC_BACKSPACE, KC_LEFT_CTRL, KC_NO, KC_TRANSPARENT};
use crate::record::{KeyPos, KeyRecord};

/// Unshifted and shifted characters for basic keycodes
const CHARS: &[(u16, char, char)] = &[
    (0x1E, '1', '!'),
    (0x1F, '2', '@'),
    (0x20, '3', '#'),
    (0x21, '4', '$'),
    (0x22, '5', '%'),
    (0x23, '6', '^'),
    (0x24, '7', '&'),
    (0x25, '8', '*'),
    (0x26, '9', '('),
    (0x27, '0', ')'),
    (0x28, '\n', '\n'),
    (0x2B, '\t', '\t'),
    (0x2C, ' ', ' '),
    (0x2D, '-', '_'),
    (0x2E, '=', '+'),
    (0x2F, '[', '{'),
    (0x30, ']', '}'),
    (0x31, '\\', '|'),
    (0x33, ';', ':'),
    (0x34, '\'', '"'),
    (0x35, '`', '~'),
    (0x36, ',', '<'),
    (0x37, '.', '>'),
    (0x38, '/', '?'),
];

/// Character a basic keycode types, if any
pub fn char_for(keycode: Keycode, shifted: bool) -> Option<char> {
    if keycode.is_alpha() {
        let c = (b'a' + (keycode.code() - 0x04) as u8) as char;
        return Some(if shifted { c.to_ascii_uppercase() } else { c });
    }
    CHARS
        .iter()
        .find(|(code, _, _)| *code == keycode.code())
        .map(|(_, plain, shift)| if shifted { *shift } else { *plain })
}

/// Host side of the simulator: keymap layers, live modifiers and the text
/// typed so far.
///
/// Keys remember the keycode they were processed with until released, so a
/// layer change while a key is down does not change its release.
#[derive(Debug, Clone)]
pub struct SimKeyboard {
    layers: Vec<Layer>,
    /// Bit n set = layer n active; layer 0 is always active
    layer_state: u32,
    held: SmallVec<[(KeyPos, Keycode); 8]>,
    mods: Mods,
    output: String,
}

impl SimKeyboard {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self {
            layers,
            layer_state: 1,
            held: SmallVec::new(),
            mods: Mods::empty(),
            output: String::new(),
        }
    }

    /// Keycode from the active layers, highest first, skipping transparent
    /// keys
    pub fn resolve(&self, key: KeyPos) -> Keycode {
        for (index, layer) in self.layers.iter().enumerate().rev() {
            if index >= 32 || self.layer_state & (1 << index) == 0 {
                continue;
            }
            let keycode = layer.get(key);
            if keycode != KC_TRANSPARENT {
                return keycode;
            }
        }
        KC_NO
    }

    /// Resolve and remember the keycode of a key being processed as pressed
    pub fn press_key(&mut self, key: KeyPos) -> Keycode {
        let keycode = self.resolve(key);
        self.held.retain(|(pos, _)| *pos != key);
        self.held.push((key, keycode));
        keycode
    }

    /// Forget a released key, returning the keycode it was pressed with
    pub fn release_key(&mut self, key: KeyPos) -> Keycode {
        match self.held.iter().position(|(pos, _)| *pos == key) {
            Some(index) => self.held.remove(index).1,
            None => self.resolve(key),
        }
    }

    pub fn layer_on(&mut self, layer: u8) {
        if layer < 32 {
            self.layer_state |= 1 << layer;
        }
    }

    pub fn layer_off(&mut self, layer: u8) {
        if layer > 0 && layer < 32 {
            self.layer_state &= !(1 << layer);
        }
    }

    pub fn is_layer_on(&self, layer: u8) -> bool {
        layer < 32 && self.layer_state & (1 << layer) != 0
    }

    pub fn register_mods(&mut self, mods: Mods) {
        self.mods.insert(mods);
    }

    /// Text typed so far
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Carry out a processed event
    pub fn apply(&mut self, keycode: Keycode, record: &KeyRecord) {
        if keycode.is_mod_tap() {
            if record.is_tap() {
                if record.pressed {
                    self.type_key(keycode.mod_tap_keycode());
                }
            } else {
                let mods = Mods::from_mods5(keycode.mod_tap_mods());
                if record.pressed {
                    self.register_mods(mods);
                } else {
                    self.unregister_mods(mods);
                }
            }
        } else if keycode.is_layer_tap() {
            if record.is_tap() {
                if record.pressed {
                    self.type_key(keycode.layer_tap_keycode());
                }
            } else if record.pressed {
                self.layer_on(keycode.layer_tap_layer());
            } else {
                self.layer_off(keycode.layer_tap_layer());
            }
        } else if let Some(layer) = keycode.momentary_layer() {
            if record.pressed {
                self.layer_on(layer);
            } else {
                self.layer_off(layer);
            }
        } else if keycode.is_modifier() {
            let mods = Mods::from_bits_truncate(1 << (keycode.code() - KC_LEFT_CTRL.code()));
            if record.pressed {
                self.register_mods(mods);
            } else {
                self.unregister_mods(mods);
            }
        } else if record.pressed {
            self.type_key(keycode);
        }
    }

    fn type_key(&mut self, keycode: Keycode) {
        if keycode == KC_BACKSPACE {
            self.output.pop();
            return;
        }
        if let Some(c) = char_for(keycode, self.mods.has_shift()) {
            self.output.push(c);
        }
    }
}

impl KeymapLookup for SimKeyboard {
    fn keycode_at(&self, key: KeyPos) -> Keycode {
        self.held
            .iter()
            .find(|(pos, _)| *pos == key)
            .map(|(_, keycode)| *keycode)
            .unwrap_or_else(|| self.resolve(key))
    }
}

impl Host for SimKeyboard {
    fn mods(&self) -> Mods {
        self.mods
    }

    fn unregister_mods(&mut self, mods: Mods) {
        self.mods.remove(mods);
    }
}
