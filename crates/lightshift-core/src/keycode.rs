// Lightshift Keycodes
// 16-bit firmware keycode ranges, mod-tap / layer-tap decoding and parsing

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use bitflags::bitflags;
use regex::Regex;

include!(concat!(env!("OUT_DIR"), "/keycodes.rs"));

// Keycode ranges
pub const QK_BASIC_MAX: u16 = 0x00FF;
pub const QK_MODS: u16 = 0x0100;
pub const QK_MODS_MAX: u16 = 0x1FFF;
pub const QK_MOD_TAP: u16 = 0x2000;
pub const QK_MOD_TAP_MAX: u16 = 0x3FFF;
pub const QK_LAYER_TAP: u16 = 0x4000;
pub const QK_LAYER_TAP_MAX: u16 = 0x4FFF;
pub const QK_LAYER_MOD: u16 = 0x5000;
pub const QK_TO: u16 = 0x5200;
pub const QK_MOMENTARY: u16 = 0x5220;
pub const QK_DEF_LAYER: u16 = 0x5240;
pub const QK_TOGGLE_LAYER: u16 = 0x5260;
pub const QK_ONE_SHOT_LAYER: u16 = 0x5280;
pub const QK_ONE_SHOT_MOD: u16 = 0x52A0;
pub const QK_LAYER_TAP_TOGGLE: u16 = 0x52C0;
pub const QK_PERSISTENT_DEF_LAYER: u16 = 0x52E0;
pub const QK_PERSISTENT_DEF_LAYER_MAX: u16 = 0x52FF;
pub const QK_LAYER_LOCK: Keycode = Keycode(0x7C7B);

/// 5-bit modifier encoding used inside mod-tap and one-shot keycodes.
///
/// Bit 4 selects the right-hand modifiers; the low nibble picks
/// Ctrl / Shift / Alt / GUI.
pub const MOD_LCTL: u8 = 0x01;
pub const MOD_LSFT: u8 = 0x02;
pub const MOD_LALT: u8 = 0x04;
pub const MOD_LGUI: u8 = 0x08;
pub const MOD_RCTL: u8 = 0x11;
pub const MOD_RSFT: u8 = 0x12;
pub const MOD_RALT: u8 = 0x14;
pub const MOD_RGUI: u8 = 0x18;

bitflags! {
    /// 8-bit modifier mask, as held in the host's live modifier state.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
    pub struct Mods: u8 {
        const LCTRL = 0b0000_0001;
        const LSHIFT = 0b0000_0010;
        const LALT = 0b0000_0100;
        const LGUI = 0b0000_1000;
        const RCTRL = 0b0001_0000;
        const RSHIFT = 0b0010_0000;
        const RALT = 0b0100_0000;
        const RGUI = 0b1000_0000;

        const SHIFT = Self::LSHIFT.bits() | Self::RSHIFT.bits();
    }
}

impl Mods {
    /// Convert a 5-bit modifier encoding to an 8-bit mask
    ///
    /// e.g. 0x12 (right shift) -> 0x20; 0x02 (left shift) -> 0x02
    pub fn from_mods5(mods5: u8) -> Self {
        let bits = if mods5 & 0x10 != 0 {
            (mods5 & 0x0F) << 4
        } else {
            mods5 & 0x0F
        };
        Mods::from_bits_truncate(bits)
    }

    /// Returns true if any shift bit is set
    pub fn has_shift(self) -> bool {
        self.intersects(Mods::SHIFT)
    }
}

/// Build a mod-tap keycode, e.g. `mod_tap(MOD_LSFT, KC_S)` for `LSFT_T(KC_S)`
pub const fn mod_tap(mods5: u8, tap: Keycode) -> Keycode {
    Keycode(QK_MOD_TAP | (((mods5 & 0x1F) as u16) << 8) | (tap.0 & 0xFF))
}

/// Build a layer-tap keycode, e.g. `layer_tap(1, KC_SPC)` for `LT(1,KC_SPC)`
pub const fn layer_tap(layer: u8, tap: Keycode) -> Keycode {
    Keycode(QK_LAYER_TAP | (((layer & 0x0F) as u16) << 8) | (tap.0 & 0xFF))
}

/// Build a momentary layer keycode, `MO(n)`
pub const fn momentary(layer: u8) -> Keycode {
    Keycode(QK_MOMENTARY | (layer & 0x1F) as u16)
}

/// Build a one-shot modifier keycode, `OSM(mods)`
pub const fn one_shot_mod(mods5: u8) -> Keycode {
    Keycode(QK_ONE_SHOT_MOD | (mods5 & 0x1F) as u16)
}

impl Keycode {
    /// Is this a basic (HID usage page) keycode?
    pub const fn is_basic(self) -> bool {
        self.0 <= QK_BASIC_MAX
    }

    /// KC_LEFT_CTRL to KC_RIGHT_GUI
    pub const fn is_modifier(self) -> bool {
        self.0 >= KC_LEFT_CTRL.0 && self.0 <= KC_RIGHT_GUI.0
    }

    pub const fn is_mod_tap(self) -> bool {
        self.0 >= QK_MOD_TAP && self.0 <= QK_MOD_TAP_MAX
    }

    pub const fn is_layer_tap(self) -> bool {
        self.0 >= QK_LAYER_TAP && self.0 <= QK_LAYER_TAP_MAX
    }

    /// Any key whose meaning depends on a tap / hold decision
    pub const fn is_tap_hold(self) -> bool {
        self.is_mod_tap() || self.is_layer_tap()
    }

    /// Layer switching and one-shot keycodes (`QK_LAYER_MOD` through
    /// `QK_PERSISTENT_DEF_LAYER_MAX`)
    pub const fn is_layer_range(self) -> bool {
        self.0 >= QK_LAYER_MOD && self.0 <= QK_PERSISTENT_DEF_LAYER_MAX
    }

    /// 5-bit modifiers of a mod-tap keycode
    pub const fn mod_tap_mods(self) -> u8 {
        ((self.0 >> 8) & 0x1F) as u8
    }

    /// Tap keycode of a mod-tap keycode
    pub const fn mod_tap_keycode(self) -> Keycode {
        Keycode(self.0 & 0xFF)
    }

    /// Layer of a layer-tap keycode
    pub const fn layer_tap_layer(self) -> u8 {
        ((self.0 >> 8) & 0x0F) as u8
    }

    /// Tap keycode of a layer-tap keycode
    pub const fn layer_tap_keycode(self) -> Keycode {
        Keycode(self.0 & 0xFF)
    }

    /// Layer of a `MO(n)` keycode, if this is one
    pub const fn momentary_layer(self) -> Option<u8> {
        if self.0 >= QK_MOMENTARY && self.0 < QK_DEF_LAYER {
            Some((self.0 & 0x1F) as u8)
        } else {
            None
        }
    }

    /// The keycode a completed tap of this key sends
    ///
    /// Mod-tap and layer-tap keys are unwrapped; everything else is returned
    /// as-is.
    pub const fn tap_keycode(self) -> Keycode {
        if self.is_mod_tap() {
            self.mod_tap_keycode()
        } else if self.is_layer_tap() {
            self.layer_tap_keycode()
        } else {
            self
        }
    }

    /// Returns true if this is a mod-tap key carrying a shift bit, even when
    /// the key is not currently tracked
    pub const fn is_lightshift(self) -> bool {
        self.is_mod_tap() && (self.mod_tap_mods() & MOD_LSFT) != 0
    }

    /// KC_A to KC_Z
    pub const fn is_alpha(self) -> bool {
        self.0 >= KC_A.0 && self.0 <= KC_Z.0
    }

    /// Canonical name for a basic keycode
    pub fn basic_name(self) -> Option<&'static str> {
        BASIC_NAMES
            .iter()
            .find(|(_, code)| *code == self.0)
            .map(|(name, _)| *name)
    }
}

impl fmt::Display for Keycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.basic_name() {
            return write!(f, "{}", name);
        }
        if self.is_mod_tap() {
            let tap = self.mod_tap_keycode();
            return match mods5_shorthand(self.mod_tap_mods()) {
                Some(prefix) => write!(f, "{}_T({})", prefix, tap),
                None => write!(f, "MT(0x{:02X},{})", self.mod_tap_mods(), tap),
            };
        }
        if self.is_layer_tap() {
            return write!(f, "LT({},{})", self.layer_tap_layer(), self.layer_tap_keycode());
        }
        if let Some(layer) = self.momentary_layer() {
            return write!(f, "MO({})", layer);
        }
        if *self == QK_LAYER_LOCK {
            return write!(f, "QK_LAYER_LOCK");
        }
        write!(f, "0x{:04X}", self.0)
    }
}

/// Errors that can occur when parsing a keycode expression
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeycodeParseError {
    #[error("keycode expression cannot be empty")]
    Empty,

    #[error("unknown keycode: '{0}'")]
    UnknownKeycode(String),

    #[error("unknown modifier: '{0}'")]
    UnknownModifier(String),

    #[error("unknown keycode function: '{0}'")]
    UnknownFunction(String),

    #[error("wrong number of arguments for {0}")]
    Arity(String),

    #[error("invalid layer number: '{0}'")]
    InvalidLayer(String),

    #[error("tap keycode must be a basic keycode: '{0}'")]
    NotBasic(String),
}

impl FromStr for Keycode {
    type Err = KeycodeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_keycode(s)
    }
}

fn call_regex() -> &'static Regex {
    static CALL: OnceLock<Regex> = OnceLock::new();
    CALL.get_or_init(|| {
        Regex::new(r"^([A-Z_]+)\s*\((.*)\)$").expect("keycode call pattern is valid")
    })
}

/// Mod-tap shorthands, e.g. `LSFT_T`
const MOD_TAP_SHORTHANDS: &[(&str, u8)] = &[
    ("LCTL", MOD_LCTL),
    ("LSFT", MOD_LSFT),
    ("LALT", MOD_LALT),
    ("LGUI", MOD_LGUI),
    ("RCTL", MOD_RCTL),
    ("RSFT", MOD_RSFT),
    ("RALT", MOD_RALT),
    ("RGUI", MOD_RGUI),
];

fn mods5_shorthand(mods5: u8) -> Option<&'static str> {
    MOD_TAP_SHORTHANDS
        .iter()
        .find(|(_, m)| *m == mods5)
        .map(|(name, _)| *name)
}

/// Parse `MOD_LSFT`, `MOD_RCTL | MOD_RSFT`, ...
fn parse_mods5(expr: &str) -> Result<u8, KeycodeParseError> {
    let mut mods = 0u8;
    for part in expr.split('|') {
        let part = part.trim();
        let short = part.strip_prefix("MOD_").unwrap_or(part);
        let (_, bits) = MOD_TAP_SHORTHANDS
            .iter()
            .find(|(name, _)| *name == short)
            .ok_or_else(|| KeycodeParseError::UnknownModifier(part.to_string()))?;
        mods |= bits;
    }
    Ok(mods)
}

fn parse_layer(expr: &str) -> Result<u8, KeycodeParseError> {
    let layer: u8 = expr
        .trim()
        .parse()
        .map_err(|_| KeycodeParseError::InvalidLayer(expr.trim().to_string()))?;
    if layer > 15 {
        return Err(KeycodeParseError::InvalidLayer(expr.trim().to_string()));
    }
    Ok(layer)
}

fn parse_basic(expr: &str) -> Result<Keycode, KeycodeParseError> {
    let keycode = parse_keycode(expr)?;
    if !keycode.is_basic() {
        return Err(KeycodeParseError::NotBasic(expr.trim().to_string()));
    }
    Ok(keycode)
}

/// Parse a keycode expression like `KC_A`, `LSFT_T(KC_S)`, `LT(1,KC_SPC)`
/// or `MO(2)`
///
/// # Examples
/// ```
/// use lightshift_core::keycode::{parse_keycode, KC_S};
/// let keycode = parse_keycode("LSFT_T(KC_S)").unwrap();
/// assert!(keycode.is_lightshift());
/// assert_eq!(keycode.tap_keycode(), KC_S);
/// ```
pub fn parse_keycode(expr: &str) -> Result<Keycode, KeycodeParseError> {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return Err(KeycodeParseError::Empty);
    }

    if let Some(caps) = call_regex().captures(trimmed) {
        let func = &caps[1];
        let args: Vec<&str> = caps[2].split(',').map(str::trim).collect();
        let arity = |n: usize| {
            if args.len() == n {
                Ok(())
            } else {
                Err(KeycodeParseError::Arity(func.to_string()))
            }
        };

        if let Some(short) = func.strip_suffix("_T") {
            arity(1)?;
            let mods = parse_mods5(short)?;
            return Ok(mod_tap(mods, parse_basic(args[0])?));
        }

        return match func {
            "MT" => {
                arity(2)?;
                Ok(mod_tap(parse_mods5(args[0])?, parse_basic(args[1])?))
            }
            "LT" => {
                arity(2)?;
                Ok(layer_tap(parse_layer(args[0])?, parse_basic(args[1])?))
            }
            "OSM" => {
                arity(1)?;
                Ok(one_shot_mod(parse_mods5(args[0])?))
            }
            "MO" | "TO" | "DF" | "TG" | "OSL" | "TT" | "PDF" => {
                arity(1)?;
                let layer = parse_layer(args[0])? as u16;
                let base = match func {
                    "MO" => QK_MOMENTARY,
                    "TO" => QK_TO,
                    "DF" => QK_DEF_LAYER,
                    "TG" => QK_TOGGLE_LAYER,
                    "OSL" => QK_ONE_SHOT_LAYER,
                    "TT" => QK_LAYER_TAP_TOGGLE,
                    _ => QK_PERSISTENT_DEF_LAYER,
                };
                Ok(Keycode(base | layer))
            }
            _ => Err(KeycodeParseError::UnknownFunction(func.to_string())),
        };
    }

    if trimmed == "QK_LAYER_LOCK" || trimmed == "QK_LLCK" {
        return Ok(QK_LAYER_LOCK);
    }

    if let Some(hex) = trimmed.strip_prefix("0x") {
        return u16::from_str_radix(hex, 16)
            .map(Keycode)
            .map_err(|_| KeycodeParseError::UnknownKeycode(trimmed.to_string()));
    }

    BASIC_ALIASES
        .iter()
        .find(|(name, _)| *name == trimmed)
        .map(|(_, code)| Keycode(*code))
        .ok_or_else(|| KeycodeParseError::UnknownKeycode(trimmed.to_string()))
}
