use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Basic (HID usage page) keycodes: canonical name, code, aliases.
const BASIC_KEYCODES: &[(&str, u16, &[&str])] = &[
    ("KC_NO", 0x00, &["XXXXXXX"]),
    ("KC_TRANSPARENT", 0x01, &["KC_TRNS", "_______"]),
    ("KC_A", 0x04, &[]),
    ("KC_B", 0x05, &[]),
    ("KC_C", 0x06, &[]),
    ("KC_D", 0x07, &[]),
    ("KC_E", 0x08, &[]),
    ("KC_F", 0x09, &[]),
    ("KC_G", 0x0A, &[]),
    ("KC_H", 0x0B, &[]),
    ("KC_I", 0x0C, &[]),
    ("KC_J", 0x0D, &[]),
    ("KC_K", 0x0E, &[]),
    ("KC_L", 0x0F, &[]),
    ("KC_M", 0x10, &[]),
    ("KC_N", 0x11, &[]),
    ("KC_O", 0x12, &[]),
    ("KC_P", 0x13, &[]),
    ("KC_Q", 0x14, &[]),
    ("KC_R", 0x15, &[]),
    ("KC_S", 0x16, &[]),
    ("KC_T", 0x17, &[]),
    ("KC_U", 0x18, &[]),
    ("KC_V", 0x19, &[]),
    ("KC_W", 0x1A, &[]),
    ("KC_X", 0x1B, &[]),
    ("KC_Y", 0x1C, &[]),
    ("KC_Z", 0x1D, &[]),
    ("KC_1", 0x1E, &[]),
    ("KC_2", 0x1F, &[]),
    ("KC_3", 0x20, &[]),
    ("KC_4", 0x21, &[]),
    ("KC_5", 0x22, &[]),
    ("KC_6", 0x23, &[]),
    ("KC_7", 0x24, &[]),
    ("KC_8", 0x25, &[]),
    ("KC_9", 0x26, &[]),
    ("KC_0", 0x27, &[]),
    ("KC_ENTER", 0x28, &["KC_ENT"]),
    ("KC_ESCAPE", 0x29, &["KC_ESC"]),
    ("KC_BACKSPACE", 0x2A, &["KC_BSPC"]),
    ("KC_TAB", 0x2B, &[]),
    ("KC_SPACE", 0x2C, &["KC_SPC"]),
    ("KC_MINUS", 0x2D, &["KC_MINS"]),
    ("KC_EQUAL", 0x2E, &["KC_EQL"]),
    ("KC_LEFT_BRACKET", 0x2F, &["KC_LBRC"]),
    ("KC_RIGHT_BRACKET", 0x30, &["KC_RBRC"]),
    ("KC_BACKSLASH", 0x31, &["KC_BSLS"]),
    ("KC_SEMICOLON", 0x33, &["KC_SCLN"]),
    ("KC_QUOTE", 0x34, &["KC_QUOT"]),
    ("KC_GRAVE", 0x35, &["KC_GRV"]),
    ("KC_COMMA", 0x36, &["KC_COMM"]),
    ("KC_DOT", 0x37, &[]),
    ("KC_SLASH", 0x38, &["KC_SLSH"]),
    ("KC_CAPS_LOCK", 0x39, &["KC_CAPS"]),
    ("KC_F1", 0x3A, &[]),
    ("KC_F2", 0x3B, &[]),
    ("KC_F3", 0x3C, &[]),
    ("KC_F4", 0x3D, &[]),
    ("KC_F5", 0x3E, &[]),
    ("KC_F6", 0x3F, &[]),
    ("KC_F7", 0x40, &[]),
    ("KC_F8", 0x41, &[]),
    ("KC_F9", 0x42, &[]),
    ("KC_F10", 0x43, &[]),
    ("KC_F11", 0x44, &[]),
    ("KC_F12", 0x45, &[]),
    ("KC_HOME", 0x4A, &[]),
    ("KC_PAGE_UP", 0x4B, &["KC_PGUP"]),
    ("KC_DELETE", 0x4C, &["KC_DEL"]),
    ("KC_END", 0x4D, &[]),
    ("KC_PAGE_DOWN", 0x4E, &["KC_PGDN"]),
    ("KC_RIGHT", 0x4F, &["KC_RGHT"]),
    ("KC_LEFT", 0x50, &[]),
    ("KC_DOWN", 0x51, &[]),
    ("KC_UP", 0x52, &[]),
    ("KC_LEFT_CTRL", 0xE0, &["KC_LCTL"]),
    ("KC_LEFT_SHIFT", 0xE1, &["KC_LSFT"]),
    ("KC_LEFT_ALT", 0xE2, &["KC_LALT"]),
    ("KC_LEFT_GUI", 0xE3, &["KC_LGUI"]),
    ("KC_RIGHT_CTRL", 0xE4, &["KC_RCTL"]),
    ("KC_RIGHT_SHIFT", 0xE5, &["KC_RSFT"]),
    ("KC_RIGHT_ALT", 0xE6, &["KC_RALT"]),
    ("KC_RIGHT_GUI", 0xE7, &["KC_RGUI"]),
];

fn const_ident(name: &str) -> Option<&str> {
    // Aliases like "_______" have no usable constant name.
    name.starts_with("KC_").then_some(name)
}

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("keycodes.rs");
    let mut f = File::create(&dest_path).unwrap();

    // Generate the Keycode newtype wrapper
    writeln!(
        f,
        r#"
/// Represents a single 16-bit firmware keycode.
///
/// This is a newtype wrapper around u16 for type safety.
/// The numeric layout follows the QMK keycode ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Keycode(pub u16);

impl Keycode {{
    /// Get the raw numeric code value
    pub const fn code(self) -> u16 {{
        self.0
    }}
}}

impl From<u16> for Keycode {{
    fn from(code: u16) -> Self {{
        Keycode(code)
    }}
}}

impl From<Keycode> for u16 {{
    fn from(keycode: Keycode) -> Self {{
        keycode.0
    }}
}}
"#
    )
    .unwrap();

    // Named constants for every canonical name and alias
    for (name, code, aliases) in BASIC_KEYCODES {
        writeln!(f, "pub const {}: Keycode = Keycode(0x{:02X});", name, code).unwrap();
        for alias in aliases.iter().filter_map(|a| const_ident(a)) {
            writeln!(f, "pub const {}: Keycode = Keycode(0x{:02X});", alias, code).unwrap();
        }
    }

    // Canonical names, used for display
    writeln!(f, "\nconst BASIC_NAMES: &[(&str, u16)] = &[").unwrap();
    for (name, code, _) in BASIC_KEYCODES {
        writeln!(f, "    ({:?}, 0x{:02X}),", name, code).unwrap();
    }
    writeln!(f, "];").unwrap();

    // Every accepted spelling, used for parsing
    writeln!(f, "\nconst BASIC_ALIASES: &[(&str, u16)] = &[").unwrap();
    for (name, code, aliases) in BASIC_KEYCODES {
        writeln!(f, "    ({:?}, 0x{:02X}),", name, code).unwrap();
        for alias in aliases.iter() {
            writeln!(f, "    ({:?}, 0x{:02X}),", alias, code).unwrap();
        }
    }
    writeln!(f, "];").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
