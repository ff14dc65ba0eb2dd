// Lightshift Config
// Engine settings and keymap layers

#[cfg(feature = "config")]
pub mod parser;

use crate::handedness::{BoardGeometry, HandLayout};
use crate::keycode::{Keycode, KC_NO};
use crate::record::KeyPos;
use crate::term::Terms;

#[cfg(feature = "config")]
pub use parser::{default_config_content, ConfigError, ConfigToml, KeyboardConfig};

/// Settings the engine is built from
#[derive(Debug, Clone)]
pub struct LightshiftConfig {
    pub terms: Terms,
    /// Run the late stage (hold promotion, consumption, double drops)
    pub dropshift: bool,
    pub board: BoardGeometry,
    /// Optional per-key handedness table
    pub hand_layout: Option<HandLayout>,
}

impl Default for LightshiftConfig {
    fn default() -> Self {
        Self {
            terms: Terms::default(),
            dropshift: true,
            board: BoardGeometry::default(),
            hand_layout: None,
        }
    }
}

/// One keymap layer, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    cols: u8,
    keys: Vec<Keycode>,
}

impl Layer {
    /// Build from rows of keycodes; rows are expected to share a width.
    ///
    /// Positions address at most 255 columns, so keys past that are dropped.
    pub fn from_rows(rows: Vec<Vec<Keycode>>) -> Self {
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        let cols = u8::try_from(width).unwrap_or(u8::MAX);
        Self {
            cols,
            keys: rows
                .into_iter()
                .flat_map(|row| row.into_iter().take(cols as usize))
                .collect(),
        }
    }

    /// Keycode at a position, `KC_NO` when outside the layer
    pub fn get(&self, key: KeyPos) -> Keycode {
        if key.col >= self.cols {
            return KC_NO;
        }
        let index = key.row as usize * self.cols as usize + key.col as usize;
        self.keys.get(index).copied().unwrap_or(KC_NO)
    }
}
