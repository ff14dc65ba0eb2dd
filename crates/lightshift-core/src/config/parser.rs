// Lightshift Config Parser - TOML with Serde
// Parses engine settings, board shape, handedness and layers

use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::{Layer, LightshiftConfig};
use crate::handedness::{BoardGeometry, HandLayout, HandLayoutError};
use crate::keycode::{parse_keycode, KeycodeParseError};
use crate::term::Terms;

/// Configuration parser errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("Invalid keycode in layer {layer} at {row},{col}: {source}")]
    InvalidKeycode {
        layer: usize,
        row: usize,
        col: usize,
        source: KeycodeParseError,
    },

    #[error("Invalid handedness layout: {0}")]
    Handedness(#[from] HandLayoutError),

    #[error("Layer {layer} does not match the board: {message}")]
    LayerShape { layer: usize, message: String },

    #[error("Board must have at least one row and one column, got {rows}x{cols}")]
    EmptyBoard { rows: u8, cols: u8 },
}

/// Main configuration structure (root TOML table)
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Dropshift on / off
    #[serde(default = "default_dropshift")]
    pub dropshift: bool,

    /// Tapping terms
    #[serde(default)]
    pub terms: Terms,

    /// Matrix shape
    #[serde(default)]
    pub board: BoardGeometry,

    /// Per-key handedness table
    #[serde(default)]
    pub handedness: Option<HandednessToml>,

    /// Keymap layers, base layer first
    #[serde(default)]
    pub layer: Vec<LayerToml>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HandednessToml {
    /// One string per row: `L`, `R` or `*` per key
    pub layout: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerToml {
    /// Rows of keycode expressions
    pub keys: Vec<Vec<String>>,
}

fn default_dropshift() -> bool {
    true
}

/// Engine settings plus the keymap they apply to
#[derive(Debug, Clone)]
pub struct KeyboardConfig {
    pub engine: LightshiftConfig,
    pub layers: Vec<Layer>,
}

impl KeyboardConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let toml_config: ConfigToml =
            toml::from_str(content).map_err(|e| ConfigError::TomlParse(e.to_string()))?;
        toml_config.into_config()
    }
}

impl ConfigToml {
    /// Validate and convert into runtime configuration
    pub fn into_config(self) -> Result<KeyboardConfig, ConfigError> {
        let board = self.board;
        if board.rows == 0 || board.cols == 0 {
            return Err(ConfigError::EmptyBoard {
                rows: board.rows,
                cols: board.cols,
            });
        }

        let hand_layout = match &self.handedness {
            Some(handedness) => Some(HandLayout::from_rows(handedness.layout.as_slice(), board)?),
            None => None,
        };

        let layers = self
            .layer
            .iter()
            .enumerate()
            .map(|(index, layer)| parse_layer(index, layer, board))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(KeyboardConfig {
            engine: LightshiftConfig {
                terms: self.terms,
                dropshift: self.dropshift,
                board,
                hand_layout,
            },
            layers,
        })
    }
}

fn parse_layer(index: usize, layer: &LayerToml, board: BoardGeometry) -> Result<Layer, ConfigError> {
    if layer.keys.len() != board.rows as usize {
        return Err(ConfigError::LayerShape {
            layer: index,
            message: format!("{} rows, board has {}", layer.keys.len(), board.rows),
        });
    }

    let mut rows = Vec::with_capacity(layer.keys.len());
    for (row, exprs) in layer.keys.iter().enumerate() {
        if exprs.len() != board.cols as usize {
            return Err(ConfigError::LayerShape {
                layer: index,
                message: format!("row {} has {} keys, board has {} columns", row, exprs.len(), board.cols),
            });
        }
        let keycodes = exprs
            .iter()
            .enumerate()
            .map(|(col, expr)| {
                parse_keycode(expr).map_err(|source| ConfigError::InvalidKeycode {
                    layer: index,
                    row,
                    col,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(keycodes);
    }

    Ok(Layer::from_rows(rows))
}

/// Create default configuration content: a Graphite layout with home row
/// mods on a 4x10 board
pub fn default_config_content() -> &'static str {
    r#"# Lightshift Configuration

# Drop an already used shift before it capitalises a second letter
dropshift = true

[terms]
# Shift keys, when the next key is on the other hand
lightshift = 150
# Shift keys, when the next key is on the same hand
extended = 65535
# Every other tap / hold key
default = 200
# flow_tap = 150

[board]
rows = 4
cols = 10
split = false

# Optional per-key handedness; `*` leaves a key to the geometric guess
# [handedness]
# layout = [
#     "LLLLLRRRRR",
#     "LLLLLRRRRR",
#     "LLLLLRRRRR",
#     "**LLLRRR**",
# ]

[[layer]]
keys = [
    ["KC_B", "KC_L", "KC_D", "KC_W", "KC_Z", "KC_QUOT", "KC_F", "KC_O", "KC_U", "KC_J"],
    ["LGUI_T(KC_N)", "LALT_T(KC_R)", "LCTL_T(KC_T)", "LSFT_T(KC_S)", "KC_G",
     "KC_Y", "RSFT_T(KC_H)", "RCTL_T(KC_A)", "RALT_T(KC_E)", "RGUI_T(KC_I)"],
    ["KC_Q", "KC_X", "KC_M", "KC_C", "KC_V", "KC_K", "KC_P", "KC_DOT", "KC_MINS", "KC_SLSH"],
    ["XXXXXXX", "XXXXXXX", "KC_ESC", "KC_BSPC", "KC_SPC",
     "LT(1,KC_ENT)", "KC_TAB", "KC_COMM", "XXXXXXX", "XXXXXXX"],
]

[[layer]]
keys = [
    ["KC_1", "KC_2", "KC_3", "KC_4", "KC_5", "KC_6", "KC_7", "KC_8", "KC_9", "KC_0"],
    ["_______", "_______", "_______", "_______", "_______",
     "KC_LEFT", "KC_DOWN", "KC_UP", "KC_RGHT", "KC_SCLN"],
    ["_______", "_______", "_______", "_______", "_______",
     "_______", "_______", "_______", "_______", "_______"],
    ["_______", "_______", "_______", "_______", "_______",
     "_______", "_______", "_______", "_______", "_______"],
]
"#
}
