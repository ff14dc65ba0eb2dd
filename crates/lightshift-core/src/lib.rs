// Lightshift Core Library
// Home-row shift disambiguation for mod-tap keyboards

pub mod config;
pub mod dropshift;
pub mod engine;
pub mod handedness;
pub mod host;
pub mod keycode;
pub mod policy;
pub mod record;
pub mod sim;
pub mod state;
pub mod term;
pub mod tracking;

pub use config::{Layer, LightshiftConfig};
pub use engine::Lightshift;
pub use handedness::{BoardGeometry, Hand, HandLayout, HandLayoutError, HandednessResolver};
pub use host::{Host, KeymapLookup};
pub use keycode::{parse_keycode, Keycode, KeycodeParseError, Mods};
pub use policy::{DefaultPolicy, FnPolicy, ShiftPolicy};
pub use record::{timer_elapsed, KeyPos, KeyRecord};
pub use sim::{EventReport, Simulator, TraceError, TraceEvent};
pub use state::{ShiftRegistry, ShiftState, TrackedShift, MAX_TRACKED_SHIFTS};
pub use term::Terms;

#[cfg(feature = "config")]
pub use config::{default_config_content, ConfigError, KeyboardConfig};
