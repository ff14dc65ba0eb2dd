// Lightshift Host Interface
// Capabilities the engine consumes from the host key-processing pipeline

use crate::keycode::{Keycode, Mods};
use crate::record::KeyPos;

/// Resolves a physical position to the keycode the host currently assigns it
/// (active layers, and for held keys the keycode cached at press time).
pub trait KeymapLookup {
    fn keycode_at(&self, key: KeyPos) -> Keycode;
}

/// Live modifier state of the host.
///
/// `unregister_mods` clears modifier bits directly, without a key release
/// for the physical key that set them.
pub trait Host: KeymapLookup {
    /// Currently active modifiers
    fn mods(&self) -> Mods;

    /// Clear the given modifier bits
    fn unregister_mods(&mut self, mods: Mods);
}
