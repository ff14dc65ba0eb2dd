// Lightshift Policy
// Overridable decisions: handedness and dropshift key classification

use crate::dropshift::{default_allow_double, default_consume_single};
use crate::handedness::Hand;
use crate::keycode::Keycode;
use crate::record::{KeyPos, KeyRecord};

/// User-overridable decisions.
///
/// Every method has a default; overrides should fall back to
/// [`default_consume_single`] / [`default_allow_double`] for keycodes they
/// do not handle, so letters keep their baseline behaviour.
///
/// ```
/// use lightshift_core::dropshift::default_consume_single;
/// use lightshift_core::keycode::{Keycode, KC_2};
/// use lightshift_core::policy::ShiftPolicy;
/// use lightshift_core::record::KeyRecord;
///
/// struct AtSign;
///
/// impl ShiftPolicy for AtSign {
///     // consume the shift on '@' so "@jess" is not typed as "@Jess"
///     fn consume_single(&self, keycode: Keycode, record: &KeyRecord) -> bool {
///         keycode == KC_2 || default_consume_single(keycode, record)
///     }
/// }
/// ```
pub trait ShiftPolicy {
    /// Custom handedness. `None` defers to the per-key table and then to the
    /// geometric guess.
    fn handedness(&self, key: KeyPos) -> Option<Hand> {
        let _ = key;
        None
    }

    /// Should this key, once shifted, turn the shift into a double?
    fn consume_single(&self, keycode: Keycode, record: &KeyRecord) -> bool {
        default_consume_single(keycode, record)
    }

    /// May this key be shifted after the single has been consumed?
    fn allow_double(&self, keycode: Keycode, record: &KeyRecord) -> bool {
        default_allow_double(keycode, record)
    }
}

/// Baseline behaviour: geometry / table handedness, letters consume and may
/// not double
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl ShiftPolicy for DefaultPolicy {}

pub type HandednessFn = fn(KeyPos) -> Option<Hand>;
pub type ClassifyFn = fn(Keycode, &KeyRecord) -> bool;

/// Policy assembled from plain function pointers; unset entries use the
/// defaults
#[derive(Debug, Clone, Copy, Default)]
pub struct FnPolicy {
    pub handedness: Option<HandednessFn>,
    pub consume_single: Option<ClassifyFn>,
    pub allow_double: Option<ClassifyFn>,
}

impl ShiftPolicy for FnPolicy {
    fn handedness(&self, key: KeyPos) -> Option<Hand> {
        self.handedness.and_then(|f| f(key))
    }

    fn consume_single(&self, keycode: Keycode, record: &KeyRecord) -> bool {
        match self.consume_single {
            Some(f) => f(keycode, record),
            None => default_consume_single(keycode, record),
        }
    }

    fn allow_double(&self, keycode: Keycode, record: &KeyRecord) -> bool {
        match self.allow_double {
            Some(f) => f(keycode, record),
            None => default_allow_double(keycode, record),
        }
    }
}
