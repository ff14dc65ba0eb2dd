// Lightshift State
// Fixed-capacity registry of in-flight shift keypresses

use arrayvec::ArrayVec;
use log::{debug, warn};
use strum_macros::{Display, EnumCount, EnumIter, FromRepr};

use crate::host::KeymapLookup;
use crate::keycode::{Keycode, KC_NO};
use crate::record::KeyPos;

/// Number of simultaneous shift presses tracked; any more behave as plain
/// mod-taps. More than two home-row shifts held at once is very rare.
pub const MAX_TRACKED_SHIFTS: usize = 2;

// indices must stay below the u8 sentinel range
const _: () = assert!(MAX_TRACKED_SHIFTS < u8::MAX as usize);

/// Lifecycle of one shift keypress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumCount, EnumIter, FromRepr)]
#[repr(u8)]
pub enum ShiftState {
    /// Not pressed, cleared, or not tracked
    #[default]
    #[strum(serialize = "INACTIVE")]
    Inactive = 0,
    /// Newly pressed, awaiting the next key
    #[strum(serialize = "UNRESOLVED")]
    Unresolved = 1,
    /// Pressed, opposite-hand key followed: use the lightshift term
    #[strum(serialize = "LIGHTSHIFT TT")]
    LightshiftTt = 2,
    /// Pressed, same-hand key followed: use the extended term
    #[strum(serialize = "EXTENDED TT")]
    ExtendedTt = 3,
    /// Just released from EXTENDED TT; kept one more event for the arbiter
    #[strum(serialize = "RELEASED, EXTENDED")]
    ReleasedExtended = 4,
    /// Held; not yet consumed
    #[strum(serialize = "SINGLE SHIFTING")]
    SingleShifting = 5,
    /// Held; already consumed, only doubles left
    #[strum(serialize = "DOUBLE SHIFTING")]
    DoubleShifting = 6,
}

impl ShiftState {
    /// Should the key's tapping term be the extended one?
    pub fn uses_extended_term(self) -> bool {
        matches!(self, ShiftState::ExtendedTt | ShiftState::ReleasedExtended)
    }

    /// Has the host confirmed this shift as a hold?
    pub fn is_held(self) -> bool {
        matches!(self, ShiftState::SingleShifting | ShiftState::DoubleShifting)
    }
}

/// One physical shift-capable key currently of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedShift {
    /// Physical key location (identity within the registry)
    pub key: KeyPos,
    /// Mod-tap keycode captured when tracking began
    pub keycode: Keycode,
    /// Current state
    pub state: ShiftState,
}

impl TrackedShift {
    /// Returned for lookups past the active count
    pub const INACTIVE: TrackedShift = TrackedShift {
        key: KeyPos::new(0, 0),
        keycode: KC_NO,
        state: ShiftState::Inactive,
    };

    pub fn is_active(&self) -> bool {
        self.state != ShiftState::Inactive
    }
}

/// Dense table of tracked shifts.
///
/// Removal shifts later entries down, so indices `0..active_count()` are
/// always exactly the live entries. No allocation after construction.
#[derive(Debug, Clone, Default)]
pub struct ShiftRegistry<const N: usize = MAX_TRACKED_SHIFTS> {
    shifts: ArrayVec<TrackedShift, N>,
}

impl<const N: usize> ShiftRegistry<N> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            shifts: ArrayVec::new(),
        }
    }

    /// Maximum number of tracked shifts
    pub fn capacity(&self) -> usize {
        N
    }

    /// Number of currently tracked shifts
    pub fn active_count(&self) -> usize {
        self.shifts.len()
    }

    /// Tracking data at `index`, or [`TrackedShift::INACTIVE`] past the end
    pub fn get(&self, index: usize) -> TrackedShift {
        self.shifts
            .get(index)
            .copied()
            .unwrap_or(TrackedShift::INACTIVE)
    }

    /// Iterate over the live entries
    pub fn iter(&self) -> impl Iterator<Item = &TrackedShift> + '_ {
        self.shifts.iter()
    }

    /// Index of the entry for a position
    pub fn find(&self, key: KeyPos) -> Option<usize> {
        self.shifts.iter().position(|shift| shift.key == key)
    }

    /// Is this position a pressed and tracked shift?
    pub fn is_tracked(&self, key: KeyPos) -> bool {
        self.find(key).is_some()
    }

    /// Current state of a position; INACTIVE if untracked
    pub fn state_of(&self, key: KeyPos) -> ShiftState {
        self.find(key)
            .map(|index| self.shifts[index].state)
            .unwrap_or(ShiftState::Inactive)
    }

    /// Should this position use the extended tapping term?
    pub fn uses_extended_term(&self, key: KeyPos) -> bool {
        self.state_of(key).uses_extended_term()
    }

    /// Positions of all entries in `state`, in registry order
    pub fn positions_in(&self, state: ShiftState) -> ArrayVec<KeyPos, N> {
        self.shifts
            .iter()
            .filter(|shift| shift.state == state)
            .map(|shift| shift.key)
            .collect()
    }

    /// Update a shift's state, or start / stop tracking it.
    ///
    /// - `Unresolved` for an untracked position starts tracking it, capturing
    ///   its current keycode from `keymap`; a full registry ignores the press.
    /// - `Inactive` stops tracking.
    /// - Anything else updates a tracked entry in place, and is ignored for
    ///   an untracked position so late events never resurrect a shift.
    pub fn set_state<K: KeymapLookup + ?Sized>(
        &mut self,
        key: KeyPos,
        state: ShiftState,
        keymap: &K,
    ) {
        let keycode = match (state, self.find(key)) {
            (ShiftState::Unresolved, None) => {
                let keycode = keymap.keycode_at(key);
                if !self.add(key, keycode) {
                    return;
                }
                keycode
            }
            (ShiftState::Inactive, Some(index)) => self.shifts.remove(index).keycode,
            (_, Some(index)) => {
                self.shifts[index].state = state;
                self.shifts[index].keycode
            }
            (_, None) => return,
        };

        debug!("{} - state: {}", keycode, state);
    }

    /// [`set_state`](Self::set_state) from a raw discriminant; out-of-range
    /// values are rejected
    pub fn set_state_raw<K: KeymapLookup + ?Sized>(&mut self, key: KeyPos, raw: u8, keymap: &K) {
        match ShiftState::from_repr(raw) {
            Some(state) => self.set_state(key, state, keymap),
            None => warn!("BUG: invalid state {}", raw),
        }
    }

    fn add(&mut self, key: KeyPos, keycode: Keycode) -> bool {
        let shift = TrackedShift {
            key,
            keycode,
            state: ShiftState::Unresolved,
        };
        if self.shifts.try_push(shift).is_err() {
            warn!("WARNING: Max shifts ({}) exceeded", N);
            return false;
        }
        true
    }
}
