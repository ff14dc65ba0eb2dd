// Lightshift Key Records
// Physical key positions, per-event records and the 16-bit wrapping timer

use std::fmt;

/// Physical key coordinate in the switch matrix.
///
/// This is the identity of a tracked shift; the keycode reported for the same
/// physical key may differ between press and release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct KeyPos {
    pub row: u8,
    pub col: u8,
}

impl KeyPos {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for KeyPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

/// One physical key event as seen by the key-processing pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    /// Physical key location
    pub key: KeyPos,
    /// Press (true) or release (false)
    pub pressed: bool,
    /// Host millisecond clock sampled at the event (wraps at 65,535)
    pub time: u16,
    /// Tap count assigned by the host's tap / hold arbiter.
    ///
    /// Zero until the arbiter has decided; stays zero for a hold.
    pub tap_count: u8,
}

impl KeyRecord {
    /// Create a press record
    pub const fn press(key: KeyPos, time: u16) -> Self {
        Self {
            key,
            pressed: true,
            time,
            tap_count: 0,
        }
    }

    /// Create a release record
    pub const fn release(key: KeyPos, time: u16) -> Self {
        Self {
            key,
            pressed: false,
            time,
            tap_count: 0,
        }
    }

    /// Copy of this record with the given tap count
    pub const fn with_tap_count(mut self, tap_count: u8) -> Self {
        self.tap_count = tap_count;
        self
    }

    /// Has the arbiter resolved this key as a completed tap?
    pub const fn is_tap(&self) -> bool {
        self.tap_count > 0
    }
}

/// Milliseconds elapsed since `last`, using wrapping 16-bit arithmetic
///
/// Correct across a single rollover of the 16-bit clock.
#[inline]
pub const fn timer_elapsed(now: u16, last: u16) -> u16 {
    now.wrapping_sub(last)
}
