// Lightshift Handedness
// Maps physical key positions to the hand that types them

use serde::Deserialize;

use crate::policy::ShiftPolicy;
use crate::record::KeyPos;

/// Which hand types a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
    /// Only produced by a custom handedness function
    Unknown,
}

impl Hand {
    /// Parse a layout cell: `L` / `R`, or `None` for an unset cell
    pub fn from_cell(cell: char) -> Option<Hand> {
        match cell {
            'L' | 'l' => Some(Hand::Left),
            'R' | 'r' => Some(Hand::Right),
            _ => None,
        }
    }

    /// Unknown never matches anything, including another Unknown
    pub fn same_as(self, other: Hand) -> bool {
        self != Hand::Unknown && self == other
    }
}

/// Matrix dimensions used by the geometric fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardGeometry {
    pub rows: u8,
    pub cols: u8,
    /// Split boards stack the halves as rows: left half first
    #[serde(default)]
    pub split: bool,
}

impl BoardGeometry {
    pub const fn new(rows: u8, cols: u8, split: bool) -> Self {
        Self { rows, cols, split }
    }

    /// Best guess from key position alone; never returns Unknown
    pub fn guess_hand(&self, key: KeyPos) -> Hand {
        let left = if self.split {
            key.row < self.rows / 2
        } else if self.cols > self.rows {
            key.col < self.cols / 2
        } else {
            key.row < self.rows / 2
        };
        if left {
            Hand::Left
        } else {
            Hand::Right
        }
    }
}

impl Default for BoardGeometry {
    fn default() -> Self {
        // 3x10 unsplit matrix
        Self::new(3, 10, false)
    }
}

/// Errors that can occur when building a per-key handedness table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandLayoutError {
    #[error("handedness layout has {found} rows, board has {expected}")]
    RowCount { expected: u8, found: usize },

    #[error("handedness row {row} has {found} cells, board has {expected} columns")]
    ColumnCount { row: usize, expected: u8, found: usize },

    #[error("invalid handedness cell '{cell}' in row {row} (use L, R or *)")]
    InvalidCell { row: usize, cell: char },
}

/// Per-key handedness table.
///
/// Cells may be left unset (`*`) for partial tables. A table whose very first
/// cell is unset counts as absent altogether.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandLayout {
    cols: u8,
    cells: Vec<Option<Hand>>,
}

impl HandLayout {
    /// Build from row strings such as `"LLLLLRRRRR"`
    pub fn from_rows<S: AsRef<str>>(
        rows: &[S],
        geometry: BoardGeometry,
    ) -> Result<Self, HandLayoutError> {
        if rows.len() != geometry.rows as usize {
            return Err(HandLayoutError::RowCount {
                expected: geometry.rows,
                found: rows.len(),
            });
        }

        let mut cells = Vec::with_capacity(geometry.rows as usize * geometry.cols as usize);
        for (row, text) in rows.iter().enumerate() {
            let row_cells: Vec<char> = text.as_ref().chars().filter(|c| !c.is_whitespace()).collect();
            if row_cells.len() != geometry.cols as usize {
                return Err(HandLayoutError::ColumnCount {
                    row,
                    expected: geometry.cols,
                    found: row_cells.len(),
                });
            }
            for cell in row_cells {
                match cell {
                    '*' | '.' => cells.push(None),
                    _ => match Hand::from_cell(cell) {
                        Some(hand) => cells.push(Some(hand)),
                        None => return Err(HandLayoutError::InvalidCell { row, cell }),
                    },
                }
            }
        }

        Ok(Self {
            cols: geometry.cols,
            cells,
        })
    }

    /// Look up a key; `None` when the cell is unset, out of range, or the
    /// table is absent
    pub fn get(&self, key: KeyPos) -> Option<Hand> {
        // first cell unset => no table
        if self.cells.first().copied().flatten().is_none() || key.col >= self.cols {
            return None;
        }
        let index = key.row as usize * self.cols as usize + key.col as usize;
        self.cells.get(index).copied().flatten()
    }
}

/// Resolves a key's hand: custom function, then table, then geometry
#[derive(Debug, Clone, Default)]
pub struct HandednessResolver {
    geometry: BoardGeometry,
    layout: Option<HandLayout>,
}

impl HandednessResolver {
    pub fn new(geometry: BoardGeometry, layout: Option<HandLayout>) -> Self {
        Self { geometry, layout }
    }

    pub fn geometry(&self) -> BoardGeometry {
        self.geometry
    }

    /// Table lookup, falling back to the geometric guess
    pub fn hand_of(&self, key: KeyPos) -> Hand {
        self.layout
            .as_ref()
            .and_then(|layout| layout.get(key))
            .unwrap_or_else(|| self.geometry.guess_hand(key))
    }

    /// Full resolution order, starting with the policy's custom function
    pub fn resolve<P: ShiftPolicy + ?Sized>(&self, key: KeyPos, policy: &P) -> Hand {
        policy.handedness(key).unwrap_or_else(|| self.hand_of(key))
    }
}
