//! Module: keypad::topology
//!
//! Purpose: Physical layout of the 4x3 telephone keypad.
//!
//! ```text
//!            C0   C1   C2
//!   R0 ──── [1]  [2]  [3]
//!   R1 ──── [4]  [5]  [6]
//!   R2 ──── [7]  [8]  [9]
//!   R3 ──── [*]  [0]  [#]
//! ```
//!
//! Each key shorts exactly one row line to exactly one column line.
//!
//! Safety: Safe. Const data and Copy types only.

/// Number of row lines.
pub const ROWS: usize = 4;

/// Number of column lines.
pub const COLUMNS: usize = 3;

/// A key of the telephone keypad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyId {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Star,
    Zero,
    Pound,
}

impl KeyId {
    /// Every key, in grid order.
    pub const ALL: [KeyId; ROWS * COLUMNS] = [
        KeyId::One,
        KeyId::Two,
        KeyId::Three,
        KeyId::Four,
        KeyId::Five,
        KeyId::Six,
        KeyId::Seven,
        KeyId::Eight,
        KeyId::Nine,
        KeyId::Star,
        KeyId::Zero,
        KeyId::Pound,
    ];

    /// Symbol printed on the key.
    pub const fn as_char(self) -> char {
        match self {
            KeyId::One => '1',
            KeyId::Two => '2',
            KeyId::Three => '3',
            KeyId::Four => '4',
            KeyId::Five => '5',
            KeyId::Six => '6',
            KeyId::Seven => '7',
            KeyId::Eight => '8',
            KeyId::Nine => '9',
            KeyId::Star => '*',
            KeyId::Zero => '0',
            KeyId::Pound => '#',
        }
    }

    /// Parse a key symbol.
    pub const fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '1' => KeyId::One,
            '2' => KeyId::Two,
            '3' => KeyId::Three,
            '4' => KeyId::Four,
            '5' => KeyId::Five,
            '6' => KeyId::Six,
            '7' => KeyId::Seven,
            '8' => KeyId::Eight,
            '9' => KeyId::Nine,
            '*' => KeyId::Star,
            '0' => KeyId::Zero,
            '#' => KeyId::Pound,
            _ => return None,
        })
    }
}

impl core::fmt::Display for KeyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use core::fmt::Write;
        f.write_char(self.as_char())
    }
}

/// Row-major key grid.
pub const KEYPAD: [[KeyId; COLUMNS]; ROWS] = [
    [KeyId::One, KeyId::Two, KeyId::Three],
    [KeyId::Four, KeyId::Five, KeyId::Six],
    [KeyId::Seven, KeyId::Eight, KeyId::Nine],
    [KeyId::Star, KeyId::Zero, KeyId::Pound],
];

/// Wiring of the keypad lines to GPIO numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeypadTopology {
    /// GPIO numbers of rows (1,4,7,*) top to bottom.
    pub row_pins: [i32; ROWS],
    /// GPIO numbers of columns (1,2,3) left to right.
    pub column_pins: [i32; COLUMNS],
}

impl KeypadTopology {
    pub const fn new(row_pins: [i32; ROWS], column_pins: [i32; COLUMNS]) -> Self {
        Self { row_pins, column_pins }
    }

    /// Key at the intersection of a row and a column.
    #[inline]
    pub fn key_at(&self, row: usize, column: usize) -> Option<KeyId> {
        KEYPAD.get(row)?.get(column).copied()
    }

    /// Grid position of a key, as `(row, column)`.
    pub fn position(&self, key: KeyId) -> (usize, usize) {
        // KEYPAD and KeyId::ALL share the same row-major order
        let idx = KeyId::ALL.iter().position(|&k| k == key).unwrap_or(0);
        (idx / COLUMNS, idx % COLUMNS)
    }

    /// Row index wired to a GPIO number.
    #[inline]
    pub fn row_index(&self, pin: i32) -> Option<usize> {
        self.row_pins.iter().position(|&p| p == pin)
    }

    /// Column index wired to a GPIO number.
    #[inline]
    pub fn column_index(&self, pin: i32) -> Option<usize> {
        self.column_pins.iter().position(|&p| p == pin)
    }
}
