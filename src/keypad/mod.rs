//! 4x3 matrix keypad: topology and interrupt-driven scanner.

pub mod scanner;
pub mod topology;

pub use scanner::{
    ColumnEvent, KeyEdge, KeyEvent, KeyListener, KeypadScanner, Line, LineMode, MatrixPins,
    ReleaseWatch, RowEvent, ScanError, ScanGuard, ScanState, ScannerConfig,
};
pub use topology::{KeyId, KeypadTopology, COLUMNS, KEYPAD, ROWS};
