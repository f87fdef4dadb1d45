//! DTMF frequency table and the key listener that drives the tone set.
//!
//! ```text
//!            1209 Hz  1336 Hz  1477 Hz
//!   697 Hz     1        2        3
//!   770 Hz     4        5        6
//!   852 Hz     7        8        9
//!   941 Hz     *        0        #
//! ```

use crate::audio::ActiveTones;
use crate::keypad::scanner::{KeyEdge, KeyEvent, KeyListener};
use crate::keypad::topology::KeyId;
use crate::logging::{LogSource, LogStream};

/// Low-band (row) frequencies in Hz.
pub const ROW_HZ: [u16; 4] = [697, 770, 852, 941];

/// High-band (column) frequencies in Hz.
pub const COLUMN_HZ: [u16; 3] = [1209, 1336, 1477];

/// The two component frequencies of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DtmfPair {
    pub high: u16,
    pub low: u16,
}

impl DtmfPair {
    /// Frequencies in table order, high band first.
    #[inline]
    pub const fn frequencies(self) -> [u16; 2] {
        [self.high, self.low]
    }
}

/// DTMF pair of a key.
pub const fn pair(key: KeyId) -> DtmfPair {
    let (row, column) = match key {
        KeyId::One => (0, 0),
        KeyId::Two => (0, 1),
        KeyId::Three => (0, 2),
        KeyId::Four => (1, 0),
        KeyId::Five => (1, 1),
        KeyId::Six => (1, 2),
        KeyId::Seven => (2, 0),
        KeyId::Eight => (2, 1),
        KeyId::Nine => (2, 2),
        KeyId::Star => (3, 0),
        KeyId::Zero => (3, 1),
        KeyId::Pound => (3, 2),
    };
    DtmfPair {
        high: COLUMN_HZ[column],
        low: ROW_HZ[row],
    }
}

/// How key events map onto the tone set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialMode {
    /// Key-down latches the high-band tone; key-up is not reported.
    SingleTone,
    /// Key-down mixes both tones, key-up silences.
    DualTone,
}

impl DialMode {
    /// Whether the scanner should report key-up events.
    #[inline]
    pub fn key_up_events(self) -> bool {
        self == DialMode::DualTone
    }
}

/// Key listener that dials DTMF tones.
pub struct DtmfDialer<'a> {
    tones: &'a ActiveTones,
    mode: DialMode,
    log: &'a LogStream,
}

impl<'a> DtmfDialer<'a> {
    pub fn new(tones: &'a ActiveTones, mode: DialMode, log: &'a LogStream) -> Self {
        Self { tones, mode, log }
    }

    #[inline]
    pub fn mode(&self) -> DialMode {
        self.mode
    }
}

impl KeyListener for DtmfDialer<'_> {
    fn on_key(&mut self, event: KeyEvent) {
        match event.edge {
            KeyEdge::Down => {
                crate::rt_debug!(self.log, LogSource::Keypad, event.timestamp_us, "Keypad down: {}", event.key);
                let freqs = pair(event.key).frequencies();
                match self.mode {
                    DialMode::SingleTone => self.tones.set(&freqs[..1]),
                    DialMode::DualTone => self.tones.set(&freqs),
                }
            }
            KeyEdge::Up => {
                crate::rt_debug!(self.log, LogSource::Keypad, event.timestamp_us, "Keypad up: {}", event.key);
                if self.mode == DialMode::DualTone {
                    self.tones.clear();
                }
            }
        }
    }
}
