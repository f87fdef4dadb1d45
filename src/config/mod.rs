//! Module: config
//!
//! Purpose: Startup configuration for the keypad dialer.
//!
//! Architecture:
//! - Plain `Copy` structs, one per subsystem (keypad, tone)
//! - `Config::DEFAULT` is the wiring of the reference board
//! - `Config::validate()` runs once at boot, before any peripheral is touched
//! - Nothing is persisted; changing a value means rebuilding the firmware
//!
//! Safety: Safe. No unsafe blocks. Copy types only.

use crate::dtmf::DialMode;
use crate::keypad::topology::{KeypadTopology, COLUMNS, ROWS};

/// Highest DTMF component frequency, used for the Nyquist check.
const HIGHEST_DTMF_HZ: u32 = 1477;

/// Keypad wiring and timing windows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeypadConfig {
    /// GPIO numbers of rows (1,4,7,*).
    pub row_pins: [i32; ROWS],
    /// GPIO numbers of columns (1,2,3).
    pub column_pins: [i32; COLUMNS],
    /// Edges on a column within this window of the last accepted one are ignored.
    pub debounce_ms: u32,
    /// Contact settle time before the column is re-read.
    pub settle_ms: u32,
}

impl KeypadConfig {
    pub const DEFAULT: Self = Self {
        row_pins: [4, 5, 6, 7],
        column_pins: [15, 16, 17],
        debounce_ms: 250,
        settle_ms: 50,
    };

    /// Line wiring as a topology.
    pub fn topology(&self) -> KeypadTopology {
        KeypadTopology::new(self.row_pins, self.column_pins)
    }
}

impl Default for KeypadConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Tone synthesis settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToneConfig {
    /// Output sample rate in Hz.
    pub sample_rate: u32,
    /// Peak amplitude of each tone (not normalized by tone count).
    pub amplitude: f32,
    /// Mix both DTMF frequencies and silence on key release.
    ///
    /// When false, key-down latches the high-band tone until the next key.
    pub dual_tone: bool,
}

impl ToneConfig {
    pub const DEFAULT: Self = Self {
        sample_rate: 11025,
        amplitude: 0.5,
        dual_tone: true,
    };

    /// Dialer behavior selected by `dual_tone`.
    pub fn dial_mode(&self) -> DialMode {
        if self.dual_tone {
            DialMode::DualTone
        } else {
            DialMode::SingleTone
        }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Complete configuration.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Config {
    pub keypad: KeypadConfig,
    pub tone: ToneConfig,
}

impl Config {
    pub const DEFAULT: Self = Self {
        keypad: KeypadConfig::DEFAULT,
        tone: ToneConfig::DEFAULT,
    };

    /// Check the configuration for values the firmware cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tone = &self.tone;
        if tone.sample_rate == 0 {
            return Err(ConfigError::NoSampleRate);
        }
        if tone.sample_rate <= 2 * HIGHEST_DTMF_HZ {
            return Err(ConfigError::BelowNyquist);
        }
        if !(tone.amplitude > 0.0 && tone.amplitude <= 1.0) {
            return Err(ConfigError::InvalidAmplitude);
        }

        let keypad = &self.keypad;
        let pins = keypad.row_pins.iter().chain(keypad.column_pins.iter());
        for (i, pin) in pins.clone().enumerate() {
            if pins.clone().skip(i + 1).any(|other| other == pin) {
                return Err(ConfigError::DuplicatePin(*pin));
            }
        }
        if keypad.settle_ms > keypad.debounce_ms {
            return Err(ConfigError::TimingWindow);
        }

        Ok(())
    }
}

/// Configuration rejected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// C01: Sample rate is zero
    NoSampleRate,
    /// C02: Sample rate cannot represent the highest DTMF tone
    BelowNyquist,
    /// C03: Amplitude outside (0, 1]
    InvalidAmplitude,
    /// C04: A GPIO is wired to more than one line
    DuplicatePin(i32),
    /// C05: Settle delay longer than the debounce window
    TimingWindow,
}

impl ConfigError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoSampleRate => "C01",
            Self::BelowNyquist => "C02",
            Self::InvalidAmplitude => "C03",
            Self::DuplicatePin(_) => "C04",
            Self::TimingWindow => "C05",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoSampleRate => "sample rate is zero",
            Self::BelowNyquist => "sample rate too low for DTMF",
            Self::InvalidAmplitude => "amplitude out of range",
            Self::DuplicatePin(_) => "GPIO used twice",
            Self::TimingWindow => "settle delay exceeds debounce window",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicatePin(pin) => write!(f, "{}: {} (GPIO{})", self.code(), self.message(), pin),
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}
