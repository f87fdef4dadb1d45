//! # RustDtmfKeypad
//!
//! Telephone keypad dialer: a 4x3 matrix keypad read through GPIO edge
//! interrupts, and a real-time DTMF tone generator feeding an I2S DAC.
//!
//! ## Architecture
//!
//! Two execution contexts, one shared word:
//! - Keypad task: woken by GPIO interrupts, runs [`KeypadScanner`], writes
//!   the active tone set
//! - Audio task: pulls blocks from [`ToneGenerator`], reads the active tone set
//! - [`ActiveTones`] is a single atomic; no locks, no queues
//!
//! Everything outside `hal` is `no_std` and runs on the host for testing.

#![cfg_attr(not(test), no_std)]

#[cfg(target_os = "espidf")]
extern crate std;

pub mod audio;
pub mod config;
pub mod dtmf;
pub mod fault;
pub mod keypad;
pub mod log_globals;
pub mod log_sink;
pub mod logging;

#[cfg(target_os = "espidf")]
pub mod hal;

pub use audio::{ActiveTones, ToneGenerator, ToneSet};
pub use config::{Config, ConfigError, KeypadConfig, ToneConfig};
pub use dtmf::{DialMode, DtmfDialer, DtmfPair};
pub use fault::{FaultCode, FaultState};
pub use keypad::{KeyEvent, KeyId, KeyListener, KeypadScanner, MatrixPins, ScanGuard};
pub use log_globals::{BG_LOG_STREAM, RT_LOG_STREAM};
