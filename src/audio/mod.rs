//! Audio subsystem for DTMF synthesis
//!
//! Architecture:
//! - ActiveTones: one atomic word written by the keypad task
//! - ToneGenerator: additive sine mixer, pulled one block at a time
//! - PCM: f32 → i16 LE for the I2S sink, mono @ configured sample rate

pub mod generator;
pub mod pcm;
pub mod tones;

pub use generator::ToneGenerator;
pub use tones::{ActiveTones, ToneSet, MAX_TONES};

/// Frames per block requested by the audio task.
pub const AUDIO_BLOCK_FRAMES: usize = 256;
