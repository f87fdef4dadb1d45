//! DTMF tone generator
//!
//! Pull-based: the audio task asks for a block of N samples, the generator
//! mixes whatever tones are active at that moment.
//!
//! Every sample is computed from its absolute index on a shared sample
//! clock, so a tone that stays active is phase continuous across blocks.
//! The clock is not reset when the tone set changes: switching keys can
//! land mid-cycle and produce an audible step.

use core::f64::consts::PI;

use super::pcm;
use super::tones::{ActiveTones, ToneSet};
use crate::config::ToneConfig;

/// Additive sine mixer driven by [`ActiveTones`].
pub struct ToneGenerator<'a> {
    tones: &'a ActiveTones,
    sample_rate: u32,
    amplitude: f32,
    /// Absolute index of the next sample to produce.
    sample_clock: u64,
}

impl<'a> ToneGenerator<'a> {
    /// Create a generator reading the tone set from `tones`.
    ///
    /// A zero sample rate is clamped to 1 Hz; `Config::validate` rejects it
    /// long before that matters.
    pub fn new(tones: &'a ActiveTones, config: &ToneConfig) -> Self {
        Self {
            tones,
            sample_rate: config.sample_rate.max(1),
            amplitude: config.amplitude,
            sample_clock: 0,
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Number of samples produced so far.
    #[inline]
    pub fn sample_clock(&self) -> u64 {
        self.sample_clock
    }

    /// Fill `out` with the next `out.len()` samples.
    ///
    /// The tone set is sampled once, so a key event mid-block takes effect
    /// on the next block. Never blocks, never allocates.
    pub fn fill(&mut self, out: &mut [f32]) {
        let set = self.tones.snapshot();
        let start = self.sample_clock;

        for (i, sample) in out.iter_mut().enumerate() {
            *sample = self.mix(&set, start + i as u64);
        }

        self.sample_clock = start + out.len() as u64;
    }

    /// Fill `frames` and encode them as 16-bit little-endian PCM into `out`.
    ///
    /// `out` must hold `2 * frames.len()` bytes; extra bytes are left untouched.
    pub fn fill_pcm16_le(&mut self, frames: &mut [f32], out: &mut [u8]) -> usize {
        self.fill(frames);
        pcm::encode_i16_le(frames, out)
    }

    /// Sum of all active tones at absolute sample index `n`.
    #[inline]
    fn mix(&self, set: &ToneSet, n: u64) -> f32 {
        let rate = self.sample_rate as u64;
        let mut acc = 0.0f64;

        for freq in set.iter() {
            // sin(2π·f·n/rate) only depends on (f·n) mod rate
            let cycle = (freq as u64 * (n % rate)) % rate;
            let angle = 2.0 * PI * cycle as f64 / rate as f64;
            acc += self.amplitude as f64 * libm::sin(angle);
        }

        acc as f32
    }
}
