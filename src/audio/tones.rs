//! Active tone set shared between the keypad task and the audio task.
//!
//! Both frequencies live in a single `AtomicU32` (low half = first tone,
//! high half = second tone, 0 = empty slot). The keypad task stores, the
//! audio task loads once per block. A reader never sees half of an update.

use core::sync::atomic::{AtomicU32, Ordering};

/// Maximum number of simultaneous tones.
pub const MAX_TONES: usize = 2;

/// Snapshot of the sounding frequencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ToneSet {
    freqs: [u16; MAX_TONES],
    len: u8,
}

impl ToneSet {
    /// No tone.
    pub const SILENT: Self = Self { freqs: [0; MAX_TONES], len: 0 };

    /// Build from up to two frequencies in Hz.
    ///
    /// Zero entries are skipped, anything past [`MAX_TONES`] is ignored.
    pub fn from_hz(freqs: &[u16]) -> Self {
        let mut set = Self::SILENT;
        for &f in freqs.iter().filter(|&&f| f != 0).take(MAX_TONES) {
            set.freqs[set.len as usize] = f;
            set.len += 1;
        }
        set
    }

    #[inline]
    fn pack(self) -> u32 {
        self.freqs[0] as u32 | (self.freqs[1] as u32) << 16
    }

    #[inline]
    fn unpack(word: u32) -> Self {
        Self::from_hz(&[word as u16, (word >> 16) as u16])
    }

    /// Sounding frequencies in Hz.
    #[inline]
    pub fn as_slice(&self) -> &[u16] {
        &self.freqs[..self.len as usize]
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.as_slice().iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Lock-free handoff of the active tone set.
pub struct ActiveTones {
    word: AtomicU32,
}

impl ActiveTones {
    /// Create empty (silent).
    pub const fn new() -> Self {
        Self { word: AtomicU32::new(0) }
    }

    /// Replace the active set.
    #[inline]
    pub fn set(&self, freqs: &[u16]) {
        self.store(ToneSet::from_hz(freqs));
    }

    /// Replace the active set with a snapshot.
    #[inline]
    pub fn store(&self, set: ToneSet) {
        self.word.store(set.pack(), Ordering::Release);
    }

    /// Silence.
    #[inline]
    pub fn clear(&self) {
        self.word.store(0, Ordering::Release);
    }

    /// Current set.
    #[inline]
    pub fn snapshot(&self) -> ToneSet {
        ToneSet::unpack(self.word.load(Ordering::Acquire))
    }
}

impl Default for ActiveTones {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_silent() {
        let tones = ActiveTones::new();
        assert!(tones.snapshot().is_empty());
    }

    #[test]
    fn test_set_and_clear() {
        let tones = ActiveTones::new();

        tones.set(&[1336, 770]);
        assert_eq!(tones.snapshot().as_slice(), &[1336, 770]);

        tones.set(&[1209]);
        assert_eq!(tones.snapshot().as_slice(), &[1209]);

        tones.clear();
        assert_eq!(tones.snapshot(), ToneSet::SILENT);
    }

    #[test]
    fn test_extra_and_zero_frequencies_dropped() {
        let set = ToneSet::from_hz(&[0, 697, 1209, 1477]);
        assert_eq!(set.as_slice(), &[697, 1209]);
    }

    #[test]
    fn test_concurrent_reader_sees_whole_sets() {
        use std::sync::Arc;
        use std::thread;

        let tones = Arc::new(ActiveTones::new());
        let writer = {
            let tones = Arc::clone(&tones);
            thread::spawn(move || {
                for i in 0..10_000 {
                    if i % 2 == 0 {
                        tones.set(&[1336, 770]);
                    } else {
                        tones.set(&[1477, 941]);
                    }
                }
            })
        };

        for _ in 0..10_000 {
            let set = tones.snapshot();
            assert!(
                set.is_empty() || set.as_slice() == [1336, 770] || set.as_slice() == [1477, 941],
                "torn read: {:?}",
                set
            );
        }
        writer.join().unwrap();
    }
}
