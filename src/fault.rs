//! Fault state for the keypad dialer.
//!
//! Transient scan anomalies (bounce, invalid row/column) are not faults.
//! A fault is a peripheral that stopped doing what we asked: a GPIO that
//! rejects a mode change, an I2S write that fails.

use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};

/// Fault codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FaultCode {
    /// No fault (normal operation).
    None = 0,

    /// GPIO driver error while scanning; keypad task stopped.
    /// Data: raw driver error code.
    Gpio = 1,

    /// I2S write failed.
    /// Data: number of failed blocks.
    AudioWrite = 2,
}

impl FaultCode {
    /// Convert from raw u8 value.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => FaultCode::Gpio,
            2 => FaultCode::AudioWrite,
            _ => FaultCode::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FaultCode::None => "none",
            FaultCode::Gpio => "gpio",
            FaultCode::AudioWrite => "audio write",
        }
    }
}

/// Thread-safe fault latch.
///
/// Set by the keypad and audio tasks, checked and reported by the main loop.
///
/// ```ignore
/// static FAULT: FaultState = FaultState::new();
///
/// // audio task
/// if i2s.write_all(&pcm, BLOCK).is_err() {
///     FAULT.set(FaultCode::AudioWrite, failures);
/// }
///
/// // main loop
/// if FAULT.is_active() {
///     report(FAULT.snapshot());
///     FAULT.clear();
/// }
/// ```
pub struct FaultState {
    active: AtomicBool,
    code: AtomicU8,
    /// Meaning depends on the code.
    data: AtomicU32,
    /// Total fault count since boot (never cleared).
    count: AtomicU32,
}

impl FaultState {
    /// Create new fault state (no fault).
    pub const fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            code: AtomicU8::new(0),
            data: AtomicU32::new(0),
            count: AtomicU32::new(0),
        }
    }

    /// Latch a fault and bump the counter.
    #[inline]
    pub fn set(&self, code: FaultCode, data: u32) {
        self.code.store(code as u8, Ordering::Release);
        self.data.store(data, Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.active.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Only meaningful if `is_active()` is true.
    #[inline]
    pub fn code(&self) -> FaultCode {
        FaultCode::from_u8(self.code.load(Ordering::Acquire))
    }

    #[inline]
    pub fn data(&self) -> u32 {
        self.data.load(Ordering::Acquire)
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }

    /// Clear the active flag after reporting. The counter is kept.
    #[inline]
    pub fn clear(&self) {
        self.active.store(false, Ordering::Release);
    }

    #[inline]
    pub fn snapshot(&self) -> FaultSnapshot {
        FaultSnapshot {
            active: self.is_active(),
            code: self.code(),
            data: self.data(),
            count: self.count(),
        }
    }
}

impl Default for FaultState {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of fault state at a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultSnapshot {
    pub active: bool,
    pub code: FaultCode,
    pub data: u32,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_state_basic() {
        let fault = FaultState::new();

        assert!(!fault.is_active());
        assert_eq!(fault.code(), FaultCode::None);
        assert_eq!(fault.count(), 0);

        fault.set(FaultCode::Gpio, 17);

        assert!(fault.is_active());
        assert_eq!(fault.code(), FaultCode::Gpio);
        assert_eq!(fault.data(), 17);
        assert_eq!(fault.count(), 1);

        fault.clear();

        assert!(!fault.is_active());
        assert_eq!(fault.count(), 1); // Count preserved
    }

    #[test]
    fn test_snapshot_reflects_last_fault() {
        let fault = FaultState::new();

        fault.set(FaultCode::AudioWrite, 1);
        fault.set(FaultCode::AudioWrite, 2);

        assert_eq!(
            fault.snapshot(),
            FaultSnapshot {
                active: true,
                code: FaultCode::AudioWrite,
                data: 2,
                count: 2,
            }
        );
    }

    #[test]
    fn test_code_round_trip_names() {
        assert_eq!(FaultCode::from_u8(FaultCode::Gpio as u8), FaultCode::Gpio);
        assert_eq!(FaultCode::from_u8(200), FaultCode::None);
        assert_eq!(FaultCode::AudioWrite.as_str(), "audio write");
    }
}
