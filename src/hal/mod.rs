//! Hardware Abstraction Layer for the keypad dialer.
//!
//! Thin wrappers around ESP-IDF peripherals.
//! Scanning and synthesis logic stays in core modules, HAL is just I/O.

pub mod audio;
pub mod gpio;
pub mod uart;

pub use audio::{audio_task, init_audio_out, AudioOut};
pub use gpio::EspMatrixPins;
pub use uart::{init_uart_logger, log_drain_task, UartLoggerConfig};

/// Microseconds since boot.
#[inline]
pub fn now_us() -> i64 {
    // SAFETY: esp_timer_get_time has no preconditions
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}
