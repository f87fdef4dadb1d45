//! Global log stream instances.
//!
//! One stream per execution context, so the audio task never contends
//! with the keypad task for a slot.

use crate::logging::LogStream;

/// Audio task log stream.
///
/// Single producer (audio task), single consumer (log drain).
pub static RT_LOG_STREAM: LogStream = LogStream::new();

/// Keypad task and main loop log stream.
pub static BG_LOG_STREAM: LogStream = LogStream::new();
