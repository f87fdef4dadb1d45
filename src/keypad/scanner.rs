//! Interrupt-driven keypad scanner.
//!
//! Pure logic over the [`MatrixPins`] trait, fully testable on host.
//!
//! # Theory of operation
//!
//! Idle: rows are driven low, columns are pulled-up inputs with a
//! falling-edge interrupt. Pressing a key shorts its row to its column,
//! pulling the column low.
//!
//! On the falling edge we wait for the contacts to settle, then swap roles:
//! rows become pulled-up inputs, the triggered column is driven low, and the
//! first row reading low identifies the key. The scanner then arms a
//! rising-edge interrupt on that row and returns; the release arrives as a
//! separate event.
//!
//! ```text
//!              column fall                 key resolved
//!   ┌──────┐ ─────────────▶ ┌──────────┐ ──────────────▶ ┌─────────┐
//!   │ Idle │                │ Scanning │                 │ Settled │
//!   └──────┘ ◀───────────── └──────────┘                 └─────────┘
//!      ▲      spurious /                                      │
//!      │      invalid row/col                        row rise │
//!      │                      ┌────────────────┐              │
//!      └───────────────────── │ Reinitializing │ ◀────────────┘
//!                             └────────────────┘
//! ```
//!
//! A [`ScanGuard`] is held from the column edge until the return to Idle.
//! Column edges arriving while it is held are dropped, not queued, so
//! chords and rollover are not supported.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;

use super::topology::{KeyId, KeypadTopology, COLUMNS, ROWS};
use crate::config::KeypadConfig;
use crate::logging::{LogSource, LogStream};

/// A keypad line, addressed by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Row(usize),
    Column(usize),
}

/// Electrical mode of a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineMode {
    /// Input with internal pull-up (reads high unless shorted to a low line)
    InputPullUp,
    /// Output driven low
    OutputLow,
}

/// Result of arming the release interrupt on a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReleaseWatch {
    /// A rising edge on the row will be delivered as `on_row_rise`.
    Armed,
    /// The platform cannot report the release edge.
    Unsupported,
}

/// Hardware access for the keypad matrix.
///
/// Interrupt handlers registered by `attach` must forward column falling
/// edges to [`KeypadScanner::on_column_fall`] and row rising edges to
/// [`KeypadScanner::on_row_rise`], with the GPIO number of the line.
pub trait MatrixPins {
    type Error: core::fmt::Debug;

    /// Register edge handlers (falling on columns, rising on rows).
    /// Called once per `start`.
    fn attach(&mut self) -> Result<(), Self::Error>;

    fn set_mode(&mut self, line: Line, mode: LineMode) -> Result<(), Self::Error>;

    fn is_high(&mut self, line: Line) -> Result<bool, Self::Error>;

    /// (Re-)enable the falling-edge interrupt of a column.
    ///
    /// Column interrupts are treated as one-shot: every edge the scanner
    /// handles ends with its column listening again, including dropped ones.
    fn listen_column_fall(&mut self, column: usize) -> Result<(), Self::Error>;

    /// Enable the rising-edge interrupt of a row.
    fn listen_row_rise(&mut self, row: usize) -> Result<ReleaseWatch, Self::Error>;

    /// Disable all interrupts and release every line.
    fn detach(&mut self) -> Result<(), Self::Error>;
}

/// Key transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEdge {
    Down,
    Up,
}

/// A key transition reported by the scanner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeyId,
    pub edge: KeyEdge,
    /// Timestamp of the interrupt that produced the event.
    pub timestamp_us: i64,
}

/// Receives key events, synchronously, from the scanning context.
pub trait KeyListener {
    fn on_key(&mut self, event: KeyEvent);
}

/// Re-entrancy flag shared by the interrupt handlers and the scanner.
///
/// Handlers may check [`ScanGuard::is_held`] to drop column edges before
/// waking the scanning task.
pub struct ScanGuard {
    busy: AtomicBool,
}

impl ScanGuard {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Take the guard, `false` if a scan is already in progress.
    #[inline]
    pub fn try_enter(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    #[inline]
    pub fn leave(&self) {
        self.busy.store(false, Ordering::Release);
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Default for ScanGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Scanner state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanState {
    /// Waiting for a column to fall.
    Idle,
    /// Column edge accepted, rows being probed.
    Scanning { column: usize },
    /// Key is down, waiting for its row to rise.
    Settled { key: KeyId, row: usize, column: usize },
    /// Release seen, lines being re-armed.
    Reinitializing,
}

/// Outcome of a column falling edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnEvent {
    /// Scanner not started.
    Ignored,
    /// Inside the debounce window of the previous edge on this column.
    Debounced,
    /// Another scan holds the guard.
    Busy,
    /// Column was back high after the settle delay.
    Spurious,
    /// GPIO is not a column of this keypad.
    InvalidColumn,
    /// No row reads low (key released during the scan).
    InvalidRow,
    /// Key-down reported, waiting for release.
    Pressed(KeyId),
    /// Key-down reported and the release handled immediately.
    Released(KeyId),
}

/// Outcome of a row rising edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowEvent {
    /// Not the row of the key being held.
    Ignored,
    Released(KeyId),
}

/// Scanner error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError<E> {
    /// Pin driver rejected an operation. The scanner is back in Idle with
    /// the guard released, but the lines may be left mid-scan.
    Pin(E),
}

impl<E: core::fmt::Debug> core::fmt::Display for ScanError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ScanError::Pin(e) => write!(f, "pin driver error: {:?}", e),
        }
    }
}

/// Scanner settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScannerConfig {
    pub topology: KeypadTopology,
    pub debounce_ms: u32,
    pub settle_ms: u32,
    /// Report key-up events.
    pub key_up_events: bool,
}

impl ScannerConfig {
    pub fn new(keypad: &KeypadConfig, key_up_events: bool) -> Self {
        Self {
            topology: keypad.topology(),
            debounce_ms: keypad.debounce_ms,
            settle_ms: keypad.settle_ms,
            key_up_events,
        }
    }
}

/// Keypad scanner.
///
/// ```ignore
/// static GUARD: ScanGuard = ScanGuard::new();
///
/// let mut scanner = KeypadScanner::new(config, pins, FreeRtos, dialer, &GUARD, &BG_LOG_STREAM);
/// scanner.start(now_us)?;
///
/// // keypad task, woken by the interrupt handlers
/// scanner.on_column_fall(now_us, gpio)?;
/// scanner.on_row_rise(now_us, gpio)?;
/// ```
pub struct KeypadScanner<'a, P, D, L> {
    config: ScannerConfig,
    pins: P,
    delay: D,
    listener: L,
    guard: &'a ScanGuard,
    log: &'a LogStream,
    state: ScanState,
    interrupt_mode_initialized: bool,
    /// Last accepted falling edge per column.
    last_edge_us: [Option<i64>; COLUMNS],
}

impl<'a, P, D, L> KeypadScanner<'a, P, D, L>
where
    P: MatrixPins,
    D: DelayNs,
    L: KeyListener,
{
    pub fn new(
        config: ScannerConfig,
        pins: P,
        delay: D,
        listener: L,
        guard: &'a ScanGuard,
        log: &'a LogStream,
    ) -> Self {
        Self {
            config,
            pins,
            delay,
            listener,
            guard,
            log,
            state: ScanState::Idle,
            interrupt_mode_initialized: false,
            last_edge_us: [None; COLUMNS],
        }
    }

    #[inline]
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Whether a scan is in progress (guard held).
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.guard.is_held()
    }

    /// Whether `start` attached the interrupt handlers.
    #[inline]
    pub fn is_started(&self) -> bool {
        self.interrupt_mode_initialized
    }

    #[inline]
    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn pins(&self) -> &P {
        &self.pins
    }

    pub fn pins_mut(&mut self) -> &mut P {
        &mut self.pins
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Arm the lines and attach the interrupt handlers.
    ///
    /// Handlers are attached once; calling `start` again only re-arms.
    pub fn start(&mut self, now_us: i64) -> Result<(), ScanError<P::Error>> {
        let first_time = !self.interrupt_mode_initialized;
        self.set_interrupt_mode(first_time).map_err(ScanError::Pin)?;
        self.interrupt_mode_initialized = true;
        self.state = ScanState::Idle;

        crate::rt_info!(
            self.log,
            LogSource::Keypad,
            now_us,
            "armed rows {:?} cols {:?}",
            self.config.topology.row_pins,
            self.config.topology.column_pins
        );
        Ok(())
    }

    /// Handle a falling edge on the column wired to GPIO `channel`.
    ///
    /// Blocks for the settle delay. Reports key-down, and key-up as well
    /// if the release cannot be waited for.
    pub fn on_column_fall(
        &mut self,
        now_us: i64,
        channel: i32,
    ) -> Result<ColumnEvent, ScanError<P::Error>> {
        if !self.interrupt_mode_initialized {
            return Ok(ColumnEvent::Ignored);
        }

        let column = self.config.topology.column_index(channel);

        if let Some(c) = column {
            let debounce_us = self.config.debounce_ms as i64 * 1000;
            if let Some(last) = self.last_edge_us[c] {
                if now_us.saturating_sub(last) < debounce_us {
                    // the dropped edge still used up the column's interrupt
                    self.pins.listen_column_fall(c).map_err(ScanError::Pin)?;
                    return Ok(ColumnEvent::Debounced);
                }
            }
            self.last_edge_us[c] = Some(now_us);
        }

        if !self.guard.try_enter() {
            return Ok(ColumnEvent::Busy);
        }

        self.scan(now_us, channel, column).map_err(|e| self.abort(e))
    }

    /// Handle a rising edge on the row wired to GPIO `channel`.
    pub fn on_row_rise(&mut self, now_us: i64, channel: i32) -> Result<RowEvent, ScanError<P::Error>> {
        let ScanState::Settled { key, row, .. } = self.state else {
            return Ok(RowEvent::Ignored);
        };
        if self.config.topology.row_index(channel) != Some(row) {
            return Ok(RowEvent::Ignored);
        }

        self.release(now_us, key).map_err(|e| self.abort(e))?;
        Ok(RowEvent::Released(key))
    }

    /// Disable interrupts and release all lines.
    ///
    /// A scan in flight is abandoned without a key-up event. The outcome is
    /// logged, so callers on a shutdown path may ignore the result.
    pub fn cleanup(&mut self, now_us: i64) -> Result<(), ScanError<P::Error>> {
        let result = self.pins.detach().map_err(ScanError::Pin);

        self.state = ScanState::Idle;
        self.interrupt_mode_initialized = false;
        self.guard.leave();

        match &result {
            Ok(()) => crate::rt_info!(self.log, LogSource::Keypad, now_us, "Cleanup done!"),
            Err(e) => crate::rt_warn!(self.log, LogSource::Keypad, now_us, "Cleanup failed: {}", e),
        }
        result
    }

    fn scan(
        &mut self,
        now_us: i64,
        channel: i32,
        column: Option<usize>,
    ) -> Result<ColumnEvent, P::Error> {
        let Some(column) = column else {
            crate::rt_error!(self.log, LogSource::Keypad, now_us, "Invalid Col! GPIO{}", channel);
            self.finish()?;
            return Ok(ColumnEvent::InvalidColumn);
        };

        self.state = ScanState::Scanning { column };

        // give it a moment to settle
        self.delay.delay_ms(self.config.settle_ms);
        if self.pins.is_high(Line::Column(column))? {
            crate::rt_debug!(self.log, LogSource::Keypad, now_us, "spurious edge on GPIO{}", channel);
            self.finish()?;
            return Ok(ColumnEvent::Spurious);
        }

        for r in 0..ROWS {
            self.pins.set_mode(Line::Row(r), LineMode::InputPullUp)?;
        }
        self.pins.set_mode(Line::Column(column), LineMode::OutputLow)?;

        let mut found = None;
        for r in 0..ROWS {
            if !self.pins.is_high(Line::Row(r))? {
                found = Some(r);
                break;
            }
        }

        let Some((row, key)) =
            found.and_then(|r| self.config.topology.key_at(r, column).map(|k| (r, k)))
        else {
            crate::rt_error!(self.log, LogSource::Keypad, now_us, "Invalid Row! col {}", column);
            self.finish()?;
            return Ok(ColumnEvent::InvalidRow);
        };

        self.emit(key, KeyEdge::Down, now_us);
        self.state = ScanState::Settled { key, row, column };

        match self.pins.listen_row_rise(row)? {
            ReleaseWatch::Armed => {
                // Released between the row read and arming: no edge will come
                if self.pins.is_high(Line::Row(row))? {
                    self.release(now_us, key)?;
                    return Ok(ColumnEvent::Released(key));
                }
                Ok(ColumnEvent::Pressed(key))
            }
            ReleaseWatch::Unsupported => {
                crate::rt_warn!(self.log, LogSource::Keypad, now_us, "release wait unsupported");
                self.release(now_us, key)?;
                Ok(ColumnEvent::Released(key))
            }
        }
    }

    fn release(&mut self, now_us: i64, key: KeyId) -> Result<(), P::Error> {
        self.state = ScanState::Reinitializing;
        self.set_interrupt_mode(false)?;
        if self.config.key_up_events {
            self.emit(key, KeyEdge::Up, now_us);
        }
        self.state = ScanState::Idle;
        self.guard.leave();
        Ok(())
    }

    /// Re-arm and return to Idle without an event.
    fn finish(&mut self) -> Result<(), P::Error> {
        self.set_interrupt_mode(false)?;
        self.state = ScanState::Idle;
        self.guard.leave();
        Ok(())
    }

    fn abort(&mut self, e: P::Error) -> ScanError<P::Error> {
        self.state = ScanState::Idle;
        self.guard.leave();
        ScanError::Pin(e)
    }

    fn set_interrupt_mode(&mut self, first_time: bool) -> Result<(), P::Error> {
        // all rows low, so any key pulls its column down
        for r in 0..ROWS {
            self.pins.set_mode(Line::Row(r), LineMode::OutputLow)?;
        }
        for c in 0..COLUMNS {
            self.pins.set_mode(Line::Column(c), LineMode::InputPullUp)?;
        }
        if first_time {
            self.pins.attach()?;
        }
        for c in 0..COLUMNS {
            self.pins.listen_column_fall(c)?;
        }
        Ok(())
    }

    #[inline]
    fn emit(&mut self, key: KeyId, edge: KeyEdge, timestamp_us: i64) {
        self.listener.on_key(KeyEvent {
            key,
            edge,
            timestamp_us,
        });
    }
}
