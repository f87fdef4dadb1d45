//! GPIO HAL for the keypad matrix.
//!
//! Every line is an open-drain input/output with the internal pull-up on:
//! - `InputPullUp` = output released, the pull-up holds the line high
//! - `OutputLow`   = output driven low
//!
//! Column interrupts fire on the falling edge, row interrupts on the rising
//! edge. ESP-IDF disables a pin interrupt after it fires, so every
//! `listen_*` call re-enables it. The handlers only set a notification bit
//! for the keypad task; the scan itself runs in task context.

use core::num::NonZeroU32;
use std::sync::Arc;

use esp_idf_svc::hal::gpio::{AnyIOPin, InputOutput, InterruptType, PinDriver, Pull};
use esp_idf_svc::hal::task::notification::Notifier;
use esp_idf_svc::sys::EspError;

use crate::keypad::scanner::{Line, LineMode, MatrixPins, ReleaseWatch, ScanGuard};
use crate::keypad::topology::{KeypadTopology, COLUMNS, ROWS};

/// Notification bit of row `r`; column `c` uses bit `c`.
pub const ROW_BIT_SHIFT: u32 = 8;

type LinePin = PinDriver<'static, AnyIOPin, InputOutput>;

/// Claim a GPIO as an idle (released, pulled-up) keypad line.
fn take_line(pin: i32) -> Result<LinePin, EspError> {
    // SAFETY: Config::validate guarantees every GPIO is used once,
    // and nothing else in the firmware claims keypad GPIOs.
    let any = unsafe { AnyIOPin::new(pin as _) };
    let mut driver = PinDriver::input_output_od(any)?;
    driver.set_pull(Pull::Up)?;
    driver.set_high()?;
    Ok(driver)
}

/// Keypad lines on ESP-IDF GPIOs.
pub struct EspMatrixPins {
    rows: [LinePin; ROWS],
    columns: [LinePin; COLUMNS],
    notifier: Arc<Notifier>,
    guard: &'static ScanGuard,
}

impl EspMatrixPins {
    /// Take the GPIOs named by `topology`.
    ///
    /// Interrupt handlers will notify `notifier`; column edges are dropped
    /// in the handler while `guard` is held.
    pub fn new(
        topology: &KeypadTopology,
        notifier: Arc<Notifier>,
        guard: &'static ScanGuard,
    ) -> Result<Self, EspError> {
        let [r0, r1, r2, r3] = topology.row_pins;
        let [c0, c1, c2] = topology.column_pins;
        Ok(Self {
            rows: [take_line(r0)?, take_line(r1)?, take_line(r2)?, take_line(r3)?],
            columns: [take_line(c0)?, take_line(c1)?, take_line(c2)?],
            notifier,
            guard,
        })
    }

    fn line(&mut self, line: Line) -> &mut LinePin {
        match line {
            Line::Row(r) => &mut self.rows[r],
            Line::Column(c) => &mut self.columns[c],
        }
    }

    /// Decode a notification into (rising rows, falling columns) masks.
    pub fn decode_bits(bits: u32) -> (u32, u32) {
        let columns = bits & ((1 << COLUMNS) - 1);
        let rows = (bits >> ROW_BIT_SHIFT) & ((1 << ROWS) - 1);
        (rows, columns)
    }
}

impl MatrixPins for EspMatrixPins {
    type Error = EspError;

    fn attach(&mut self) -> Result<(), EspError> {
        for (c, column) in self.columns.iter_mut().enumerate() {
            column.set_interrupt_type(InterruptType::NegEdge)?;
            let notifier = Arc::clone(&self.notifier);
            let guard = self.guard;
            let bit = NonZeroU32::new(1 << c);
            // SAFETY: the closure only touches the notifier and an atomic
            unsafe {
                column.subscribe(move || {
                    if guard.is_held() {
                        return;
                    }
                    if let Some(bit) = bit {
                        notifier.notify_and_yield(bit);
                    }
                })?;
            }
        }

        for (r, row) in self.rows.iter_mut().enumerate() {
            row.set_interrupt_type(InterruptType::PosEdge)?;
            let notifier = Arc::clone(&self.notifier);
            let bit = NonZeroU32::new(1 << (ROW_BIT_SHIFT + r as u32));
            // SAFETY: as above
            unsafe {
                row.subscribe(move || {
                    if let Some(bit) = bit {
                        notifier.notify_and_yield(bit);
                    }
                })?;
            }
        }
        Ok(())
    }

    fn set_mode(&mut self, line: Line, mode: LineMode) -> Result<(), EspError> {
        if let (Line::Row(r), LineMode::OutputLow) = (line, mode) {
            // a release watch that never fired must not see the next scan
            self.rows[r].disable_interrupt()?;
        }
        let pin = self.line(line);
        match mode {
            LineMode::InputPullUp => pin.set_high(),
            LineMode::OutputLow => pin.set_low(),
        }
    }

    fn is_high(&mut self, line: Line) -> Result<bool, EspError> {
        Ok(self.line(line).is_high())
    }

    fn listen_column_fall(&mut self, column: usize) -> Result<(), EspError> {
        self.columns[column].enable_interrupt()
    }

    fn listen_row_rise(&mut self, row: usize) -> Result<ReleaseWatch, EspError> {
        self.rows[row].enable_interrupt()?;
        Ok(ReleaseWatch::Armed)
    }

    fn detach(&mut self) -> Result<(), EspError> {
        for pin in self.rows.iter_mut().chain(self.columns.iter_mut()) {
            pin.unsubscribe()?;
            pin.set_high()?;
        }
        Ok(())
    }
}
