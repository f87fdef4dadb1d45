//! UART log output.
//!
//! Drains the log streams to a TX-only UART.
//! Requires external USB-UART adapter (CH340, CP2102, etc).
//!
//! ```text
//! ESP32-S3 GPIO18 (TX) ──────▶ USB-UART RX
//!                              └─▶ PC Serial Monitor
//! ```

use esp_idf_svc::hal::gpio::{self, OutputPin};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::uart::{self, Uart, UartTxDriver};
use esp_idf_svc::hal::units::Hertz;
use esp_idf_svc::sys::EspError;

use crate::log_globals::{BG_LOG_STREAM, RT_LOG_STREAM};
use crate::log_sink::{LogDrain, LogSink};

/// UART configuration for logging.
pub struct UartLoggerConfig {
    pub baud_rate: u32,
}

impl Default for UartLoggerConfig {
    fn default() -> Self {
        Self { baud_rate: 115200 }
    }
}

/// Initialize a TX-only UART for log output.
pub fn init_uart_logger<'d, U: Uart>(
    uart: impl Peripheral<P = U> + 'd,
    tx_pin: impl Peripheral<P = impl OutputPin> + 'd,
    config: &UartLoggerConfig,
) -> Result<UartTxDriver<'d>, EspError> {
    let uart_config = uart::config::Config::default().baudrate(Hertz(config.baud_rate));

    UartTxDriver::new(
        uart,
        tx_pin,
        Option::<gpio::AnyIOPin>::None, // CTS
        Option::<gpio::AnyIOPin>::None, // RTS
        &uart_config,
    )
}

impl LogSink for UartTxDriver<'_> {
    fn write_line(&mut self, line: &[u8]) {
        let _ = self.write(line);
    }
}

/// Log drain task: audio stream first, then keypad/system stream.
pub fn log_drain_task(uart: &mut UartTxDriver<'_>) -> ! {
    let mut drain = LogDrain::new([&RT_LOG_STREAM, &BG_LOG_STREAM]);

    loop {
        if drain.drain_into(uart, super::now_us()) == 0 {
            esp_idf_svc::hal::delay::FreeRtos::delay_ms(10);
        }
    }
}
