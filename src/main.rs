//! RustDtmfKeypad - firmware entry point
//!
//! 1. Validate configuration, bring up the UART log drain
//! 2. Start the audio task (I2S, paced by DMA)
//! 3. Start the keypad task (GPIO interrupts → scanner → dialer)
//! 4. Idle loop: report faults once per second

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    firmware::run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "{}: ESP-IDF firmware, build for an espidf target (host builds are for `cargo test`)",
        env!("VERSION_STRING")
    );
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::thread;
    use std::time::Duration;

    use anyhow::anyhow;
    use esp_idf_svc::hal::delay::{FreeRtos, BLOCK};
    use esp_idf_svc::hal::peripherals::Peripherals;
    use esp_idf_svc::hal::task::notification::Notification;
    use esp_idf_svc::sys::EspError;

    use rust_dtmf_keypad::audio::{ActiveTones, ToneGenerator};
    use rust_dtmf_keypad::config::{Config, KeypadConfig};
    use rust_dtmf_keypad::dtmf::{DialMode, DtmfDialer};
    use rust_dtmf_keypad::fault::{FaultCode, FaultState};
    use rust_dtmf_keypad::hal::{
        audio_task, init_audio_out, init_uart_logger, log_drain_task, now_us, EspMatrixPins,
        UartLoggerConfig,
    };
    use rust_dtmf_keypad::keypad::{
        KeypadScanner, KeypadTopology, ScanError, ScanGuard, ScannerConfig, COLUMNS, ROWS,
    };
    use rust_dtmf_keypad::log_globals::{BG_LOG_STREAM, RT_LOG_STREAM};
    use rust_dtmf_keypad::logging::LogSource;
    use rust_dtmf_keypad::{rt_error, rt_info};

    /// Board configuration.
    const CONFIG: Config = Config::DEFAULT;

    static ACTIVE_TONES: ActiveTones = ActiveTones::new();
    static SCAN_GUARD: ScanGuard = ScanGuard::new();
    static FAULT_STATE: FaultState = FaultState::new();

    type Scanner = KeypadScanner<'static, EspMatrixPins, FreeRtos, DtmfDialer<'static>>;

    pub fn run() -> anyhow::Result<()> {
        esp_idf_svc::sys::link_patches();

        CONFIG.validate().map_err(|e| anyhow!("invalid configuration: {}", e))?;

        let peripherals = Peripherals::take()?;
        let pins = peripherals.pins;

        // Log drain first, so bring-up messages have somewhere to go
        let mut uart = init_uart_logger(peripherals.uart1, pins.gpio18, &UartLoggerConfig::default())?;
        thread::Builder::new()
            .name("log".into())
            .stack_size(4096)
            .spawn(move || log_drain_task(&mut uart))?;

        rt_info!(BG_LOG_STREAM, LogSource::System, now_us(), "{}", env!("VERSION_STRING"));

        // Audio task: paced by I2S DMA
        let tone = CONFIG.tone;
        let mut out = init_audio_out(
            peripherals.i2s0,
            tone.sample_rate,
            pins.gpio12, // BCLK
            pins.gpio14, // DOUT
            pins.gpio13, // WS
        )?;
        thread::Builder::new()
            .name("audio".into())
            .stack_size(8192)
            .spawn(move || {
                let mut generator = ToneGenerator::new(&ACTIVE_TONES, &tone);
                audio_task(&mut out, &mut generator, &FAULT_STATE, &RT_LOG_STREAM)
            })?;

        // Keypad task: owns the GPIOs and the notification they signal
        let keypad = CONFIG.keypad;
        let mode = tone.dial_mode();
        thread::Builder::new()
            .name("keypad".into())
            .stack_size(8192)
            .spawn(move || {
                if let Err(e) = keypad_task(&keypad, mode) {
                    FAULT_STATE.set(FaultCode::Gpio, e.code() as u32);
                    rt_error!(BG_LOG_STREAM, LogSource::Keypad, now_us(), "keypad stopped: {}", e);
                }
            })?;

        loop {
            thread::sleep(Duration::from_secs(1));

            if FAULT_STATE.is_active() {
                let fault = FAULT_STATE.snapshot();
                rt_error!(
                    BG_LOG_STREAM,
                    LogSource::System,
                    now_us(),
                    "FAULT: {} data={} total={}",
                    fault.code.as_str(),
                    fault.data,
                    fault.count
                );
                FAULT_STATE.clear();
            }
        }
    }

    fn keypad_task(keypad: &KeypadConfig, mode: DialMode) -> Result<(), EspError> {
        let notification = Notification::new();
        let topology = keypad.topology();

        let pins = EspMatrixPins::new(&topology, notification.notifier(), &SCAN_GUARD)?;
        let dialer = DtmfDialer::new(&ACTIVE_TONES, mode, &BG_LOG_STREAM);
        let mut scanner = KeypadScanner::new(
            ScannerConfig::new(keypad, mode.key_up_events()),
            pins,
            FreeRtos,
            dialer,
            &SCAN_GUARD,
            &BG_LOG_STREAM,
        );

        let result = serve(&mut scanner, &notification, &topology);

        // cleanup logs its own failure; the serve error is the one returned
        let _ = scanner.cleanup(now_us());
        result
    }

    fn serve(
        scanner: &mut Scanner,
        notification: &Notification,
        topology: &KeypadTopology,
    ) -> Result<(), EspError> {
        scanner.start(now_us()).map_err(pin_error)?;

        loop {
            let Some(bits) = notification.wait(BLOCK) else {
                continue;
            };
            let (rows, columns) = EspMatrixPins::decode_bits(bits.get());

            // releases first: a release and the next press can share a wakeup
            for r in (0..ROWS).filter(|r| rows & (1 << r) != 0) {
                scanner.on_row_rise(now_us(), topology.row_pins[r]).map_err(pin_error)?;
            }
            for c in (0..COLUMNS).filter(|c| columns & (1 << c) != 0) {
                scanner.on_column_fall(now_us(), topology.column_pins[c]).map_err(pin_error)?;
            }
        }
    }

    fn pin_error(err: ScanError<EspError>) -> EspError {
        match err {
            ScanError::Pin(e) => e,
        }
    }
}
