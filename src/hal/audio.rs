//! Audio HAL: I2S standard-mode TX, mono 16-bit, to an external DAC.
//!
//! The audio task is the pull side of the tone generator: each
//! `write_all` blocks until DMA has room for one more block, which paces
//! the loop at the sample rate.

use esp_idf_svc::hal::delay::BLOCK;
use esp_idf_svc::hal::gpio::{AnyIOPin, InputPin, OutputPin};
use esp_idf_svc::hal::i2s::config::{
    Config, DataBitWidth, SlotMode, StdClkConfig, StdConfig, StdGpioConfig, StdSlotConfig,
};
use esp_idf_svc::hal::i2s::{I2s, I2sDriver, I2sTx};
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::sys::EspError;

use crate::audio::{ToneGenerator, AUDIO_BLOCK_FRAMES};
use crate::fault::{FaultCode, FaultState};
use crate::logging::{LogSource, LogStream};

/// I2S output driver.
pub type AudioOut<'d> = I2sDriver<'d, I2sTx>;

/// Bring up I2S TX at `sample_rate`, mono 16-bit Philips format.
pub fn init_audio_out<'d, I: I2s>(
    i2s: impl Peripheral<P = I> + 'd,
    sample_rate: u32,
    bclk: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
    dout: impl Peripheral<P = impl OutputPin> + 'd,
    ws: impl Peripheral<P = impl InputPin + OutputPin> + 'd,
) -> Result<AudioOut<'d>, EspError> {
    let config = StdConfig::new(
        Config::default(),
        StdClkConfig::from_sample_rate_hz(sample_rate),
        StdSlotConfig::philips_slot_default(DataBitWidth::Bits16, SlotMode::Mono),
        StdGpioConfig::default(),
    );

    let mut driver =
        I2sDriver::new_std_tx(i2s, &config, bclk, dout, Option::<AnyIOPin>::None, ws)?;
    driver.tx_enable()?;
    Ok(driver)
}

/// Audio task: pull one block from the generator, write it, repeat.
///
/// Write errors are latched in `fault` and the task keeps going with the
/// next block.
pub fn audio_task(
    out: &mut AudioOut<'_>,
    generator: &mut ToneGenerator<'_>,
    fault: &FaultState,
    log: &LogStream,
) -> ! {
    let mut frames = [0.0f32; AUDIO_BLOCK_FRAMES];
    let mut pcm = [0u8; AUDIO_BLOCK_FRAMES * 2];
    let mut failures: u32 = 0;

    crate::rt_info!(
        log,
        LogSource::Tone,
        super::now_us(),
        "audio @ {} Hz, {} frames/block",
        generator.sample_rate(),
        AUDIO_BLOCK_FRAMES
    );

    loop {
        let len = generator.fill_pcm16_le(&mut frames, &mut pcm);

        if let Err(e) = out.write_all(&pcm[..len], BLOCK) {
            failures = failures.wrapping_add(1);
            fault.set(FaultCode::AudioWrite, failures);
            crate::rt_warn!(log, LogSource::Tone, super::now_us(), "i2s write failed: {}", e);
        }
    }
}
