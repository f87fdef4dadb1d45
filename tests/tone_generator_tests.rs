//! Tone generator tests

use std::f64::consts::PI;

use rust_dtmf_keypad::audio::{ActiveTones, ToneGenerator};
use rust_dtmf_keypad::config::ToneConfig;

const SAMPLE_RATE: u32 = 11025;

fn config(amplitude: f32) -> ToneConfig {
    ToneConfig {
        sample_rate: SAMPLE_RATE,
        amplitude,
        dual_tone: true,
    }
}

/// amplitude · sin(2π·f·n/rate), straight from the definition.
fn reference(amplitude: f64, freq: f64, n: u64) -> f64 {
    amplitude * (2.0 * PI * freq * n as f64 / SAMPLE_RATE as f64).sin()
}

fn assert_close(actual: f32, expected: f64, what: &str) {
    assert!(
        (actual as f64 - expected).abs() < 1e-5,
        "{}: got {}, expected {}",
        what,
        actual,
        expected
    );
}

#[test]
fn test_silent_when_no_tone_active() {
    let tones = ActiveTones::new();
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    let mut block = [1.0f32; 64];
    gen.fill(&mut block);

    assert!(block.iter().all(|&s| s == 0.0), "Should be silent with no tones");
    assert_eq!(gen.sample_clock(), 64);
}

#[test]
fn test_single_tone_first_samples() {
    let tones = ActiveTones::new();
    tones.set(&[1209]);
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    let mut block = [0.0f32; 4];
    gen.fill(&mut block);

    assert_eq!(block[0], 0.0);
    for (n, &sample) in block.iter().enumerate() {
        assert_close(sample, reference(0.5, 1209.0, n as u64), "1209 Hz");
    }
    // second sample is well into the first quarter cycle
    assert!(block[1] > 0.3 && block[1] < 0.4);
}

#[test]
fn test_single_tone_matches_sine() {
    let tones = ActiveTones::new();
    tones.set(&[697]);
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    let mut block = [0.0f32; 512];
    gen.fill(&mut block);

    for (n, &sample) in block.iter().enumerate() {
        assert_close(sample, reference(0.5, 697.0, n as u64), "697 Hz");
    }
}

#[test]
fn test_dual_tone_is_sum_of_components() {
    let tones = ActiveTones::new();
    tones.set(&[1336, 770]);
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    let mut block = [0.0f32; 256];
    gen.fill(&mut block);

    for (n, &sample) in block.iter().enumerate() {
        let n = n as u64;
        let expected = reference(0.5, 1336.0, n) + reference(0.5, 770.0, n);
        assert_close(sample, expected, "1336 + 770 Hz");
    }

    // amplitudes add without normalization
    let peak = block.iter().fold(0.0f32, |m, &s| m.max(s.abs()));
    assert!(peak > 0.5 && peak <= 1.0, "peak {}", peak);
}

#[test]
fn test_phase_continuous_across_blocks() {
    let tones = ActiveTones::new();
    tones.set(&[1477, 941]);

    let mut split = ToneGenerator::new(&tones, &config(0.5));
    let mut whole = ToneGenerator::new(&tones, &config(0.5));

    let mut first = [0.0f32; 100];
    let mut second = [0.0f32; 100];
    split.fill(&mut first);
    split.fill(&mut second);

    let mut all = [0.0f32; 200];
    whole.fill(&mut all);

    assert_eq!(&all[..100], &first[..]);
    assert_eq!(&all[100..], &second[..]);
    assert_eq!(split.sample_clock(), whole.sample_clock());
}

#[test]
fn test_zero_length_fill_does_not_advance() {
    let tones = ActiveTones::new();
    tones.set(&[852]);
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    let mut empty: [f32; 0] = [];
    gen.fill(&mut empty);
    assert_eq!(gen.sample_clock(), 0);

    let mut block = [0.0f32; 2];
    gen.fill(&mut block);
    assert_eq!(block[0], 0.0);
}

#[test]
fn test_clock_keeps_running_through_tone_changes() {
    let tones = ActiveTones::new();
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    let mut block = [0.0f32; 10];
    gen.fill(&mut block);

    tones.set(&[1209, 697]);
    gen.fill(&mut block);

    for (i, &sample) in block.iter().enumerate() {
        let n = 10 + i as u64;
        let expected = reference(0.5, 1209.0, n) + reference(0.5, 697.0, n);
        assert_close(sample, expected, "tone started mid-stream");
    }

    tones.clear();
    gen.fill(&mut block);
    assert!(block.iter().all(|&s| s == 0.0));
    assert_eq!(gen.sample_clock(), 30);
}

#[test]
fn test_tone_change_applies_to_next_block() {
    let tones = ActiveTones::new();
    tones.set(&[1336]);
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    let mut block = [0.0f32; 32];
    gen.fill(&mut block);
    assert!(block.iter().any(|&s| s != 0.0));

    tones.clear();
    gen.fill(&mut block);
    assert!(block.iter().all(|&s| s == 0.0));
}

#[test]
fn test_long_running_clock_stays_exact() {
    let tones = ActiveTones::new();
    let mut gen = ToneGenerator::new(&tones, &config(0.5));

    // one hour of silence in one-second blocks
    let mut block = vec![0.0f32; SAMPLE_RATE as usize];
    for _ in 0..3600 {
        gen.fill(&mut block);
    }
    assert_eq!(gen.sample_clock(), SAMPLE_RATE as u64 * 3600);

    // whole seconds in, the waveform is back at sample 0 of the cycle
    tones.set(&[941]);
    gen.fill(&mut block[..4]);
    for n in 0..4u64 {
        assert_close(block[n as usize], reference(0.5, 941.0, n), "after one hour");
    }
}

#[test]
fn test_pcm16_output() {
    let tones = ActiveTones::new();
    tones.set(&[1209, 697]);
    let mut gen = ToneGenerator::new(&tones, &config(0.9));

    let mut frames = [0.0f32; 128];
    let mut pcm = [0u8; 256];
    let written = gen.fill_pcm16_le(&mut frames, &mut pcm);

    assert_eq!(written, 256);
    for (frame, bytes) in frames.iter().zip(pcm.chunks_exact(2)) {
        let value = i16::from_le_bytes([bytes[0], bytes[1]]);
        let expected = (frame.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        assert_eq!(value, expected);
    }
    // 0.9 + 0.9 peaks beyond full scale and clips
    assert!(frames.iter().any(|&s| s > 1.0));
}

#[test]
fn test_zero_sample_rate_is_clamped() {
    let tones = ActiveTones::new();
    tones.set(&[697]);
    let mut gen = ToneGenerator::new(
        &tones,
        &ToneConfig {
            sample_rate: 0,
            amplitude: 0.5,
            dual_tone: true,
        },
    );

    assert_eq!(gen.sample_rate(), 1);
    let mut block = [1.0f32; 8];
    gen.fill(&mut block);
    assert!(block.iter().all(|&s| s == 0.0));
}
