//! Float to PCM conversion for the I2S sink.

/// Convert one float sample to i16, clipping outside [-1.0, 1.0].
#[inline]
pub fn to_i16(sample: f32) -> i16 {
    let clipped = if sample > 1.0 {
        1.0
    } else if sample < -1.0 {
        -1.0
    } else {
        sample
    };
    // NaN falls through the comparisons and saturates to 0 in the cast
    (clipped * i16::MAX as f32) as i16
}

/// Encode samples as 16-bit little-endian PCM.
///
/// Returns the number of bytes written, bounded by `out.len()`.
pub fn encode_i16_le(samples: &[f32], out: &mut [u8]) -> usize {
    let mut written = 0;
    for (sample, chunk) in samples.iter().zip(out.chunks_exact_mut(2)) {
        chunk.copy_from_slice(&to_i16(*sample).to_le_bytes());
        written += 2;
    }
    written
}
