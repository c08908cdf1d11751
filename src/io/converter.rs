//! Sample-format conversion shims for the sample store.

/// Reinterpret raw little-endian bytes as signed 16-bit PCM.
///
/// A trailing odd byte is the caller's problem; see `StoreError::OddLength`.
pub fn bytes_to_pcm16(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

/// Scale 16-bit PCM into the [-1.0, 1.0] float range the mixer works in.
pub fn pcm16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples.iter().map(|&s| s as f32 / 32_768.0).collect()
}
