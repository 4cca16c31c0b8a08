//! Conversion between interleaved `i16` blocks and the I2S byte stream.
//!
//! Samples travel little-endian, channels interleaved left first. Only whole
//! samples are converted; a trailing odd byte is ignored.

use crate::constants::{AMY_BYTES_PER_SAMPLE, AMY_NCHANS};

/// Bytes in one interleaved frame.
pub const FRAME_BYTES: usize = AMY_NCHANS * AMY_BYTES_PER_SAMPLE;

/// Whole frames contained in `bytes` bytes.
pub const fn frames_in(bytes: usize) -> usize {
    bytes / FRAME_BYTES
}

/// Whole frames contained in `samples` interleaved samples.
pub const fn frames_in_samples(samples: usize) -> usize {
    samples / AMY_NCHANS
}

/// Encode samples into `dest`. Returns the number of samples written, bounded
/// by whichever side is shorter.
pub fn encode(src: &[i16], dest: &mut [u8]) -> usize {
    let mut n = 0;
    for (sample, out) in src.iter().zip(dest.chunks_exact_mut(AMY_BYTES_PER_SAMPLE)) {
        out.copy_from_slice(&sample.to_le_bytes());
        n += 1;
    }
    n
}

/// Decode bytes from `src` into `dest`. Returns the number of whole samples
/// decoded.
pub fn decode(src: &[u8], dest: &mut [i16]) -> usize {
    let mut n = 0;
    for (bytes, out) in src.chunks_exact(AMY_BYTES_PER_SAMPLE).zip(dest.iter_mut()) {
        *out = i16::from_le_bytes([bytes[0], bytes[1]]);
        n += 1;
    }
    n
}

/// Fill a block with silence.
pub fn silence(dest: &mut [i16]) {
    dest.fill(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_little_endian_left_first() {
        let src = [0x0102i16, -2];
        let mut dest = [0u8; 4];

        assert_eq!(encode(&src, &mut dest), 2);
        assert_eq!(dest, [0x02, 0x01, 0xFE, 0xFF]);
    }

    #[test]
    fn decode_ignores_trailing_odd_byte() {
        let src = [0x34, 0x12, 0x00, 0x80, 0x7F];
        let mut dest = [0i16; 4];

        assert_eq!(decode(&src, &mut dest), 2);
        assert_eq!(dest[..2], [0x1234, i16::MIN]);
        assert_eq!(dest[2..], [0, 0]);
    }

    #[test]
    fn encode_stops_at_shorter_side() {
        let src = [1i16, 2, 3];
        let mut dest = [0u8; 5];
        assert_eq!(encode(&src, &mut dest), 2);
    }

    #[test]
    fn frame_counts() {
        assert_eq!(FRAME_BYTES, 4);
        assert_eq!(frames_in(1024), 256);
        assert_eq!(frames_in(1023), 255);
        assert_eq!(frames_in(3), 0);
        assert_eq!(frames_in_samples(511), 255);
    }

    #[test]
    fn extreme_values_survive() {
        let src = [i16::MIN, i16::MAX, 0, -1];
        let mut bytes = [0u8; 8];
        let mut out = [0i16; 4];

        encode(&src, &mut bytes);
        decode(&bytes, &mut out);
        assert_eq!(out, src);
    }

    #[test]
    fn silence_zeroes_block() {
        let mut buf = [0x5A5Ai16; 8];
        silence(&mut buf);
        assert!(buf.iter().all(|&x| x == 0));
    }
}
