//! Q15/Q16 arithmetic and block mixing.

/// Saturate an `i32` to `i16` range (`-32768..=32767`).
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    val.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}

/// Scale a Q15 sample by a Q16.16 magnitude (`65536` = unity).
#[inline(always)]
pub fn scale_q16(sample: i32, magnitude: i32) -> i32 {
    ((i64::from(sample) * i64::from(magnitude)) >> 16) as i32
}

/// Convert a linear gain to Q15, clamped to `0.0..=4.0`.
pub fn q15_gain(gain: f32) -> i32 {
    let g = if gain.is_nan() { 0.0 } else { gain.clamp(0.0, 4.0) };
    libm::roundf(g * 32768.0) as i32
}

/// Sum two partial mixes, apply a Q15 `gain` and saturate into `out`.
///
/// All three slices are walked in lock-step; the shortest one bounds the
/// work.
pub fn mix_down(a: &[i32], b: &[i32], gain: i32, out: &mut [i16]) {
    for ((o, &x), &y) in out.iter_mut().zip(a.iter()).zip(b.iter()) {
        let sum = i64::from(x) + i64::from(y);
        let scaled = (sum * i64::from(gain)) >> 15;
        *o = saturate16(scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32);
    }
}
