//! Fixed-point helpers for the mixing path.

pub mod helpers;

pub use helpers::{mix_down, q15_gain, saturate16, scale_q16};
