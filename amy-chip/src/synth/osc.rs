//! One oscillator of the bank.

use core::f32::consts::TAU;

use crate::constants::{AMY_BLOCK_SIZE, AMY_NCHANS, AMY_SAMPLE_RATE};
use crate::dsp::scale_q16;
use crate::engine::{AudioBlock, MixBuffer};

/// Waveform codes, numbered like the AMY wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Wave {
    #[default]
    Sine = 0,
    Pulse = 1,
    SawDown = 2,
    SawUp = 3,
    Triangle = 4,
    Noise = 5,
    /// Left channel of the audio input.
    AudioIn0 = 13,
    /// Right channel of the audio input.
    AudioIn1 = 14,
}

impl Wave {
    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Wave::Sine,
            1 => Wave::Pulse,
            2 => Wave::SawDown,
            3 => Wave::SawUp,
            4 => Wave::Triangle,
            5 => Wave::Noise,
            13 => Wave::AudioIn0,
            14 => Wave::AudioIn1,
            _ => return None,
        })
    }
}

/// Phase-accumulator oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Oscillator {
    wave: Wave,
    /// Wraps at 2^32 = one cycle.
    phase: u32,
    increment: u32,
    /// Q16.16, 0 = silent, 65536 = full scale.
    magnitude: i32,
    noise: u32,
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Oscillator {
    pub const fn new() -> Self {
        Oscillator {
            wave: Wave::Sine,
            phase: 0,
            increment: 0,
            magnitude: 0,
            noise: 0x2545_F491,
        }
    }

    pub fn wave(&self) -> Wave {
        self.wave
    }

    pub fn set_wave(&mut self, wave: Wave) {
        self.wave = wave;
    }

    pub fn set_frequency(&mut self, hz: f32) {
        let hz = hz.clamp(0.0, AMY_SAMPLE_RATE as f32 / 2.0);
        self.increment = (hz * (4_294_967_296.0 / AMY_SAMPLE_RATE as f32)) as u32;
    }

    /// Velocity doubles as the output level; zero silences the oscillator.
    pub fn set_velocity(&mut self, velocity: f32) {
        let v = if velocity.is_nan() { 0.0 } else { velocity.clamp(0.0, 1.0) };
        self.magnitude = (v * 65536.0) as i32;
        if self.magnitude == 0 {
            self.phase = 0;
        }
    }

    pub fn is_active(&self) -> bool {
        self.magnitude != 0
    }

    /// Next Q15 sample of the waveform at the current phase.
    fn sample(&mut self, input: &AudioBlock, frame: usize) -> i32 {
        let ph = self.phase;
        match self.wave {
            Wave::Sine => {
                let angle = ph as f32 * (TAU / 4_294_967_296.0);
                (libm::sinf(angle) * 32767.0) as i32
            }
            Wave::Pulse => {
                if ph < 0x8000_0000 {
                    32767
                } else {
                    -32767
                }
            }
            Wave::SawDown => 32767 - (ph >> 16) as i32,
            Wave::SawUp => (ph >> 16) as i32 - 32768,
            Wave::Triangle => {
                let p = (ph >> 15) as i32;
                if p < 65536 {
                    p - 32768
                } else {
                    98303 - p
                }
            }
            Wave::Noise => {
                // xorshift32
                let mut x = self.noise;
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                self.noise = x;
                i32::from((x >> 16) as u16 as i16)
            }
            Wave::AudioIn0 => i32::from(input[frame * AMY_NCHANS]),
            Wave::AudioIn1 => i32::from(input[frame * AMY_NCHANS + 1]),
        }
    }

    /// Add one block of this oscillator to both channels of `mix`.
    pub fn render(&mut self, input: &AudioBlock, mix: &mut MixBuffer) {
        if self.magnitude == 0 {
            return;
        }
        for frame in 0..AMY_BLOCK_SIZE {
            let s = scale_q16(self.sample(input, frame), self.magnitude);
            let base = frame * AMY_NCHANS;
            mix[base] += s;
            mix[base + 1] += s;
            self.phase = self.phase.wrapping_add(self.increment);
        }
    }
}
