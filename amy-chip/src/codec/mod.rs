//! Drivers for the board's two write-only codecs.
//!
//! Both talk plain [`embedded_hal::i2c::I2c`], keep a
//! [`RegisterShadow`](shadow::RegisterShadow) of everything written, and
//! implement [`CodecControl`](crate::control::CodecControl) for boot.

pub mod registers;
pub mod shadow;

#[cfg(feature = "pcm9211")]
mod pcm9211;
#[cfg(feature = "wm8960")]
mod wm8960;

#[cfg(feature = "pcm9211")]
pub use pcm9211::{Pcm9211, SCRIPT as PCM9211_SCRIPT};
#[cfg(feature = "wm8960")]
pub use wm8960::{
    convert_db_to_setting, AlcMode, ClockSource, GainRange, MicBiasVoltage, MicBoost, PgaInput,
    PllMode, PllPrescale, SysclkDiv, Vmid, WordLength, Wm8960, ADC_GAIN, DAC_GAIN, DCLKDIV_16,
    HP_GAIN, PGA_GAIN, SPEAKER_GAIN,
};

use crate::error::BusError;

/// Result of one register write.
pub type BusResult<E> = Result<(), BusError<E>>;
