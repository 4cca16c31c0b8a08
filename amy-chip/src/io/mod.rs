//! Audio transport between the pipeline and the codec.
//!
//! The coordinator sees the I2S link as an [`AudioTransport`]: a blocking
//! full-duplex stream of interleaved `i16` frames with one read and one write
//! per cadence period. Hardware sits behind the byte-level [`I2sRead`] and
//! [`I2sWrite`] channel traits, and [`I2sTransport`] adapts one to the other.
//!
//! ## Byte layout
//!
//! One frame is `AMY_NCHANS` little-endian `i16` samples, left first:
//!
//! ```text
//! byte:   0    1    2    3    4 ...
//!       [ L.lo L.hi R.lo R.hi ] [ L.lo ...
//! ```
//!
//! A transfer that ends mid-frame counts only its whole frames, so a short
//! read or write always shows up as an underrun.

pub mod frames;
pub mod i2s;

pub use i2s::I2sTransport;

use crate::config::I2sConfig;
use crate::error::TransportError;

/// Deadline for a blocking transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Block until the transfer completes.
    Forever,
    /// Give up after this many milliseconds.
    Millis(u32),
}

impl Timeout {
    /// `None` for [`Timeout::Forever`].
    pub const fn as_millis(self) -> Option<u32> {
        match self {
            Timeout::Forever => None,
            Timeout::Millis(ms) => Some(ms),
        }
    }
}

/// Frame-level, full-duplex audio stream.
///
/// Both transfers take an interleaved block and return how many whole frames
/// actually moved. Fewer frames than requested is not an error: it is an
/// underrun the caller detects and logs.
pub trait AudioTransport {
    type Error: core::fmt::Debug;

    /// Capture up to `block.len() / AMY_NCHANS` frames into `block`.
    fn read_block(
        &mut self,
        block: &mut [i16],
        timeout: Timeout,
    ) -> Result<usize, TransportError<Self::Error>>;

    /// Play up to `block.len() / AMY_NCHANS` frames from `block`.
    fn write_block(
        &mut self,
        block: &[i16],
        timeout: Timeout,
    ) -> Result<usize, TransportError<Self::Error>>;
}

/// Setup shared by both directions of an I2S peripheral.
pub trait I2sChannel {
    type Error: core::fmt::Debug;

    /// Apply clocking, slot and pin settings. Called once, before `enable`.
    fn configure(&mut self, config: &I2sConfig) -> Result<(), Self::Error>;

    /// Start the channel.
    fn enable(&mut self) -> Result<(), Self::Error>;
}

/// Receive half of an I2S peripheral (ADC data from the codec).
pub trait I2sRead: I2sChannel {
    /// Read raw bytes, blocking until `buf` is full or `timeout` expires.
    /// Returns the byte count.
    fn read(&mut self, buf: &mut [u8], timeout: Timeout)
        -> Result<usize, TransportError<Self::Error>>;
}

/// Transmit half of an I2S peripheral (DAC data to the codec).
pub trait I2sWrite: I2sChannel {
    /// Write raw bytes, blocking until all of `buf` is queued or `timeout`
    /// expires. Returns the byte count.
    fn write(&mut self, buf: &[u8], timeout: Timeout) -> Result<usize, TransportError<Self::Error>>;
}
