/// Frames per audio block (one cadence period).
pub const AMY_BLOCK_SIZE: usize = 256;

/// Interleaved channels per frame.
pub const AMY_NCHANS: usize = 2;

/// Bytes per sample on the I2S wire (`i16`).
pub const AMY_BYTES_PER_SAMPLE: usize = 2;

/// Samples in one interleaved block.
pub const BLOCK_SAMPLES: usize = AMY_BLOCK_SIZE * AMY_NCHANS;

/// Bytes in one interleaved block on the I2S wire.
pub const BLOCK_BYTES: usize = BLOCK_SAMPLES * AMY_BYTES_PER_SAMPLE;

/// Output sample rate in Hz.
pub const AMY_SAMPLE_RATE: u32 = 44_100;

/// Size of the oscillator pool shared by both render stages.
pub const AMY_OSCS: usize = 120;

/// Longest inbound control message, in bytes.
pub const MAX_MESSAGE_LEN: usize = 255;

/// Inbound control messages buffered between coordinator periods.
pub const MESSAGE_QUEUE_DEPTH: usize = 16;

/// Length of one cadence period in microseconds (rounded down).
pub const BLOCK_PERIOD_US: u32 = (AMY_BLOCK_SIZE as u64 * 1_000_000 / AMY_SAMPLE_RATE as u64) as u32;
