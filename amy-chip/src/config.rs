//! Board wiring and runtime configuration.
//!
//! Every struct here is plain `Copy` data with a `Default` that matches the
//! ESP32-S3 AMY chip board. [`ChipConfig::esp32s3()`] bundles them.

use crate::constants::{AMY_SAMPLE_RATE, MAX_MESSAGE_LEN};
use crate::io::Timeout;

// ── I2S ────────────────────────────────────────────────────────────────────

/// Which side of the I2S link drives BCLK/LRCLK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2sRole {
    Master,
    /// The codec generates the clocks (the AMY chip default).
    Slave,
}

/// Data bits per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitWidth {
    Bits16,
    Bits24,
    Bits32,
}

impl BitWidth {
    pub const fn bits(self) -> u32 {
        match self {
            BitWidth::Bits16 => 16,
            BitWidth::Bits24 => 24,
            BitWidth::Bits32 => 32,
        }
    }
}

/// Slots per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMode {
    Mono,
    Stereo,
}

/// GPIO assignment for the I2S peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2sPins {
    /// `None` when MCLK is not routed out.
    pub mclk: Option<u8>,
    pub bclk: u8,
    pub ws: u8,
    /// Data towards the codec (DAC data).
    pub dout: u8,
    /// Data from the codec (ADC data).
    pub din: u8,
}

impl Default for I2sPins {
    fn default() -> Self {
        Self {
            mclk: None,
            bclk: 13,
            ws: 12,
            dout: 11,
            din: 16,
        }
    }
}

/// Philips-standard I2S configuration handed to [`I2sChannel::configure`].
///
/// [`I2sChannel::configure`]: crate::io::I2sChannel::configure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2sConfig {
    pub role: I2sRole,
    pub sample_rate: u32,
    pub bit_width: BitWidth,
    pub slot_mode: SlotMode,
    pub pins: I2sPins,
}

impl Default for I2sConfig {
    fn default() -> Self {
        Self {
            role: I2sRole::Slave,
            sample_rate: AMY_SAMPLE_RATE,
            bit_width: BitWidth::Bits16,
            slot_mode: SlotMode::Stereo,
            pins: I2sPins::default(),
        }
    }
}

// ── I2C ────────────────────────────────────────────────────────────────────

/// Codec bus (we are the master).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cMasterConfig {
    pub scl: u8,
    pub sda: u8,
    pub clock_hz: u32,
    /// Upper bound for one register write transaction.
    pub timeout_ms: u32,
    pub internal_pullup: bool,
    pub glitch_ignore_cnt: u8,
}

impl Default for I2cMasterConfig {
    fn default() -> Self {
        Self {
            scl: 17,
            sda: 18,
            clock_hz: 400_000,
            timeout_ms: 50,
            internal_pullup: true,
            glitch_ignore_cnt: 7,
        }
    }
}

/// Control bus (an external controller is the master, we answer at `address`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cSlaveConfig {
    pub scl: u8,
    pub sda: u8,
    /// 7-bit address.
    pub address: u8,
    pub clock_hz: u32,
    pub rx_buf_len: usize,
    pub tx_buf_len: usize,
}

impl Default for I2cSlaveConfig {
    fn default() -> Self {
        Self {
            scl: 5,
            sda: 4,
            address: 0x58,
            clock_hz: 400_000,
            rx_buf_len: 2 * MAX_MESSAGE_LEN,
            tx_buf_len: 2 * MAX_MESSAGE_LEN,
        }
    }
}

// ── Pipeline / engine ──────────────────────────────────────────────────────

/// Coordinator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Upper bound on the wait for the remote render stage.
    ///
    /// `None` waits forever: a stalled remote stage stalls the pipeline.
    /// `Some(t)` enables the silence-and-resync watchdog.
    pub barrier_timeout_us: Option<u32>,
    /// Poll step while a bounded barrier wait is in progress.
    pub barrier_poll_us: u32,
    /// Deadline passed to every transport read and write.
    pub transport_timeout: Timeout,
    /// Log pipeline statistics every this many periods (0 disables).
    pub stats_interval: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            barrier_timeout_us: None,
            barrier_poll_us: 10,
            transport_timeout: Timeout::Forever,
            stats_interval: 0,
        }
    }
}

/// Start-up parameters for the synthesis engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    /// Render cores available to the engine.
    pub cores: u8,
    pub reverb: bool,
    pub chorus: bool,
    pub echo: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            cores: 2,
            reverb: true,
            chorus: true,
            echo: true,
        }
    }
}

/// Everything the board needs at boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChipConfig {
    pub i2s: I2sConfig,
    pub i2c_master: I2cMasterConfig,
    pub i2c_slave: I2cSlaveConfig,
    pub pipeline: PipelineConfig,
    pub engine: EngineParams,
}

impl ChipConfig {
    /// Wiring of the ESP32-S3 AMY chip board.
    pub fn esp32s3() -> Self {
        Self::default()
    }
}
