//! WM8960 stereo CODEC driver.
//!
//! The WM8960 is write-only: the driver keeps a [`RegisterShadow`] seeded
//! with the datasheet reset values and computes every bit edit against it.
//! Named operations map one-to-one onto register fields; most come in
//! `enable_*`/`disable_*` pairs.
//!
//! # Example
//!
//! ```ignore
//! let mut codec = Wm8960::new(i2c);
//! let report = codec.initialize();      // line in -> ADC, DAC -> headphones
//! codec.set_headphone_volume_db(-6.0)?;
//! ```

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use super::registers::wm8960 as reg;
use super::shadow::RegisterShadow;
use super::BusResult;
use crate::control::{CodecControl, InitReport};
use crate::error::BusError;

// ── Settings ───────────────────────────────────────────────────────────────

/// Signal on a PGA's non-inverting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgaInput {
    /// LINPUT2 / RINPUT2.
    Input2,
    /// LINPUT3 / RINPUT3.
    Input3,
    /// Mid-rail reference (single-ended input on INPUT1).
    Vmid,
}

/// Microphone boost stage gain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MicBoost {
    Db0 = 0,
    Db13 = 1,
    Db20 = 2,
    Db29 = 3,
}

/// VMID divider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Vmid {
    Disabled = 0,
    /// Playback and record.
    Divider2x50k = 1,
    /// Low-power standby.
    Divider2x250k = 2,
    /// Fast start-up.
    Divider2x5k = 3,
}

/// Channels controlled by the ALC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AlcMode {
    Off = 0,
    RightOnly = 1,
    LeftOnly = 2,
    Stereo = 3,
}

/// Audio interface word length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WordLength {
    Bits16 = 0,
    Bits20 = 1,
    Bits24 = 2,
    Bits32 = 3,
}

/// SYSCLK source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Mclk,
    Pll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PllMode {
    Integer,
    Fractional,
}

/// MCLK divider ahead of the PLL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PllPrescale {
    Div1,
    Div2,
}

/// SYSCLK divider (1 and 3 are reserved encodings).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SysclkDiv {
    Div1 = 0,
    Div2 = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MicBiasVoltage {
    /// 0.9 × AVDD.
    High,
    /// 0.65 × AVDD.
    Low,
}

/// Class-D clock divider setting for SYSCLK / 16.
pub const DCLKDIV_16: u8 = 7;

// ── dB conversion ──────────────────────────────────────────────────────────

/// Mapping between a gain in dB and a register setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRange {
    /// Setting of 0 dB, in steps.
    pub offset: f32,
    pub step: f32,
    pub min: f32,
    pub max: f32,
    /// One step below `min` is a true mute.
    pub has_mute: bool,
}

/// Input PGA: -17.25 dB to +30 dB, no mute step.
pub const PGA_GAIN: GainRange = GainRange { offset: 17.25, step: 0.75, min: -17.25, max: 30.0, has_mute: false };
/// Headphone driver: -73 dB to +6 dB.
pub const HP_GAIN: GainRange = GainRange { offset: 121.0, step: 1.0, min: -73.0, max: 6.0, has_mute: true };
/// Class-D speaker driver: -73 dB to +6 dB.
pub const SPEAKER_GAIN: GainRange = GainRange { offset: 121.0, step: 1.0, min: -73.0, max: 6.0, has_mute: true };
/// ADC digital volume: -97 dB to +30 dB.
pub const ADC_GAIN: GainRange = GainRange { offset: 97.5, step: 0.5, min: -97.0, max: 30.0, has_mute: true };
/// DAC digital volume: -97 dB to +30 dB.
pub const DAC_GAIN: GainRange = GainRange { offset: 97.5, step: 0.5, min: -97.0, max: 30.0, has_mute: true };

/// Convert `db` into the nearest register setting of `range`.
///
/// Clamped to `max`, and to `min` (or one step below it, where that is the
/// mute setting).
pub fn convert_db_to_setting(db: f32, range: &GainRange) -> u8 {
    let floor = if range.has_mute { range.min - range.step } else { range.min };
    let db = db.min(range.max).max(floor);
    libm::roundf((db + range.offset) / range.step) as u8
}

// ── Driver ─────────────────────────────────────────────────────────────────

/// Generates an `enable`/`disable` pair flipping one register bit.
macro_rules! bit_switch {
    ($(#[$doc:meta])* $enable:ident, $disable:ident: $reg:expr, $bit:expr) => {
        $(#[$doc])*
        pub fn $enable(&mut self) -> BusResult<I2C::Error> {
            self.write_register_bit($reg, $bit, true)
        }

        pub fn $disable(&mut self) -> BusResult<I2C::Error> {
            self.write_register_bit($reg, $bit, false)
        }
    };
}

/// WM8960 driver over any blocking [`I2c`] bus.
pub struct Wm8960<I2C> {
    i2c: I2C,
    address: u8,
    shadow: RegisterShadow<{ reg::REGISTER_COUNT }>,
}

impl<I2C: I2c> Wm8960<I2C> {
    pub const DEFAULT_ADDRESS: u8 = reg::I2C_ADDR;

    pub fn new(i2c: I2C) -> Self {
        Self::new_with_address(i2c, Self::DEFAULT_ADDRESS)
    }

    pub fn new_with_address(i2c: I2C, address: u8) -> Self {
        Wm8960 {
            i2c,
            address,
            shadow: RegisterShadow::new(reg::DEFAULTS),
        }
    }

    /// The driver's view of the register bank.
    pub fn shadow(&self) -> &RegisterShadow<{ reg::REGISTER_COUNT }> {
        &self.shadow
    }

    /// Give back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    // ── Register access ────────────────────────────────────────────────

    /// Write a 9-bit value. The shadow is updated only if the bus write
    /// succeeds.
    pub fn write_register(&mut self, register: u8, value: u16) -> BusResult<I2C::Error> {
        let value = value & 0x1FF;
        let frame = [(register << 1) | (value >> 8) as u8, value as u8];
        debug!("wm8960: R{} <- {:#05x}", register, value);
        match self.i2c.write(self.address, &frame) {
            Ok(()) => {
                self.shadow.set(register, value);
                Ok(())
            }
            Err(e) => {
                let err = BusError::classify(e);
                warn!("wm8960: R{}: {}", register, err);
                Err(err)
            }
        }
    }

    /// Set or clear one bit.
    pub fn write_register_bit(&mut self, register: u8, bit: u8, on: bool) -> BusResult<I2C::Error> {
        let value = self.shadow.with_bit(register, bit, on);
        self.write_register(register, value)
    }

    /// Replace the field `[msb:lsb]`.
    pub fn write_register_multi_bits(
        &mut self,
        register: u8,
        msb: u8,
        lsb: u8,
        setting: u8,
    ) -> BusResult<I2C::Error> {
        let value = self.shadow.with_bits(register, msb, lsb, u16::from(setting));
        self.write_register(register, value)
    }

    /// Reset every register to its default, shadow included.
    pub fn reset(&mut self) -> BusResult<I2C::Error> {
        // Any value written to R15 resets the part.
        self.write_register_bit(reg::RESET, 7, true)?;
        self.shadow.reset();
        Ok(())
    }

    // ── Reference and bias ─────────────────────────────────────────────

    bit_switch!(
        /// VREF, needed by every analog block.
        enable_vref, disable_vref: reg::PWR_MGMT_1, 6
    );

    pub fn set_vmid(&mut self, setting: Vmid) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::PWR_MGMT_1, 8, 7, setting as u8)
    }

    /// VMID with the 2 × 50 kΩ divider (playback and record).
    pub fn enable_vmid(&mut self) -> BusResult<I2C::Error> {
        self.set_vmid(Vmid::Divider2x50k)
    }

    pub fn disable_vmid(&mut self) -> BusResult<I2C::Error> {
        self.set_vmid(Vmid::Disabled)
    }

    bit_switch!(enable_mic_bias, disable_mic_bias: reg::PWR_MGMT_1, 1);

    pub fn set_mic_bias_voltage(&mut self, voltage: MicBiasVoltage) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::ADDITIONAL_CONTROL_4, 0, voltage == MicBiasVoltage::Low)
    }

    /// Analog bias current select (0..3).
    pub fn set_vsel(&mut self, setting: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ADDITIONAL_CONTROL_1, 7, 6, setting.min(3))
    }

    /// Output buffer VMID resistance: `false` 500 Ω, `true` 20 kΩ.
    pub fn set_vroi(&mut self, high_impedance: bool) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::ADDITIONAL_CONTROL_3, 6, high_impedance)
    }

    // ── Input path ─────────────────────────────────────────────────────

    bit_switch!(
        /// Left input PGA and boost mixer power.
        enable_ainl, disable_ainl: reg::PWR_MGMT_1, 5
    );
    bit_switch!(enable_ainr, disable_ainr: reg::PWR_MGMT_1, 4);
    bit_switch!(
        /// Left mic/PGA stage power.
        enable_lmic, disable_lmic: reg::PWR_MGMT_3, 5
    );
    bit_switch!(enable_rmic, disable_rmic: reg::PWR_MGMT_3, 4);

    pub fn pga_left_non_inv_signal_select(&mut self, input: PgaInput) -> BusResult<I2C::Error> {
        self.pga_non_inv_select(reg::ADCL_SIGNAL_PATH, input)
    }

    pub fn pga_right_non_inv_signal_select(&mut self, input: PgaInput) -> BusResult<I2C::Error> {
        self.pga_non_inv_select(reg::ADCR_SIGNAL_PATH, input)
    }

    fn pga_non_inv_select(&mut self, register: u8, input: PgaInput) -> BusResult<I2C::Error> {
        // Clear both selects first so two inputs are never connected at once.
        self.write_register_bit(register, 7, false)?;
        self.write_register_bit(register, 6, false)?;
        match input {
            PgaInput::Input2 => self.write_register_bit(register, 6, true),
            PgaInput::Input3 => self.write_register_bit(register, 7, true),
            PgaInput::Vmid => Ok(()),
        }
    }

    bit_switch!(
        /// Connect LINPUT1 to the left PGA's inverting input.
        connect_lmn1, disconnect_lmn1: reg::ADCL_SIGNAL_PATH, 8
    );
    bit_switch!(connect_rmn1, disconnect_rmn1: reg::ADCR_SIGNAL_PATH, 8);
    bit_switch!(
        /// Connect the left PGA output to the boost mixer.
        connect_lmic2b, disconnect_lmic2b: reg::ADCL_SIGNAL_PATH, 3
    );
    bit_switch!(connect_rmic2b, disconnect_rmic2b: reg::ADCR_SIGNAL_PATH, 3);

    /// Left PGA volume, 0..63 (-17.25 dB to +30 dB in 0.75 dB steps).
    pub fn set_linvol(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::LEFT_INPUT_VOLUME, 5, 0, volume.min(63))?;
        self.pga_left_ipvu_set()
    }

    pub fn set_rinvol(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::RIGHT_INPUT_VOLUME, 5, 0, volume.min(63))?;
        self.pga_right_ipvu_set()
    }

    pub fn set_linvol_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_linvol(convert_db_to_setting(db, &PGA_GAIN))
    }

    pub fn set_rinvol_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_rinvol(convert_db_to_setting(db, &PGA_GAIN))
    }

    /// Latch both PGA volumes.
    pub fn pga_left_ipvu_set(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LEFT_INPUT_VOLUME, 8, true)
    }

    pub fn pga_right_ipvu_set(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::RIGHT_INPUT_VOLUME, 8, true)
    }

    /// Zero-cross detection on both PGAs.
    pub fn enable_pga_zero_cross(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LEFT_INPUT_VOLUME, 6, true)?;
        self.write_register_bit(reg::RIGHT_INPUT_VOLUME, 6, true)
    }

    pub fn disable_pga_zero_cross(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LEFT_INPUT_VOLUME, 6, false)?;
        self.write_register_bit(reg::RIGHT_INPUT_VOLUME, 6, false)
    }

    pub fn enable_linmute(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LEFT_INPUT_VOLUME, 7, true)
    }

    /// Unmute the left PGA and latch its volume.
    pub fn disable_linmute(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LEFT_INPUT_VOLUME, 7, false)?;
        self.write_register_bit(reg::LEFT_INPUT_VOLUME, 8, true)
    }

    pub fn enable_rinmute(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::RIGHT_INPUT_VOLUME, 7, true)
    }

    pub fn disable_rinmute(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::RIGHT_INPUT_VOLUME, 7, false)?;
        self.write_register_bit(reg::RIGHT_INPUT_VOLUME, 8, true)
    }

    pub fn set_lmicboost(&mut self, gain: MicBoost) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ADCL_SIGNAL_PATH, 5, 4, gain as u8)
    }

    pub fn set_rmicboost(&mut self, gain: MicBoost) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ADCR_SIGNAL_PATH, 5, 4, gain as u8)
    }

    /// Boost mixer gain for LINPUT3, 0 (mute) ..= 7 (+6 dB).
    pub fn set_lin3boost(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::INPUT_BOOST_MIXER_1, 6, 4, gain.min(7))
    }

    pub fn set_lin2boost(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::INPUT_BOOST_MIXER_1, 3, 1, gain.min(7))
    }

    pub fn set_rin3boost(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::INPUT_BOOST_MIXER_2, 6, 4, gain.min(7))
    }

    pub fn set_rin2boost(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::INPUT_BOOST_MIXER_2, 3, 1, gain.min(7))
    }

    // ── ADC ────────────────────────────────────────────────────────────

    bit_switch!(enable_adc_left, disable_adc_left: reg::PWR_MGMT_1, 3);
    bit_switch!(enable_adc_right, disable_adc_right: reg::PWR_MGMT_1, 2);

    /// Left ADC digital volume (0 mute, 1 = -97 dB ... 255 = +30 dB), latched.
    pub fn set_adc_left_digital_volume(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::LEFT_ADC_VOLUME, 7, 0, volume)?;
        self.write_register_bit(reg::LEFT_ADC_VOLUME, 8, true)
    }

    pub fn set_adc_right_digital_volume(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::RIGHT_ADC_VOLUME, 7, 0, volume)?;
        self.write_register_bit(reg::RIGHT_ADC_VOLUME, 8, true)
    }

    pub fn set_adc_left_digital_volume_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_adc_left_digital_volume(convert_db_to_setting(db, &ADC_GAIN))
    }

    pub fn set_adc_right_digital_volume_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_adc_right_digital_volume(convert_db_to_setting(db, &ADC_GAIN))
    }

    // ── ALC and noise gate ─────────────────────────────────────────────

    /// Automatic level control. Overrides the PGA volume and mute settings.
    pub fn enable_alc(&mut self, mode: AlcMode) -> BusResult<I2C::Error> {
        let mode = mode as u8;
        self.write_register_bit(reg::ALC1, 8, mode & 0b10 != 0)?;
        self.write_register_bit(reg::ALC1, 7, mode & 0b01 != 0)
    }

    pub fn disable_alc(&mut self) -> BusResult<I2C::Error> {
        self.enable_alc(AlcMode::Off)
    }

    /// Target level, 0 (-22.5 dBFS) ..= 15 (-1.5 dBFS).
    pub fn set_alc_target(&mut self, target: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ALC1, 3, 0, target.min(15))
    }

    pub fn set_alc_decay(&mut self, decay: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ALC3, 7, 4, decay.min(10))
    }

    pub fn set_alc_attack(&mut self, attack: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ALC3, 3, 0, attack.min(10))
    }

    pub fn set_alc_max_gain(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ALC1, 6, 4, gain.min(7))
    }

    pub fn set_alc_min_gain(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ALC2, 6, 4, gain.min(7))
    }

    pub fn set_alc_hold(&mut self, hold: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::ALC2, 3, 0, hold.min(15))
    }

    bit_switch!(enable_peak_limiter, disable_peak_limiter: reg::ALC3, 8);
    bit_switch!(enable_noise_gate, disable_noise_gate: reg::NOISE_GATE, 0);

    /// Noise gate threshold, 0 (-76.5 dBFS) ..= 31 (-30 dBFS).
    pub fn set_noise_gate_threshold(&mut self, threshold: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::NOISE_GATE, 7, 3, threshold.min(31))
    }

    // ── DAC ────────────────────────────────────────────────────────────

    bit_switch!(enable_dac_left, disable_dac_left: reg::PWR_MGMT_2, 8);
    bit_switch!(enable_dac_right, disable_dac_right: reg::PWR_MGMT_2, 7);

    /// Left DAC digital volume (0 mute, 1 = -127 dB ... 255 = 0 dB), latched.
    pub fn set_dac_left_digital_volume(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::LEFT_DAC_VOLUME, 7, 0, volume)?;
        self.write_register_bit(reg::LEFT_DAC_VOLUME, 8, true)
    }

    pub fn set_dac_right_digital_volume(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::RIGHT_DAC_VOLUME, 7, 0, volume)?;
        self.write_register_bit(reg::RIGHT_DAC_VOLUME, 8, true)
    }

    pub fn set_dac_left_digital_volume_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_dac_left_digital_volume(convert_db_to_setting(db, &DAC_GAIN))
    }

    pub fn set_dac_right_digital_volume_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_dac_right_digital_volume(convert_db_to_setting(db, &DAC_GAIN))
    }

    bit_switch!(
        /// Soft-mute both DAC channels.
        enable_dac_mute, disable_dac_mute: reg::ADC_DAC_CTRL_1, 3
    );
    bit_switch!(enable_3d, disable_3d: reg::CONTROL_3D, 0);

    /// 3D enhancement depth, 0 (0 %) ..= 15 (100 %).
    pub fn set_3d_depth(&mut self, depth: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CONTROL_3D, 4, 1, depth.min(15))
    }

    bit_switch!(
        enable_dac_6db_attenuation, disable_dac_6db_attenuation: reg::ADC_DAC_CTRL_1, 7
    );

    // ── Output mixers ──────────────────────────────────────────────────

    bit_switch!(enable_lomix, disable_lomix: reg::PWR_MGMT_3, 3);
    bit_switch!(enable_romix, disable_romix: reg::PWR_MGMT_3, 2);
    bit_switch!(
        /// OUT3 mixer, used as the capless headphone ground.
        enable_out3mix, disable_out3mix: reg::PWR_MGMT_2, 1
    );

    bit_switch!(
        /// LINPUT3 to left output mixer.
        enable_li2lo, disable_li2lo: reg::LEFT_OUT_MIX_1, 7
    );
    bit_switch!(
        /// Left boost mixer to left output mixer.
        enable_lb2lo, disable_lb2lo: reg::BYPASS_1, 7
    );
    bit_switch!(
        /// Left DAC to left output mixer.
        enable_ld2lo, disable_ld2lo: reg::LEFT_OUT_MIX_1, 8
    );
    bit_switch!(enable_ri2ro, disable_ri2ro: reg::RIGHT_OUT_MIX_2, 7);
    bit_switch!(enable_rb2ro, disable_rb2ro: reg::BYPASS_2, 7);
    bit_switch!(enable_rd2ro, disable_rd2ro: reg::RIGHT_OUT_MIX_2, 8);
    bit_switch!(enable_li2mo, disable_li2mo: reg::MONO_OUT_MIX_1, 7);
    bit_switch!(enable_ri2mo, disable_ri2mo: reg::MONO_OUT_MIX_2, 7);

    /// Mixer path gain, 0 (0 dB) ..= 7 (-21 dB).
    pub fn set_li2lovol(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::LEFT_OUT_MIX_1, 6, 4, volume.min(7))
    }

    pub fn set_lb2lovol(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::BYPASS_1, 6, 4, volume.min(7))
    }

    pub fn set_ri2rovol(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::RIGHT_OUT_MIX_2, 6, 4, volume.min(7))
    }

    pub fn set_rb2rovol(&mut self, volume: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::BYPASS_2, 6, 4, volume.min(7))
    }

    // ── Headphones ─────────────────────────────────────────────────────

    bit_switch!(enable_left_headphone, disable_left_headphone: reg::PWR_MGMT_2, 6);
    bit_switch!(enable_right_headphone, disable_right_headphone: reg::PWR_MGMT_2, 5);
    bit_switch!(enable_headphone_standby, disable_headphone_standby: reg::ANTI_POP_1, 0);

    pub fn enable_headphones(&mut self) -> BusResult<I2C::Error> {
        self.enable_right_headphone()?;
        self.enable_left_headphone()
    }

    pub fn disable_headphones(&mut self) -> BusResult<I2C::Error> {
        self.disable_right_headphone()?;
        self.disable_left_headphone()
    }

    /// Both headphone channels, 0..=47 mute, 48 (-73 dB) ..= 127 (+6 dB).
    /// Both channels latch together.
    pub fn set_headphone_volume(&mut self, volume: u8) -> BusResult<I2C::Error> {
        let volume = volume.min(127);
        self.write_register_multi_bits(reg::LOUT1_VOLUME, 6, 0, volume)?;
        self.write_register_multi_bits(reg::ROUT1_VOLUME, 6, 0, volume)?;
        self.write_register_bit(reg::LOUT1_VOLUME, 8, true)?;
        self.write_register_bit(reg::ROUT1_VOLUME, 8, true)
    }

    pub fn set_headphone_volume_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_headphone_volume(convert_db_to_setting(db, &HP_GAIN))
    }

    pub fn enable_headphone_zero_cross(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LOUT1_VOLUME, 7, true)?;
        self.write_register_bit(reg::ROUT1_VOLUME, 7, true)
    }

    pub fn disable_headphone_zero_cross(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LOUT1_VOLUME, 7, false)?;
        self.write_register_bit(reg::ROUT1_VOLUME, 7, false)
    }

    // ── Speakers ───────────────────────────────────────────────────────

    pub fn enable_left_speaker(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::CLASS_D_CONTROL_1, 6, true)?;
        self.write_register_bit(reg::PWR_MGMT_2, 4, true)
    }

    pub fn disable_left_speaker(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::CLASS_D_CONTROL_1, 6, false)?;
        self.write_register_bit(reg::PWR_MGMT_2, 4, false)
    }

    pub fn enable_right_speaker(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::CLASS_D_CONTROL_1, 7, true)?;
        self.write_register_bit(reg::PWR_MGMT_2, 3, true)
    }

    pub fn disable_right_speaker(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::CLASS_D_CONTROL_1, 7, false)?;
        self.write_register_bit(reg::PWR_MGMT_2, 3, false)
    }

    pub fn enable_speakers(&mut self) -> BusResult<I2C::Error> {
        self.enable_right_speaker()?;
        self.enable_left_speaker()
    }

    pub fn disable_speakers(&mut self) -> BusResult<I2C::Error> {
        self.disable_right_speaker()?;
        self.disable_left_speaker()
    }

    /// Both speaker channels, same scale as the headphones.
    pub fn set_speaker_volume(&mut self, volume: u8) -> BusResult<I2C::Error> {
        let volume = volume.min(127);
        self.write_register_multi_bits(reg::LOUT2_VOLUME, 6, 0, volume)?;
        self.write_register_multi_bits(reg::ROUT2_VOLUME, 6, 0, volume)?;
        self.write_register_bit(reg::LOUT2_VOLUME, 8, true)?;
        self.write_register_bit(reg::ROUT2_VOLUME, 8, true)
    }

    pub fn set_speaker_volume_db(&mut self, db: f32) -> BusResult<I2C::Error> {
        self.set_speaker_volume(convert_db_to_setting(db, &SPEAKER_GAIN))
    }

    pub fn enable_speaker_zero_cross(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LOUT2_VOLUME, 7, true)?;
        self.write_register_bit(reg::ROUT2_VOLUME, 7, true)
    }

    pub fn disable_speaker_zero_cross(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::LOUT2_VOLUME, 7, false)?;
        self.write_register_bit(reg::ROUT2_VOLUME, 7, false)
    }

    /// Class-D DC boost, 0 (1.0×) ..= 5 (1.8×).
    pub fn set_speaker_dc_gain(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CLASS_D_CONTROL_3, 5, 3, gain.min(5))
    }

    pub fn set_speaker_ac_gain(&mut self, gain: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CLASS_D_CONTROL_3, 2, 0, gain.min(5))
    }

    // ── Digital interface and clocking ─────────────────────────────────

    bit_switch!(
        /// Route ADC data straight back into the DAC.
        enable_loopback, disable_loopback: reg::AUDIO_INTERFACE_2, 0
    );
    bit_switch!(enable_pll, disable_pll: reg::PWR_MGMT_2, 0);

    pub fn set_pll_prescale(&mut self, prescale: PllPrescale) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::PLL_N, 4, prescale == PllPrescale::Div2)
    }

    /// Integer part of the PLL ratio, 0..=15.
    pub fn set_pll_n(&mut self, n: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::PLL_N, 3, 0, n.min(15))
    }

    /// Fractional part of the PLL ratio, most significant byte first.
    pub fn set_pll_k(&mut self, k1: u8, k2: u8, k3: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::PLL_K_1, 7, 0, k1)?;
        self.write_register_multi_bits(reg::PLL_K_2, 7, 0, k2)?;
        self.write_register_multi_bits(reg::PLL_K_3, 7, 0, k3)
    }

    pub fn set_smd(&mut self, mode: PllMode) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::PLL_N, 5, mode == PllMode::Fractional)
    }

    pub fn set_clksel(&mut self, source: ClockSource) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::CLOCKING_1, 0, source == ClockSource::Pll)
    }

    pub fn set_sysclkdiv(&mut self, div: SysclkDiv) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CLOCKING_1, 2, 1, div as u8)
    }

    /// ADC rate divider; 0 is SYSCLK / 256.
    pub fn set_adcdiv(&mut self, div: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CLOCKING_1, 8, 6, div)
    }

    /// DAC rate divider; 0 is SYSCLK / 256.
    pub fn set_dacdiv(&mut self, div: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CLOCKING_1, 5, 3, div)
    }

    pub fn set_bclkdiv(&mut self, div: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CLOCKING_2, 3, 0, div)
    }

    pub fn set_dclkdiv(&mut self, div: u8) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::CLOCKING_2, 8, 6, div)
    }

    /// ADCLRC pin as GPIO: the ADC shares the DAC's LRCLK.
    pub fn set_alrcgpio(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::AUDIO_INTERFACE_2, 6, true)
    }

    /// The codec drives BCLK and LRCLK.
    pub fn enable_master_mode(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::AUDIO_INTERFACE_1, 6, true)
    }

    /// The host drives BCLK and LRCLK.
    pub fn enable_peripheral_mode(&mut self) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::AUDIO_INTERFACE_1, 6, false)
    }

    pub fn set_wl(&mut self, length: WordLength) -> BusResult<I2C::Error> {
        self.write_register_multi_bits(reg::AUDIO_INTERFACE_1, 3, 2, length as u8)
    }

    pub fn set_lrp(&mut self, inverted: bool) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::AUDIO_INTERFACE_1, 4, inverted)
    }

    pub fn set_alrswap(&mut self, swap: bool) -> BusResult<I2C::Error> {
        self.write_register_bit(reg::AUDIO_INTERFACE_1, 8, swap)
    }

    // ── Board bring-up ─────────────────────────────────────────────────

    /// Line input through the ADC to I2S, I2S through the DAC to the
    /// headphone outputs at line level, 44.1 kHz from a 24 MHz MCLK.
    ///
    /// Every step is attempted even if an earlier one failed.
    pub fn initialize(&mut self) -> InitReport {
        let mut r = InitReport::default();

        r.record(self.enable_vref());
        r.record(self.enable_vmid());

        // Input: INPUT1 single-ended into the PGAs, 0 dB, into the boost mixers.
        r.record(self.enable_lmic());
        r.record(self.enable_rmic());
        r.record(self.connect_lmn1());
        r.record(self.connect_rmn1());
        r.record(self.disable_linmute());
        r.record(self.disable_rinmute());
        r.record(self.set_linvol_db(0.0));
        r.record(self.set_rinvol_db(0.0));
        r.record(self.set_lmicboost(MicBoost::Db0));
        r.record(self.set_rmicboost(MicBoost::Db0));
        r.record(self.connect_lmic2b());
        r.record(self.connect_rmic2b());
        r.record(self.enable_ainl());
        r.record(self.enable_ainr());

        // Output mixers: DAC only, analog bypass off.
        r.record(self.disable_lb2lo());
        r.record(self.disable_rb2ro());
        r.record(self.enable_ld2lo());
        r.record(self.enable_rd2ro());
        r.record(self.set_lb2lovol(7));
        r.record(self.set_rb2rovol(7));
        r.record(self.enable_lomix());
        r.record(self.enable_romix());

        // 24 MHz / 2 -> PLL (N = 7, K = 0x86C226) -> 90.3168 MHz / 8 -> SYSCLK.
        r.record(self.enable_pll());
        r.record(self.set_pll_prescale(PllPrescale::Div2));
        r.record(self.set_smd(PllMode::Fractional));
        r.record(self.set_clksel(ClockSource::Pll));
        r.record(self.set_sysclkdiv(SysclkDiv::Div2));
        r.record(self.set_bclkdiv(4));
        r.record(self.set_dclkdiv(DCLKDIV_16));
        r.record(self.set_pll_n(7));
        r.record(self.set_pll_k(0x86, 0xC2, 0x26));
        r.record(self.set_wl(WordLength::Bits16));
        r.record(self.enable_peripheral_mode());

        r.record(self.enable_adc_left());
        r.record(self.enable_adc_right());
        r.record(self.enable_dac_left());
        r.record(self.enable_dac_right());
        r.record(self.disable_dac_mute());
        r.record(self.disable_loopback());
        r.record(self.disable_dac_mute());

        // Capless headphones with OUT3 as ground, at line level.
        r.record(self.enable_headphones());
        r.record(self.enable_out3mix());
        r.record(self.set_headphone_volume_db(0.0));

        r
    }
}

impl<I2C: I2c> CodecControl for Wm8960<I2C> {
    fn name(&self) -> &'static str {
        "wm8960"
    }

    fn initialize(&mut self) -> InitReport {
        Wm8960::initialize(self)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{self, ErrorType, Operation};
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockError(i2c::ErrorKind);

    impl i2c::Error for MockError {
        fn kind(&self) -> i2c::ErrorKind {
            self.0
        }
    }

    /// Decodes 9-bit frames into a register file and a write log.
    struct MockI2c {
        regs: [u16; reg::REGISTER_COUNT],
        log: Vec<(u8, u8, u16)>,
        /// Fail the write with this index (0-based), if set.
        fail_at: Option<usize>,
        attempts: usize,
    }

    impl MockI2c {
        fn new() -> Self {
            MockI2c {
                regs: reg::DEFAULTS,
                log: Vec::new(),
                fail_at: None,
                attempts: 0,
            }
        }
    }

    impl ErrorType for MockI2c {
        type Error = MockError;
    }

    impl i2c::I2c for MockI2c {
        fn transaction(&mut self, addr: u8, ops: &mut [Operation<'_>]) -> Result<(), MockError> {
            for op in ops {
                if let Operation::Write(bytes) = op {
                    let attempt = self.attempts;
                    self.attempts += 1;
                    if self.fail_at == Some(attempt) {
                        return Err(MockError(i2c::ErrorKind::Bus));
                    }
                    assert_eq!(bytes.len(), 2);
                    let register = bytes[0] >> 1;
                    let value = (u16::from(bytes[0] & 1) << 8) | u16::from(bytes[1]);
                    self.regs[usize::from(register)] = value;
                    self.log.push((addr, register, value));
                }
            }
            Ok(())
        }
    }

    fn codec() -> Wm8960<MockI2c> {
        Wm8960::new(MockI2c::new())
    }

    #[test]
    fn nine_bit_framing() {
        let mut c = codec();
        c.write_register(reg::LEFT_DAC_VOLUME, 0x1FF).unwrap();
        c.write_register(reg::PLL_K_1, 0x086).unwrap();
        let i2c = c.release();

        assert_eq!(i2c.log[0], (0x1A, reg::LEFT_DAC_VOLUME, 0x1FF));
        assert_eq!(i2c.log[1], (0x1A, reg::PLL_K_1, 0x086));
    }

    #[test]
    fn frame_bytes_carry_ninth_bit_in_address_byte() {
        struct Raw(Vec<[u8; 2]>);
        impl ErrorType for Raw {
            type Error = MockError;
        }
        impl i2c::I2c for Raw {
            fn transaction(&mut self, _: u8, ops: &mut [Operation<'_>]) -> Result<(), MockError> {
                for op in ops {
                    if let Operation::Write(b) = op {
                        self.0.push([b[0], b[1]]);
                    }
                }
                Ok(())
            }
        }

        let mut c = Wm8960::new(Raw(Vec::new()));
        c.write_register(0x1A, 0x1C3).unwrap();
        assert_eq!(c.release().0, [[0x35, 0xC3]]);
    }

    #[test]
    fn shadow_starts_at_reset_values() {
        let c = codec();
        assert_eq!(c.shadow().get(reg::LEFT_INPUT_VOLUME), 0x097);
        assert_eq!(c.shadow().get(reg::CLOCKING_2), 0x1C0);
        assert_eq!(c.shadow().get(reg::PLL_K_3), 0x0E9);
    }

    #[test]
    fn bit_edits_use_shadow() {
        let mut c = codec();
        c.enable_vref().unwrap();
        c.enable_ainl().unwrap();
        assert_eq!(c.shadow().get(reg::PWR_MGMT_1), 0x060);
        c.disable_vref().unwrap();
        assert_eq!(c.shadow().get(reg::PWR_MGMT_1), 0x020);
    }

    #[test]
    fn multi_bit_field_round_trip() {
        let mut c = codec();
        // INPUT_BOOST_MIXER_1 resets to zero.
        c.set_lin3boost(5).unwrap();
        assert_eq!(c.shadow().get(reg::INPUT_BOOST_MIXER_1), 5 << 4);
        c.set_lin2boost(9).unwrap();
        assert_eq!(c.shadow().get(reg::INPUT_BOOST_MIXER_1), (5 << 4) | (7 << 1));
    }

    #[test]
    fn db_conversion() {
        assert_eq!(convert_db_to_setting(0.0, &HP_GAIN), 121);
        assert_eq!(convert_db_to_setting(6.0, &HP_GAIN), 127);
        assert_eq!(convert_db_to_setting(50.0, &HP_GAIN), 127);
        assert_eq!(convert_db_to_setting(-73.0, &HP_GAIN), 48);
        // One step below the minimum is mute.
        assert_eq!(convert_db_to_setting(-200.0, &HP_GAIN), 47);
        assert_eq!(convert_db_to_setting(0.0, &PGA_GAIN), 23);
        // PGA has no mute step.
        assert_eq!(convert_db_to_setting(-40.0, &PGA_GAIN), 0);
        assert_eq!(convert_db_to_setting(0.0, &DAC_GAIN), 195);
        assert_eq!(convert_db_to_setting(0.2, &DAC_GAIN), 195);
        assert_eq!(convert_db_to_setting(0.3, &DAC_GAIN), 196);
        assert_eq!(convert_db_to_setting(-97.5, &ADC_GAIN), 0);
    }

    #[test]
    fn headphone_volume_latches_both_channels() {
        let mut c = codec();
        c.set_headphone_volume_db(0.0).unwrap();
        assert_eq!(c.shadow().get(reg::LOUT1_VOLUME), 0x100 | 121);
        assert_eq!(c.shadow().get(reg::ROUT1_VOLUME), 0x100 | 121);
    }

    #[test]
    fn pga_select_clears_other_input() {
        let mut c = codec();
        c.pga_left_non_inv_signal_select(PgaInput::Input3).unwrap();
        assert_eq!(c.shadow().get(reg::ADCL_SIGNAL_PATH) & 0xC0, 0x80);
        c.pga_left_non_inv_signal_select(PgaInput::Input2).unwrap();
        assert_eq!(c.shadow().get(reg::ADCL_SIGNAL_PATH) & 0xC0, 0x40);
        c.pga_left_non_inv_signal_select(PgaInput::Vmid).unwrap();
        assert_eq!(c.shadow().get(reg::ADCL_SIGNAL_PATH) & 0xC0, 0);
    }

    #[test]
    fn alc_mode_bits() {
        let mut c = codec();
        c.enable_alc(AlcMode::Stereo).unwrap();
        assert_eq!(c.shadow().get(reg::ALC1) & 0x180, 0x180);
        c.enable_alc(AlcMode::LeftOnly).unwrap();
        assert_eq!(c.shadow().get(reg::ALC1) & 0x180, 0x100);
        c.disable_alc().unwrap();
        assert_eq!(c.shadow().get(reg::ALC1) & 0x180, 0);
    }

    #[test]
    fn initialize_clocks_for_44k1() {
        let mut c = codec();
        let report = c.initialize();
        assert!(report.is_clean());

        let s = c.shadow();
        // PLLPRESCALE, SDM, N = 7
        assert_eq!(s.get(reg::PLL_N), 0x037);
        assert_eq!(s.get(reg::PLL_K_1), 0x086);
        assert_eq!(s.get(reg::PLL_K_2), 0x0C2);
        assert_eq!(s.get(reg::PLL_K_3), 0x026);
        // CLKSEL = PLL, SYSCLKDIV = /2
        assert_eq!(s.get(reg::CLOCKING_1) & 0x007, 0x005);
        // DCLKDIV = 16, BCLKDIV = 4
        assert_eq!(s.get(reg::CLOCKING_2), (7 << 6) | 4);
        // 16-bit, peripheral mode
        assert_eq!(s.get(reg::AUDIO_INTERFACE_1) & 0x04C, 0);
        // Headphones at 0 dB
        assert_eq!(s.get(reg::LOUT1_VOLUME) & 0x7F, 121);
        // DAC unmuted
        assert_eq!(s.get(reg::ADC_DAC_CTRL_1) & 0x008, 0);
    }

    #[test]
    fn pll_k_keeps_all_eight_bits() {
        let mut c = codec();
        assert!(c.set_pll_k(0xFF, 0x80, 0x01).is_ok());

        let s = c.shadow();
        assert_eq!(s.get(reg::PLL_K_1), 0x0FF);
        assert_eq!(s.get(reg::PLL_K_2), 0x080);
        assert_eq!(s.get(reg::PLL_K_3), 0x001);
    }

    #[test]
    fn initialize_matches_device_state() {
        let mut c = codec();
        c.initialize();
        let shadow: Vec<u16> = c.shadow().as_slice().to_vec();
        let i2c = c.release();
        assert_eq!(&i2c.regs[..], &shadow[..]);
    }

    #[test]
    fn initialize_is_idempotent() {
        let mut a = codec();
        let mut b = codec();
        a.initialize();
        b.initialize();
        assert_eq!(a.shadow(), b.shadow());

        let first = a.shadow().clone();
        a.initialize();
        assert_eq!(a.shadow(), &first);
    }

    #[test]
    fn failed_write_leaves_shadow_stale_and_continues() {
        let mut i2c = MockI2c::new();
        i2c.fail_at = Some(0); // enable_vref
        let mut c = Wm8960::new(i2c);

        let report = c.initialize();
        assert_eq!(report.failures, 1);
        assert!(report.steps > 40);
        // VREF bit never recorded, VMID (next step) still applied.
        assert_eq!(c.shadow().get(reg::PWR_MGMT_1) & 0x040, 0);
        assert_eq!(c.shadow().get(reg::PWR_MGMT_1) & 0x180, 0x080);
    }

    #[test]
    fn bus_error_is_classified() {
        let mut i2c = MockI2c::new();
        i2c.fail_at = Some(0);
        let mut c = Wm8960::new(i2c);
        assert_eq!(c.enable_vref(), Err(BusError::Busy));
    }

    #[test]
    fn reset_restores_shadow() {
        let mut c = codec();
        c.initialize();
        c.reset().unwrap();
        assert_eq!(c.shadow().as_slice(), &reg::DEFAULTS[..]);
    }

    #[test]
    fn custom_address() {
        let mut c = Wm8960::new_with_address(MockI2c::new(), 0x1B);
        c.enable_pll().unwrap();
        assert_eq!(c.release().log[0].0, 0x1B);
    }
}
