//! Register maps of the two codecs on the board.
//!
//! Both parts are write-only over I2C, so alongside the addresses this file
//! carries what the drivers need to seed their shadows.

// Several registers are listed for completeness and not driven yet.
#![allow(dead_code)]

/// Wolfson/Cirrus WM8960 stereo CODEC.
///
/// 7-bit register addresses, 9-bit register values. One write is two bytes:
/// `[addr << 1 | value[8], value[7:0]]`.
pub mod wm8960 {
    /// Fixed 7-bit bus address.
    pub const I2C_ADDR: u8 = 0x1A;

    /// Registers R0..R55 (reserved slots included).
    pub const REGISTER_COUNT: usize = 56;

    // ── Input PGAs ─────────────────────────────────────────────────────
    /// - Bit 8 IPVU, bit 7 LINMUTE, bit 6 LIZC, bits 5:0 LINVOL
    pub const LEFT_INPUT_VOLUME: u8 = 0x00;
    pub const RIGHT_INPUT_VOLUME: u8 = 0x01;

    // ── Headphone outputs ──────────────────────────────────────────────
    /// - Bit 8 OUT1VU, bit 7 LO1ZC, bits 6:0 LOUT1VOL
    pub const LOUT1_VOLUME: u8 = 0x02;
    pub const ROUT1_VOLUME: u8 = 0x03;

    // ── Clocking / interface ───────────────────────────────────────────
    /// - Bits 8:6 ADCDIV, 5:3 DACDIV, 2:1 SYSCLKDIV, bit 0 CLKSEL
    pub const CLOCKING_1: u8 = 0x04;
    /// - Bit 7 DACDIV2 (6 dB attenuation), bit 3 DACMU
    pub const ADC_DAC_CTRL_1: u8 = 0x05;
    pub const ADC_DAC_CTRL_2: u8 = 0x06;
    /// - Bit 8 ALRSWAP, bit 6 MS, bit 4 LRP, bits 3:2 WL, bits 1:0 FORMAT
    pub const AUDIO_INTERFACE_1: u8 = 0x07;
    /// - Bits 8:6 DCLKDIV, bits 3:0 BCLKDIV
    pub const CLOCKING_2: u8 = 0x08;
    /// - Bit 6 ALRCGPIO, bit 0 LOOPBACK
    pub const AUDIO_INTERFACE_2: u8 = 0x09;

    // ── DAC ────────────────────────────────────────────────────────────
    /// - Bit 8 DACVU, bits 7:0 LDACVOL
    pub const LEFT_DAC_VOLUME: u8 = 0x0A;
    pub const RIGHT_DAC_VOLUME: u8 = 0x0B;

    /// Any write resets every register.
    pub const RESET: u8 = 0x0F;
    /// - Bits 4:1 3DDEPTH, bit 0 3DEN
    pub const CONTROL_3D: u8 = 0x10;

    // ── ALC / noise gate ───────────────────────────────────────────────
    /// - Bits 8:7 ALCSEL, 6:4 MAXGAIN, 3:0 ALCL
    pub const ALC1: u8 = 0x11;
    /// - Bits 6:4 MINGAIN, 3:0 HLD
    pub const ALC2: u8 = 0x12;
    /// - Bit 8 ALCMODE (limiter), 7:4 DCY, 3:0 ATK
    pub const ALC3: u8 = 0x13;
    /// - Bits 7:3 NGTH, bit 0 NGAT
    pub const NOISE_GATE: u8 = 0x14;

    // ── ADC ────────────────────────────────────────────────────────────
    /// - Bit 8 ADCVU, bits 7:0 LADCVOL
    pub const LEFT_ADC_VOLUME: u8 = 0x15;
    pub const RIGHT_ADC_VOLUME: u8 = 0x16;

    /// - Bits 7:6 VSEL
    pub const ADDITIONAL_CONTROL_1: u8 = 0x17;
    pub const ADDITIONAL_CONTROL_2: u8 = 0x18;

    // ── Power ──────────────────────────────────────────────────────────
    /// - Bits 8:7 VMIDSEL, 6 VREF, 5 AINL, 4 AINR, 3 ADCL, 2 ADCR, 1 MICB
    pub const PWR_MGMT_1: u8 = 0x19;
    /// - Bits 8 DACL, 7 DACR, 6 LOUT1, 5 ROUT1, 4 SPKL, 3 SPKR, 1 OUT3, 0 PLL_EN
    pub const PWR_MGMT_2: u8 = 0x1A;
    /// - Bit 6 VROI
    pub const ADDITIONAL_CONTROL_3: u8 = 0x1B;
    /// - Bit 0 HPSTBY
    pub const ANTI_POP_1: u8 = 0x1C;
    pub const ANTI_POP_2: u8 = 0x1D;

    // ── Input signal path / boost ──────────────────────────────────────
    /// - Bit 8 LMN1, 7 LMP3, 6 LMP2, bits 5:4 LMICBOOST, bit 3 LMIC2B
    pub const ADCL_SIGNAL_PATH: u8 = 0x20;
    pub const ADCR_SIGNAL_PATH: u8 = 0x21;

    // ── Output mixers ──────────────────────────────────────────────────
    /// - Bit 8 LD2LO, 7 LI2LO, bits 6:4 LI2LOVOL
    pub const LEFT_OUT_MIX_1: u8 = 0x22;
    /// - Bit 8 RD2RO, 7 RI2RO, bits 6:4 RI2ROVOL
    pub const RIGHT_OUT_MIX_2: u8 = 0x25;
    /// - Bit 7 L2MO
    pub const MONO_OUT_MIX_1: u8 = 0x26;
    /// - Bit 7 R2MO
    pub const MONO_OUT_MIX_2: u8 = 0x27;

    // ── Speaker outputs ────────────────────────────────────────────────
    /// - Bit 8 SPKVU, bit 7 SPKLZC, bits 6:0 SPKLVOL
    pub const LOUT2_VOLUME: u8 = 0x28;
    pub const ROUT2_VOLUME: u8 = 0x29;
    pub const MONO_OUT_VOLUME: u8 = 0x2A;

    /// - Bits 6:4 LIN3BOOST, 3:1 LIN2BOOST
    pub const INPUT_BOOST_MIXER_1: u8 = 0x2B;
    /// - Bits 6:4 RIN3BOOST, 3:1 RIN2BOOST
    pub const INPUT_BOOST_MIXER_2: u8 = 0x2C;
    /// - Bit 7 LB2LO, bits 6:4 LB2LOVOL
    pub const BYPASS_1: u8 = 0x2D;
    pub const BYPASS_2: u8 = 0x2E;
    /// - Bit 5 LMIC, 4 RMIC, 3 LOMIX, 2 ROMIX
    pub const PWR_MGMT_3: u8 = 0x2F;
    /// - Bit 0 MBSEL
    pub const ADDITIONAL_CONTROL_4: u8 = 0x30;
    /// - Bits 7:6 SPK_OP_EN
    pub const CLASS_D_CONTROL_1: u8 = 0x31;
    /// - Bits 5:3 DCGAIN, 2:0 ACGAIN
    pub const CLASS_D_CONTROL_3: u8 = 0x33;

    // ── PLL ────────────────────────────────────────────────────────────
    /// - Bit 5 SDM, bit 4 PLLPRESCALE, bits 3:0 PLLN
    pub const PLL_N: u8 = 0x34;
    pub const PLL_K_1: u8 = 0x35;
    pub const PLL_K_2: u8 = 0x36;
    pub const PLL_K_3: u8 = 0x37;

    /// Datasheet reset value of every register, R0..R55.
    pub const DEFAULTS: [u16; REGISTER_COUNT] = [
        0x097, 0x097, 0x000, 0x000, 0x000, 0x008, 0x000, 0x00A, // R0-R7
        0x1C0, 0x000, 0x0FF, 0x0FF, 0x000, 0x000, 0x000, 0x000, // R8-R15
        0x000, 0x07B, 0x100, 0x032, 0x000, 0x0C3, 0x0C3, 0x1C0, // R16-R23
        0x000, 0x000, 0x000, 0x000, 0x000, 0x000, 0x000, 0x000, // R24-R31
        0x100, 0x100, 0x050, 0x000, 0x000, 0x050, 0x000, 0x000, // R32-R39
        0x000, 0x000, 0x040, 0x000, 0x000, 0x050, 0x050, 0x000, // R40-R47
        0x002, 0x037, 0x000, 0x080, 0x008, 0x031, 0x026, 0x0E9, // R48-R55
    ];
}

/// TI PCM9211 digital audio interface transceiver.
///
/// 8-bit register addresses and values, written as `[addr, value]`.
pub mod pcm9211 {
    /// 7-bit bus address with ADR0/ADR1 strapped low.
    pub const I2C_ADDR: u8 = 0x40;

    /// Address space covered by the shadow (0x00..0x7F).
    pub const REGISTER_COUNT: usize = 0x80;

    /// Error/interrupt output setup.
    pub const ERROR_OUT: u8 = 0x20;
    /// DIR initial settings 1/3.
    pub const DIR_INIT_1: u8 = 0x21;
    /// DIR initial settings 2/3.
    pub const DIR_INIT_2: u8 = 0x22;
    /// DIR initial settings 3/3.
    pub const DIR_INIT_3: u8 = 0x23;
    /// Oscillation circuit control.
    pub const OSC_CTRL: u8 = 0x24;
    /// DIR receivable fs range.
    pub const DIR_FS_RANGE: u8 = 0x26;
    /// Non-PCM / DTS-CD detection.
    pub const NPCM_DETECT: u8 = 0x27;
    /// DIR output data format.
    pub const DIR_OUT_FORMAT: u8 = 0x2F;
    /// DIR recovered system clock ratio.
    pub const DIR_RSCK_RATIO: u8 = 0x30;
    /// XTI source clock frequency.
    pub const XTI_SCLK_FREQ: u8 = 0x31;
    /// XTI BCK/LRCK output frequency.
    pub const XTI_BCK_LRCK: u8 = 0x32;
    /// XTI source, SCK/BCK/LRCK ratios.
    pub const XTI_OUT_SETTINGS: u8 = 0x33;
    /// DIR input biphase source select.
    pub const DIR_INPUT_SELECT: u8 = 0x34;
    /// Port sampling-frequency calculator source.
    pub const FS_CALC_TARGET: u8 = 0x37;
    /// Port sampling-frequency calculator result.
    pub const FS_CALC_RESULT: u8 = 0x38;
    /// System reset and power-down control.
    pub const SYSTEM_RESET: u8 = 0x40;
    /// Main output / AUX output port Hi-Z control.
    pub const MAIN_AUX_HIZ: u8 = 0x6A;
    /// Main output port source select.
    pub const MAIN_OUT_SOURCE: u8 = 0x6B;
    /// MPIO_B / MPIO_C / MPIO_A flag and GPIO assignment.
    pub const MPIO_SELECT: u8 = 0x6D;
}
