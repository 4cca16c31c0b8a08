//! PCM9211 digital audio interface transceiver.
//!
//! The board uses the PCM9211 only as a clock and routing hub, so the driver
//! is a single fixed register script: XTI as the clock source, the DIR
//! receiver on RXIN1, and the recovered audio on the main output port.

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use super::registers::pcm9211 as reg;
use super::shadow::RegisterShadow;
use super::BusResult;
use crate::control::{CodecControl, InitReport};
use crate::error::BusError;

/// Board bring-up writes, applied in order.
pub const SCRIPT: [(u8, u8); 21] = [
    // Power up every block, then release the reset.
    (reg::SYSTEM_RESET, 0x33),
    (reg::SYSTEM_RESET, 0xC0),
    // 24.576 MHz XTI: SCK 12.288 MHz, BCK 3.072 MHz, LRCK 48 kHz.
    (reg::XTI_SCLK_FREQ, 0x1A),
    (reg::XTI_OUT_SETTINGS, 0x22),
    (reg::ERROR_OUT, 0x00),
    (reg::OSC_CTRL, 0x00),
    (reg::DIR_FS_RANGE, 0x81),
    (reg::XTI_OUT_SETTINGS, 0x22),
    // DIR: 28-108 kHz input, any fs accepted, 24-bit I2S out, RXIN1.
    (reg::DIR_INIT_1, 0x10),
    (reg::DIR_INIT_2, 0x01),
    (reg::DIR_INIT_3, 0x04),
    (reg::NPCM_DETECT, 0x00),
    (reg::DIR_OUT_FORMAT, 0x04),
    (reg::DIR_RSCK_RATIO, 0x02),
    (reg::XTI_BCK_LRCK, 0x22),
    (reg::DIR_INPUT_SELECT, 0x01),
    // Rate calculator on the DIR.
    (reg::FS_CALC_TARGET, 0x00),
    (reg::FS_CALC_RESULT, 0x01),
    // Main output driven by the DIR.
    (reg::MAIN_AUX_HIZ, 0x00),
    (reg::MAIN_OUT_SOURCE, 0x14),
    (reg::MPIO_SELECT, 0x00),
];

/// PCM9211 driver over any blocking [`I2c`] bus.
pub struct Pcm9211<I2C> {
    i2c: I2C,
    address: u8,
    shadow: RegisterShadow<{ reg::REGISTER_COUNT }>,
}

impl<I2C: I2c> Pcm9211<I2C> {
    pub const DEFAULT_ADDRESS: u8 = reg::I2C_ADDR;

    pub fn new(i2c: I2C) -> Self {
        Self::new_with_address(i2c, Self::DEFAULT_ADDRESS)
    }

    pub fn new_with_address(i2c: I2C, address: u8) -> Self {
        Pcm9211 {
            i2c,
            address,
            shadow: RegisterShadow::zeroed(),
        }
    }

    pub fn shadow(&self) -> &RegisterShadow<{ reg::REGISTER_COUNT }> {
        &self.shadow
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    pub fn write_register(&mut self, register: u8, value: u8) -> BusResult<I2C::Error> {
        debug!("pcm9211: {:#04x} <- {:#04x}", register, value);
        match self.i2c.write(self.address, &[register, value]) {
            Ok(()) => {
                self.shadow.set(register, u16::from(value));
                Ok(())
            }
            Err(e) => {
                let err = BusError::classify(e);
                match err {
                    BusError::Busy => warn!("pcm9211: {:#04x}: Bus is busy", register),
                    _ => warn!("pcm9211: {:#04x}: Write Failed ({})", register, err),
                }
                Err(err)
            }
        }
    }

    /// Apply [`SCRIPT`]. A failed write is logged and skipped.
    pub fn initialize(&mut self) -> InitReport {
        let mut report = InitReport::default();
        for &(register, value) in SCRIPT.iter() {
            report.record(self.write_register(register, value));
        }
        report
    }
}

impl<I2C: I2c> CodecControl for Pcm9211<I2C> {
    fn name(&self) -> &'static str {
        "pcm9211"
    }

    fn initialize(&mut self) -> InitReport {
        Pcm9211::initialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{self, ErrorKind, ErrorType, NoAcknowledgeSource, Operation};
    use std::{vec, vec::Vec};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct MockError(ErrorKind);

    impl i2c::Error for MockError {
        fn kind(&self) -> ErrorKind {
            self.0
        }
    }

    #[derive(Default)]
    struct MockI2c {
        log: Vec<(u8, [u8; 2])>,
        fail: Vec<(usize, ErrorKind)>,
        attempts: usize,
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
                    if let Some(&(_, kind)) = self.fail.iter().find(|(i, _)| *i == attempt) {
                        return Err(MockError(kind));
                    }
                    self.log.push((addr, [bytes[0], bytes[1]]));
                }
            }
            Ok(())
        }
    }

    #[test]
    fn script_order_is_exact() {
        let mut dev = Pcm9211::new(MockI2c::default());
        assert!(dev.initialize().is_clean());

        let expected: Vec<(u8, [u8; 2])> = [
            (0x40, 0x33), (0x40, 0xC0), (0x31, 0x1A), (0x33, 0x22), (0x20, 0x00),
            (0x24, 0x00), (0x26, 0x81), (0x33, 0x22), (0x21, 0x10), (0x22, 0x01),
            (0x23, 0x04), (0x27, 0x00), (0x2F, 0x04), (0x30, 0x02), (0x32, 0x22),
            (0x34, 0x01), (0x37, 0x00), (0x38, 0x01), (0x6A, 0x00), (0x6B, 0x14),
            (0x6D, 0x00),
        ]
        .iter()
        .map(|&(r, v)| (0x40, [r, v]))
        .collect();
        assert_eq!(dev.release().log, expected);
    }

    #[test]
    fn shadow_tracks_acknowledged_writes() {
        let mut dev = Pcm9211::new(MockI2c::default());
        dev.initialize();
        assert_eq!(dev.shadow().get(reg::SYSTEM_RESET), 0xC0);
        assert_eq!(dev.shadow().get(reg::MAIN_OUT_SOURCE), 0x14);
        assert_eq!(dev.shadow().get(reg::DIR_FS_RANGE), 0x81);
    }

    #[test]
    fn failures_do_not_stop_script() {
        let i2c = MockI2c {
            fail: vec![
                (2, ErrorKind::Bus),
                (19, ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)),
            ],
            ..Default::default()
        };
        let mut dev = Pcm9211::new(i2c);

        let report = dev.initialize();
        assert_eq!(report, InitReport { steps: 21, failures: 2 });
        // XTI_SCLK_FREQ and MAIN_OUT_SOURCE were never acknowledged.
        assert_eq!(dev.shadow().get(reg::XTI_SCLK_FREQ), 0);
        assert_eq!(dev.shadow().get(reg::MAIN_OUT_SOURCE), 0);
        assert_eq!(dev.shadow().get(reg::MPIO_SELECT), 0);
        assert_eq!(dev.release().log.len(), 19);
    }

    #[test]
    fn busy_is_reported() {
        let i2c = MockI2c {
            fail: vec![(0, ErrorKind::ArbitrationLoss)],
            ..Default::default()
        };
        let mut dev = Pcm9211::new(i2c);
        assert_eq!(dev.write_register(0x40, 0x33), Err(BusError::Busy));
    }
}
