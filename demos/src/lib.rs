//! Host simulation of the AMY chip board.
//!
//! [`board`] fakes the peripherals, [`startup`] runs the boot sequence of the
//! firmware against them and [`song`] has the demo material.

pub mod board;
pub mod song;

use amy_chip::boot::{banner, check_init, init_codec};
use amy_chip::codec::{Pcm9211, Wm8960};
use amy_chip::config::ChipConfig;
use amy_chip::io::I2sTransport;

use board::{SimI2c, SimRx, SimSlave, SimTx};

/// Bus addresses that answer on the simulated codec bus.
pub const CODEC_ADDRESSES: [u8; 2] = [Pcm9211::<SimI2c>::DEFAULT_ADDRESS, Wm8960::<SimI2c>::DEFAULT_ADDRESS];

/// Bring up the board: buses, codecs, then I2S. Returns the names of the
/// steps that failed; boot carries on regardless.
pub fn startup<const N: usize>(
    config: &ChipConfig,
    bus: &mut SimI2c,
    slave: &mut SimSlave<'_, N>,
    transport: &mut I2sTransport<SimRx, SimTx>,
) -> Vec<&'static str> {
    banner(config);

    let steps = [
        check_init("i2c_master", || bus.configure(&config.i2c_master)),
        check_init("i2c_slave", || slave.configure(&config.i2c_slave)),
        init_codec(&mut Pcm9211::new(bus.clone())),
        init_codec(&mut Wm8960::new(bus.clone())),
        check_init("i2s", || transport.start(&config.i2s)),
    ];
    steps.iter().filter_map(|s| s.err().map(|e| e.step)).collect()
}
