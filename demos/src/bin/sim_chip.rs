//! The whole chip on the host.
//!
//! Two OS threads stand in for the two cores, a paced fake I2S link stands in
//! for the codec clock, and a third thread plays the external controller,
//! sending notes over the simulated I2C slave port.
//!
//! ```text
//! cargo run --bin sim_chip -- [seconds]
//! RUST_LOG=debug cargo run --bin sim_chip    # every codec register write
//! ```

use std::thread;
use std::time::Duration;

use amy_chip::config::ChipConfig;
use amy_chip::constants::{AMY_BLOCK_SIZE, AMY_OSCS, AMY_SAMPLE_RATE};
use amy_chip::control::ControlSink;
use amy_chip::io::I2sTransport;
use amy_chip::pipeline::{Coordinator, RemoteRender};
use amy_chip::sync::MessageQueue;
use amy_chip::synth::{Oscillator, SineBank};
use amy_chip_demos::board::{SimI2c, SimRx, SimSlave, SimTx, StdDelay};
use amy_chip_demos::song::{boot_tone, polyphony, to_wire};
use amy_chip_demos::{startup, CODEC_ADDRESSES};
use log::{info, warn};

static REMOTE: RemoteRender<SineBank> = RemoteRender::new();
static MESSAGES: MessageQueue = MessageQueue::new();

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seconds: f32 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3.0);
    let periods = (seconds * AMY_SAMPLE_RATE as f32 / AMY_BLOCK_SIZE as f32) as usize;

    let mut config = ChipConfig::esp32s3();
    config.pipeline.stats_interval = 100;

    let mut bus = SimI2c::new(&CODEC_ADDRESSES);
    let mut slave = SimSlave::new(ControlSink::new(&MESSAGES));
    let mut transport = I2sTransport::new(SimRx::paced(220.0), SimTx::discard());

    let failed = startup(&config, &mut bus, &mut slave, &mut transport);
    if !failed.is_empty() {
        warn!("booted with failed steps: {:?}", failed);
    }
    info!("{} codec register writes", bus.writes().len());

    let mut voices = [Oscillator::new(); AMY_OSCS];

    thread::scope(|s| -> anyhow::Result<()> {
        // Core 1. Claims the remote stage before core 0 starts waiting on it.
        let mut c = Coordinator::new(
            SineBank::new(),
            &mut voices,
            &REMOTE,
            transport,
            StdDelay,
            config.pipeline,
        )?
        .with_messages(&MESSAGES);

        // Core 0.
        s.spawn(|| {
            for _ in 0..periods {
                REMOTE.run_once();
            }
        });

        // External controller.
        s.spawn(move || {
            let mut elapsed = 0;
            for event in polyphony(0) {
                let at = event.time_ms.unwrap_or(elapsed);
                if at as f32 > seconds * 1000.0 {
                    break;
                }
                thread::sleep(Duration::from_millis(at.saturating_sub(elapsed)));
                elapsed = at;
                let mut msg = to_wire(&event).into_bytes();
                msg.push(0);
                slave.master_write(&msg);
                info!("controller: sent {:?}, reply {:?}", to_wire(&event), slave.master_read(8));
            }
        });

        c.initialize_engine(&config.engine);
        c.reset_oscillators();
        c.submit_event(boot_tone());

        for _ in 0..periods {
            c.run_period();
        }
        info!("done: {:?}", c.stats());
        Ok(())
    })
}
