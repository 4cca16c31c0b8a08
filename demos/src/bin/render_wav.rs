//! Render the demo song through the pipeline offline and save it as WAV.
//!
//! ```text
//! cargo run --bin render_wav -- out.wav [seconds]
//! ```

use std::thread;

use anyhow::{bail, Context};
use amy_chip::config::{ChipConfig, EngineParams};
use amy_chip::constants::{AMY_BLOCK_SIZE, AMY_NCHANS, AMY_OSCS, AMY_SAMPLE_RATE};
use amy_chip::io::{I2sTransport, Timeout};
use amy_chip::pipeline::{Coordinator, RemoteRender};
use amy_chip::synth::{Oscillator, SineBank};
use amy_chip_demos::board::{SimRx, SimTx, StdDelay};
use amy_chip_demos::song::polyphony;
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: render_wav <out.wav> [seconds]");
    };
    let seconds: f32 = match args.next() {
        Some(s) => s.parse().context("seconds")?,
        None => 12.0,
    };
    let periods = (seconds * AMY_SAMPLE_RATE as f32 / AMY_BLOCK_SIZE as f32) as usize;

    let config = ChipConfig::esp32s3();
    let (tx, captured) = SimTx::capture();
    let mut transport = I2sTransport::new(SimRx::unpaced(0.0), tx);
    transport
        .start(&config.i2s)
        .map_err(|e| anyhow::anyhow!("i2s: {:?}", e))?;

    let remote = RemoteRender::<SineBank>::new();
    let mut voices = [Oscillator::new(); AMY_OSCS];
    let mut pipeline = config.pipeline;
    pipeline.transport_timeout = Timeout::Millis(10);

    thread::scope(|s| -> anyhow::Result<()> {
        let mut c = Coordinator::new(SineBank::new(), &mut voices, &remote, transport, StdDelay, pipeline)?;
        s.spawn(|| {
            for _ in 0..periods {
                remote.run_once();
            }
        });

        c.initialize_engine(&EngineParams::default());
        c.reset_oscillators();
        for event in polyphony(0) {
            c.submit_event(event);
        }
        for _ in 0..periods {
            c.run_period();
        }
        info!("rendered {} periods: {:?}", periods, c.stats());
        Ok(())
    })?;

    let samples = captured
        .lock()
        .map_err(|_| anyhow::anyhow!("capture poisoned"))?
        .clone();
    let spec = hound::WavSpec {
        channels: AMY_NCHANS as u16,
        sample_rate: AMY_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).with_context(|| format!("creating {path}"))?;
    for s in &samples {
        writer.write_sample(*s)?;
    }
    writer.finalize()?;
    info!("wrote {} frames to {}", samples.len() / AMY_NCHANS, path);
    Ok(())
}
