//! The coordinator: per-period state machine of the pipeline.
//!
//! ## Barrier watchdog
//!
//! With [`PipelineConfig::barrier_timeout_us`] unset the coordinator waits
//! for the remote stage forever, exactly like the hardware reference. With a
//! deadline set, a missed barrier does not stall the output:
//!
//! 1. the period writes a silent block and the remote stage is marked
//!    outstanding;
//! 2. while it is outstanding, every period still reads input, ingests
//!    messages and writes silence, but neither prepares the engine nor
//!    touches the voice pool (the remote stage may still be using its half);
//! 3. the first period that finds the late `done` resumes normal rendering.

use log::{debug, info, trace, warn};

use embedded_hal::delay::DelayNs;

use crate::config::{EngineParams, PipelineConfig};
use crate::constants::{AMY_BLOCK_SIZE, BLOCK_SAMPLES};
use crate::engine::{AudioBlock, MixBuffer, RenderHalf, SynthEngine};
use crate::error::RemoteClaimed;
use crate::io::AudioTransport;
use crate::sync::MessageQueue;

use super::partition::OscPartition;
use super::remote::RemoteRender;

static SILENCE: AudioBlock = [0; BLOCK_SAMPLES];

/// What happened during one period.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PeriodReport {
    pub frames_read: usize,
    pub frames_written: usize,
    /// The period produced engine output (not watchdog silence).
    pub rendered: bool,
    /// Either transfer moved fewer than a block of frames.
    pub underrun: bool,
    /// The remote start signal was coalesced with a stale one.
    pub coalesced: bool,
    /// Inbound messages handed to the engine.
    pub messages: usize,
}

/// Running totals since start-up.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub periods: u64,
    pub underruns: u64,
    pub read_errors: u64,
    pub write_errors: u64,
    pub coalesced: u64,
    pub barrier_timeouts: u64,
    pub silent_periods: u64,
    pub messages: u64,
}

/// Owns the engine, the transport and the voice pool, and drives one period
/// at a time.
pub struct Coordinator<'a, E, T, D>
where
    E: SynthEngine,
    T: AudioTransport,
    D: DelayNs,
{
    engine: E,
    voices: &'a mut [E::Voice],
    remote: &'a RemoteRender<E>,
    transport: T,
    delay: D,
    messages: Option<&'a MessageQueue>,
    partition: OscPartition,
    config: PipelineConfig,
    input: AudioBlock,
    local_mix: MixBuffer,
    remote_outstanding: bool,
    stats: PipelineStats,
}

impl<'a, E, T, D> Coordinator<'a, E, T, D>
where
    E: SynthEngine,
    T: AudioTransport,
    D: DelayNs,
{
    /// Split `voices` in half between `remote` and this coordinator.
    ///
    /// Fails if another coordinator is still driving `remote`.
    pub fn new(
        engine: E,
        voices: &'a mut [E::Voice],
        remote: &'a RemoteRender<E>,
        transport: T,
        delay: D,
        config: PipelineConfig,
    ) -> Result<Self, RemoteClaimed> {
        if !remote.claim() {
            return Err(RemoteClaimed);
        }
        let partition = OscPartition::halves(voices.len());
        Ok(Coordinator {
            engine,
            voices,
            remote,
            transport,
            delay,
            messages: None,
            partition,
            config,
            input: [0; BLOCK_SAMPLES],
            local_mix: MixBuffer::new(),
            remote_outstanding: false,
            stats: PipelineStats::default(),
        })
    }

    /// Drain `queue` into the engine at the start of every period.
    pub fn with_messages(mut self, queue: &'a MessageQueue) -> Self {
        self.messages = Some(queue);
        self
    }

    /// Use a non-default split point.
    ///
    /// # Panics
    ///
    /// If `partition` does not cover exactly the voice pool.
    pub fn with_partition(mut self, partition: OscPartition) -> Self {
        assert_eq!(partition.total(), self.voices.len(), "partition does not match voice pool");
        self.partition = partition;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    pub fn partition(&self) -> OscPartition {
        self.partition
    }

    /// The remote stage missed a barrier and has not reported back yet.
    pub fn remote_outstanding(&self) -> bool {
        self.remote_outstanding
    }

    pub fn initialize_engine(&mut self, params: &EngineParams) {
        self.engine.initialize(params);
    }

    /// Reset every voice. Refused (returns `false`) while the remote stage
    /// is outstanding.
    pub fn reset_oscillators(&mut self) -> bool {
        if self.remote_outstanding {
            return false;
        }
        self.engine.reset_oscillators(self.voices);
        true
    }

    pub fn submit_event(&mut self, event: E::Event) {
        self.engine.submit_event(event);
    }

    /// Run one cadence period.
    pub fn run_period(&mut self) -> PeriodReport {
        let timeout = self.config.transport_timeout;
        let mut report = PeriodReport::default();

        trace!("period {}: await input", self.stats.periods);
        report.frames_read = match self.transport.read_block(&mut self.input, timeout) {
            Ok(frames) => frames,
            Err(e) => {
                self.stats.read_errors += 1;
                warn!("i2s read: {}", e);
                0
            }
        };

        if let Some(queue) = self.messages {
            let engine = &mut self.engine;
            report.messages = queue.drain(|text| engine.ingest_message(text));
            self.stats.messages += report.messages as u64;
        }

        if self.remote_outstanding && self.remote.try_done() {
            self.remote_outstanding = false;
            info!("remote render caught up, resuming");
        }

        let mut block: &AudioBlock = &SILENCE;
        if self.remote_outstanding {
            self.stats.silent_periods += 1;
        } else {
            let ctx = self.engine.prepare_buffer(self.voices, &self.input);
            let (remote_voices, local_voices) = self.partition.split(self.voices);

            // SAFETY: we hold the claim and nothing is in flight (remote not
            // outstanding). The context moves into the stage, and
            // `remote_voices` lives behind `self.voices`, which is not touched
            // again until `done` is consumed, either below or by `try_done()`
            // in a later period.
            report.coalesced =
                unsafe { self.remote.dispatch(ctx, remote_voices, self.partition.remote().start) };
            if report.coalesced {
                self.stats.coalesced += 1;
                warn!("remote render start coalesced with a pending signal");
            }

            self.local_mix.clear();
            // SAFETY: the reference ends with this render, before any dispatch.
            if let Some(ctx) = unsafe { self.remote.context() } {
                E::render_range(
                    ctx,
                    local_voices,
                    self.partition.local().start,
                    RenderHalf::Local,
                    &mut self.local_mix,
                );
            }

            let arrived = match self.config.barrier_timeout_us {
                None => {
                    self.remote.wait_done();
                    true
                }
                Some(limit) => {
                    let ok = self.remote.wait_done_within(&mut self.delay, limit, self.config.barrier_poll_us);
                    if !ok {
                        self.remote_outstanding = true;
                        self.stats.barrier_timeouts += 1;
                        self.stats.silent_periods += 1;
                        warn!("remote render missed the {} us barrier, writing silence", limit);
                    }
                    ok
                }
            };

            if arrived {
                // SAFETY: `done` was consumed above.
                let remote_mix = unsafe { self.remote.mix() };
                block = self.engine.fetch_finished_block([remote_mix, &self.local_mix]);
                report.rendered = true;
            }
        }

        report.frames_written = match self.transport.write_block(block, timeout) {
            Ok(frames) => frames,
            Err(e) => {
                self.stats.write_errors += 1;
                warn!("i2s write: {}", e);
                0
            }
        };

        if report.frames_written != AMY_BLOCK_SIZE || report.frames_read != AMY_BLOCK_SIZE {
            report.underrun = true;
            self.stats.underruns += 1;
            warn!(
                "i2s underrun: [w {},r {}] vs {}",
                report.frames_written, report.frames_read, AMY_BLOCK_SIZE
            );
        }

        self.stats.periods += 1;
        let interval = u64::from(self.config.stats_interval);
        if interval > 0 && self.stats.periods % interval == 0 {
            debug!("pipeline: {:?}", self.stats);
        }

        report
    }

    /// Run periods forever.
    pub fn run(&mut self) -> ! {
        info!(
            "pipeline: {} voices, remote {:?}, local {:?}",
            self.partition.total(),
            self.partition.remote(),
            self.partition.local()
        );
        loop {
            self.run_period();
        }
    }
}

impl<E, T, D> Drop for Coordinator<'_, E, T, D>
where
    E: SynthEngine,
    T: AudioTransport,
    D: DelayNs,
{
    fn drop(&mut self) {
        // The remote stage may still hold a pointer into the voice pool.
        if self.remote_outstanding {
            self.remote.wait_done();
        }
        self.remote.release();
    }
}
