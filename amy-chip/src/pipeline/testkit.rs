//! Fakes shared by the pipeline tests.

use std::string::String;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::config::EngineParams;
use crate::constants::{AMY_BLOCK_SIZE, BLOCK_SAMPLES};
use crate::engine::{AudioBlock, MixBuffer, RenderHalf, SynthEngine};
use crate::error::TransportError;
use crate::io::{AudioTransport, Timeout};

/// Virtual clock: delays return immediately and just add up.
#[derive(Default)]
pub struct MockDelay {
    pub elapsed_us: u64,
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.elapsed_us += u64::from(ns / 1_000);
    }
}

/// Real clock for tests that race another thread.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TallyVoice {
    pub renders: u32,
    pub last_period: u64,
    pub remote: bool,
    /// Address of the context the last render read.
    pub ctx_addr: usize,
}

pub struct TallyCtx {
    pub period: u64,
}

/// Engine where voice `i` adds `i + 1` to every sample, so a complete block
/// is the constant `N (N + 1) / 2` and a missing half is easy to spot.
#[derive(Default)]
pub struct TallyEngine {
    pub period: u64,
    pub messages: Vec<String>,
    pub events: Vec<i32>,
    pub inputs: Vec<i16>,
    pub initialized: bool,
    pub resets: u32,
    block: Vec<i16>,
}

impl TallyEngine {
    pub fn full_block_value(oscs: usize) -> i16 {
        (oscs * (oscs + 1) / 2) as i16
    }
}

impl SynthEngine for TallyEngine {
    type Voice = TallyVoice;
    type Context = TallyCtx;
    type Event = i32;

    fn initialize(&mut self, _: &EngineParams) {
        self.initialized = true;
        self.block = std::vec![0; BLOCK_SAMPLES];
    }

    fn reset_oscillators(&mut self, voices: &mut [TallyVoice]) {
        self.resets += 1;
        voices.fill(TallyVoice::default());
    }

    fn prepare_buffer(&mut self, _: &mut [TallyVoice], input: &AudioBlock) -> TallyCtx {
        self.period += 1;
        self.inputs.push(input[0]);
        TallyCtx { period: self.period }
    }

    fn render_range(
        ctx: &TallyCtx,
        voices: &mut [TallyVoice],
        first: usize,
        half: RenderHalf,
        mix: &mut MixBuffer,
    ) {
        for (i, v) in voices.iter_mut().enumerate() {
            v.renders += 1;
            v.last_period = ctx.period;
            v.remote = half == RenderHalf::Remote;
            v.ctx_addr = ctx as *const TallyCtx as usize;
            let value = (first + i + 1) as i32;
            mix.iter_mut().for_each(|s| *s += value);
        }
    }

    fn fetch_finished_block(&mut self, mixes: [&MixBuffer; 2]) -> &AudioBlock {
        if self.block.len() != BLOCK_SAMPLES {
            self.block = std::vec![0; BLOCK_SAMPLES];
        }
        for (i, out) in self.block.iter_mut().enumerate() {
            *out = (mixes[0][i] + mixes[1][i]).clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }
        let block: &[i16] = &self.block;
        block.try_into().unwrap()
    }

    fn submit_event(&mut self, event: i32) {
        self.events.push(event);
    }

    fn ingest_message(&mut self, text: &str) {
        self.messages.push(String::from(text));
    }
}

/// Transport that replays scripted read sizes and records every write.
pub struct ScriptedTransport {
    /// Frames returned by successive reads; full blocks once exhausted.
    pub reads: Vec<Result<usize, TransportError<()>>>,
    pub writes: Vec<Vec<i16>>,
    /// Value captured into sample 0 of each read.
    pub input_marker: i16,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        ScriptedTransport {
            reads: Vec::new(),
            writes: Vec::new(),
            input_marker: 0,
        }
    }
}

impl AudioTransport for ScriptedTransport {
    type Error = ();

    fn read_block(&mut self, block: &mut [i16], _: Timeout) -> Result<usize, TransportError<()>> {
        self.input_marker += 1;
        block[0] = self.input_marker;
        if self.reads.is_empty() {
            Ok(AMY_BLOCK_SIZE)
        } else {
            self.reads.remove(0)
        }
    }

    fn write_block(&mut self, block: &[i16], _: Timeout) -> Result<usize, TransportError<()>> {
        self.writes.push(block.to_vec());
        Ok(block.len() / 2)
    }
}
