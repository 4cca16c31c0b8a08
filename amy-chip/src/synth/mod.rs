//! `SineBank`: a small reference [`SynthEngine`].
//!
//! Enough of a synthesizer to drive the pipeline end to end: a pool of
//! [`Oscillator`]s, a time-ordered event queue fed by [`ToneEvent`]s or AMY
//! wire messages, a global volume and a saturating mix-down. It has no
//! filters, envelopes or effects.
//!
//! ```ignore
//! let mut bank = SineBank::new();
//! bank.initialize(&EngineParams::default());
//! bank.ingest_message("v0f440l1w0");
//! ```

mod message;
mod osc;

pub use message::{note_to_freq, parse, MessageError, ToneEvent};
pub use osc::{Oscillator, Wave};

use heapless::Vec;
use log::{info, warn};

use crate::config::EngineParams;
use crate::constants::{AMY_BLOCK_SIZE, AMY_SAMPLE_RATE, BLOCK_SAMPLES};
use crate::dsp::{mix_down, q15_gain};
use crate::engine::{AudioBlock, MixBuffer, RenderHalf, SynthEngine};

/// Events waiting for their time to come.
pub const EVENT_QUEUE_DEPTH: usize = 64;

/// Per-period state shared by both render stages.
pub struct BlockContext {
    /// Engine time at the start of the period, in frames.
    pub frame: u64,
    /// Audio input captured for the period.
    pub input: AudioBlock,
}

pub struct SineBank {
    params: EngineParams,
    /// Frames rendered since start.
    frames: u64,
    volume: f32,
    pending: Vec<ToneEvent, EVENT_QUEUE_DEPTH>,
    out: AudioBlock,
}

impl Default for SineBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SineBank {
    pub const fn new() -> Self {
        SineBank {
            params: EngineParams {
                cores: 2,
                reverb: false,
                chorus: false,
                echo: false,
            },
            frames: 0,
            volume: 1.0,
            pending: Vec::new(),
            out: [0; BLOCK_SAMPLES],
        }
    }

    /// Engine time in milliseconds (AMY's `sysclock`).
    pub fn sysclock_ms(&self) -> u64 {
        self.frames * 1000 / u64::from(AMY_SAMPLE_RATE)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    /// Events not yet applied.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    fn apply(&mut self, event: ToneEvent, voices: &mut [Oscillator]) {
        if let Some(volume) = event.volume {
            self.volume = volume;
        }
        if let Some(target) = event.reset {
            match voices.get_mut(usize::from(target)) {
                Some(osc) => *osc = Oscillator::new(),
                None => voices.fill(Oscillator::new()),
            }
        }

        let touches_osc = event.wave.is_some()
            || event.freq.is_some()
            || event.note.is_some()
            || event.velocity.is_some();
        if !touches_osc {
            return;
        }
        let Some(osc) = voices.get_mut(usize::from(event.osc)) else {
            warn!("sine bank: no oscillator {}", event.osc);
            return;
        };
        if let Some(wave) = event.wave {
            osc.set_wave(wave);
        }
        if let Some(hz) = event.frequency() {
            osc.set_frequency(hz);
        }
        if let Some(velocity) = event.velocity {
            osc.set_velocity(velocity);
        }
    }
}

impl SynthEngine for SineBank {
    type Voice = Oscillator;
    type Context = BlockContext;
    type Event = ToneEvent;

    fn initialize(&mut self, params: &EngineParams) {
        self.params = *params;
        self.frames = 0;
        self.volume = 1.0;
        self.pending.clear();
        info!(
            "sine bank: {} cores (reverb {}, chorus {}, echo {} not supported)",
            params.cores, params.reverb, params.chorus, params.echo
        );
    }

    fn reset_oscillators(&mut self, voices: &mut [Oscillator]) {
        voices.fill(Oscillator::new());
    }

    fn prepare_buffer(&mut self, voices: &mut [Oscillator], input: &AudioBlock) -> BlockContext {
        let now = self.sysclock_ms();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].time_ms.map_or(true, |t| t <= now) {
                let event = self.pending.remove(i);
                self.apply(event, voices);
            } else {
                i += 1;
            }
        }

        let ctx = BlockContext {
            frame: self.frames,
            input: *input,
        };
        self.frames += AMY_BLOCK_SIZE as u64;
        ctx
    }

    fn render_range(
        ctx: &BlockContext,
        voices: &mut [Oscillator],
        _first: usize,
        _half: RenderHalf,
        mix: &mut MixBuffer,
    ) {
        for osc in voices.iter_mut() {
            osc.render(&ctx.input, mix);
        }
    }

    fn fetch_finished_block(&mut self, mixes: [&MixBuffer; 2]) -> &AudioBlock {
        mix_down(&mixes[0][..], &mixes[1][..], q15_gain(self.volume), &mut self.out);
        &self.out
    }

    fn submit_event(&mut self, event: ToneEvent) {
        if self.pending.push(event).is_err() {
            warn!("sine bank: event queue full, dropping event for osc {}", event.osc);
        }
    }

    fn ingest_message(&mut self, text: &str) {
        match parse(text) {
            Ok(event) => self.submit_event(event),
            Err(e) => warn!("sine bank: `{}`: {}", text, e),
        }
    }
}
