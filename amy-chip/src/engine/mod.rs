//! Interface to the polyphonic synthesis engine.
//!
//! The engine (oscillators, event scheduling, patch model, mixing) is an
//! external collaborator: the pipeline only calls the operations of
//! [`SynthEngine`] and never looks inside voices, events or messages.
//!
//! ## Ownership
//!
//! The engine object itself (event queue, volume, filters, output block) is
//! owned by the coordinator and is only ever touched from its core. The voice
//! pool lives outside the engine so the coordinator can split it into two
//! disjoint `&mut` slices, one per render stage. Rendering is an associated
//! function without a receiver, which is what allows both cores to run it at
//! the same time.

use core::ops::{Deref, DerefMut};

use crate::config::EngineParams;
use crate::constants::BLOCK_SAMPLES;

/// One finished, interleaved output block (`L R L R ...`).
pub type AudioBlock = [i16; BLOCK_SAMPLES];

/// Which render stage is calling [`SynthEngine::render_range`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderHalf {
    /// Render Stage A, on the remote core.
    Remote,
    /// Render Stage B, run inline by the coordinator.
    Local,
}

impl RenderHalf {
    /// Core index the stage runs on.
    pub const fn core(self) -> usize {
        match self {
            RenderHalf::Remote => 0,
            RenderHalf::Local => 1,
        }
    }
}

/// Per-stage accumulation buffer.
///
/// Wider than the output format so that partial sums from many voices do
/// not clip before the engine's final volume and saturation step.
#[repr(C, align(4))]
pub struct MixBuffer {
    samples: [i32; BLOCK_SAMPLES],
}

impl MixBuffer {
    /// Create a silent buffer.
    pub const fn new() -> Self {
        MixBuffer {
            samples: [0; BLOCK_SAMPLES],
        }
    }

    /// Reset to silence.
    pub fn clear(&mut self) {
        self.samples.fill(0);
    }
}

impl Default for MixBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for MixBuffer {
    type Target = [i32; BLOCK_SAMPLES];

    fn deref(&self) -> &Self::Target {
        &self.samples
    }
}

impl DerefMut for MixBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.samples
    }
}

/// The synthesis engine as seen by the pipeline.
pub trait SynthEngine {
    /// State of one oscillator. Each render stage gets exclusive access to
    /// its own slice of voices, possibly on another core.
    type Voice: Send;

    /// Read-only per-period state shared by both render stages.
    type Context: Send + Sync;

    /// Opaque scheduled event.
    type Event;

    /// One-time start-up.
    fn initialize(&mut self, params: &EngineParams);

    /// Silence and reset every voice.
    fn reset_oscillators(&mut self, voices: &mut [Self::Voice]);

    /// Start a new period: apply due events to `voices`, advance the clock
    /// and capture the audio `input` block. Returns the context both stages
    /// render against.
    fn prepare_buffer(&mut self, voices: &mut [Self::Voice], input: &AudioBlock) -> Self::Context;

    /// Render `voices` (the pool slice starting at index `first`) into `mix`.
    ///
    /// `mix` has already been cleared by the caller. Must not fail and must
    /// not touch anything but its arguments.
    fn render_range(
        ctx: &Self::Context,
        voices: &mut [Self::Voice],
        first: usize,
        half: RenderHalf,
        mix: &mut MixBuffer,
    );

    /// Combine both stages' mixes (volume, filters, saturation) into the
    /// finished output block.
    fn fetch_finished_block(&mut self, mixes: [&MixBuffer; 2]) -> &AudioBlock;

    /// Schedule an event.
    fn submit_event(&mut self, event: Self::Event);

    /// Hand over one inbound text message, verbatim.
    fn ingest_message(&mut self, text: &str);
}
