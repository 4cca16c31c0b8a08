//! # amy-chip
//!
//! A `no_std` runtime for the AMY synthesizer chip: an ESP32-S3 that renders
//! AMY on both cores and streams the result to a WM8960 codec over I2S, with
//! a PCM9211 receiver for digital input and an I2C slave port for control.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Engine | [`engine`] | [`SynthEngine`](engine::SynthEngine) trait, mix buffers |
//! | Pipeline | [`pipeline`] | Coordinator, remote render stage, oscillator partition |
//! | Sync | [`sync`] | Cross-core notifications, inbound message queue |
//! | I/O | [`io`] | I2S frame transport |
//! | Control | [`control`] | I2C slave text channel, codec bring-up trait |
//! | Codec | [`codec`] | WM8960 and PCM9211 drivers (feature-gated) |
//! | Synth | [`synth`] | `SineBank` reference engine (feature-gated) |
//! | Boot | [`boot`] | Logged, non-aborting start-up steps |
//!
//! ## Quick start
//!
//! ```ignore
//! use amy_chip::pipeline::{Coordinator, RemoteRender};
//! use amy_chip::synth::{Oscillator, SineBank, ToneEvent};
//!
//! static REMOTE: RemoteRender<SineBank> = RemoteRender::new();
//!
//! // Core 0:
//! REMOTE.run();
//!
//! // Core 1:
//! let mut c = Coordinator::new(SineBank::new(), &mut voices, &REMOTE,
//!                              transport, delay, config.pipeline)?;
//! c.initialize_engine(&config.engine);
//! c.submit_event(ToneEvent::sine(0, 440.0, 1.0));
//! c.run();
//! ```
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `wm8960` | yes | WM8960 codec driver |
//! | `pcm9211` | yes | PCM9211 receiver driver |
//! | `sine-bank` | yes | [`synth::SineBank`] reference engine |
//!
//! ## Audio parameters
//!
//! - **Block size:** 256 frames of 2 channels ([`constants::AMY_BLOCK_SIZE`])
//! - **Sample rate:** 44 100 Hz ([`constants::AMY_SAMPLE_RATE`])
//! - **Sample format:** `i16`, interleaved `L R`
//! - **Oscillators:** 120, split evenly between the cores ([`constants::AMY_OSCS`])

#![no_std]

#[cfg(test)]
extern crate std;

pub mod boot;
pub mod config;
pub mod constants;
pub mod control;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod sync;

#[cfg(any(feature = "wm8960", feature = "pcm9211"))]
pub mod codec;

#[cfg(feature = "sine-bank")]
pub mod synth;
