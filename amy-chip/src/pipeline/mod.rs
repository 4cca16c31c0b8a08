//! The dual-core block pipeline.
//!
//! Once per cadence period the [`Coordinator`] reads one input block,
//! prepares the engine, renders half of the oscillators itself while the
//! [`RemoteRender`] stage renders the other half on the second core, waits at
//! the barrier, finalizes and writes one output block.
//!
//! ```text
//!  AWAIT_INPUT ─► PREPARE ─► DISPATCH_REMOTE ─► RENDER_LOCAL ─► AWAIT_REMOTE
//!       ▲                                                            │
//!       └──────────────────── OUTPUT ◄──────── FINALIZE ◄────────────┘
//! ```
//!
//! The I2S read blocks until a full input block has been captured, so the
//! codec clock alone paces the loop.

pub mod coordinator;
pub mod partition;
pub mod remote;

pub use coordinator::{Coordinator, PeriodReport, PipelineStats};
pub use partition::OscPartition;
pub use remote::RemoteRender;

#[cfg(test)]
pub(crate) mod testkit;
