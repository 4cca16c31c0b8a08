//! Render Stage A: the half of the oscillator pool rendered on the other core.
//!
//! The coordinator publishes a [`RenderJob`] (voice slice, mix buffer),
//! moves the period's context into the stage and signals `start`. The remote
//! core wakes, renders, and signals `done`. Nothing else is shared, and there
//! is no lock: ownership of the job and of the mix buffer ping-pongs between
//! the two cores with the notifications. The context stays here until the
//! next dispatch, so its address does not depend on where the coordinator
//! lives.
//!
//! Only one coordinator may drive a stage at a time:
//! [`Coordinator::new`](super::Coordinator::new) claims it.
//!
//! ```text
//! coordinator            RemoteRender                 remote core
//!   dispatch() ──job──►  [job] ──start.give()──►  run_once(): take start
//!                                                   render_range(job)
//!   wait_done() ◄──────  [mix] ◄──done.give()───   give done
//! ```

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

use log::trace;

use embedded_hal::delay::DelayNs;

use crate::engine::{MixBuffer, RenderHalf, SynthEngine};
use crate::sync::Notification;

/// What the remote stage renders next period.
///
/// Raw parts of the voice borrow the coordinator gave up for the duration of
/// the job.
struct RenderJob<E: SynthEngine> {
    voices: *mut E::Voice,
    len: usize,
    first: usize,
}

/// Render Stage A, shared between the coordinator and the remote core.
///
/// Place it in a `static` (or otherwise outlive both cores), run
/// [`run()`](Self::run) on the remote core and hand a reference to the
/// [`Coordinator`](super::Coordinator).
pub struct RemoteRender<E: SynthEngine> {
    start: Notification,
    done: Notification,
    claimed: AtomicBool,
    ctx: UnsafeCell<Option<E::Context>>,
    job: UnsafeCell<Option<RenderJob<E>>>,
    mix: UnsafeCell<MixBuffer>,
}

// SAFETY: `job` and `mix` are only accessed by whoever currently owns them.
// The coordinator owns both from construction until `start.give()`, the remote
// core owns both from `start.take()` until `done.give()`, and the pair of
// notifications orders every access across the hand-off. `ctx` is only
// replaced by the coordinator while nothing is in flight, and is otherwise
// only read from both sides. The voices sent across are `Send`, and the
// context is shared by reference and dropped by the coordinator, so
// `Send + Sync`. `claimed` keeps a second coordinator from dispatching into the same stage.
unsafe impl<E> Sync for RemoteRender<E>
where
    E: SynthEngine,
    E::Voice: Send,
    E::Context: Send + Sync,
{
}

impl<E: SynthEngine> RemoteRender<E> {
    pub const fn new() -> Self {
        RemoteRender {
            start: Notification::new(),
            done: Notification::new(),
            claimed: AtomicBool::new(false),
            ctx: UnsafeCell::new(None),
            job: UnsafeCell::new(None),
            mix: UnsafeCell::new(MixBuffer::new()),
        }
    }

    /// Take exclusive use of the stage. Returns `false` if another
    /// coordinator already holds it.
    pub(crate) fn claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Give the stage back. Only after the last job's `done` was consumed.
    pub(crate) fn release(&self) {
        self.claimed.store(false, Ordering::Release);
    }

    /// Store the period's context, publish a job and wake the remote core.
    ///
    /// Returns `true` if a start signal was already pending, which means the
    /// remote core missed a period and the two wakeups were coalesced.
    ///
    /// # Safety
    ///
    /// The caller must hold the claim and own the job slot and the mix buffer
    /// (no job in flight). No reference from [`context`](Self::context) may
    /// be alive. `voices` must stay alive and untouched until `done` has been
    /// consumed through one of the `wait_*` methods.
    pub(crate) unsafe fn dispatch(&self, ctx: E::Context, voices: &mut [E::Voice], first: usize) -> bool {
        // SAFETY: no job in flight, so the remote core is reading neither slot.
        unsafe {
            *self.ctx.get() = Some(ctx);
            *self.job.get() = Some(RenderJob {
                voices: voices.as_mut_ptr(),
                len: voices.len(),
                first,
            });
        }
        self.start.give()
    }

    /// Block until the remote stage reports done.
    pub(crate) fn wait_done(&self) {
        self.done.take();
    }

    /// Wait at most `timeout_us` for the remote stage.
    pub(crate) fn wait_done_within<D: DelayNs>(&self, delay: &mut D, timeout_us: u32, poll_us: u32) -> bool {
        self.done.take_within(delay, timeout_us, poll_us)
    }

    /// Consume a done signal if one is pending.
    pub(crate) fn try_done(&self) -> bool {
        self.done.try_take()
    }

    /// The context of the last dispatched job.
    ///
    /// # Safety
    ///
    /// The reference must be dropped before the next [`dispatch`](Self::dispatch).
    pub(crate) unsafe fn context(&self) -> Option<&E::Context> {
        // SAFETY: only `dispatch` writes the slot; the remote core only reads.
        unsafe { (*self.ctx.get()).as_ref() }
    }

    /// The remote stage's finished mix.
    ///
    /// # Safety
    ///
    /// Only between consuming `done` and the next [`dispatch`](Self::dispatch).
    pub(crate) unsafe fn mix(&self) -> &MixBuffer {
        // SAFETY: the remote core is idle and will not write until the next start.
        unsafe { &*self.mix.get() }
    }

    /// Wait for one start signal and render the published job.
    pub fn run_once(&self) {
        self.start.take();

        // SAFETY: `start` was consumed, so the coordinator has handed over the
        // job slot and the mix buffer until we give `done`.
        let (job, ctx, mix) = unsafe {
            ((*self.job.get()).take(), (*self.ctx.get()).as_ref(), &mut *self.mix.get())
        };

        if let (Some(job), Some(ctx)) = (job, ctx) {
            // SAFETY: `dispatch()`'s contract keeps the voice slice alive and
            // unaliased until `done` is consumed.
            let voices = unsafe { core::slice::from_raw_parts_mut(job.voices, job.len) };
            mix.clear();
            E::render_range(ctx, voices, job.first, RenderHalf::Remote, mix);
            trace!("remote: rendered {} voices from {}", job.len, job.first);
        }

        self.done.give();
    }

    /// Remote core entry point. Never returns.
    pub fn run(&self) -> ! {
        loop {
            self.run_once();
        }
    }
}

impl<E: SynthEngine> Default for RemoteRender<E> {
    fn default() -> Self {
        Self::new()
    }
}
