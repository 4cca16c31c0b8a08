//! Single-permit task notification.
//!
//! A [`Notification`] is a counting wakeup whose count saturates at one: a
//! `give()` while a permit is already pending is coalesced, never queued.
//! Exactly one context may wait on a given notification; any number may give.
//!
//! The permit is an `embassy_sync` [`Signal`] carrying no value, so the
//! pipeline can `give()` from one core and `take()` on the other.
//!
//! # Memory ordering
//!
//! Every `give()` and `take()` goes through the signal's critical section,
//! so every write the giver made before `give()` is visible to the taker after
//! `take()` returns. The render hand-off relies on this to pass the job
//! descriptor and the finished mix buffer between cores without a lock of
//! its own.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use embedded_hal::delay::DelayNs;

/// Single-permit wakeup shared between two execution contexts.
pub struct Notification {
    permit: Signal<CriticalSectionRawMutex, ()>,
}

impl Notification {
    /// Create a notification with no permit pending.
    pub const fn new() -> Self {
        Notification {
            permit: Signal::new(),
        }
    }

    /// Post the permit.
    ///
    /// Returns `true` if a permit was already pending, i.e. this signal was
    /// coalesced with an earlier one that has not been consumed yet. With
    /// several givers racing, more than one may report a fresh permit.
    pub fn give(&self) -> bool {
        // Whoever takes the pending permit first owns it, so a taker racing
        // this call sees either the old permit or the new one, never both.
        let coalesced = self.permit.try_take().is_some();
        self.permit.signal(());
        coalesced
    }

    /// Consume the permit if one is pending.
    pub fn try_take(&self) -> bool {
        self.permit.try_take().is_some()
    }

    /// Block until a permit is pending, then consume it.
    ///
    /// There is no deadline: if nobody ever gives, this never returns.
    pub fn take(&self) {
        while !self.try_take() {
            core::hint::spin_loop();
        }
    }

    /// Wait at most `timeout_us` for the permit, polling every `poll_us`.
    ///
    /// Returns `true` if the permit was consumed, `false` on timeout (the
    /// permit, if it arrives later, stays pending for the next call).
    pub fn take_within<D: DelayNs>(&self, delay: &mut D, timeout_us: u32, poll_us: u32) -> bool {
        let step = poll_us.max(1);
        let mut waited = 0u32;
        loop {
            if self.try_take() {
                return true;
            }
            if waited >= timeout_us {
                return false;
            }
            delay.delay_us(step);
            waited = waited.saturating_add(step);
        }
    }

    /// Whether a permit is currently pending (diagnostics only).
    pub fn is_pending(&self) -> bool {
        self.permit.signaled()
    }
}

impl Default for Notification {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::thread;

    struct MockDelay {
        elapsed_us: u32,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.elapsed_us += ns / 1_000;
        }
    }

    #[test]
    fn give_then_take() {
        let n = Notification::new();
        assert!(!n.is_pending());
        assert!(!n.give());
        assert!(n.is_pending());
        n.take();
        assert!(!n.is_pending());
    }

    #[test]
    fn try_take_without_permit() {
        let n = Notification::new();
        assert!(!n.try_take());
    }

    #[test]
    fn gives_coalesce_into_one_permit() {
        let n = Notification::new();
        assert!(!n.give());
        // Second give reports the pending permit and does not stack
        assert!(n.give());
        assert!(n.give());
        assert!(n.try_take());
        assert!(!n.try_take(), "only one permit may be pending");
    }

    #[test]
    fn take_within_times_out() {
        let n = Notification::new();
        let mut delay = MockDelay { elapsed_us: 0 };
        assert!(!n.take_within(&mut delay, 100, 10));
        assert_eq!(delay.elapsed_us, 100);
    }

    #[test]
    fn take_within_returns_pending_permit_immediately() {
        let n = Notification::new();
        n.give();
        let mut delay = MockDelay { elapsed_us: 0 };
        assert!(n.take_within(&mut delay, 100, 10));
        assert_eq!(delay.elapsed_us, 0);
    }

    #[test]
    fn zero_poll_step_still_progresses() {
        let n = Notification::new();
        let mut delay = MockDelay { elapsed_us: 0 };
        assert!(!n.take_within(&mut delay, 3, 0));
        assert_eq!(delay.elapsed_us, 3);
    }

    #[test]
    fn racing_gives_leave_one_permit() {
        let n = Notification::new();

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..250 {
                        n.give();
                    }
                });
            }
        });
        assert!(n.try_take());
        assert!(!n.try_take());
    }

    #[test]
    fn ping_pong_across_threads() {
        let ping = Notification::new();
        let pong = Notification::new();
        let counter = AtomicU32::new(0);

        thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..1000 {
                    ping.take();
                    counter.fetch_add(1, Ordering::Relaxed);
                    pong.give();
                }
            });
            for i in 0..1000 {
                ping.give();
                pong.take();
                // Write made before `pong.give()` is visible after `take()`
                assert_eq!(counter.load(Ordering::Relaxed), i + 1);
            }
        });
    }
}
