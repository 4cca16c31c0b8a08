//! Lock-protected queue of inbound control messages.
//!
//! Several producers (the I2C slave receive callback, a debug console, boot
//! code) may submit text at any time, while the coordinator drains the queue
//! once per period during PREPARE. The queue is guarded by a critical-section
//! mutex; the lock is only ever held for a single push or pop, never while
//! the engine consumes a message.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::{Deque, String};
use thiserror::Error;

use crate::constants::{MAX_MESSAGE_LEN, MESSAGE_QUEUE_DEPTH};

/// One inbound message, stored verbatim.
pub type Message = String<MAX_MESSAGE_LEN>;

/// Why a message was not queued.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    #[error("message queue is full")]
    Full,
    #[error("message longer than {} bytes", MAX_MESSAGE_LEN)]
    TooLong,
}

/// Bounded multi-producer, single-consumer message FIFO.
pub struct MessageQueue<const N: usize = MESSAGE_QUEUE_DEPTH> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Deque<Message, N>>>,
}

impl<const N: usize> MessageQueue<N> {
    pub const fn new() -> Self {
        MessageQueue {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Queue `text` for the engine. The text is copied as-is.
    pub fn push(&self, text: &str) -> Result<(), PushError> {
        let mut msg = Message::new();
        msg.push_str(text).map_err(|_| PushError::TooLong)?;
        self.inner
            .lock(|q| q.borrow_mut().push_back(msg))
            .map_err(|_| PushError::Full)
    }

    /// Pop the oldest message.
    pub fn pop(&self) -> Option<Message> {
        self.inner.lock(|q| q.borrow_mut().pop_front())
    }

    /// Hand every queued message to `f`, oldest first. Returns how many.
    ///
    /// Messages pushed while draining are delivered in the same call.
    pub fn drain(&self, mut f: impl FnMut(&str)) -> usize {
        let mut count = 0;
        while let Some(msg) = self.pop() {
            f(msg.as_str());
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|q| q.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for MessageQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::vec::Vec;

    #[test]
    fn fifo_order() {
        let q: MessageQueue<4> = MessageQueue::new();
        q.push("v0f440").unwrap();
        q.push("v1f220").unwrap();
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop().unwrap().as_str(), "v0f440");
        assert_eq!(q.pop().unwrap().as_str(), "v1f220");
        assert!(q.pop().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_rejects() {
        let q: MessageQueue<2> = MessageQueue::new();
        q.push("a").unwrap();
        q.push("b").unwrap();
        assert_eq!(q.push("c"), Err(PushError::Full));
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn oversize_message_rejected() {
        let q: MessageQueue<2> = MessageQueue::new();
        let long = [b'x'; MAX_MESSAGE_LEN + 1];
        let text = core::str::from_utf8(&long).unwrap();
        assert_eq!(q.push(text), Err(PushError::TooLong));
        assert!(q.is_empty());

        let exact = core::str::from_utf8(&long[..MAX_MESSAGE_LEN]).unwrap();
        q.push(exact).unwrap();
    }

    #[test]
    fn drain_delivers_all_in_order() {
        let q: MessageQueue<4> = MessageQueue::new();
        q.push("one").unwrap();
        q.push("two").unwrap();
        q.push("three").unwrap();

        let mut seen: Vec<std::string::String> = Vec::new();
        let n = q.drain(|m| seen.push(m.into()));
        assert_eq!(n, 3);
        assert_eq!(seen, ["one", "two", "three"]);
        assert!(q.is_empty());
    }

    #[test]
    fn concurrent_producers() {
        let q: MessageQueue<64> = MessageQueue::new();
        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..16 {
                        q.push("v0l1").unwrap();
                    }
                });
            }
        });
        assert_eq!(q.len(), 64);
        assert_eq!(q.drain(|m| assert_eq!(m, "v0l1")), 64);
    }
}
