//! Cross-core signalling.
//!
//! | Primitive | Direction | Purpose |
//! |-----------|-----------|---------|
//! | [`Notification`] | one context → one context | Single-permit wakeup (render trigger, render done) |
//! | [`MessageQueue`] | many producers → coordinator | Inbound control messages for the engine |

pub mod message_queue;
pub mod notify;

pub use message_queue::{Message, MessageQueue};
pub use notify::Notification;
