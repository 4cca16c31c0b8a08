//! Inbound text messages from the external controller (I2C slave).
//!
//! The bus driver calls [`ControlSink::on_receive`] from its receive
//! callback and [`respond`] from its request callback. Both must be quick:
//! the master is held with clock stretching while they run, so nothing here
//! blocks or parses beyond splitting at terminators.

use log::warn;

use crate::sync::MessageQueue;

/// Splits received bytes into messages and queues them for the engine.
///
/// A message ends at NUL or newline; empty pieces are ignored and the bytes
/// are otherwise forwarded verbatim.
pub struct ControlSink<'a, const N: usize> {
    queue: &'a MessageQueue<N>,
}

impl<'a, const N: usize> ControlSink<'a, N> {
    pub const fn new(queue: &'a MessageQueue<N>) -> Self {
        ControlSink { queue }
    }

    /// Handle one receive event. Returns how many messages were queued.
    pub fn on_receive(&self, data: &[u8]) -> usize {
        let mut queued = 0;
        for piece in data.split(|&b| b == 0 || b == b'\n') {
            let piece = piece.strip_suffix(b"\r").unwrap_or(piece);
            if piece.is_empty() {
                continue;
            }
            let text = match core::str::from_utf8(piece) {
                Ok(text) => text,
                Err(_) => {
                    warn!("control: dropped {} bytes of non-text message", piece.len());
                    continue;
                }
            };
            match self.queue.push(text) {
                Ok(()) => queued += 1,
                Err(e) => warn!("control: dropped message ({})", e),
            }
        }
        queued
    }
}

/// Fill `out` with the reply to a master read.
///
/// Echoes the pending command bytes if there are any, otherwise a single
/// `0x00`. Returns the reply length.
pub fn respond(cmd: &[u8], out: &mut [u8]) -> usize {
    if out.is_empty() {
        return 0;
    }
    if cmd.is_empty() {
        out[0] = 0x00;
        return 1;
    }
    let n = cmd.len().min(out.len());
    out[..n].copy_from_slice(&cmd[..n]);
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::String;
    use std::vec::Vec;

    fn drained<const N: usize>(q: &MessageQueue<N>) -> Vec<String> {
        let mut out = Vec::new();
        q.drain(|m| out.push(String::from(m)));
        out
    }

    #[test]
    fn single_message_without_terminator() {
        let q: MessageQueue<4> = MessageQueue::new();
        let sink = ControlSink::new(&q);
        assert_eq!(sink.on_receive(b"v0f440l1"), 1);
        assert_eq!(drained(&q), ["v0f440l1"]);
    }

    #[test]
    fn splits_on_nul_and_newline() {
        let q: MessageQueue<8> = MessageQueue::new();
        let sink = ControlSink::new(&q);
        assert_eq!(sink.on_receive(b"v0l1\0v1l0\nv2w3\r\n\0\0"), 3);
        assert_eq!(drained(&q), ["v0l1", "v1l0", "v2w3"]);
    }

    #[test]
    fn empty_receive_queues_nothing() {
        let q: MessageQueue<2> = MessageQueue::new();
        let sink = ControlSink::new(&q);
        assert_eq!(sink.on_receive(b""), 0);
        assert_eq!(sink.on_receive(b"\0"), 0);
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_drops_extra_messages() {
        let q: MessageQueue<2> = MessageQueue::new();
        let sink = ControlSink::new(&q);
        assert_eq!(sink.on_receive(b"a\nb\nc\n"), 2);
        assert_eq!(drained(&q), ["a", "b"]);
    }

    #[test]
    fn invalid_utf8_is_dropped_not_fatal() {
        let q: MessageQueue<4> = MessageQueue::new();
        let sink = ControlSink::new(&q);
        assert_eq!(sink.on_receive(b"\xff\xfe\nv0l1"), 1);
        assert_eq!(drained(&q), ["v0l1"]);
    }

    #[test]
    fn respond_echoes_command() {
        let mut out = [0xAAu8; 8];
        assert_eq!(respond(b"\x01\x02\x03", &mut out), 3);
        assert_eq!(&out[..3], &[1, 2, 3]);
    }

    #[test]
    fn respond_without_command_sends_one_zero() {
        let mut out = [0xAAu8; 8];
        assert_eq!(respond(&[], &mut out), 1);
        assert_eq!(out[0], 0x00);
    }

    #[test]
    fn respond_truncates_to_buffer() {
        let mut out = [0u8; 2];
        assert_eq!(respond(b"abcd", &mut out), 2);
        assert_eq!(&out, b"ab");
    }
}
