//! Wire protocol for the UTR telemetry network
//!
//! Every datagram on the network is a fixed 60-byte frame carrying
//! zero-terminated UTF-8 text. There is no header, no length prefix and no
//! checksum; classification is purely textual.
//!
//! # Message Shapes
//!
//! | Text | Variant | Direction | Handling |
//! |------|---------|-----------|----------|
//! | `NEW UTR` | [`Message::Register`] | UTR → historian | Unicast `ASSIGNED UTR #<n>` reply |
//! | `UTR #...` | [`Message::Status`] | UTR → historian | Logged, no reply |
//! | `HELLO?` | [`Message::Probe`] | historian → network | Liveness probe, never replied to |
//! | anything else | [`Message::Raw`] | operator → network | Relayed free text, ignored on receive |
//!
//! # Frame Layout
//!
//! ```text
//! ┌─────────────────────────────┬──────────────────────┐
//! │ UTF-8 text (≤ 59 bytes)     │ Zero padding         │
//! │ terminated by first 0 byte  │ to 60 bytes total    │
//! └─────────────────────────────┴──────────────────────┘
//! ```
//!
//! # Decoding Semantics
//!
//! The text window of an inbound datagram runs up to its first zero byte. A
//! datagram shorter than [`FRAME_LEN`] with no zero byte is treated as
//! terminated at its end (senders receive into zeroed buffers, so the two are
//! indistinguishable on the wire). A full 60-byte window with no terminator,
//! or a window that is not valid UTF-8, decodes to [`Message::Raw`] rather
//! than an error: unrecognized traffic is dropped, never rejected.

/// Fixed size of every datagram on the wire
pub const FRAME_LEN: usize = 60;

/// Registration request sent by a unit on first contact
pub const REGISTER_REQUEST: &str = "NEW UTR";

/// Prefix of a unit status report
pub const STATUS_PREFIX: &str = "UTR #";

/// Liveness probe payload broadcast by the keepalive loop
pub const PROBE: &str = "HELLO?";

/// Console line that requests shutdown (line terminator included, as read)
pub const SHUTDOWN_COMMAND: &str = "END\n";

/// A classified inbound datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Registration request (`NEW UTR`)
    Register,
    /// Unit status report (`UTR #...`), text preserved verbatim
    Status(String),
    /// Liveness probe (`HELLO?`); the historian hears its own broadcasts
    Probe,
    /// Anything else: operator free text, garbled or unterminated frames
    Raw(String),
}

impl Message {
    /// Decode a received datagram. Never fails; unrecognized content lands in
    /// [`Message::Raw`].
    pub fn decode(datagram: &[u8]) -> Self {
        let window = &datagram[..datagram.len().min(FRAME_LEN)];

        let text = match window.iter().position(|&b| b == 0) {
            Some(n) => &window[..n],
            // Short datagrams land in a zeroed receive buffer, so the
            // datagram end acts as the terminator.
            None if window.len() < FRAME_LEN => window,
            // Full window with no terminator: contents are unreliable.
            None => return Message::Raw(String::from_utf8_lossy(window).into_owned()),
        };

        match std::str::from_utf8(text) {
            Ok(REGISTER_REQUEST) => Message::Register,
            Ok(PROBE) => Message::Probe,
            Ok(t) if t.starts_with(STATUS_PREFIX) => Message::Status(t.to_string()),
            Ok(t) => Message::Raw(t.to_string()),
            Err(_) => Message::Raw(String::from_utf8_lossy(text).into_owned()),
        }
    }
}

/// Build an outbound frame: text truncated to 59 bytes, zero-padded to 60.
pub fn encode_frame(text: &str) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    let bytes = text.as_bytes();
    let len = bytes.len().min(FRAME_LEN - 1);
    frame[..len].copy_from_slice(&bytes[..len]);
    frame
}

/// Reply text for the n-th registration
pub fn assignment_reply(unit_id: u32) -> String {
    format!("ASSIGNED UTR #{}", unit_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_register_request() {
        let frame = encode_frame("NEW UTR");
        assert_eq!(Message::decode(&frame), Message::Register);
    }

    #[test]
    fn test_decode_status_report() {
        let frame = encode_frame("UTR #3 TEMP 22");
        assert_eq!(
            Message::decode(&frame),
            Message::Status("UTR #3 TEMP 22".to_string())
        );
    }

    #[test]
    fn test_decode_probe() {
        let frame = encode_frame("HELLO?");
        assert_eq!(Message::decode(&frame), Message::Probe);
    }

    #[test]
    fn test_decode_free_text() {
        let frame = encode_frame("WATER NOW\n");
        assert_eq!(
            Message::decode(&frame),
            Message::Raw("WATER NOW\n".to_string())
        );
    }

    #[test]
    fn test_console_register_text_is_not_a_request() {
        // An operator typing "NEW UTR" broadcasts "NEW UTR\n"; the line
        // terminator keeps it from matching the exact registration text.
        let frame = encode_frame("NEW UTR\n");
        assert_eq!(
            Message::decode(&frame),
            Message::Raw("NEW UTR\n".to_string())
        );
    }

    #[test]
    fn test_short_datagram_terminates_at_end() {
        // A 7-byte datagram with no zero byte decodes as if terminated.
        assert_eq!(Message::decode(b"NEW UTR"), Message::Register);
        assert_eq!(
            Message::decode(b"UTR #1"),
            Message::Status("UTR #1".to_string())
        );
    }

    #[test]
    fn test_full_window_without_terminator_is_raw() {
        let frame = [b'A'; FRAME_LEN];
        match Message::decode(&frame) {
            Message::Raw(text) => assert_eq!(text.len(), FRAME_LEN),
            other => panic!("expected Raw, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_datagram_is_clamped_to_window() {
        // Only the first 60 bytes are considered.
        let mut datagram = vec![0u8; 200];
        datagram[..7].copy_from_slice(b"NEW UTR");
        assert_eq!(Message::decode(&datagram), Message::Register);
    }

    #[test]
    fn test_invalid_utf8_is_raw() {
        let datagram = [0xFF, 0xFE, 0x41, 0x00];
        match Message::decode(&datagram) {
            Message::Raw(_) => {}
            other => panic!("expected Raw, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_datagram_is_raw() {
        assert_eq!(Message::decode(&[]), Message::Raw(String::new()));
    }

    #[test]
    fn test_encode_pads_to_frame_len() {
        let frame = encode_frame("HELLO?");
        assert_eq!(frame.len(), FRAME_LEN);
        assert_eq!(&frame[..6], b"HELLO?");
        assert!(frame[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_truncates_and_keeps_terminator() {
        let long = "X".repeat(100);
        let frame = encode_frame(&long);
        assert_eq!(frame.len(), FRAME_LEN);
        assert!(frame[..FRAME_LEN - 1].iter().all(|&b| b == b'X'));
        // Last byte always stays zero so the frame remains terminated.
        assert_eq!(frame[FRAME_LEN - 1], 0);
    }

    #[test]
    fn test_assignment_reply_format() {
        assert_eq!(assignment_reply(1), "ASSIGNED UTR #1");
        assert_eq!(assignment_reply(42), "ASSIGNED UTR #42");
    }
}
