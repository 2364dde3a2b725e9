//! Incremental receive-side framing state machine.
//!
//! ```text
//!          ┌──────────────── mismatch / bad length ───────────────┐
//!          v                                                      │
//!   ┌────────┐ full  ┌─────────┐   ┌─────────┐ len>0 ┌─────────┐  │
//!   │ Header │──────>│ Length1 │──>│ Length2 │──────>│ Payload │  │
//!   └────────┘       └─────────┘   └─────────┘       └─────────┘  │
//!       ^                               │ len==0          │ full  │
//!       │                               v                 v       │
//!       │      footer complete     ┌──────────────────────────┐   │
//!       └──────────────────────────│          Footer          │───┘
//!                                  └──────────────────────────┘
//! ```

use bytes::Bytes;

use crate::class::FrameClass;
use crate::error::{FrameError, Result};

/// Parse phase of a [`FrameDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Searching for (or partway through) the header signature.
    Header,
    /// Expecting the first length byte.
    Length1,
    /// Expecting the second length byte.
    Length2,
    /// Receiving payload bytes.
    Payload,
    /// Matching the footer signature.
    Footer,
}

/// Diagnostic counters. They never influence decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames completed.
    pub frames: u64,
    /// Partial header or footer matches abandoned on a mismatching byte.
    pub resyncs: u64,
    /// Frames rejected because the declared length reached capacity.
    pub oversized: u64,
}

/// Byte-at-a-time frame decoder for one frame class.
///
/// The receive buffer is allocated once at construction and reused for
/// every frame. Feeding bytes performs no allocation and no I/O.
#[derive(Debug)]
pub struct FrameDecoder {
    class: FrameClass,
    phase: Phase,
    /// Signature bytes matched so far in the header or footer phase.
    matched: usize,
    length_first: u8,
    len: usize,
    idx: usize,
    buf: Box<[u8]>,
    ready: bool,
    stats: DecoderStats,
}

impl FrameDecoder {
    /// Create a decoder bound to `class`.
    pub fn new(class: FrameClass) -> Self {
        Self {
            buf: vec![0u8; class.capacity()].into_boxed_slice(),
            class,
            phase: Phase::Header,
            matched: 0,
            length_first: 0,
            len: 0,
            idx: 0,
            ready: false,
            stats: DecoderStats::default(),
        }
    }

    /// Feed one byte.
    ///
    /// Returns `true` if and only if this byte completed a valid frame. The
    /// payload must then be retrieved with [`payload`](Self::payload) or
    /// [`take_payload`](Self::take_payload) before the next byte is fed.
    pub fn process_byte(&mut self, byte: u8) -> bool {
        if self.ready {
            self.ready = false;
            self.len = 0;
            self.idx = 0;
        }

        match self.phase {
            Phase::Header => self.match_header(byte),
            Phase::Length1 => {
                self.length_first = byte;
                self.phase = Phase::Length2;
            }
            Phase::Length2 => {
                let len = usize::from(
                    self.class
                        .length_order()
                        .decode_u16([self.length_first, byte]),
                );
                if len >= self.class.capacity() {
                    self.stats.oversized = self.stats.oversized.saturating_add(1);
                    tracing::trace!(
                        class = self.class.name(),
                        len,
                        capacity = self.class.capacity(),
                        "declared length rejected"
                    );
                    self.reset();
                } else {
                    self.len = len;
                    self.idx = 0;
                    self.matched = 0;
                    self.phase = if len == 0 {
                        Phase::Footer
                    } else {
                        Phase::Payload
                    };
                }
            }
            Phase::Payload => {
                if self.idx >= self.len {
                    self.reset();
                    return false;
                }
                match self.buf.get_mut(self.idx) {
                    Some(slot) => *slot = byte,
                    None => {
                        self.reset();
                        return false;
                    }
                }
                self.idx += 1;
                if self.idx == self.len {
                    self.matched = 0;
                    self.phase = Phase::Footer;
                }
            }
            Phase::Footer => return self.match_footer(byte),
        }
        false
    }

    /// Feed bytes until one completes a frame.
    ///
    /// Returns the number of bytes consumed (including the completing byte),
    /// or `None` if every byte was consumed without completing a frame.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<usize> {
        bytes
            .iter()
            .position(|&byte| self.process_byte(byte))
            .map(|pos| pos + 1)
    }

    /// Return to the header search phase, discarding any partial frame.
    pub fn reset(&mut self) {
        self.phase = Phase::Header;
        self.matched = 0;
        self.length_first = 0;
        self.len = 0;
        self.idx = 0;
        self.ready = false;
    }

    /// Borrow the payload of the frame completed by the last byte.
    ///
    /// Fails with [`FrameError::NoFrameReady`] unless the most recent
    /// [`process_byte`](Self::process_byte) returned `true`.
    pub fn payload(&self) -> Result<&[u8]> {
        if !self.ready {
            return Err(FrameError::NoFrameReady);
        }
        self.buf.get(..self.len).ok_or(FrameError::NoFrameReady)
    }

    /// Copy out the payload of the frame completed by the last byte.
    pub fn take_payload(&self) -> Result<Bytes> {
        self.payload().map(Bytes::copy_from_slice)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn class(&self) -> &FrameClass {
        &self.class
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    fn match_header(&mut self, byte: u8) {
        let header = *self.class.header();
        let matched = header.step(self.matched, byte);
        if matched <= self.matched && self.matched > 0 {
            self.stats.resyncs = self.stats.resyncs.saturating_add(1);
            tracing::trace!(class = self.class.name(), byte, "header match restarted");
        }
        if matched == header.len() {
            self.matched = 0;
            self.phase = Phase::Length1;
        } else {
            self.matched = matched;
        }
    }

    fn match_footer(&mut self, byte: u8) -> bool {
        let footer = *self.class.footer();
        if footer.as_bytes().get(self.matched) != Some(&byte) {
            self.stats.resyncs = self.stats.resyncs.saturating_add(1);
            tracing::trace!(class = self.class.name(), byte, "footer mismatch");
            self.reset();
            // The offending byte may open the next frame.
            self.match_header(byte);
            return false;
        }

        self.matched += 1;
        if self.matched < footer.len() {
            return false;
        }

        self.matched = 0;
        self.phase = Phase::Header;
        self.ready = true;
        self.stats.frames = self.stats.frames.saturating_add(1);
        tracing::trace!(class = self.class.name(), len = self.len, "frame complete");
        true
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;
    use crate::class::ByteOrder;
    use crate::encoder::{build_command, encode_frame};

    const ENABLE_CONFIG_FRAME: [u8; 12] = [
        0xFD, 0xFC, 0xFB, 0xFA, 0x02, 0x00, 0xFF, 0x00, 0x04, 0x03, 0x02, 0x01,
    ];

    fn feed_all(decoder: &mut FrameDecoder, bytes: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        for &byte in bytes {
            if decoder.process_byte(byte) {
                frames.push(decoder.payload().unwrap().to_vec());
            }
        }
        frames
    }

    #[test]
    fn completes_only_on_last_footer_byte() {
        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        for (i, &byte) in ENABLE_CONFIG_FRAME.iter().enumerate() {
            let done = decoder.process_byte(byte);
            assert_eq!(done, i == ENABLE_CONFIG_FRAME.len() - 1, "byte {i}");
        }
        assert_eq!(decoder.payload().unwrap(), &[0xFF, 0x00]);
        assert_eq!(decoder.take_payload().unwrap().as_ref(), &[0xFF, 0x00]);
        assert_eq!(decoder.phase(), Phase::Header);
        assert_eq!(decoder.stats().frames, 1);
    }

    #[test]
    fn roundtrip_with_encoder() {
        let mut wire = [0u8; 64];
        let data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05];
        let n = build_command(&mut wire, 0x0064, &data).unwrap();

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        let frames = feed_all(&mut decoder, &wire[..n]);
        assert_eq!(frames, vec![vec![0x64, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04, 0x05]]);
    }

    #[test]
    fn roundtrip_largest_accepted_payload() {
        let class = FrameClass::COMMAND_ACK;
        let data: Vec<u8> = (0..(class.capacity() - 3) as u8).collect();
        let mut wire = [0u8; 128];
        let n = build_command(&mut wire, 0x0061, &data).unwrap();

        let mut decoder = FrameDecoder::new(class);
        let frames = feed_all(&mut decoder, &wire[..n]);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].len(), class.capacity() - 1);
        assert_eq!(&frames[0][2..], data.as_slice());
    }

    #[test]
    fn declared_length_equal_to_capacity_is_rejected() {
        let class = FrameClass::COMMAND_ACK;
        let data = vec![0u8; class.capacity() - 2];
        let mut wire = [0u8; 128];
        let n = build_command(&mut wire, 0x0061, &data).unwrap();
        assert_eq!(wire[4] as usize, class.capacity());

        let mut decoder = FrameDecoder::new(class);
        assert!(feed_all(&mut decoder, &wire[..n]).is_empty());
        assert_eq!(decoder.stats().oversized, 1);
    }

    #[test]
    fn noise_never_completes() {
        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        let mut seed = 0x1234_5678u32;
        for _ in 0..10_000 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            // Never emit 0xFD so the header can never match.
            let byte = match (seed & 0xFF) as u8 {
                0xFD => 0x00,
                other => other,
            };
            assert!(!decoder.process_byte(byte));
            assert_eq!(decoder.phase(), Phase::Header);
        }
        assert!(decoder.payload().is_err());
    }

    #[test]
    fn header_bytes_in_noise_do_not_block_sync() {
        let mut stream = vec![0xFD, 0xFD, 0xFC, 0xFD, 0xFC, 0xFB, 0x00, 0xFA, 0xFD];
        stream.extend_from_slice(&ENABLE_CONFIG_FRAME);

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        let frames = feed_all(&mut decoder, &stream);
        assert_eq!(frames, vec![vec![0xFF, 0x00]]);
    }

    #[test]
    fn repeated_first_header_byte_resyncs() {
        let mut stream = vec![0xFD, 0xFD, 0xFD];
        stream.extend_from_slice(&ENABLE_CONFIG_FRAME[1..]);

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        assert_eq!(feed_all(&mut decoder, &stream), vec![vec![0xFF, 0x00]]);
    }

    #[test]
    fn zero_length_payload_skips_payload_phase() {
        let wire = [
            0xF4, 0xF3, 0xF2, 0xF1, 0x00, 0x00, 0xF8, 0xF7, 0xF6, 0xF5,
        ];
        let mut decoder = FrameDecoder::new(FrameClass::REPORT);
        for &byte in &wire[..6] {
            assert!(!decoder.process_byte(byte));
        }
        assert_eq!(decoder.phase(), Phase::Footer);
        let done: Vec<bool> = wire[6..].iter().map(|&b| decoder.process_byte(b)).collect();
        assert_eq!(done, vec![false, false, false, true]);
        assert!(decoder.payload().unwrap().is_empty());
    }

    #[test]
    fn oversized_length_is_rejected_without_payload_phase() {
        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        for byte in [0xFD, 0xFC, 0xFB, 0xFA, 0x40] {
            decoder.process_byte(byte);
        }
        assert_eq!(decoder.phase(), Phase::Length2);
        // 0x0040 == capacity: invalid.
        assert!(!decoder.process_byte(0x00));
        assert_eq!(decoder.phase(), Phase::Header);
        assert_eq!(decoder.stats().oversized, 1);

        // The very next byte is a header candidate.
        let frames = feed_all(&mut decoder, &ENABLE_CONFIG_FRAME);
        assert_eq!(frames, vec![vec![0xFF, 0x00]]);
    }

    #[test]
    fn length_just_below_capacity_is_accepted() {
        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        for byte in [0xFD, 0xFC, 0xFB, 0xFA, 0x3F, 0x00] {
            decoder.process_byte(byte);
        }
        assert_eq!(decoder.phase(), Phase::Payload);
    }

    #[test]
    fn high_length_byte_is_honoured() {
        // 0x0100 little-endian must be 256, not 0 or 1.
        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        for byte in [0xFD, 0xFC, 0xFB, 0xFA, 0x00, 0x01] {
            decoder.process_byte(byte);
        }
        assert_eq!(decoder.phase(), Phase::Header);
        assert_eq!(decoder.stats().oversized, 1);
    }

    #[test]
    fn footer_mismatch_resets_and_rescans_byte() {
        let mut stream = vec![0xFD, 0xFC, 0xFB, 0xFA, 0x02, 0x00, 0xAA, 0xBB, 0x04, 0x03];
        // Truncated footer immediately followed by a new frame.
        stream.extend_from_slice(&ENABLE_CONFIG_FRAME);

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        let frames = feed_all(&mut decoder, &stream);
        assert_eq!(frames, vec![vec![0xFF, 0x00]]);
        assert_eq!(decoder.stats().resyncs, 1);
    }

    #[test]
    fn payload_bytes_may_look_like_signatures() {
        let mut wire = BytesMut::new();
        let payload = [0x04, 0x03, 0x02, 0x01, 0xFD, 0xFC, 0xFB, 0xFA];
        encode_frame(&FrameClass::COMMAND_ACK, &payload, &mut wire).unwrap();

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        assert_eq!(feed_all(&mut decoder, &wire), vec![payload.to_vec()]);
    }

    #[test]
    fn reset_mid_payload_leaves_no_residue() {
        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        for byte in [0xFD, 0xFC, 0xFB, 0xFA, 0x08, 0x00, 0x11, 0x22, 0x33] {
            assert!(!decoder.process_byte(byte));
        }
        assert_eq!(decoder.phase(), Phase::Payload);

        decoder.reset();
        assert_eq!(decoder.phase(), Phase::Header);

        let frames = feed_all(&mut decoder, &ENABLE_CONFIG_FRAME);
        assert_eq!(frames, vec![vec![0xFF, 0x00]]);
    }

    #[test]
    fn payload_requires_completed_frame() {
        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        assert!(matches!(decoder.payload(), Err(FrameError::NoFrameReady)));

        for &byte in &ENABLE_CONFIG_FRAME {
            decoder.process_byte(byte);
        }
        assert!(decoder.payload().is_ok());

        // Any further byte invalidates the previous payload.
        decoder.process_byte(0x00);
        assert!(matches!(decoder.take_payload(), Err(FrameError::NoFrameReady)));

        for &byte in &ENABLE_CONFIG_FRAME {
            decoder.process_byte(byte);
        }
        decoder.reset();
        assert!(matches!(decoder.payload(), Err(FrameError::NoFrameReady)));
    }

    #[test]
    fn back_to_back_frames() {
        let mut stream = ENABLE_CONFIG_FRAME.to_vec();
        stream.extend_from_slice(&ENABLE_CONFIG_FRAME);
        stream.extend_from_slice(&ENABLE_CONFIG_FRAME);

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        assert_eq!(feed_all(&mut decoder, &stream).len(), 3);
        assert_eq!(decoder.stats().frames, 3);
    }

    #[test]
    fn feed_reports_consumed_bytes() {
        let mut stream = vec![0x00, 0x01];
        stream.extend_from_slice(&ENABLE_CONFIG_FRAME);
        stream.extend_from_slice(&[0xFD, 0xFC]);

        let mut decoder = FrameDecoder::new(FrameClass::COMMAND_ACK);
        assert_eq!(decoder.feed(&stream), Some(14));
        assert_eq!(decoder.payload().unwrap(), &[0xFF, 0x00]);
        assert_eq!(decoder.feed(&stream[14..]), None);
    }

    #[test]
    fn report_class_ignores_ack_frames() {
        let mut decoder = FrameDecoder::new(FrameClass::REPORT);
        assert!(feed_all(&mut decoder, &ENABLE_CONFIG_FRAME).is_empty());
    }

    #[test]
    fn big_endian_custom_class() {
        let class =
            FrameClass::custom("be", &[0x55, 0xA5], &[0x5A, 0xAA], ByteOrder::Big, 32).unwrap();
        let wire = [0x55, 0xA5, 0x00, 0x03, 0x01, 0x02, 0x03, 0x5A, 0xAA];

        let mut decoder = FrameDecoder::new(class);
        assert_eq!(feed_all(&mut decoder, &wire), vec![vec![0x01, 0x02, 0x03]]);
    }

    #[test]
    fn self_overlapping_header_resyncs() {
        let class =
            FrameClass::custom("aab", &[0xAA, 0xAA, 0xBB], &[0xCC, 0xCC, 0xDD], ByteOrder::Little, 16)
                .unwrap();
        let wire = [
            0xAA, 0xAA, 0xAA, 0xBB, 0x01, 0x00, 0x42, 0xCC, 0xCC, 0xDD,
        ];

        let mut decoder = FrameDecoder::new(class);
        assert_eq!(feed_all(&mut decoder, &wire), vec![vec![0x42]]);
    }
}
