//! Frame class configuration: header/footer signatures, length byte order
//! and receive capacity.
//!
//! Known device classes:
//!
//! ```text
//! ┌─────────────┬──────────────┬─────────────┬──────────────┬──────────┐
//! │ Class       │ Header       │ Length      │ Footer       │ Capacity │
//! ├─────────────┼──────────────┼─────────────┼──────────────┼──────────┤
//! │ command/ack │ FD FC FB FA  │ 2B LE       │ 04 03 02 01  │ 64       │
//! │ report      │ F4 F3 F2 F1  │ 2B LE       │ F8 F7 F6 F5  │ 64       │
//! └─────────────┴──────────────┴─────────────┴──────────────┴──────────┘
//! ```

use bytes::BufMut;

use crate::error::{FrameError, Result};

/// Shortest accepted header/footer signature.
pub const MIN_SIGNATURE_LEN: usize = 2;

/// Longest accepted header/footer signature.
pub const MAX_SIGNATURE_LEN: usize = 4;

/// Largest receive buffer a frame class may declare.
pub const MAX_CAPACITY: usize = 1024;

/// Receive buffer capacity of the known device classes.
pub const DEFAULT_CAPACITY: usize = 64;

/// Byte order of the 16-bit length and command word fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Serialize a 16-bit value in this byte order.
    pub const fn encode_u16(self, value: u16) -> [u8; 2] {
        match self {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        }
    }

    /// Deserialize a 16-bit value in this byte order.
    pub const fn decode_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            ByteOrder::Little => u16::from_le_bytes(bytes),
            ByteOrder::Big => u16::from_be_bytes(bytes),
        }
    }

    pub(crate) fn put_u16<B: BufMut>(self, dst: &mut B, value: u16) {
        match self {
            ByteOrder::Little => dst.put_u16_le(value),
            ByteOrder::Big => dst.put_u16(value),
        }
    }
}

/// A fixed 2-4 byte framing signature with its precomputed fallback table.
///
/// `fallback[i]` is the length of the longest proper prefix of
/// `bytes[..=i]` that is also a suffix of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    bytes: [u8; MAX_SIGNATURE_LEN],
    fallback: [u8; MAX_SIGNATURE_LEN],
    len: u8,
}

impl Signature {
    /// Callers guarantee `MIN_SIGNATURE_LEN <= src.len() <= MAX_SIGNATURE_LEN`.
    const fn new(src: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_SIGNATURE_LEN];
        let mut i = 0;
        while i < src.len() {
            bytes[i] = src[i];
            i += 1;
        }

        let mut fallback = [0u8; MAX_SIGNATURE_LEN];
        let mut k = 0usize;
        let mut i = 1;
        while i < src.len() {
            while k > 0 && src[i] != src[k] {
                k = fallback[k - 1] as usize;
            }
            if src[i] == src[k] {
                k += 1;
            }
            fallback[i] = k as u8;
            i += 1;
        }

        Self {
            bytes,
            fallback,
            len: src.len() as u8,
        }
    }

    /// The signature bytes in wire order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len()]
    }

    /// Number of bytes in the signature.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Advance a partial match of `matched` bytes by one input byte.
    ///
    /// Returns the new number of matched bytes. On mismatch the byte is
    /// re-tested against every shorter prefix that could still be in
    /// progress, so overlapping noise never hides a real signature start.
    /// `matched` must be below `len()`.
    pub(crate) fn step(&self, mut matched: usize, byte: u8) -> usize {
        loop {
            if self.bytes[matched] == byte {
                return matched + 1;
            }
            if matched == 0 {
                return 0;
            }
            matched = self.fallback[matched - 1] as usize;
        }
    }
}

/// Configuration of one frame class.
///
/// A decoder instance is bound to exactly one class for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameClass {
    name: &'static str,
    header: Signature,
    footer: Signature,
    length_order: ByteOrder,
    capacity: usize,
}

impl FrameClass {
    /// Command and acknowledgement frames.
    pub const COMMAND_ACK: FrameClass = FrameClass {
        name: "ack",
        header: Signature::new(&[0xFD, 0xFC, 0xFB, 0xFA]),
        footer: Signature::new(&[0x04, 0x03, 0x02, 0x01]),
        length_order: ByteOrder::Little,
        capacity: DEFAULT_CAPACITY,
    };

    /// Periodic target report frames.
    pub const REPORT: FrameClass = FrameClass {
        name: "report",
        header: Signature::new(&[0xF4, 0xF3, 0xF2, 0xF1]),
        footer: Signature::new(&[0xF8, 0xF7, 0xF6, 0xF5]),
        length_order: ByteOrder::Little,
        capacity: DEFAULT_CAPACITY,
    };

    /// Define a custom frame class.
    ///
    /// Header and footer must be 2-4 bytes long and of equal length;
    /// capacity must be in `1..=MAX_CAPACITY`.
    pub fn custom(
        name: &'static str,
        header: &[u8],
        footer: &[u8],
        length_order: ByteOrder,
        capacity: usize,
    ) -> Result<Self> {
        for (what, sig) in [("header", header), ("footer", footer)] {
            if !(MIN_SIGNATURE_LEN..=MAX_SIGNATURE_LEN).contains(&sig.len()) {
                return Err(FrameError::InvalidClass(format!(
                    "{name}: {what} must be {MIN_SIGNATURE_LEN}-{MAX_SIGNATURE_LEN} bytes, got {}",
                    sig.len()
                )));
            }
        }
        if header.len() != footer.len() {
            return Err(FrameError::InvalidClass(format!(
                "{name}: header ({}) and footer ({}) lengths differ",
                header.len(),
                footer.len()
            )));
        }
        if capacity == 0 || capacity > MAX_CAPACITY {
            return Err(FrameError::InvalidClass(format!(
                "{name}: capacity must be 1-{MAX_CAPACITY}, got {capacity}"
            )));
        }

        Ok(Self {
            name,
            header: Signature::new(header),
            footer: Signature::new(footer),
            length_order,
            capacity,
        })
    }

    /// Look up a predefined class by name (`ack`, `command` or `report`).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ack" | "command" => Some(Self::COMMAND_ACK),
            "report" => Some(Self::REPORT),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn header(&self) -> &Signature {
        &self.header
    }

    pub fn footer(&self) -> &Signature {
        &self.footer
    }

    pub fn length_order(&self) -> ByteOrder {
        self.length_order
    }

    /// Receive buffer size. Declared lengths must be strictly below it.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Framing bytes around the payload: header + length field + footer.
    pub fn wire_overhead(&self) -> usize {
        self.header.len() + 2 + self.footer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predefined_classes_expose_wire_signatures() {
        let ack = FrameClass::COMMAND_ACK;
        assert_eq!(ack.header().as_bytes(), &[0xFD, 0xFC, 0xFB, 0xFA]);
        assert_eq!(ack.footer().as_bytes(), &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(ack.capacity(), 64);
        assert_eq!(ack.wire_overhead(), 10);

        let report = FrameClass::REPORT;
        assert_eq!(report.header().as_bytes(), &[0xF4, 0xF3, 0xF2, 0xF1]);
        assert_eq!(report.footer().as_bytes(), &[0xF8, 0xF7, 0xF6, 0xF5]);
        assert_eq!(report.length_order(), ByteOrder::Little);
    }

    #[test]
    fn by_name_lookup() {
        assert_eq!(FrameClass::by_name("ack"), Some(FrameClass::COMMAND_ACK));
        assert_eq!(FrameClass::by_name("Command"), Some(FrameClass::COMMAND_ACK));
        assert_eq!(FrameClass::by_name("report"), Some(FrameClass::REPORT));
        assert!(FrameClass::by_name("55a5").is_none());
    }

    #[test]
    fn custom_class_validation() {
        let ok = FrameClass::custom("short", &[0x55, 0xA5], &[0x5A, 0xAA], ByteOrder::Big, 32);
        assert!(ok.is_ok());

        let one_byte = FrameClass::custom("x", &[0x55], &[0xAA], ByteOrder::Little, 32);
        assert!(matches!(one_byte, Err(FrameError::InvalidClass(_))));

        let mismatched =
            FrameClass::custom("x", &[1, 2, 3], &[4, 5], ByteOrder::Little, 32);
        assert!(matches!(mismatched, Err(FrameError::InvalidClass(_))));

        let zero_cap = FrameClass::custom("x", &[1, 2], &[3, 4], ByteOrder::Little, 0);
        assert!(matches!(zero_cap, Err(FrameError::InvalidClass(_))));

        let huge = FrameClass::custom("x", &[1, 2], &[3, 4], ByteOrder::Little, MAX_CAPACITY + 1);
        assert!(matches!(huge, Err(FrameError::InvalidClass(_))));
    }

    #[test]
    fn byte_order_conversions() {
        assert_eq!(ByteOrder::Little.encode_u16(0x1234), [0x34, 0x12]);
        assert_eq!(ByteOrder::Big.encode_u16(0x1234), [0x12, 0x34]);
        assert_eq!(ByteOrder::Little.decode_u16([0x34, 0x12]), 0x1234);
        assert_eq!(ByteOrder::Big.decode_u16([0x12, 0x34]), 0x1234);
    }

    #[test]
    fn step_without_self_overlap_retests_first_byte() {
        let sig = *FrameClass::COMMAND_ACK.header();
        assert_eq!(sig.step(0, 0xFD), 1);
        // FD FD: second FD restarts the match instead of being dropped.
        assert_eq!(sig.step(1, 0xFD), 1);
        assert_eq!(sig.step(1, 0x00), 0);
        assert_eq!(sig.step(3, 0xFA), 4);
    }

    #[test]
    fn step_with_self_overlap_falls_back_to_prefix() {
        let class =
            FrameClass::custom("overlap", &[0xAA, 0xAA, 0xBB], &[1, 2, 3], ByteOrder::Little, 16)
                .unwrap();
        let sig = *class.header();
        // AA AA AA BB: the third AA keeps two bytes matched.
        let mut matched = 0;
        for byte in [0xAA, 0xAA, 0xAA] {
            matched = sig.step(matched, byte);
        }
        assert_eq!(matched, 2);
        assert_eq!(sig.step(matched, 0xBB), 3);
    }
}
