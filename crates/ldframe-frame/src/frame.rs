use bytes::Bytes;

/// A decoded frame payload tagged with the class it was framed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Name of the frame class the payload was decoded with.
    pub class: &'static str,
    /// The payload bytes (framing stripped).
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(class: &'static str, payload: impl Into<Bytes>) -> Self {
        Self {
            class,
            payload: payload.into(),
        }
    }

    /// Interpret the payload as a command/ack payload.
    pub fn command(&self) -> Option<(u16, &[u8])> {
        split_command(self.payload.as_ref())
    }
}

/// Split a command/ack payload into its little-endian command word and data.
///
/// Returns `None` when the payload is shorter than a command word.
pub fn split_command(payload: &[u8]) -> Option<(u16, &[u8])> {
    match payload {
        [lo, hi, data @ ..] => Some((u16::from_le_bytes([*lo, *hi]), data)),
        _ => None,
    }
}
