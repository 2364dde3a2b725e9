/// Errors that can occur during frame encoding, decoding and stream I/O.
///
/// Framing desynchronization is never reported here: the decoder recovers
/// from it silently.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A custom frame class failed validation.
    #[error("invalid frame class: {0}")]
    InvalidClass(String),

    /// The payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The caller-supplied output buffer cannot hold the encoded frame.
    #[error("output buffer too small ({available} bytes, need {needed})")]
    BufferTooSmall { needed: usize, available: usize },

    /// Payload was requested but the last byte processed did not complete a frame.
    #[error("no completed frame is available")]
    NoFrameReady,

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
