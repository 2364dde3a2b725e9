use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::class::FrameClass;
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};
use crate::frame::Frame;

/// Default number of bytes requested from the stream per read.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Configuration for [`FrameReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Bytes requested per read call. Default: 256.
    pub chunk_size: usize,
    /// Reset the decoder when a read times out. Default: true.
    pub reset_on_timeout: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            reset_on_timeout: true,
        }
    }
}

/// Reads complete frames from any `Read` byte stream.
///
/// Bytes are pushed through a [`FrameDecoder`] one at a time; bytes that
/// arrive after a completed frame are kept for the next call.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
    pending: BytesMut,
    chunk: Box<[u8]>,
    config: ReaderConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T, class: FrameClass) -> Self {
        Self::with_config(inner, class, ReaderConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, class: FrameClass, config: ReaderConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        Self {
            inner,
            decoder: FrameDecoder::new(class),
            pending: BytesMut::with_capacity(chunk_size),
            chunk: vec![0u8; chunk_size].into_boxed_slice(),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` at end of stream. A read
    /// that times out resets the decoder (unless disabled) and surfaces as
    /// `FrameError::Io`; the reader stays usable afterwards.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if !self.pending.is_empty() {
                match self.decoder.feed(&self.pending) {
                    Some(consumed) => {
                        self.pending.advance(consumed);
                        let payload = self.decoder.take_payload()?;
                        tracing::debug!(
                            class = self.decoder.class().name(),
                            len = payload.len(),
                            "frame received"
                        );
                        return Ok(Frame::new(self.decoder.class().name(), payload));
                    }
                    None => self.pending.clear(),
                }
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) =>
                {
                    if self.config.reset_on_timeout {
                        tracing::debug!(
                            class = self.decoder.class().name(),
                            phase = ?self.decoder.phase(),
                            "read timed out, resetting decoder"
                        );
                        self.decoder.reset();
                    }
                    return Err(FrameError::Io(err));
                }
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.pending.extend_from_slice(&self.chunk[..read]);
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Borrow the decoder, e.g. to inspect its statistics.
    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }

    /// Discard buffered bytes and any partial frame.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.decoder.reset();
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames until the stream ends; `ConnectionClosed` ends iteration.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
