use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::class::FrameClass;
use crate::command::CommandWord;
use crate::encoder::encode_command;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Writes complete command frames to any `Write` stream.
pub struct CommandWriter<T> {
    inner: T,
    buf: BytesMut,
    class: FrameClass,
}

impl<T: Write> CommandWriter<T> {
    /// Create a writer emitting command/ack-class frames.
    pub fn new(inner: T) -> Self {
        Self::with_class(inner, FrameClass::COMMAND_ACK)
    }

    /// Create a writer emitting frames of an explicit class.
    pub fn with_class(inner: T, class: FrameClass) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            class,
        }
    }

    /// Encode and send a raw command word with its data (blocking).
    pub fn send(&mut self, command_word: u16, data: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_command(&self.class, command_word, data, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        tracing::debug!(
            class = self.class.name(),
            command_word,
            len = self.buf.len(),
            "command frame written"
        );

        self.flush()
    }

    /// Send a known command.
    pub fn send_command(&mut self, command: CommandWord, data: &[u8]) -> Result<()> {
        self.send(command.word(), data)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn class(&self) -> &FrameClass {
        &self.class
    }
}
