//! `tokio_util::codec` adapter over [`FrameDecoder`].

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::class::FrameClass;
use crate::decoder::FrameDecoder;
use crate::encoder::encode_command;
use crate::error::FrameError;
use crate::frame::Frame;

/// Decodes frames of one class; encodes `(command_word, data)` command frames.
#[derive(Debug)]
pub struct FrameCodec {
    decoder: FrameDecoder,
}

impl FrameCodec {
    pub fn new(class: FrameClass) -> Self {
        Self {
            decoder: FrameDecoder::new(class),
        }
    }

    pub fn decoder(&self) -> &FrameDecoder {
        &self.decoder
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decoder.feed(&src[..]) {
            Some(consumed) => {
                src.advance(consumed);
                let payload = self.decoder.take_payload()?;
                Ok(Some(Frame::new(self.decoder.class().name(), payload)))
            }
            None => {
                // Every byte is now held by the decoder state.
                src.clear();
                Ok(None)
            }
        }
    }
}

impl Encoder<(u16, Bytes)> for FrameCodec {
    type Error = FrameError;

    fn encode(&mut self, item: (u16, Bytes), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (command_word, data) = item;
        encode_command(self.decoder.class(), command_word, &data, dst)
    }
}
