//! Header/footer framing for UART radar presence sensors.
//!
//! Every frame on the link is laid out as:
//! - A fixed 4-byte header signature that identifies the frame class
//! - A 2-byte payload length
//! - The payload (for command/ack frames: a 2-byte command word, then data)
//! - A fixed 4-byte footer signature
//!
//! [`FrameDecoder`] consumes the stream one byte at a time and silently
//! resynchronizes on noise, truncated frames and oversized lengths.

pub mod class;
#[cfg(feature = "async")]
pub mod codec;
pub mod command;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod frame;
pub mod reader;
pub mod writer;

pub use class::{ByteOrder, FrameClass, Signature, DEFAULT_CAPACITY, MAX_CAPACITY};
#[cfg(feature = "async")]
pub use codec::FrameCodec;
pub use command::{command_name, CommandWord};
pub use decoder::{DecoderStats, FrameDecoder, Phase};
pub use encoder::{
    build_command, build_command_for, command_frame_len, encode_command, encode_frame,
    COMMAND_WORD_SIZE, MAX_WIRE_PAYLOAD,
};
pub use error::{FrameError, Result};
pub use frame::{split_command, Frame};
pub use reader::{FrameReader, ReaderConfig};
pub use writer::CommandWriter;
