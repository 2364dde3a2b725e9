use bytes::{BufMut, BytesMut};

use crate::class::FrameClass;
use crate::error::{FrameError, Result};

/// Size of the length field.
pub const LENGTH_FIELD_SIZE: usize = 2;

/// Size of the command word at the start of a command payload.
pub const COMMAND_WORD_SIZE: usize = 2;

/// Largest payload the 16-bit length field can describe.
pub const MAX_WIRE_PAYLOAD: usize = u16::MAX as usize;

/// Total wire size of a command frame carrying `data_len` bytes of command data.
pub fn command_frame_len(class: &FrameClass, data_len: usize) -> usize {
    class.wire_overhead() + COMMAND_WORD_SIZE + data_len
}

/// Build a command/ack-class command frame into `buf`.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────────┬──────────┬──────────────┬──────────────┐
/// │ Header (4B)  │ Length   │ Command  │ Data         │ Footer (4B)  │
/// │ FD FC FB FA  │ (2B LE)  │ (2B LE)  │ (Length - 2) │ 04 03 02 01  │
/// └──────────────┴──────────┴──────────┴──────────────┴──────────────┘
/// ```
///
/// Returns the number of bytes written. The frame is never truncated: a
/// `buf` too small for the whole frame is an error and nothing is written.
pub fn build_command(buf: &mut [u8], command_word: u16, data: &[u8]) -> Result<usize> {
    build_command_for(&FrameClass::COMMAND_ACK, buf, command_word, data)
}

/// Build a command frame for any frame class, honouring its byte order.
pub fn build_command_for(
    class: &FrameClass,
    buf: &mut [u8],
    command_word: u16,
    data: &[u8],
) -> Result<usize> {
    let declared = declared_len(COMMAND_WORD_SIZE + data.len())?;
    let needed = command_frame_len(class, data.len());
    if buf.len() < needed {
        return Err(FrameError::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }

    let order = class.length_order();
    let length = order.encode_u16(declared);
    let command = order.encode_u16(command_word);
    let parts: [&[u8]; 5] = [
        class.header().as_bytes(),
        &length,
        &command,
        data,
        class.footer().as_bytes(),
    ];

    let mut idx = 0;
    for part in parts {
        buf[idx..idx + part.len()].copy_from_slice(part);
        idx += part.len();
    }
    Ok(idx)
}

/// Append a command frame to a growable buffer.
pub fn encode_command(
    class: &FrameClass,
    command_word: u16,
    data: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    let declared = declared_len(COMMAND_WORD_SIZE + data.len())?;
    let order = class.length_order();

    dst.reserve(command_frame_len(class, data.len()));
    dst.put_slice(class.header().as_bytes());
    order.put_u16(dst, declared);
    order.put_u16(dst, command_word);
    dst.put_slice(data);
    dst.put_slice(class.footer().as_bytes());
    Ok(())
}

/// Append a raw frame (no command word) to a growable buffer.
///
/// Used for report-class frames, which carry opaque payloads.
pub fn encode_frame(class: &FrameClass, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let declared = declared_len(payload.len())?;

    dst.reserve(class.wire_overhead() + payload.len());
    dst.put_slice(class.header().as_bytes());
    class.length_order().put_u16(dst, declared);
    dst.put_slice(payload);
    dst.put_slice(class.footer().as_bytes());
    Ok(())
}

fn declared_len(size: usize) -> Result<u16> {
    u16::try_from(size).map_err(|_| FrameError::PayloadTooLarge {
        size,
        max: MAX_WIRE_PAYLOAD,
    })
}
