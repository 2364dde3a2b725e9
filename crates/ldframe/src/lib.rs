//! Framing and command tooling for UART radar presence sensors.
//!
//! # Crate Structure
//!
//! - [`frame`]: Byte-at-a-time frame decoder, command frame encoder, stream reader/writer
//! - [`cmd`]: Line-oriented command dispatcher for consoles driving the sensor

/// Re-export frame types.
pub mod frame {
    pub use ldframe_frame::*;
}

/// Re-export command dispatch types.
pub mod cmd {
    pub use ldframe_cmd::*;
}
