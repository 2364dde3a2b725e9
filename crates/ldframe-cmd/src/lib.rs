//! Line-oriented command dispatch.
//!
//! A console line is split on spaces into `argv`, `argv[0]` names the
//! command, and the matching handler in a [`CommandTable`] runs with the
//! full `argv`. Unrelated to the wire protocol; it only drives it.

pub mod dispatch;
pub mod error;

pub use dispatch::{tokenize, CommandTable, Handler, DEFAULT_MAX_ARGS};
pub use error::{DispatchError, Result, NO_COMMAND, UNKNOWN_COMMAND};
