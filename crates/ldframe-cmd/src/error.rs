/// Result code reported for an empty line.
pub const NO_COMMAND: i32 = -1;

/// Result code reported when no handler matches.
pub const UNKNOWN_COMMAND: i32 = -2;

/// Dispatch failures, distinct from any handler-returned result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The line contained no tokens.
    #[error("no command")]
    NoCommand,

    /// No table entry matches the command name.
    #[error("unknown command: {0}")]
    Unknown(String),
}

impl DispatchError {
    /// Integer result code for callers that report plain codes.
    pub fn code(&self) -> i32 {
        match self {
            DispatchError::NoCommand => NO_COMMAND,
            DispatchError::Unknown(_) => UNKNOWN_COMMAND,
        }
    }
}

pub type Result<T> = std::result::Result<T, DispatchError>;
