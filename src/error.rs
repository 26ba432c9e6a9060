use std::fmt::Display;

/// Custom Result type for TabDB operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for TabDB
///
/// Every failure is detected before a table is rewritten, so an `Err` never
/// leaves a half-written table behind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Malformed statement, nothing was executed
    #[error("{0}")]
    Parse(String),
    /// Unknown table or column, duplicate column, altering `id`
    #[error("{0}")]
    Schema(String),
    /// The session is not in a state to run the command (no active database)
    #[error("{0}")]
    State(String),
    /// Storage failure
    #[error("storage error: {0}")]
    Io(String),
}

impl Error {
    pub fn parse(msg: impl Display) -> Self {
        Error::Parse(msg.to_string())
    }

    pub fn schema(msg: impl Display) -> Self {
        Error::Schema(msg.to_string())
    }

    pub fn no_database() -> Self {
        Error::State("No database selected.".into())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<bincode::Error> for Error {
    fn from(value: bincode::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(value: tempfile::PersistError) -> Self {
        Error::Io(value.error.to_string())
    }
}
