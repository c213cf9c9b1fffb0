//! Error types shared by the library and the `cuan` binary.
//!
//! Errors are `anyhow::Error` throughout. Errors that reach the user are tagged with an
//! `ErrorType` so that the binary (or any other front end) can decide how to present them, e.g.
//! telling the user to log in again when the backend rejects the session token.

use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a user-facing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// The home directory or config file is missing or unreadable.
    Config,
    /// User input was rejected before anything was sent to the backend.
    Validation,
    /// There is no session, or the backend rejected the session token.
    Auth,
    /// The backend could not be reached or answered with a non-success status.
    Backend,
    /// A report document could not be produced or written.
    Export,
    /// A local file operation failed.
    Io,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Config => "configuration error",
            ErrorType::Validation => "invalid input",
            ErrorType::Auth => "authentication error",
            ErrorType::Backend => "backend error",
            ErrorType::Export => "export error",
            ErrorType::Io => "file error",
        };
        f.write_str(s)
    }
}

impl std::error::Error for ErrorType {}

/// Tags the error side of a `Result` with an `ErrorType`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            // Keep the innermost classification if one was already attached.
            if error_type_of(&e).is_some() {
                e
            } else {
                e.context(error_type)
            }
        })
    }
}

/// Returns the `ErrorType` attached anywhere in `e`'s context chain.
pub fn error_type_of(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}

/// Creates a new error of the given type from a message.
pub(crate) fn typed(error_type: ErrorType, message: impl Display) -> Error {
    anyhow::anyhow!("{message}").context(error_type)
}
