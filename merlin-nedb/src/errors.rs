use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for adapter operations.
///
/// Argument problems are reported synchronously by the operation itself,
/// while [`ErrorKind::StorageError`] and friends arrive asynchronously
/// through the caller's sink or callback.
///
/// # Examples
///
/// ```rust,ignore
/// use merlin_nedb::errors::{AdapterError, ErrorKind, AdapterResult};
///
/// fn example() -> AdapterResult<()> {
///     Err(AdapterError::new("collection name must not be empty", ErrorKind::InvalidArgument))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A required argument is missing or malformed
    InvalidArgument,
    /// The query could not be translated
    InvalidQuery,
    /// Failure reported by the underlying datastore
    StorageError,
    /// Index options or index field path failed validation
    ValidationError,
    /// No datastore is registered under the requested collection name
    CollectionNotFound,
    /// A unique index rejected a write
    UniqueConstraintViolation,
    /// Generic IO error
    IOError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::InvalidQuery => write!(f, "Invalid query"),
            ErrorKind::StorageError => write!(f, "Storage error"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::CollectionNotFound => write!(f, "Collection not found"),
            ErrorKind::UniqueConstraintViolation => write!(f, "Unique constraint violation"),
            ErrorKind::IOError => write!(f, "IO error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Adapter error type.
///
/// Carries a message, an [`ErrorKind`], an optional cause and the backtrace of
/// the place it was created. Cloning is cheap, the backtrace is shared.
#[derive(Clone)]
pub struct AdapterError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<AdapterError>>,
    backtrace: Atomic<Backtrace>,
}

impl AdapterError {
    /// Creates a new `AdapterError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        AdapterError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `AdapterError` wrapping a cause.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: AdapterError) -> Self {
        AdapterError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&AdapterError> {
        self.cause.as_deref()
    }
}

impl Display for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for AdapterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{}: {}\nCaused by: {:?}", self.error_kind, self.message, cause),
            None => write!(
                f,
                "{}: {}\n{:?}",
                self.error_kind,
                self.message,
                self.backtrace.read()
            ),
        }
    }
}

impl Error for AdapterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, AdapterError>`.
pub type AdapterResult<T> = Result<T, AdapterError>;

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        AdapterError::new(&format!("IO error: {}", err), ErrorKind::IOError)
    }
}

impl From<regex::Error> for AdapterError {
    fn from(err: regex::Error) -> Self {
        AdapterError::new(
            &format!("Invalid regular expression: {}", err),
            ErrorKind::InvalidQuery,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapter_error_new_creates_error() {
        let error = AdapterError::new("An error occurred", ErrorKind::StorageError);
        assert_eq!(error.message(), "An error occurred");
        assert_eq!(error.kind(), &ErrorKind::StorageError);
        assert!(error.cause().is_none());
    }

    #[test]
    fn adapter_error_new_with_cause_chains_source() {
        let cause = AdapterError::new("disk gone", ErrorKind::IOError);
        let error = AdapterError::new_with_cause("load failed", ErrorKind::StorageError, cause);
        assert_eq!(error.cause().map(|c| c.message()), Some("disk gone"));
        assert!(error.source().is_some());
    }

    #[test]
    fn adapter_error_display_is_message() {
        let error = AdapterError::new("boom", ErrorKind::InternalError);
        assert_eq!(format!("{}", error), "boom");
    }

    #[test]
    fn debug_includes_kind_and_cause() {
        let cause = AdapterError::new("inner", ErrorKind::IOError);
        let error = AdapterError::new_with_cause("outer", ErrorKind::StorageError, cause);
        let debug = format!("{:?}", error);
        assert!(debug.contains("Storage error: outer"));
        assert!(debug.contains("Caused by"));
        assert!(debug.contains("inner"));
    }

    #[test]
    fn io_error_converts_to_io_kind() {
        let err: AdapterError = std::io::Error::other("nope").into();
        assert_eq!(err.kind(), &ErrorKind::IOError);
        assert!(err.message().contains("nope"));
    }

    #[test]
    fn regex_error_converts_to_invalid_query() {
        let err: AdapterError = regex::Regex::new("(").unwrap_err().into();
        assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
    }

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidArgument.to_string(), "Invalid argument");
        assert_eq!(ErrorKind::CollectionNotFound.to_string(), "Collection not found");
        assert_eq!(ErrorKind::ValidationError.to_string(), "Validation error");
    }
}
