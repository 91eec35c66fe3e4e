use std::fmt;
use std::path::PathBuf;

/// Classification of a failed operation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required handle was missing or stale.
    NullArgument,
    /// Argument out of range or malformed.
    InvalidArgument,
    /// The GPU backend rejected or failed the operation.
    BackendError,
    /// Pixel or file format cannot be handled.
    UnsupportedFormat,
    /// The backend lacks the capability the call needs.
    UnsupportedFunction,
    FileNotFound,
    /// Input data could not be decoded or encoded.
    DataError,
    /// The call is not valid in the current renderer state.
    UserError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NullArgument => "NULL ARGUMENT",
            ErrorKind::InvalidArgument => "INVALID ARGUMENT",
            ErrorKind::BackendError => "BACKEND ERROR",
            ErrorKind::UnsupportedFormat => "UNSUPPORTED FORMAT",
            ErrorKind::UnsupportedFunction => "UNSUPPORTED FUNCTION",
            ErrorKind::FileNotFound => "FILE NOT FOUND",
            ErrorKind::DataError => "DATA ERROR",
            ErrorKind::UserError => "USER ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing {0}")]
    NullArgument(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported function: {0}")]
    UnsupportedFunction(String),

    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("data error: {0}")]
    Data(String),

    #[error("{0}")]
    User(String),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NullArgument(_) => ErrorKind::NullArgument,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Backend(_) => ErrorKind::BackendError,
            Error::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Error::UnsupportedFunction(_) => ErrorKind::UnsupportedFunction,
            Error::FileNotFound(_) => ErrorKind::FileNotFound,
            Error::Data(_) => ErrorKind::DataError,
            Error::User(_) => ErrorKind::UserError,
        }
    }

    pub(crate) fn backend(detail: impl Into<String>) -> Self {
        Error::Backend(detail.into())
    }

    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        Error::InvalidArgument(detail.into())
    }

    pub(crate) fn unsupported(detail: impl Into<String>) -> Self {
        Error::UnsupportedFunction(detail.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Error::NullArgument("target").kind(), ErrorKind::NullArgument);
        assert_eq!(Error::Data("bad".into()).kind(), ErrorKind::DataError);
        assert_eq!(Error::FileNotFound("a.png".into()).kind(), ErrorKind::FileNotFound);
    }

    #[test]
    fn display_includes_detail() {
        let e = Error::invalid("channels must be 3 or 4, got 2");
        assert_eq!(e.to_string(), "invalid argument: channels must be 3 or 4, got 2");
        assert_eq!(ErrorKind::BackendError.to_string(), "BACKEND ERROR");
    }
}
