use thiserror::Error;

/// Failure of a driver operation.
///
/// Callers branch on [`DriverError::kind`], never on the message text. Provider
/// messages are carried verbatim for diagnostics only.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("authentication expired")]
    AuthExpired,

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("provider error (code {code}): {message}")]
    Provider { code: i64, message: String },

    #[error("operation not implemented by this driver")]
    NotImplemented,

    #[error("preview not supported")]
    NotSupported,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("operation cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    PathNotFound,
    AuthExpired,
    AuthFailed,
    Provider,
    NotImplemented,
    NotSupported,
    Transport,
    Cancelled,
}

impl DriverError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DriverError::PathNotFound(_) => ErrorKind::PathNotFound,
            DriverError::AuthExpired => ErrorKind::AuthExpired,
            DriverError::AuthFailed(_) => ErrorKind::AuthFailed,
            DriverError::Provider { .. } => ErrorKind::Provider,
            DriverError::NotImplemented => ErrorKind::NotImplemented,
            DriverError::NotSupported => ErrorKind::NotSupported,
            DriverError::Transport(_) => ErrorKind::Transport,
            DriverError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DriverError::Transport(_) | DriverError::Cancelled | DriverError::AuthExpired
        )
    }

    /// The backend cannot do this at all; a UI should grey the action out.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, DriverError::NotImplemented | DriverError::NotSupported)
    }
}

impl From<reqwest::Error> for DriverError {
    fn from(err: reqwest::Error) -> Self {
        DriverError::Transport(err.to_string())
    }
}

impl From<url::ParseError> for DriverError {
    fn from(err: url::ParseError) -> Self {
        DriverError::Transport(format!("invalid url: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;
