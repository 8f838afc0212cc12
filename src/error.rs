use thiserror::Error;

/// Errors raised while building, sending or verifying IPC messages.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IpcError {
    /// Credential bundle is incomplete or one of its keys does not parse.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An operation field is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// A cryptographic primitive failed on otherwise valid input.
    #[error("crypto operation failed: {0}")]
    Crypto(String),

    /// The gateway could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The connect or read deadline expired.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The gateway answered with a non-success HTTP status.
    #[error("gateway returned HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body, kept for diagnostics
        body: String,
    },

    /// The response payload is empty or cannot be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The response carries no `Signature` field.
    #[error("missing response signature")]
    MissingSignature,

    /// The response signature does not verify against the gateway key.
    #[error("signature check failed")]
    SignatureCheckFailed,

    /// The gateway sent an unsigned general error envelope.
    #[error("gateway general error: {0}")]
    Gateway(String),
}

/// Convenience result type for IPC operations.
pub type Result<T> = std::result::Result<T, IpcError>;

/// Coarse error classes used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ErrorKind {
    Configuration,
    Validation,
    Transport,
    Protocol,
}

impl IpcError {
    /// Returns the error class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) | Self::Crypto(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Connection(_) | Self::Timeout(_) | Self::HttpStatus { .. } => {
                ErrorKind::Transport
            }
            Self::InvalidResponse(_)
            | Self::MissingSignature
            | Self::SignatureCheckFailed
            | Self::Gateway(_) => ErrorKind::Protocol,
        }
    }

    /// Whether the caller may resubmit the request.
    ///
    /// Only an expired deadline qualifies. The SDK itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
