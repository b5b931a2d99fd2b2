use thiserror::Error;

/// Prefix shared by every business-level failure reported by the service.
pub const REMOTE_ERROR_PREFIX: &str = "Failed to request delivery points: ";

#[derive(Error, Debug)]
pub enum ColissimoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("SOAP fault {code}: {message}")]
    SoapFault { code: String, message: String },

    #[error("XML error: {message}")]
    Xml { message: String },

    #[error("{}{}", REMOTE_ERROR_PREFIX, .message)]
    RemoteError { code: i64, message: String },

    #[error("Missing field in response: {field}")]
    MissingField { field: String },

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Network, HTTP or SOAP level failure.
    Transport,
    /// The service answered with a non-zero error code.
    Remote,
    /// The response could not be mapped into domain objects.
    Decode,
    /// Bad credentials, config file or endpoint.
    Configuration,
}

impl ColissimoError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Http(_) | Self::UnexpectedStatus { .. } | Self::SoapFault { .. } => {
                ErrorCategory::Transport
            }
            Self::RemoteError { .. } => ErrorCategory::Remote,
            Self::Xml { .. }
            | Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::SerializationError(_) => ErrorCategory::Decode,
            Self::InvalidCredentials { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::IoError(_) => ErrorCategory::Configuration,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Transport => "Check network connectivity and the service endpoint",
            ErrorCategory::Remote => "Check the request parameters against the service documentation",
            ErrorCategory::Decode => "The service returned an unexpected payload; enable --verbose to inspect it",
            ErrorCategory::Configuration => "Check the configuration file and credentials",
        }
    }

    pub(crate) fn xml(err: impl std::fmt::Display) -> Self {
        Self::Xml {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ColissimoError>;
