use serde::Serialize;
use thiserror::Error;

pub const INVALID_COUNTRY: &str = "INVALID_COUNTRY";

#[derive(Error, Debug)]
pub enum EnhancerError {
    #[error("{message}")]
    InvalidRequest { message: String },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{message}")]
    MalformedResponse { message: String },

    #[error("Publisher id not available")]
    MissingPublisherId,

    #[error("ip is not from united states")]
    InvalidCountry { country: String },

    #[error("Enhancer task failed: {message}")]
    TaskFailed { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl EnhancerError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// HTTP-style status the invoking layer should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. }
            | Self::InvalidInput { .. }
            | Self::MalformedResponse { .. }
            | Self::MissingPublisherId
            | Self::InvalidCountry { .. } => 400,
            Self::Upstream { status, .. } => *status,
            _ => 500,
        }
    }

    /// Machine-readable code; only the country policy gate carries one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::InvalidCountry { .. } => Some(INVALID_COUNTRY),
            _ => None,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            status: self.status(),
            code: self.code(),
        }
    }
}

/// Failure as seen by whoever invokes the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

pub type Result<T> = std::result::Result<T, EnhancerError>;
