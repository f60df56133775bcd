use thiserror::Error;

pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";
pub const UNREADABLE_FAILURE_MESSAGE: &str = "Request failed";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
    /// Transport failure (no status) or a non-2xx response.
    #[error("request_failed - {message}")]
    RequestFailed { status: Option<u16>, message: String },
    /// The task collection could not be fetched.
    #[error("load_failed - {0}")]
    LoadFailed(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn request_failed<M: Into<String>>(status: Option<u16>, message: M) -> Self {
        Self::RequestFailed {
            status,
            message: message.into(),
        }
    }

    pub fn load_failed<M: Into<String>>(message: M) -> Self {
        Self::LoadFailed(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::RequestFailed { .. } => "request_failed",
            Self::LoadFailed(_) => "load_failed",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) => message,
            Self::InvalidData(message) => message,
            Self::Io(message) => message,
            Self::RequestFailed { message, .. } => message,
            Self::LoadFailed(message) => message,
        }
    }

    /// HTTP status of a failed response, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::InvalidData(err.to_string());
        }
        Self::RequestFailed {
            status: err.status().map(|status| status.as_u16()),
            message: err.to_string(),
        }
    }
}
