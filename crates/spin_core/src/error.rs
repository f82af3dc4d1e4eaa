use std::time::Duration;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Headlines unavailable: {0}")]
    HeadlinesUnavailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Articles not found: {0}")]
    ArticlesNotFound(String),

    #[error("Narration unsupported: {0}")]
    NarrationUnsupported(String),

    #[error("Narration device error: {0}")]
    NarrationDeviceError(String),

    #[error("Request timed out after {}s", .0.as_secs_f32())]
    RequestTimeout(Duration),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// The classified kinds presented to callers of the pipeline and scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ConfigurationMissing,
    HeadlinesUnavailable,
    MalformedResponse,
    ArticlesNotFound,
    NarrationUnsupported,
    NarrationDeviceError,
    RequestTimeout,
    ServiceUnavailable,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ConfigurationMissing(_) => ErrorKind::ConfigurationMissing,
            Error::HeadlinesUnavailable(_) => ErrorKind::HeadlinesUnavailable,
            Error::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Error::ArticlesNotFound(_) => ErrorKind::ArticlesNotFound,
            Error::NarrationUnsupported(_) => ErrorKind::NarrationUnsupported,
            Error::NarrationDeviceError(_) => ErrorKind::NarrationDeviceError,
            Error::RequestTimeout(_) => ErrorKind::RequestTimeout,
            Error::ServiceUnavailable(_) => ErrorKind::ServiceUnavailable,
            Error::Io(_) | Error::Serialization(_) | Error::Http(_) | Error::External(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether the user can meaningfully retry the action that failed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::ConfigurationMissing(_) | Error::NarrationUnsupported(_))
    }

    /// Converts an error raised inside a headline fetch into `HeadlinesUnavailable`.
    pub fn into_headlines_error(self) -> Error {
        match self {
            Error::HeadlinesUnavailable(_) | Error::ConfigurationMissing(_) => self,
            other => Error::HeadlinesUnavailable(other.user_message()),
        }
    }

    /// Converts transport and parse failures raised during an analysis into
    /// one of the classified kinds. Classified errors pass through untouched.
    /// `timeout` is the request deadline reported when the transport expired.
    pub fn into_analysis_error(self, timeout: Duration) -> Error {
        match self {
            Error::Serialization(e) => Error::MalformedResponse(e.to_string()),
            Error::Http(e) if e.is_timeout() => Error::RequestTimeout(timeout),
            Error::Http(e) if e.is_decode() => Error::MalformedResponse(e.to_string()),
            Error::Http(e) => Error::ServiceUnavailable(e.to_string()),
            Error::Io(e) => Error::ServiceUnavailable(e.to_string()),
            Error::External(e) => Error::ServiceUnavailable(e.to_string()),
            classified => classified,
        }
    }

    /// A short message suitable for display, never a backtrace.
    pub fn user_message(&self) -> String {
        match self {
            Error::ConfigurationMissing(what) => format!("{}. Set it and restart.", what),
            Error::HeadlinesUnavailable(_) => "Could not load headlines. Please try again.".to_string(),
            Error::MalformedResponse(_) => {
                "The AI service returned a response that could not be read. Please try again.".to_string()
            }
            Error::ArticlesNotFound(_) => {
                "Could not find two distinct articles on this story. Try a different topic.".to_string()
            }
            Error::NarrationUnsupported(_) => "Speech narration is not available on this system.".to_string(),
            Error::NarrationDeviceError(reason) => format!("Narration stopped: {}", reason),
            Error::RequestTimeout(after) => {
                format!("The AI service did not answer within {}s. Please try again.", after.as_secs())
            }
            Error::ServiceUnavailable(_) => "The AI service is unreachable right now. Please try again.".to_string(),
            other => format!("Unexpected error: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
