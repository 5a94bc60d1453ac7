//! Failure taxonomy shared by every pipeline step.
//!
//! Client crates keep their own error enums; they are converted here, at the
//! boundary, so the orchestrator only ever sees a `PipelineError`.

use thiserror::Error;
use twitter_client::TwitterError;
use youtube_client::YouTubeError;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    ConfigMissing,
    NotFound,
    CommentsDisabled,
    RateLimited,
    AuthFailed,
    UpstreamError,
    ClassifierUnavailable,
    ClassifierProtocolError,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} is not configured")]
    ConfigMissing(String),

    #[error("no items found: {0}")]
    NotFound(String),

    #[error("comments are disabled for this video")]
    CommentsDisabled,

    #[error("{0} rate limit exceeded")]
    RateLimited(String),

    #[error("{0} authentication failed")]
    AuthFailed(String),

    #[error("upstream error: {0}")]
    UpstreamError(String),

    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    #[error("classifier protocol error: {0}")]
    ClassifierProtocolError(String),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidInput(_) => ErrorKind::InvalidInput,
            PipelineError::ConfigMissing(_) => ErrorKind::ConfigMissing,
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::CommentsDisabled => ErrorKind::CommentsDisabled,
            PipelineError::RateLimited(_) => ErrorKind::RateLimited,
            PipelineError::AuthFailed(_) => ErrorKind::AuthFailed,
            PipelineError::UpstreamError(_) => ErrorKind::UpstreamError,
            PipelineError::ClassifierUnavailable(_) => ErrorKind::ClassifierUnavailable,
            PipelineError::ClassifierProtocolError(_) => ErrorKind::ClassifierProtocolError,
        }
    }

    /// HTTP status a caller should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::InvalidInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::CommentsDisabled => 403,
            ErrorKind::RateLimited => 429,
            ErrorKind::AuthFailed => 502,
            ErrorKind::ConfigMissing
            | ErrorKind::UpstreamError
            | ErrorKind::ClassifierUnavailable
            | ErrorKind::ClassifierProtocolError => 500,
        }
    }

    /// Message safe to hand back to the requester. Internal detail (stderr,
    /// raw bodies) stays in the logs.
    pub fn public_message(&self) -> String {
        match self {
            PipelineError::InvalidInput(msg) => msg.clone(),
            PipelineError::ConfigMissing(what) => {
                format!("{what} is not configured on the server.")
            }
            PipelineError::NotFound(what) => format!("No {what} found."),
            PipelineError::CommentsDisabled => "Comments are disabled for this video.".to_string(),
            PipelineError::RateLimited(platform) => {
                format!("{platform} rate limit exceeded. Please try again later.")
            }
            PipelineError::AuthFailed(platform) => {
                format!("{platform} authentication failed. Check the configured credentials.")
            }
            PipelineError::UpstreamError(msg) => msg.clone(),
            PipelineError::ClassifierUnavailable(_) => {
                "Failed to get a response from the classifier.".to_string()
            }
            PipelineError::ClassifierProtocolError(_) => {
                "The classifier returned a malformed response.".to_string()
            }
        }
    }
}

impl From<YouTubeError> for PipelineError {
    fn from(err: YouTubeError) -> Self {
        match err {
            YouTubeError::CommentsDisabled => PipelineError::CommentsDisabled,
            YouTubeError::Api { message, .. } => {
                PipelineError::UpstreamError(format!("YouTube API error: {message}"))
            }
            YouTubeError::Network(msg) | YouTubeError::Parse(msg) => {
                PipelineError::UpstreamError(format!("YouTube API error: {msg}"))
            }
        }
    }
}

impl From<TwitterError> for PipelineError {
    fn from(err: TwitterError) -> Self {
        match err {
            TwitterError::RateLimited => PipelineError::RateLimited("Twitter".into()),
            TwitterError::AuthFailed => PipelineError::AuthFailed("Twitter".into()),
            TwitterError::Api { message, .. } => {
                PipelineError::UpstreamError(format!("Twitter API error: {message}"))
            }
            TwitterError::Network(msg) | TwitterError::Parse(msg) => {
                PipelineError::UpstreamError(format!("Failed to fetch tweets: {msg}"))
            }
        }
    }
}
