use std::time::Duration;
use thiserror::Error;

pub const NETWORK_ERROR_MESSAGE: &str =
    "No response received from server. Please check your internet connection.";

#[derive(Debug, Error)]
pub enum ImageGenError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider answered with a non-success status.
    #[error("Server error: {status}. {}", .message.as_deref().unwrap_or("Unknown error"))]
    RemoteRejected {
        status: u16,
        message: Option<String>,
    },

    /// Success status, but the image URL was not where the provider puts it.
    #[error("{0}")]
    MalformedResponse(String),

    #[error("No response received from server. Please check your internet connection.")]
    Network(String),

    #[error("The request timed out after {}.", describe_duration(.0))]
    Timeout(Duration),

    #[error("The request was cancelled.")]
    Cancelled,

    #[error("A request is already in flight")]
    Busy,

    #[error("Failed to download image: {0}")]
    Export(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("An error occurred: {0}")]
    Unknown(String),
}

impl ImageGenError {
    /// The text shown to the user in place of the image.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ImageGenError::Busy)
    }
}

pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Whole seconds read as seconds; anything finer is shown in milliseconds.
pub(crate) fn describe_duration(duration: &Duration) -> String {
    if duration.as_secs() == 0 || duration.subsec_millis() != 0 {
        format!("{}ms", duration.as_millis())
    } else if duration.as_secs() == 1 {
        "1 second".to_string()
    } else {
        format!("{} seconds", duration.as_secs())
    }
}
