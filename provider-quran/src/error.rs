//! Error types for the Quran content provider

use thiserror::Error;

/// Quran content provider errors
#[derive(Error, Debug)]
pub enum QuranProviderError {
    /// API request returned an error status
    #[error("Content API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Requested chapter is outside the canonical range
    #[error("Chapter {chapter} out of range (1..=114)")]
    ChapterOutOfRange { chapter: u16 },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Response parsed but violated a structural expectation
    #[error("Invalid content payload: {0}")]
    InvalidPayload(String),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] bridge_traits::error::BridgeError),
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, QuranProviderError>;

impl From<QuranProviderError> for bridge_traits::error::BridgeError {
    fn from(error: QuranProviderError) -> Self {
        match error {
            QuranProviderError::ApiError {
                status_code,
                message,
            } => bridge_traits::error::BridgeError::OperationFailed(format!(
                "Content API error (status {}): {}",
                status_code, message
            )),
            QuranProviderError::ChapterOutOfRange { chapter } => {
                bridge_traits::error::BridgeError::OperationFailed(format!(
                    "Chapter {} out of range",
                    chapter
                ))
            }
            QuranProviderError::ParseError(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!("Parse error: {}", msg))
            }
            QuranProviderError::InvalidPayload(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!(
                    "Invalid payload: {}",
                    msg
                ))
            }
            QuranProviderError::NetworkError(msg) => {
                bridge_traits::error::BridgeError::OperationFailed(format!(
                    "Network error: {}",
                    msg
                ))
            }
            QuranProviderError::BridgeError(e) => e,
        }
    }
}
