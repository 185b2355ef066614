//! Playback error types.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors surfaced by the playback core.
///
/// Nothing here is fatal to the process. Device failures leave the loaded
/// session in place; cascade failures close the session deterministically.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The audio output device could not load or play a resource.
    #[error("Audio device error: {0}")]
    Device(String),

    /// The next chapter could not be fetched during a cascade.
    #[error("Failed to load chapter {chapter}: {message}")]
    CascadeFetch { chapter: u16, message: String },

    /// The lead-in audio locator could not be resolved for a voice.
    #[error("Lead-in audio unavailable for voice '{0}'")]
    LeadInUnavailable(String),

    /// A bridge-layer operation failed.
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// Internal invariant failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
