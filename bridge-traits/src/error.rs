use thiserror::Error;

/// Errors surfaced by host bridge implementations.
///
/// Bridges report failure in host terms (transport, storage, IO); the
/// core decides what each failure means for the session. None of these
/// variants are fatal to the core.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
