//! Route Navigation Abstraction
//!
//! The continuity controller requests a route change after a successful
//! chapter cascade so the reading view follows the audio. Navigation itself
//! is a host concern; the core only names the destination path.

use async_trait::async_trait;

use crate::error::Result;

/// Route-change collaborator.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Navigate the host UI to `path` (e.g. `/surah/2`).
    async fn navigate(&self, path: &str) -> Result<()>;
}
