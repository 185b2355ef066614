//! Audio output bridge trait and event types.
//!
//! The core owns exactly one logical audio output channel. Hosts provide a
//! concrete [`AudioOutput`] backed by whatever their platform offers (an HTML
//! audio element, a native media player, a test double). The core never talks
//! to the physical resource directly; it issues load/play/pause/seek through
//! this trait and reacts to the event stream the host surfaces.
//!
//! Every event carries the URL of the resource it belongs to. Consumers must
//! compare that URL against the currently targeted resource before acting:
//! events for a superseded load are stale and must be discarded, not treated
//! as errors.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;

/// Events emitted by an audio output device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioOutputEvent {
    /// The resource at `url` finished loading and can be played.
    Ready {
        url: String,
        /// Total duration, when the host can determine it at load time.
        duration: Option<Duration>,
    },
    /// Periodic position report while the resource plays.
    Progress {
        url: String,
        position: Duration,
        duration: Option<Duration>,
    },
    /// The resource played to its end.
    Ended { url: String },
    /// The resource could not be loaded or played.
    Error { url: String, message: String },
}

impl AudioOutputEvent {
    /// URL of the resource this event belongs to.
    pub fn url(&self) -> &str {
        match self {
            AudioOutputEvent::Ready { url, .. }
            | AudioOutputEvent::Progress { url, .. }
            | AudioOutputEvent::Ended { url }
            | AudioOutputEvent::Error { url, .. } => url,
        }
    }
}

/// The single physical audio output channel.
///
/// Implementations hold at most one loaded resource at a time; a `load` call
/// for a new URL replaces whatever was loaded before. Control methods must be
/// fast and non-blocking; `load` completion is signalled asynchronously via
/// [`AudioOutputEvent::Ready`] on the subscription stream.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Begin loading the resource at `url`, replacing the current one.
    ///
    /// Completion is reported as `Ready` (or `Error`) on the event stream.
    async fn load(&self, url: &str) -> Result<()>;

    /// Start or resume playback of the loaded resource.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the resource loaded and the position intact.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position in the loaded resource.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Subscribe to the device's event stream.
    fn subscribe(&self) -> broadcast::Receiver<AudioOutputEvent>;
}
