//! # Tilawah Core
//!
//! Recitation playback continuity core: the cross-page audio session for a
//! scripture reading application. Hosts provide an audio output channel, a
//! settings store, and a navigator; this crate assembles the session store,
//! device adapter, and continuity controller around them and exposes the
//! shared event bus UI surfaces render from.
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tilawah_core::{init, CoreConfig};
//!
//! let config = CoreConfig::builder()
//!     .settings_store(settings)
//!     .navigator(navigator)
//!     .build()?;
//!
//! let core = init(config, audio_output).await?;
//! core.spawn_device_pump();
//!
//! core.controller.play_all(unit, segments).await?;
//! ```

use std::sync::Arc;

use tracing::warn;

pub use bridge_traits::{
    AudioOutput, AudioOutputEvent, ChapterPayload, ContentSource, HttpClient, LeadInAudio,
    Navigator, SettingsStore, VersePayload,
};
pub use core_playback::{
    build_chapter, build_part, has_lead_in, to_active_index, to_displayed_index, ChapterMeta,
    ContinuityController, ContentUnit, DeviceAdapter, PlaybackSession, PlayerError, PlayerPhase,
    Segment, SessionStore, CHAPTER_COUNT, PART_COUNT,
};
pub use core_runtime::config::{CoreConfig, CoreConfigBuilder, DEFAULT_API_BASE_URL, DEFAULT_VOICE};
pub use core_runtime::events::{CascadeEvent, CoreEvent, EventBus, EventStream, PlayerEvent};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
pub use core_runtime::Error;
pub use provider_quran::QuranContentSource;

#[cfg(feature = "desktop")]
pub use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};

/// An assembled playback core.
///
/// Holds the three cooperating components plus the event bus. The store is
/// the single source of truth; the controller is the entry point for UI
/// requests; the adapter is internal plumbing exposed for hosts that drive
/// device events manually instead of using [`spawn_device_pump`].
///
/// [`spawn_device_pump`]: PlaybackCore::spawn_device_pump
pub struct PlaybackCore {
    pub store: Arc<SessionStore>,
    pub adapter: Arc<DeviceAdapter>,
    pub controller: Arc<ContinuityController>,
    pub events: EventBus,
    output: Arc<dyn AudioOutput>,
}

impl PlaybackCore {
    /// Subscribe to core events.
    pub fn subscribe(&self) -> core_runtime::events::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// Spawn a background task pumping device events into the controller.
    ///
    /// Event handling errors (a failed cascade, a device fault) are already
    /// surfaced on the event bus by the components that detect them, so the
    /// pump only logs and keeps going. The task ends when the device drops
    /// its event sender.
    pub fn spawn_device_pump(&self) -> tokio::task::JoinHandle<()> {
        let controller = self.controller.clone();
        let mut events = self.output.subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if let Err(e) = controller.handle_device_event(event).await {
                            warn!(error = %e, "Device event handling failed");
                        }
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        warn!(missed = n, "Device event pump lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

/// Assemble a playback core from a validated configuration and a host audio
/// output.
///
/// Restores the persisted auto-cascade preference before returning. When the
/// configuration carries no HTTP client, the desktop default is used (or
/// [`Error::CapabilityMissing`] is returned when that feature is off).
pub async fn init(config: CoreConfig, output: Arc<dyn AudioOutput>) -> Result<PlaybackCore, Error> {
    config.validate()?;

    let http_client = match config.http_client.clone() {
        Some(client) => client,
        None => default_http_client()?,
    };

    let events = EventBus::new(config.event_buffer);
    let store = Arc::new(
        SessionStore::restore(config.settings_store.clone(), events.clone()).await,
    );
    let adapter = Arc::new(DeviceAdapter::new(
        output.clone(),
        store.clone(),
        events.clone(),
    ));
    let content: Arc<dyn ContentSource> = Arc::new(QuranContentSource::new(
        http_client,
        config.api_base_url.clone(),
    ));
    let controller = Arc::new(ContinuityController::new(
        store.clone(),
        adapter.clone(),
        content,
        config.navigator.clone(),
        events.clone(),
        config.default_voice.clone(),
    ));

    Ok(PlaybackCore {
        store,
        adapter,
        controller,
        events,
        output,
    })
}

#[cfg(feature = "desktop")]
fn default_http_client() -> Result<Arc<dyn HttpClient>, Error> {
    Ok(Arc::new(ReqwestHttpClient::new()))
}

#[cfg(not(feature = "desktop"))]
fn default_http_client() -> Result<Arc<dyn HttpClient>, Error> {
    Err(Error::CapabilityMissing {
        capability: "http_client".to_string(),
        message: "no HTTP client configured and the desktop default is disabled".to_string(),
    })
}
