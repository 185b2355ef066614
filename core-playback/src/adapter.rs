//! Playback device adapter.
//!
//! Keeps the single audio output channel synchronized with the session
//! store's active segment and translates device events back into session
//! concerns. The adapter holds no advance-or-cascade policy; when a
//! resource plays to its end it hands a [`DeviceSignal::Finished`] up to
//! the continuity controller.
//!
//! Device events always re-read the store: an event whose URL no longer
//! matches the store's current target belongs to a superseded load and is
//! discarded silently.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{AudioOutput, AudioOutputEvent};
use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::{PlayerError, Result};
use crate::session::SessionStore;

/// Device outcomes that require a policy decision upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceSignal {
    /// The active segment's resource played to its end.
    Finished,
}

/// Mirror of the physical output resource.
///
/// Exists to tell "same locator, different play intent" (a toggle, no
/// reload) apart from "different locator" (a full reload).
#[derive(Debug, Default)]
struct PlaybackDeviceState {
    loaded_url: Option<String>,
    ready: bool,
    last_error: Option<String>,
    position: Duration,
    duration: Option<Duration>,
}

/// Owner of the single audio output resource.
///
/// No other component issues load/play/pause against the device; UI
/// surfaces and the controller always go through the store, and the
/// adapter reconciles the device with it via [`sync`](Self::sync).
pub struct DeviceAdapter {
    output: Arc<dyn AudioOutput>,
    store: Arc<SessionStore>,
    events: EventBus,
    device: Mutex<PlaybackDeviceState>,
}

impl DeviceAdapter {
    pub fn new(output: Arc<dyn AudioOutput>, store: Arc<SessionStore>, events: EventBus) -> Self {
        Self {
            output,
            store,
            events,
            device: Mutex::new(PlaybackDeviceState::default()),
        }
    }

    /// Reconcile the device with the store's current active segment.
    ///
    /// Called after every store transition. A changed locator starts a
    /// load; an unchanged locator only honors the playing flag; a closed
    /// session pauses the device.
    pub async fn sync(&self) -> Result<()> {
        let session = self.store.snapshot();

        let Some(segment) = session.active_segment() else {
            self.output
                .pause()
                .await
                .map_err(|e| PlayerError::Device(e.to_string()))?;
            return Ok(());
        };

        let target = segment.audio_url.clone();
        let needs_load = {
            let mut device = self.device.lock();
            if device.loaded_url.as_deref() != Some(target.as_str()) {
                device.loaded_url = Some(target.clone());
                device.ready = false;
                device.last_error = None;
                device.position = Duration::ZERO;
                device.duration = None;
                true
            } else {
                false
            }
        };

        if needs_load {
            debug!(url = %target, "Loading segment audio");
            self.output
                .load(&target)
                .await
                .map_err(|e| PlayerError::Device(e.to_string()))?;
        } else if session.playing {
            self.output
                .play()
                .await
                .map_err(|e| PlayerError::Device(e.to_string()))?;
        } else {
            self.output
                .pause()
                .await
                .map_err(|e| PlayerError::Device(e.to_string()))?;
        }

        Ok(())
    }

    /// Handle one device event.
    ///
    /// Returns `Some(DeviceSignal)` when the event requires a policy
    /// decision from the controller, `None` otherwise. Events for a
    /// locator that is no longer the store's current target are stale
    /// and are dropped without effect.
    pub async fn handle_event(&self, event: AudioOutputEvent) -> Result<Option<DeviceSignal>> {
        let current_target = self
            .store
            .snapshot()
            .active_segment()
            .map(|s| s.audio_url.clone());

        if current_target.as_deref() != Some(event.url()) {
            debug!(url = event.url(), "Discarding event for superseded load");
            return Ok(None);
        }

        match event {
            AudioOutputEvent::Ready { duration, .. } => {
                {
                    let mut device = self.device.lock();
                    device.ready = true;
                    device.duration = duration;
                }
                // The user may have paused while the load was in flight.
                if self.store.snapshot().playing {
                    self.output
                        .play()
                        .await
                        .map_err(|e| PlayerError::Device(e.to_string()))?;
                }
                Ok(None)
            }
            AudioOutputEvent::Progress {
                position, duration, ..
            } => {
                {
                    let mut device = self.device.lock();
                    device.position = position;
                    device.duration = duration;
                }
                let percent = normalized_progress(position, duration);
                self.events
                    .emit(CoreEvent::Player(PlayerEvent::PositionChanged {
                        percent,
                        position_ms: position.as_millis() as u64,
                        duration_ms: duration.map(|d| d.as_millis() as u64),
                    }))
                    .ok();
                Ok(None)
            }
            AudioOutputEvent::Ended { .. } => Ok(Some(DeviceSignal::Finished)),
            AudioOutputEvent::Error { message, url } => {
                warn!(url = %url, error = %message, "Audio device error");
                self.device.lock().last_error = Some(message.clone());
                // Explicit failure over a silent stall; the loaded session
                // stays in place and nothing retries automatically.
                self.events
                    .emit(CoreEvent::Player(PlayerEvent::Error {
                        message,
                        recoverable: true,
                    }))
                    .ok();
                Ok(None)
            }
        }
    }

    /// Seek within the loaded resource.
    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.output
            .seek(position)
            .await
            .map_err(|e| PlayerError::Device(e.to_string()))
    }

    /// Last error reported by the device, if any.
    pub fn last_error(&self) -> Option<String> {
        self.device.lock().last_error.clone()
    }
}

impl std::fmt::Debug for DeviceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let device = self.device.lock();
        f.debug_struct("DeviceAdapter")
            .field("loaded_url", &device.loaded_url)
            .field("ready", &device.ready)
            .finish()
    }
}

/// Normalized progress in 0..=100 for UI consumption.
fn normalized_progress(position: Duration, duration: Option<Duration>) -> u8 {
    // Nanosecond precision: a sub-millisecond duration still divides cleanly.
    match duration {
        Some(d) if !d.is_zero() => {
            let percent = position.as_nanos().saturating_mul(100) / d.as_nanos();
            percent.min(100) as u8
        }
        _ => 0,
    }
}
