//! Playback session store.
//!
//! Single authority over the process-wide playback state. Every read by a
//! UI surface or the device adapter goes through a [`SessionStore`], and
//! every write happens through one of its named transitions, so the state
//! is never partially updated. Subscribers observe transitions as
//! [`PlayerEvent`]s on the shared event bus.

use std::sync::Arc;

use bridge_traits::SettingsStore;
use core_runtime::events::{CoreEvent, EventBus, PlayerEvent};
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::types::{ContentUnit, Segment};

/// Settings key for the persisted auto-cascade preference.
pub const AUTO_CASCADE_KEY: &str = "playback.auto_cascade";

/// The one mutable playback state in the process.
///
/// Only the auto-cascade flag survives a restart; everything else is
/// session-local by design.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    /// Currently loaded content unit, if any.
    pub unit: Option<ContentUnit>,
    /// Ordered playable sequence, lead-in included when present.
    pub segments: Vec<Segment>,
    /// Index of the active segment, `None` when the player is closed.
    pub active_index: Option<usize>,
    /// Whether playback is (intended to be) running.
    pub playing: bool,
    /// Persisted cross-chapter auto-advance preference.
    pub auto_cascade: bool,
}

impl PlaybackSession {
    fn empty() -> Self {
        Self {
            unit: None,
            segments: Vec::new(),
            active_index: None,
            playing: false,
            auto_cascade: true,
        }
    }

    /// The currently active segment, when one is selected.
    pub fn active_segment(&self) -> Option<&Segment> {
        self.active_index.and_then(|i| self.segments.get(i))
    }
}

/// Sole owner of the [`PlaybackSession`] state.
///
/// Transitions are synchronous state replacements under a short-held lock;
/// none of them blocks or suspends. The async methods only await the
/// settings store, never while holding the lock.
pub struct SessionStore {
    state: Mutex<PlaybackSession>,
    settings: Arc<dyn SettingsStore>,
    events: EventBus,
}

impl SessionStore {
    /// Create a store with an empty session and defaults.
    pub fn new(settings: Arc<dyn SettingsStore>, events: EventBus) -> Self {
        Self {
            state: Mutex::new(PlaybackSession::empty()),
            settings,
            events,
        }
    }

    /// Create a store and restore persisted preferences.
    ///
    /// A missing or unreadable preference falls back to the default
    /// (auto-cascade on) rather than failing startup.
    pub async fn restore(settings: Arc<dyn SettingsStore>, events: EventBus) -> Self {
        let store = Self::new(settings, events);
        match store.settings.get_bool(AUTO_CASCADE_KEY).await {
            Ok(Some(value)) => store.state.lock().auto_cascade = value,
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Could not restore auto-cascade preference"),
        }
        store
    }

    /// Snapshot the current session state.
    pub fn snapshot(&self) -> PlaybackSession {
        self.state.lock().clone()
    }

    /// Replace the content unit and sequence atomically and start playing
    /// at `start_index`.
    ///
    /// # Panics
    ///
    /// Panics when `start_index` is out of range for `segments`. Callers
    /// construct both together; an out-of-range index is a programming
    /// error, not a runtime condition to recover from.
    pub fn adopt(&self, unit: ContentUnit, segments: Vec<Segment>, start_index: usize) {
        assert!(
            start_index < segments.len(),
            "adopt start_index {} out of range for {} segments",
            start_index,
            segments.len()
        );

        let event = {
            let mut state = self.state.lock();
            let event = PlayerEvent::SessionAdopted {
                unit_id: unit.id,
                segment_count: segments.len(),
                start_index,
            };
            state.unit = Some(unit);
            state.segments = segments;
            state.active_index = Some(start_index);
            state.playing = true;
            event
        };

        debug!(?event, "Session adopted");
        self.events.emit(CoreEvent::Player(event)).ok();
    }

    /// Move within the current sequence and start playing.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range for the current sequence, for
    /// the same reason as [`adopt`](Self::adopt).
    pub fn set_active_index(&self, index: usize) {
        let event = {
            let mut state = self.state.lock();
            assert!(
                index < state.segments.len(),
                "active index {} out of range for {} segments",
                index,
                state.segments.len()
            );
            state.active_index = Some(index);
            state.playing = true;
            let segment = &state.segments[index];
            PlayerEvent::SegmentChanged {
                index,
                ordinal: segment.ordinal,
                chapter: segment.chapter.chapter,
            }
        };

        self.events.emit(CoreEvent::Player(event)).ok();
    }

    /// Set the playing flag without changing position.
    ///
    /// Ignored when no segment is active; playing=true with no active
    /// index would violate the session invariant.
    pub fn set_playing(&self, playing: bool) {
        let event = {
            let mut state = self.state.lock();
            let Some(index) = state.active_index else {
                return;
            };
            if state.playing == playing {
                return;
            }
            state.playing = playing;
            if playing {
                PlayerEvent::Resumed { index }
            } else {
                PlayerEvent::Paused { index }
            }
        };

        self.events.emit(CoreEvent::Player(event)).ok();
    }

    /// Clear the active index and playing flag.
    ///
    /// The unit and sequence stay loaded, so re-opening the same chapter
    /// resumes without a refetch. Stopped is not discarded.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            if state.active_index.is_none() && !state.playing {
                return;
            }
            state.active_index = None;
            state.playing = false;
        }

        debug!("Session closed");
        self.events.emit(CoreEvent::Player(PlayerEvent::Closed)).ok();
    }

    /// Flip the auto-cascade preference and persist it.
    ///
    /// Returns the new value. A persistence failure is logged and does not
    /// revert the in-memory flip.
    pub async fn toggle_auto_cascade(&self) -> bool {
        let enabled = {
            let mut state = self.state.lock();
            state.auto_cascade = !state.auto_cascade;
            state.auto_cascade
        };

        if let Err(e) = self.settings.set_bool(AUTO_CASCADE_KEY, enabled).await {
            warn!(error = %e, "Could not persist auto-cascade preference");
        }

        self.events
            .emit(CoreEvent::Player(PlayerEvent::AutoCascadeChanged { enabled }))
            .ok();
        enabled
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SessionStore")
            .field("unit", &state.unit.as_ref().map(|u| u.id))
            .field("segments", &state.segments.len())
            .field("active_index", &state.active_index)
            .field("playing", &state.playing)
            .field("auto_cascade", &state.auto_cascade)
            .finish()
    }
}
