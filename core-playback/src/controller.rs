//! Continuity controller.
//!
//! Policy layer over the session store and device adapter. This is the
//! only component that knows about chapter boundaries, lead-in synthesis,
//! and the auto-cascade preference. UI surfaces call its operations;
//! device events arrive through [`handle_device_event`] and drive the
//! advance-or-cascade decision at segment boundaries.
//!
//! [`handle_device_event`]: ContinuityController::handle_device_event

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::{AudioOutputEvent, ContentSource, Navigator};
use core_runtime::events::{CascadeEvent, CoreEvent, EventBus, PlayerEvent};
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::adapter::{DeviceAdapter, DeviceSignal};
use crate::error::{PlayerError, Result};
use crate::leadin;
use crate::session::SessionStore;
use crate::types::{build_chapter, ContentUnit, Segment, CHAPTER_COUNT};

/// Route prefix for chapter reading pages, used after a cascade.
const CHAPTER_ROUTE_PREFIX: &str = "/surah";

/// Conceptual controller phase, layered on top of the session state.
///
/// `Advancing` and `CascadeLoading` are transient; the UI uses
/// `CascadeLoading` to show a loading affordance on the next-chapter
/// control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    /// No active segment.
    Idle,
    /// A sequence is loaded and playing.
    Playing,
    /// A sequence is loaded and paused.
    Paused,
    /// The last device event finished a segment; deciding what is next.
    Advancing,
    /// Fetching the next chapter before resuming playback.
    CascadeLoading,
}

/// Ordering and cascading policy for the playback session.
pub struct ContinuityController {
    store: Arc<SessionStore>,
    adapter: Arc<DeviceAdapter>,
    content: Arc<dyn ContentSource>,
    navigator: Arc<dyn Navigator>,
    events: EventBus,
    voice: Mutex<String>,
    phase: Mutex<PlayerPhase>,
}

impl ContinuityController {
    pub fn new(
        store: Arc<SessionStore>,
        adapter: Arc<DeviceAdapter>,
        content: Arc<dyn ContentSource>,
        navigator: Arc<dyn Navigator>,
        events: EventBus,
        voice: impl Into<String>,
    ) -> Self {
        Self {
            store,
            adapter,
            content,
            navigator,
            events,
            voice: Mutex::new(voice.into()),
            phase: Mutex::new(PlayerPhase::Idle),
        }
    }

    /// Current controller phase.
    pub fn phase(&self) -> PlayerPhase {
        *self.phase.lock()
    }

    /// The active recitation voice.
    pub fn voice(&self) -> String {
        self.voice.lock().clone()
    }

    /// Change the recitation voice for subsequent fetches.
    ///
    /// Already-loaded segments keep their locators; the new voice takes
    /// effect on the next `play_all` or cascade.
    pub fn set_voice(&self, voice: impl Into<String>) {
        *self.voice.lock() = voice.into();
    }

    fn set_phase(&self, phase: PlayerPhase) {
        *self.phase.lock() = phase;
    }

    /// Play one segment of a unit, or toggle when it is already active.
    ///
    /// Re-invoking play on the already-active segment is a pause/resume
    /// gesture, not a reload.
    #[instrument(skip(self, unit, segments), fields(unit_id = unit.id))]
    pub async fn play_segment(
        &self,
        unit: ContentUnit,
        segments: Vec<Segment>,
        index: usize,
    ) -> Result<()> {
        let session = self.store.snapshot();
        let same_segment = session.unit.as_ref().map(|u| u.id) == Some(unit.id)
            && session.active_index == Some(index);

        if same_segment {
            let playing = !session.playing;
            self.store.set_playing(playing);
            self.set_phase(if playing {
                PlayerPhase::Playing
            } else {
                PlayerPhase::Paused
            });
        } else {
            if index >= segments.len() {
                return Err(PlayerError::Internal(format!(
                    "segment index {} out of range for {} segments",
                    index,
                    segments.len()
                )));
            }
            self.store.adopt(unit, segments, index);
            self.set_phase(PlayerPhase::Playing);
        }

        self.adapter.sync().await
    }

    /// Play a whole unit from its first segment.
    ///
    /// Prepends a synthesized lead-in when the unit's opening warrants
    /// one. A failed lead-in resolution degrades to playing without it
    /// rather than blocking playback.
    #[instrument(skip(self, unit, segments), fields(unit_id = unit.id))]
    pub async fn play_all(&self, unit: ContentUnit, mut segments: Vec<Segment>) -> Result<()> {
        let Some(first) = segments.first() else {
            return Err(PlayerError::Internal("empty segment sequence".to_string()));
        };
        let wants_lead_in = leadin::needs_lead_in(&unit, first);
        let first_chapter = first.chapter.clone();

        if wants_lead_in {
            let voice = self.voice();
            match self.content.lead_in_audio(&voice).await {
                Ok(audio) => {
                    segments.insert(0, leadin::lead_in_segment(&first_chapter, &audio));
                }
                Err(e) => {
                    warn!(voice = %voice, error = %e, "Lead-in unavailable, playing without it");
                }
            }
        }

        self.store.adopt(unit, segments, 0);
        self.set_phase(PlayerPhase::Playing);
        self.adapter.sync().await
    }

    /// Toggle play/pause on the current segment.
    pub async fn toggle_play(&self) -> Result<()> {
        let session = self.store.snapshot();
        if session.active_index.is_none() {
            return Ok(());
        }
        let playing = !session.playing;
        self.store.set_playing(playing);
        self.set_phase(if playing {
            PlayerPhase::Playing
        } else {
            PlayerPhase::Paused
        });
        self.adapter.sync().await
    }

    /// Advance to the next segment; no-op at the last one.
    pub async fn play_next(&self) -> Result<()> {
        let session = self.store.snapshot();
        let Some(index) = session.active_index else {
            return Ok(());
        };
        if index + 1 >= session.segments.len() {
            return Ok(());
        }
        self.store.set_active_index(index + 1);
        self.set_phase(PlayerPhase::Playing);
        self.adapter.sync().await
    }

    /// Step back to the previous segment; no-op at the first one.
    pub async fn play_previous(&self) -> Result<()> {
        let session = self.store.snapshot();
        let Some(index) = session.active_index else {
            return Ok(());
        };
        let Some(previous) = index.checked_sub(1) else {
            return Ok(());
        };
        self.store.set_active_index(previous);
        self.set_phase(PlayerPhase::Playing);
        self.adapter.sync().await
    }

    /// Seek within the active segment.
    pub async fn seek(&self, position: Duration) -> Result<()> {
        self.adapter.seek(position).await
    }

    /// Close the session and quiesce the device.
    pub async fn close(&self) -> Result<()> {
        self.store.close();
        self.set_phase(PlayerPhase::Idle);
        self.adapter.sync().await
    }

    /// Flip the persisted auto-cascade preference.
    pub async fn toggle_auto_cascade(&self) -> bool {
        self.store.toggle_auto_cascade().await
    }

    /// Feed one device event through the adapter and apply boundary policy.
    ///
    /// This is the single dispatch point for resource events; hosts pump
    /// their device's event stream into it.
    pub async fn handle_device_event(&self, event: AudioOutputEvent) -> Result<()> {
        match self.adapter.handle_event(event).await? {
            Some(DeviceSignal::Finished) => self.on_segment_finished().await,
            None => Ok(()),
        }
    }

    /// Boundary policy: advance within the unit, cascade into the next
    /// chapter, or stop.
    async fn on_segment_finished(&self) -> Result<()> {
        let session = self.store.snapshot();
        let Some(index) = session.active_index else {
            return Ok(());
        };

        self.set_phase(PlayerPhase::Advancing);

        if index + 1 < session.segments.len() {
            self.store.set_active_index(index + 1);
            self.set_phase(PlayerPhase::Playing);
            return self.adapter.sync().await;
        }

        // Last segment of the sequence.
        let next_chapter = session
            .unit
            .as_ref()
            .and_then(ContentUnit::chapter_number)
            .filter(|&c| c < CHAPTER_COUNT)
            .map(|c| c + 1);

        match next_chapter {
            Some(chapter) if session.auto_cascade => self.cascade_into(chapter).await,
            _ => {
                debug!("Sequence finished without cascade");
                self.store.close();
                self.set_phase(PlayerPhase::Idle);
                self.adapter.sync().await
            }
        }
    }

    /// Fetch and adopt the next chapter after the current one finished.
    #[instrument(skip(self))]
    async fn cascade_into(&self, chapter: u16) -> Result<()> {
        self.set_phase(PlayerPhase::CascadeLoading);
        self.events
            .emit(CoreEvent::Cascade(CascadeEvent::Started {
                from_chapter: chapter - 1,
                to_chapter: chapter,
            }))
            .ok();

        let voice = self.voice();
        let payload = match self.content.fetch_chapter(chapter, &voice).await {
            Ok(payload) => payload,
            Err(e) => {
                let message = e.to_string();
                warn!(chapter = chapter, error = %message, "Cascade fetch failed");
                self.events
                    .emit(CoreEvent::Cascade(CascadeEvent::Failed {
                        chapter,
                        message: message.clone(),
                    }))
                    .ok();
                self.events
                    .emit(CoreEvent::Player(PlayerEvent::Error {
                        message: format!("Failed to load chapter {chapter}"),
                        recoverable: true,
                    }))
                    .ok();
                // Close rather than linger half-loaded; the UI returns to
                // a no-active-player rendering deterministically.
                self.store.close();
                self.set_phase(PlayerPhase::Idle);
                self.adapter.sync().await?;
                return Err(PlayerError::CascadeFetch { chapter, message });
            }
        };

        let (unit, mut segments) = build_chapter(&payload);

        let mut lead_in = false;
        let wants_lead_in = segments
            .first()
            .map(|first| (leadin::needs_lead_in(&unit, first), first.chapter.clone()));
        if let Some((true, first_chapter)) = wants_lead_in {
            match self.content.lead_in_audio(&voice).await {
                Ok(audio) => {
                    segments.insert(0, leadin::lead_in_segment(&first_chapter, &audio));
                    lead_in = true;
                }
                Err(e) => {
                    warn!(voice = %voice, error = %e, "Lead-in unavailable, cascading without it");
                }
            }
        }

        let segment_count = segments.len();
        self.store.adopt(unit, segments, 0);

        if let Err(e) = self
            .navigator
            .navigate(&format!("{CHAPTER_ROUTE_PREFIX}/{chapter}"))
            .await
        {
            // Navigation is a side effect; playback continues regardless.
            warn!(chapter = chapter, error = %e, "Route update failed after cascade");
        }

        self.set_phase(PlayerPhase::Playing);
        self.adapter.sync().await?;

        info!(chapter = chapter, segments = segment_count, "Cascade completed");
        self.events
            .emit(CoreEvent::Cascade(CascadeEvent::Completed {
                chapter,
                segment_count,
                lead_in,
            }))
            .ok();

        Ok(())
    }
}

impl std::fmt::Debug for ContinuityController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContinuityController")
            .field("phase", &self.phase())
            .field("voice", &self.voice())
            .finish()
    }
}
