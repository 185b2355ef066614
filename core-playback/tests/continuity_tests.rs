//! End-to-end tests for the playback continuity core: session adoption,
//! lead-in policy, toggle semantics, superseded-load discard, and the
//! cross-chapter cascade, exercised through hand-written bridge mocks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::content::{ChapterPayload, ContentSource, LeadInAudio, VersePayload};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::{AudioOutput, AudioOutputEvent, Navigator, SettingsStore};
use core_playback::{
    to_active_index, ContinuityController, ContentUnit, DeviceAdapter, PlayerPhase, SessionStore,
};
use core_runtime::events::{CascadeEvent, CoreEvent, EventBus};
use parking_lot::Mutex;
use tokio::sync::broadcast;

// ============================================================================
// Bridge mocks
// ============================================================================

struct MockAudioOutput {
    calls: Mutex<Vec<String>>,
    events: broadcast::Sender<AudioOutputEvent>,
}

impl MockAudioOutput {
    fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(32);
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            events,
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn load_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with("load:"))
            .count()
    }

    fn play_count(&self) -> usize {
        self.calls.lock().iter().filter(|c| *c == "play").count()
    }
}

#[async_trait]
impl AudioOutput for MockAudioOutput {
    async fn load(&self, url: &str) -> BridgeResult<()> {
        self.calls.lock().push(format!("load:{url}"));
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.calls.lock().push("play".to_string());
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.calls.lock().push("pause".to_string());
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        self.calls.lock().push(format!("seek:{}", position.as_millis()));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AudioOutputEvent> {
        self.events.subscribe()
    }
}

struct MockContentSource {
    chapters: HashMap<u16, ChapterPayload>,
    fail_fetch: AtomicBool,
    fail_lead_in: AtomicBool,
    fetch_count: AtomicUsize,
}

impl MockContentSource {
    fn new(chapters: Vec<ChapterPayload>) -> Arc<Self> {
        Arc::new(Self {
            chapters: chapters.into_iter().map(|c| (c.chapter, c)).collect(),
            fail_fetch: AtomicBool::new(false),
            fail_lead_in: AtomicBool::new(false),
            fetch_count: AtomicUsize::new(0),
        })
    }

    fn fail_next_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    fn fail_lead_in(&self) {
        self.fail_lead_in.store(true, Ordering::SeqCst);
    }

    fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for MockContentSource {
    async fn fetch_chapter(&self, chapter: u16, _voice: &str) -> BridgeResult<ChapterPayload> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.swap(false, Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("network unreachable".into()));
        }
        self.chapters
            .get(&chapter)
            .cloned()
            .ok_or_else(|| BridgeError::OperationFailed(format!("no chapter {chapter}")))
    }

    async fn lead_in_audio(&self, _voice: &str) -> BridgeResult<LeadInAudio> {
        if self.fail_lead_in.load(Ordering::SeqCst) {
            return Err(BridgeError::OperationFailed("voice has no lead-in".into()));
        }
        Ok(LeadInAudio {
            audio_url: "https://cdn.test/bismillah.mp3".to_string(),
            alternate_urls: vec![],
        })
    }
}

struct MockNavigator {
    paths: Mutex<Vec<String>>,
}

impl MockNavigator {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            paths: Mutex::new(Vec::new()),
        })
    }

    fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }
}

#[async_trait]
impl Navigator for MockNavigator {
    async fn navigate(&self, path: &str) -> BridgeResult<()> {
        self.paths.lock().push(path.to_string());
        Ok(())
    }
}

struct MemorySettings {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(HashMap::new()),
        })
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
        self.values.lock().insert(key.into(), value.into());
        Ok(())
    }

    async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    async fn set_bool(&self, key: &str, value: bool) -> BridgeResult<()> {
        self.set_string(key, if value { "true" } else { "false" }).await
    }

    async fn get_bool(&self, key: &str) -> BridgeResult<Option<bool>> {
        Ok(self.values.lock().get(key).map(|v| v == "true"))
    }

    async fn delete(&self, key: &str) -> BridgeResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }

    async fn has_key(&self, key: &str) -> BridgeResult<bool> {
        Ok(self.values.lock().contains_key(key))
    }
}

// ============================================================================
// Harness
// ============================================================================

fn chapter_payload(chapter: u16, verse_count: u16) -> ChapterPayload {
    ChapterPayload {
        chapter,
        name: format!("chapter-{chapter}"),
        transliterated_name: format!("Chapter {chapter}"),
        verses: (1..=verse_count)
            .map(|n| VersePayload {
                ordinal: n,
                text: format!("verse {chapter}:{n}"),
                translation: format!("translation {chapter}:{n}"),
                audio_url: format!("https://cdn.test/{chapter}/{n}.mp3"),
                alternate_urls: vec![],
            })
            .collect(),
    }
}

struct Harness {
    controller: ContinuityController,
    store: Arc<SessionStore>,
    output: Arc<MockAudioOutput>,
    content: Arc<MockContentSource>,
    navigator: Arc<MockNavigator>,
    events: EventBus,
}

fn harness(chapters: Vec<ChapterPayload>) -> Harness {
    let events = EventBus::new(64);
    let store = Arc::new(SessionStore::new(MemorySettings::new(), events.clone()));
    let output = MockAudioOutput::new();
    let adapter = Arc::new(DeviceAdapter::new(
        output.clone(),
        store.clone(),
        events.clone(),
    ));
    let content = MockContentSource::new(chapters);
    let navigator = MockNavigator::new();
    let controller = ContinuityController::new(
        store.clone(),
        adapter,
        content.clone(),
        navigator.clone(),
        events.clone(),
        "alafasy",
    );

    Harness {
        controller,
        store,
        output,
        content,
        navigator,
        events,
    }
}

fn built(payload: &ChapterPayload) -> (ContentUnit, Vec<core_playback::Segment>) {
    core_playback::build_chapter(payload)
}

fn ended(url: impl Into<String>) -> AudioOutputEvent {
    AudioOutputEvent::Ended { url: url.into() }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn active_index_offsets_displayed_position_by_lead_in() {
    let h = harness(vec![]);
    let payload = chapter_payload(2, 5);
    let (unit, segments) = built(&payload);

    h.controller.play_all(unit, segments).await.unwrap();

    let session = h.store.snapshot();
    assert_eq!(session.segments.len(), 6);
    assert!(session.segments[0].is_lead_in());

    for displayed in 0..5usize {
        let active = to_active_index(displayed, true);
        assert_eq!(active, displayed + 1);
        assert_eq!(session.segments[active].ordinal as usize, displayed + 1);
    }

    // Moving within the sequence preserves the mapping.
    h.store.set_active_index(to_active_index(3, true));
    assert_eq!(h.store.snapshot().active_segment().unwrap().ordinal, 4);
}

#[tokio::test]
async fn opening_and_omitting_chapters_never_get_a_lead_in() {
    for chapter in [1u16, 9] {
        let h = harness(vec![]);
        let payload = chapter_payload(chapter, 7);
        let (unit, segments) = built(&payload);

        h.controller.play_all(unit, segments).await.unwrap();

        let session = h.store.snapshot();
        assert_eq!(session.segments.len(), 7);
        assert_eq!(session.segments[0].ordinal, 1);
    }

    // Every other chapter does get one.
    let h = harness(vec![]);
    let payload = chapter_payload(114, 6);
    let (unit, segments) = built(&payload);
    h.controller.play_all(unit, segments).await.unwrap();
    assert!(h.store.snapshot().segments[0].is_lead_in());
}

#[tokio::test]
async fn parts_follow_their_own_lead_in_rule() {
    // A part opening at a chapter's first verse gets the lead-in.
    let h = harness(vec![]);
    let (unit, segments) =
        core_playback::build_part(30, "Juz 30", &[chapter_payload(78, 4), chapter_payload(79, 3)]);
    assert_eq!(unit.id, -30);
    h.controller.play_all(unit, segments).await.unwrap();
    assert!(h.store.snapshot().segments[0].is_lead_in());

    // A part opening mid-chapter does not.
    let h = harness(vec![]);
    let mut opening = chapter_payload(2, 3);
    for verse in &mut opening.verses {
        verse.ordinal += 141;
    }
    let (unit, segments) = core_playback::build_part(2, "Juz 2", &[opening]);
    h.controller.play_all(unit, segments).await.unwrap();
    assert_eq!(h.store.snapshot().segments[0].ordinal, 142);
}

#[tokio::test]
async fn missing_lead_in_degrades_to_verses_only() {
    let h = harness(vec![]);
    h.content.fail_lead_in();
    let (unit, segments) = built(&chapter_payload(2, 5));

    h.controller.play_all(unit, segments).await.unwrap();

    // Playback proceeds on the verses alone.
    let session = h.store.snapshot();
    assert_eq!(session.segments.len(), 5);
    assert_eq!(session.segments[0].ordinal, 1);
    assert!(session.playing);
    assert_eq!(h.controller.phase(), PlayerPhase::Playing);
}

#[tokio::test]
async fn replaying_the_active_segment_toggles_without_reload() {
    let h = harness(vec![]);
    let payload = chapter_payload(1, 7);
    let (unit, segments) = built(&payload);

    h.controller
        .play_segment(unit.clone(), segments.clone(), 0)
        .await
        .unwrap();
    assert!(h.store.snapshot().playing);
    assert_eq!(h.output.load_count(), 1);
    assert_eq!(h.controller.phase(), PlayerPhase::Playing);

    h.controller
        .play_segment(unit.clone(), segments.clone(), 0)
        .await
        .unwrap();
    assert!(!h.store.snapshot().playing);
    assert_eq!(h.controller.phase(), PlayerPhase::Paused);

    h.controller.play_segment(unit, segments, 0).await.unwrap();
    assert!(h.store.snapshot().playing);

    // Same locator throughout: one load, never a reload.
    assert_eq!(h.output.load_count(), 1);
}

#[tokio::test]
async fn events_for_superseded_loads_are_discarded() {
    let h = harness(vec![]);
    let (unit_a, segments_a) = built(&chapter_payload(3, 4));
    let (unit_b, segments_b) = built(&chapter_payload(4, 4));
    let stale_url = segments_a[0].audio_url.clone();
    let current_url = segments_b[0].audio_url.clone();

    h.controller.play_segment(unit_a, segments_a, 0).await.unwrap();
    // Supersede before the first load signals ready.
    h.controller
        .play_segment(unit_b.clone(), segments_b, 0)
        .await
        .unwrap();

    let plays_before = h.output.play_count();

    h.controller
        .handle_device_event(AudioOutputEvent::Ready {
            url: stale_url.clone(),
            duration: Some(Duration::from_secs(4)),
        })
        .await
        .unwrap();
    h.controller.handle_device_event(ended(stale_url)).await.unwrap();

    // The stale ready must not start audio, and the stale ended must not
    // advance the session.
    assert_eq!(h.output.play_count(), plays_before);
    let session = h.store.snapshot();
    assert_eq!(session.unit.as_ref().map(|u| u.id), Some(unit_b.id));
    assert_eq!(session.active_index, Some(0));
    assert!(session.playing);
    assert_eq!(session.active_segment().unwrap().audio_url, current_url);
}

#[tokio::test]
async fn ready_respects_a_pause_issued_during_load() {
    let h = harness(vec![]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let url = segments[0].audio_url.clone();

    h.controller
        .play_segment(unit.clone(), segments.clone(), 0)
        .await
        .unwrap();
    // Pause while the load is still in flight.
    h.controller.play_segment(unit, segments, 0).await.unwrap();

    h.controller
        .handle_device_event(AudioOutputEvent::Ready {
            url,
            duration: None,
        })
        .await
        .unwrap();

    // Loaded but silent.
    assert_eq!(h.output.play_count(), 0);
    assert!(!h.store.snapshot().playing);
}

#[tokio::test]
async fn finishing_a_mid_sequence_segment_advances_within_the_unit() {
    let h = harness(vec![]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let first_url = segments[0].audio_url.clone();

    h.controller.play_segment(unit, segments, 0).await.unwrap();
    h.controller.handle_device_event(ended(first_url)).await.unwrap();

    let session = h.store.snapshot();
    assert_eq!(session.active_index, Some(1));
    assert!(session.playing);
    assert_eq!(h.output.load_count(), 2);
}

#[tokio::test]
async fn finishing_the_last_segment_cascades_into_the_next_chapter() {
    let h = harness(vec![chapter_payload(2, 5)]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let last_url = segments[6].audio_url.clone();
    let mut sub = h.events.subscribe();

    h.controller.play_segment(unit, segments, 6).await.unwrap();
    h.controller.handle_device_event(ended(last_url)).await.unwrap();

    assert_eq!(h.content.fetch_count(), 1);

    let session = h.store.snapshot();
    assert_eq!(session.unit.as_ref().map(|u| u.id), Some(2));
    // Chapter 2 gets a lead-in: 5 verses plus the synthesized segment.
    assert_eq!(session.segments.len(), 6);
    assert!(session.segments[0].is_lead_in());
    assert_eq!(session.active_index, Some(0));
    assert!(session.playing);

    assert_eq!(h.navigator.paths(), vec!["/surah/2".to_string()]);
    assert_eq!(h.controller.phase(), PlayerPhase::Playing);

    // Started and Completed cascade events were published.
    let mut started = false;
    let mut completed = false;
    while let Ok(event) = sub.try_recv() {
        match event {
            CoreEvent::Cascade(CascadeEvent::Started {
                from_chapter: 1,
                to_chapter: 2,
            }) => started = true,
            CoreEvent::Cascade(CascadeEvent::Completed {
                chapter: 2,
                segment_count: 6,
                lead_in: true,
            }) => completed = true,
            _ => {}
        }
    }
    assert!(started);
    assert!(completed);
}

#[tokio::test]
async fn cascading_without_a_lead_in_when_resolution_fails() {
    let h = harness(vec![chapter_payload(2, 5)]);
    h.content.fail_lead_in();
    let (unit, segments) = built(&chapter_payload(1, 7));
    let last_url = segments[6].audio_url.clone();
    let mut sub = h.events.subscribe();

    h.controller.play_segment(unit, segments, 6).await.unwrap();
    h.controller.handle_device_event(ended(last_url)).await.unwrap();

    let session = h.store.snapshot();
    assert_eq!(session.unit.as_ref().map(|u| u.id), Some(2));
    assert_eq!(session.segments.len(), 5);
    assert_eq!(session.segments[0].ordinal, 1);
    assert!(session.playing);

    // The completion event reports the omission.
    let mut completed = false;
    while let Ok(event) = sub.try_recv() {
        if matches!(
            event,
            CoreEvent::Cascade(CascadeEvent::Completed {
                chapter: 2,
                segment_count: 5,
                lead_in: false,
            })
        ) {
            completed = true;
        }
    }
    assert!(completed);
}

#[tokio::test]
async fn auto_cascade_disabled_closes_without_fetching() {
    let h = harness(vec![chapter_payload(2, 5)]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let last_url = segments[6].audio_url.clone();

    h.controller.toggle_auto_cascade().await;
    h.controller.play_segment(unit, segments, 6).await.unwrap();
    h.controller.handle_device_event(ended(last_url)).await.unwrap();

    let session = h.store.snapshot();
    assert_eq!(session.active_index, None);
    assert!(!session.playing);
    // Stopped, not discarded.
    assert_eq!(session.unit.as_ref().map(|u| u.id), Some(1));
    assert_eq!(session.segments.len(), 7);

    assert_eq!(h.content.fetch_count(), 0);
    assert_eq!(h.controller.phase(), PlayerPhase::Idle);
}

#[tokio::test]
async fn the_final_chapter_never_cascades() {
    let h = harness(vec![]);
    let (unit, segments) = built(&chapter_payload(114, 6));
    let last_url = segments[5].audio_url.clone();

    h.controller.play_segment(unit, segments, 5).await.unwrap();
    h.controller.handle_device_event(ended(last_url)).await.unwrap();

    assert_eq!(h.content.fetch_count(), 0);
    assert_eq!(h.store.snapshot().active_index, None);
}

#[tokio::test]
async fn finishing_a_part_closes_instead_of_cascading() {
    // Parts have no "next chapter": the boundary policy stops even with
    // auto-cascade left enabled.
    let h = harness(vec![chapter_payload(80, 4)]);
    let (unit, segments) =
        core_playback::build_part(30, "Juz 30", &[chapter_payload(78, 2), chapter_payload(79, 2)]);
    let last = segments.len() - 1;
    let last_url = segments[last].audio_url.clone();

    h.controller.play_segment(unit, segments, last).await.unwrap();
    assert!(h.store.snapshot().auto_cascade);

    h.controller.handle_device_event(ended(last_url)).await.unwrap();

    assert_eq!(h.content.fetch_count(), 0);
    let session = h.store.snapshot();
    assert_eq!(session.active_index, None);
    assert!(!session.playing);
    assert_eq!(session.unit.as_ref().map(|u| u.id), Some(-30));
    assert_eq!(h.controller.phase(), PlayerPhase::Idle);
}

#[tokio::test]
async fn navigation_is_bounds_checked_at_both_ends() {
    let h = harness(vec![]);
    let (unit, segments) = built(&chapter_payload(1, 3));

    h.controller.play_segment(unit, segments, 0).await.unwrap();
    let calls_before = h.output.calls().len();

    h.controller.play_previous().await.unwrap();
    // No store mutation and no device interaction past the boundary.
    assert_eq!(h.store.snapshot().active_index, Some(0));
    assert_eq!(h.output.calls().len(), calls_before);

    h.store.set_active_index(2);
    let calls_before = h.output.calls().len();
    h.controller.play_next().await.unwrap();
    assert_eq!(h.store.snapshot().active_index, Some(2));
    assert_eq!(h.output.calls().len(), calls_before);
}

#[tokio::test]
async fn cascade_fetch_failure_closes_the_session_and_surfaces_an_error() {
    let h = harness(vec![chapter_payload(2, 5)]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let last_url = segments[6].audio_url.clone();
    let mut sub = h.events.subscribe();

    h.content.fail_next_fetch();
    h.controller.play_segment(unit, segments, 6).await.unwrap();

    let result = h.controller.handle_device_event(ended(last_url)).await;
    assert!(result.is_err());

    let session = h.store.snapshot();
    assert_eq!(session.active_index, None);
    assert!(!session.playing);
    // Nothing half-adopted: the finished chapter is still the loaded unit.
    assert_eq!(session.unit.as_ref().map(|u| u.id), Some(1));

    let mut failed = false;
    while let Ok(event) = sub.try_recv() {
        if matches!(
            event,
            CoreEvent::Cascade(CascadeEvent::Failed { chapter: 2, .. })
        ) {
            failed = true;
        }
    }
    assert!(failed);
    assert_eq!(h.controller.phase(), PlayerPhase::Idle);
}

#[tokio::test]
async fn device_errors_surface_without_clearing_the_session() {
    let h = harness(vec![]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let url = segments[0].audio_url.clone();
    let mut sub = h.events.subscribe();

    h.controller.play_segment(unit, segments, 0).await.unwrap();
    h.controller
        .handle_device_event(AudioOutputEvent::Error {
            url,
            message: "decode failure".to_string(),
        })
        .await
        .unwrap();

    // The loaded unit and active index stay in place.
    let session = h.store.snapshot();
    assert_eq!(session.active_index, Some(0));
    assert!(session.unit.is_some());

    let mut surfaced = false;
    while let Ok(event) = sub.try_recv() {
        if matches!(
            event,
            CoreEvent::Player(core_runtime::events::PlayerEvent::Error { recoverable: true, .. })
        ) {
            surfaced = true;
        }
    }
    assert!(surfaced);
}

#[tokio::test]
async fn progress_events_publish_normalized_position() {
    let h = harness(vec![]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let url = segments[0].audio_url.clone();
    let mut sub = h.events.subscribe();

    h.controller.play_segment(unit, segments, 0).await.unwrap();
    h.controller
        .handle_device_event(AudioOutputEvent::Progress {
            url,
            position: Duration::from_secs(3),
            duration: Some(Duration::from_secs(12)),
        })
        .await
        .unwrap();

    let mut percent = None;
    while let Ok(event) = sub.try_recv() {
        if let CoreEvent::Player(core_runtime::events::PlayerEvent::PositionChanged {
            percent: p,
            ..
        }) = event
        {
            percent = Some(p);
        }
    }
    assert_eq!(percent, Some(25));
}

#[tokio::test]
async fn sub_millisecond_durations_do_not_break_the_event_pump() {
    let h = harness(vec![]);
    let (unit, segments) = built(&chapter_payload(1, 7));
    let url = segments[0].audio_url.clone();
    let mut sub = h.events.subscribe();

    h.controller.play_segment(unit, segments, 0).await.unwrap();
    h.controller
        .handle_device_event(AudioOutputEvent::Progress {
            url,
            position: Duration::from_secs(1),
            duration: Some(Duration::from_micros(500)),
        })
        .await
        .unwrap();

    let mut percent = None;
    while let Ok(event) = sub.try_recv() {
        if let CoreEvent::Player(core_runtime::events::PlayerEvent::PositionChanged {
            percent: p,
            ..
        }) = event
        {
            percent = Some(p);
        }
    }
    assert_eq!(percent, Some(100));
}
