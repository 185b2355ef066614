//! Content-Fetch Abstraction
//!
//! The continuity controller needs chapter verse data when it cascades from
//! the last segment of one chapter into the next, and it needs the lead-in
//! (bismillah) audio locator for the active recitation voice. Both are
//! provided through [`ContentSource`], implemented against the upstream
//! content API by a provider crate.
//!
//! The payload types here are the validated boundary representation: a
//! provider parses and checks the raw API response into these shapes, so
//! upstream schema drift cannot silently corrupt the playback core's index
//! invariants.

use async_trait::async_trait;

use crate::error::Result;

/// One verse of a chapter, in verse order, ready for playback assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersePayload {
    /// Verse number within its chapter (1-based; 0 never appears here).
    pub ordinal: u16,
    /// Native-script verse text.
    pub text: String,
    /// Translation text.
    pub translation: String,
    /// Primary audio locator for the active voice.
    pub audio_url: String,
    /// Alternate recitation locators, possibly empty.
    pub alternate_urls: Vec<String>,
}

/// A complete chapter as returned by the content collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterPayload {
    /// Chapter number, 1..=114.
    pub chapter: u16,
    /// Native-script chapter name.
    pub name: String,
    /// Transliterated chapter name.
    pub transliterated_name: String,
    /// Verses in verse order, never empty.
    pub verses: Vec<VersePayload>,
}

/// Audio locator for the fixed lead-in phrase, resolved per voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadInAudio {
    pub audio_url: String,
    pub alternate_urls: Vec<String>,
}

/// Chapter data and lead-in audio provider.
///
/// The continuity controller calls `fetch_chapter` exactly once per
/// cross-chapter cascade and treats any non-success outcome uniformly as a
/// fetch failure.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch a chapter's verses with translation and per-voice audio.
    async fn fetch_chapter(&self, chapter: u16, voice: &str) -> Result<ChapterPayload>;

    /// Resolve the lead-in audio locator for `voice`.
    ///
    /// Implementations may serve this from a short-lived cache keyed by
    /// voice, since the locator only changes when the voice does.
    async fn lead_in_audio(&self, voice: &str) -> Result<LeadInAudio>;
}
