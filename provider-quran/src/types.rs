//! Quran content API response types
//!
//! Data structures for deserializing upstream content API responses. These
//! are the raw wire shapes; `connector` validates them before converting to
//! the boundary payload types in `bridge_traits::content`, so a schema drift
//! upstream fails loudly here instead of corrupting playback state.

use serde::{Deserialize, Serialize};

/// One verse as returned by the content API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerseDto {
    /// Verse number within its chapter (1-based)
    pub verse_number: u16,

    /// Native-script verse text
    pub text: String,

    /// Translation text
    pub translation: String,

    /// Primary audio locator for the requested voice
    pub audio_url: String,

    /// Alternate recitation locators
    #[serde(default)]
    pub alternate_audio_urls: Vec<String>,
}

/// Chapter response from the content API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDto {
    /// Chapter number (1..=114)
    pub chapter: u16,

    /// Native-script chapter name
    pub name_arabic: String,

    /// Transliterated chapter name
    pub name_transliterated: String,

    /// Verses in verse order
    pub verses: Vec<VerseDto>,
}

/// Lead-in (bismillah) audio response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInDto {
    /// Primary audio locator for the requested voice
    pub audio_url: String,

    /// Alternate recitation locators
    #[serde(default)]
    pub alternate_audio_urls: Vec<String>,
}
