//! Lead-in (bismillah) synthesis and omission rules.
//!
//! Chapter playback ordinarily opens with the bismillah phrase as a
//! synthesized segment carrying ordinal 0. Two chapters canonically omit
//! it: chapter 1, whose first verse already is the phrase, and chapter 9,
//! which traditionally opens without it.

use bridge_traits::content::LeadInAudio;

use crate::types::{ChapterMeta, ContentUnit, Segment};

/// The opening chapter; its first verse is the lead-in phrase itself.
pub const OPENING_CHAPTER: u16 = 1;

/// The chapter that traditionally opens without the lead-in.
pub const LEAD_IN_OMITTING_CHAPTER: u16 = 9;

/// Native-script text of the lead-in phrase.
pub const LEAD_IN_TEXT: &str = "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ";

/// Translation of the lead-in phrase.
pub const LEAD_IN_TRANSLATION: &str =
    "In the name of Allah, the Entirely Merciful, the Especially Merciful.";

/// Whether a chapter opens with a lead-in segment.
pub fn chapter_needs_lead_in(chapter: u16) -> bool {
    chapter != OPENING_CHAPTER && chapter != LEAD_IN_OMITTING_CHAPTER
}

/// Whether a full-unit playback sequence should be prefixed with a lead-in.
///
/// For a chapter unit the chapter rule applies directly. For a part the
/// lead-in is only warranted when the part opens exactly at a chapter's
/// first verse and that chapter is not one of the two exceptions; a part
/// starting mid-chapter never gets one.
pub fn needs_lead_in(unit: &ContentUnit, first_segment: &Segment) -> bool {
    if let Some(chapter) = unit.chapter_number() {
        return chapter_needs_lead_in(chapter);
    }
    first_segment.ordinal == 1 && chapter_needs_lead_in(first_segment.chapter.chapter)
}

/// Synthesize the lead-in segment for a chapter.
pub fn lead_in_segment(chapter: &ChapterMeta, audio: &LeadInAudio) -> Segment {
    Segment {
        ordinal: 0,
        text: LEAD_IN_TEXT.to_string(),
        translation: LEAD_IN_TRANSLATION.to_string(),
        audio_url: audio.audio_url.clone(),
        alternate_urls: audio.alternate_urls.clone(),
        chapter: chapter.clone(),
    }
}
