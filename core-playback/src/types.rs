//! Session data model: content units, segments, and their assembly.
//!
//! A `ContentUnit` is what one playback session holds: either a single
//! chapter or a cross-chapter part. A `Segment` is one playable item,
//! ordinarily a verse, occasionally a synthesized lead-in carrying ordinal 0.
//! Both are immutable once built; the session replaces them wholesale.

use bridge_traits::content::ChapterPayload;
use serde::{Deserialize, Serialize};

/// Number of chapters in the scripture.
pub const CHAPTER_COUNT: u16 = 114;

/// Number of parts (juz) in the scripture.
pub const PART_COUNT: u16 = 30;

/// Chapter metadata carried by every segment.
///
/// Segments from multiple chapters can be concatenated when a part is
/// loaded, so each segment keeps a back-reference to its own chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMeta {
    /// Chapter number, 1..=114.
    pub chapter: u16,
    /// Native-script name.
    pub name: String,
    /// Transliterated name.
    pub transliterated_name: String,
}

/// The content unit loaded into a playback session.
///
/// Identity is a single integer field: chapters use positive identifiers
/// 1..=114, parts use the negated part number (-1..=-30) so both kinds stay
/// disjoint in the same field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    /// Positive chapter number or negated part number.
    pub id: i32,
    /// Native-script display name.
    pub name: String,
    /// Transliterated display name.
    pub transliterated_name: String,
    /// Number of real (non-lead-in) segments in the unit.
    pub segment_count: usize,
}

impl ContentUnit {
    /// Build the unit for a single chapter.
    pub fn chapter(meta: &ChapterMeta, segment_count: usize) -> Self {
        Self {
            id: i32::from(meta.chapter),
            name: meta.name.clone(),
            transliterated_name: meta.transliterated_name.clone(),
            segment_count,
        }
    }

    /// Build the unit for a part, identified by the negated part number.
    pub fn part(part: u16, name: impl Into<String>, segment_count: usize) -> Self {
        let name = name.into();
        Self {
            id: -i32::from(part),
            transliterated_name: name.clone(),
            name,
            segment_count,
        }
    }

    /// Whether this unit is a single chapter.
    pub fn is_chapter(&self) -> bool {
        self.id > 0
    }

    /// The chapter number, when this unit is a chapter.
    pub fn chapter_number(&self) -> Option<u16> {
        u16::try_from(self.id).ok().filter(|&c| c >= 1)
    }

    /// The part number, when this unit is a part.
    pub fn part_number(&self) -> Option<u16> {
        if self.id < 0 {
            u16::try_from(-self.id).ok()
        } else {
            None
        }
    }
}

/// One playable item in a session sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    /// Verse number within its chapter; 0 is reserved for a lead-in.
    pub ordinal: u16,
    /// Native-script text.
    pub text: String,
    /// Translation text.
    pub translation: String,
    /// Primary audio locator.
    pub audio_url: String,
    /// Alternate recitation locators.
    pub alternate_urls: Vec<String>,
    /// Chapter this segment belongs to.
    pub chapter: ChapterMeta,
}

impl Segment {
    /// Whether this segment is a synthesized lead-in.
    pub fn is_lead_in(&self) -> bool {
        self.ordinal == 0
    }
}

/// Assemble a fetched chapter into a content unit and its segments.
///
/// The returned sequence holds the chapter's verses only; lead-in
/// prepending is a policy decision made elsewhere.
pub fn build_chapter(payload: &ChapterPayload) -> (ContentUnit, Vec<Segment>) {
    let meta = ChapterMeta {
        chapter: payload.chapter,
        name: payload.name.clone(),
        transliterated_name: payload.transliterated_name.clone(),
    };

    let segments: Vec<Segment> = payload
        .verses
        .iter()
        .map(|v| Segment {
            ordinal: v.ordinal,
            text: v.text.clone(),
            translation: v.translation.clone(),
            audio_url: v.audio_url.clone(),
            alternate_urls: v.alternate_urls.clone(),
            chapter: meta.clone(),
        })
        .collect();

    let unit = ContentUnit::chapter(&meta, segments.len());
    (unit, segments)
}

/// Assemble a part (juz) from its chapter payloads, in reading order.
///
/// Callers pass the chapters already sliced to the part's verse range;
/// ordinals restart at each chapter boundary, which is the one place the
/// non-decreasing ordinal invariant is allowed to reset.
pub fn build_part(
    part: u16,
    name: impl Into<String>,
    chapters: &[ChapterPayload],
) -> (ContentUnit, Vec<Segment>) {
    let mut segments = Vec::new();
    for payload in chapters {
        let (_, mut chapter_segments) = build_chapter(payload);
        segments.append(&mut chapter_segments);
    }
    let unit = ContentUnit::part(part, name, segments.len());
    (unit, segments)
}
