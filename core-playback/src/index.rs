//! Displayed-position to active-index mapping.
//!
//! When a session sequence starts with a synthesized lead-in, every surface
//! that shows verse positions (reading views, the footer player) numbers
//! segments without it, while the session's active index counts it. These
//! two functions are the only place that offset lives.

use crate::types::Segment;

/// Whether a sequence starts with a lead-in segment.
pub fn has_lead_in(segments: &[Segment]) -> bool {
    segments.first().is_some_and(Segment::is_lead_in)
}

/// Map a displayed verse position to a session active index.
pub fn to_active_index(displayed: usize, has_lead_in: bool) -> usize {
    displayed + usize::from(has_lead_in)
}

/// Map a session active index back to a displayed verse position.
///
/// Returns `None` for the lead-in itself, which has no displayed position.
pub fn to_displayed_index(active: usize, has_lead_in: bool) -> Option<usize> {
    if has_lead_in {
        active.checked_sub(1)
    } else {
        Some(active)
    }
}
