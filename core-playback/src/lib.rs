//! # Playback Continuity Core
//!
//! The cross-page audio session for scripture recitation: what plays, in
//! what order, how it survives navigation, and how it cascades from one
//! chapter into the next.
//!
//! ## Overview
//!
//! Three cooperating components:
//!
//! - [`SessionStore`] — sole authority over the playback session state
//!   (content unit, segment sequence, active index, playing flag, the
//!   persisted auto-cascade preference).
//! - [`DeviceAdapter`] — owns the single audio output resource, keeps it
//!   synchronized with the store, and discards events from superseded
//!   loads.
//! - [`ContinuityController`] — the policy layer: lead-in synthesis and
//!   omission, within-unit advancing, and cross-chapter cascading.
//!
//! UI surfaces subscribe to the shared event bus for rendering and issue
//! only play/toggle/seek/close requests; they hold no playback logic.

pub mod adapter;
pub mod controller;
pub mod error;
pub mod index;
pub mod leadin;
pub mod session;
pub mod types;

pub use adapter::{DeviceAdapter, DeviceSignal};
pub use controller::{ContinuityController, PlayerPhase};
pub use error::{PlayerError, Result};
pub use index::{has_lead_in, to_active_index, to_displayed_index};
pub use leadin::{chapter_needs_lead_in, LEAD_IN_OMITTING_CHAPTER, OPENING_CHAPTER};
pub use session::{PlaybackSession, SessionStore, AUTO_CASCADE_KEY};
pub use types::{
    build_chapter, build_part, ChapterMeta, ContentUnit, Segment, CHAPTER_COUNT, PART_COUNT,
};
