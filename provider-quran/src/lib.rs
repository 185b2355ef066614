//! # Quran Content Provider
//!
//! Implements the [`ContentSource`](bridge_traits::ContentSource) trait
//! against the upstream Quran content API.
//!
//! ## Overview
//!
//! The provider fetches a chapter's verses (native text, translation,
//! per-voice audio locators) over HTTP, validates the raw response into
//! explicit DTOs, and converts them to the boundary payload types the
//! playback core consumes. The lead-in (bismillah) audio locator is resolved
//! per recitation voice behind a small LRU cache.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::QuranContentSource;
pub use error::{QuranProviderError, Result};
