//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host that
//! embeds the recitation playback core.
//!
//! ## Overview
//!
//! This crate defines the contract between the core library and host-specific
//! implementations. Each trait represents a capability that the core requires
//! but that is provided differently per host (desktop shell, server-rendered
//! web frontend, mobile wrapper).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with retry and TLS
//!
//! ### Audio
//! - [`AudioOutput`](audio::AudioOutput) - The single physical audio output
//!   channel and its event stream
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Key-value preferences storage
//!
//! ### Navigation
//! - [`Navigator`](navigation::Navigator) - Route changes requested by the core
//!
//! ### Content
//! - [`ContentSource`](content::ContentSource) - Chapter verse data and
//!   lead-in audio resolution
//!
//! ## Fail-Fast Strategy
//!
//! The core fails fast with descriptive errors when a required capability is
//! missing; see `core-runtime::config` for the validation that enforces this.

pub mod audio;
pub mod content;
pub mod error;
pub mod http;
pub mod navigation;
pub mod storage;

pub use audio::{AudioOutput, AudioOutputEvent};
pub use content::{ChapterPayload, ContentSource, LeadInAudio, VersePayload};
pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use navigation::Navigator;
pub use storage::SettingsStore;
