//! # Core Configuration Module
//!
//! Provides configuration management for the recitation playback core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`CoreConfig`] holding the bridge implementations and settings the core
//! needs. It enforces fail-fast validation so a missing required capability
//! surfaces as a descriptive error at startup, not a panic mid-playback.
//!
//! ## Required Dependencies
//!
//! - `SettingsStore` - persistence for the auto-cascade preference
//! - `Navigator` - route changes after a chapter cascade
//!
//! ## Optional Dependencies
//!
//! - `HttpClient` - content API access (desktop default: reqwest, injected
//!   by the facade crate when the `desktop` feature is enabled)
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .settings_store(Arc::new(my_settings))
//!     .navigator(Arc::new(my_navigator))
//!     .default_voice("alafasy")
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, Navigator, SettingsStore};
use std::sync::Arc;

use crate::events::DEFAULT_EVENT_BUFFER_SIZE;

/// Default base URL of the upstream content API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.quran.com/api/v4";

/// Default recitation voice identifier.
pub const DEFAULT_VOICE: &str = "alafasy";

/// Core configuration for the recitation playback core.
///
/// Use [`CoreConfig::builder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Base URL of the upstream content API
    pub api_base_url: String,

    /// Recitation voice used until the user selects another
    pub default_voice: String,

    /// Buffer size of the event bus channel
    pub event_buffer: usize,

    /// HTTP client for content API requests (optional with desktop default)
    pub http_client: Option<Arc<dyn HttpClient>>,

    /// Preference storage (required)
    pub settings_store: Arc<dyn SettingsStore>,

    /// Route-change collaborator (required)
    pub navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url)
            .field("default_voice", &self.default_voice)
            .field("event_buffer", &self.event_buffer)
            .field(
                "http_client",
                &self.http_client.as_ref().map(|_| "HttpClient { ... }"),
            )
            .field("settings_store", &"SettingsStore { ... }")
            .field("navigator", &"Navigator { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            return Err(Error::Config("API base URL cannot be empty".to_string()));
        }

        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "API base URL must be http(s), got '{}'",
                self.api_base_url
            )));
        }

        if self.default_voice.is_empty() {
            return Err(Error::Config(
                "Default voice identifier cannot be empty".to_string(),
            ));
        }

        if self.event_buffer == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    default_voice: Option<String>,
    event_buffer: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl CoreConfigBuilder {
    /// Sets the content API base URL (defaults to [`DEFAULT_API_BASE_URL`]).
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the default recitation voice (defaults to [`DEFAULT_VOICE`]).
    pub fn default_voice(mut self, voice: impl Into<String>) -> Self {
        self.default_voice = Some(voice.into());
        self
    }

    /// Sets the event bus buffer size.
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = Some(capacity);
        self
    }

    /// Injects a custom HTTP client.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Injects the preference storage (required).
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Injects the route-change collaborator (required).
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityMissing`] with an actionable message when a
    /// required bridge was not provided, or [`Error::Config`] when a setting
    /// is invalid.
    pub fn build(self) -> Result<CoreConfig> {
        let settings_store = self.settings_store.ok_or_else(|| Error::CapabilityMissing {
            capability: "SettingsStore".to_string(),
            message: "A SettingsStore implementation is required to persist the auto-cascade \
                      preference. Desktop: inject bridge_desktop::SqliteSettingsStore. \
                      Web: inject a localStorage-backed store."
                .to_string(),
        })?;

        let navigator = self.navigator.ok_or_else(|| Error::CapabilityMissing {
            capability: "Navigator".to_string(),
            message: "A Navigator implementation is required so the continuity controller can \
                      follow a chapter cascade with a route change. Inject the host's router \
                      adapter."
                .to_string(),
        })?;

        let config = CoreConfig {
            api_base_url: self
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            default_voice: self
                .default_voice
                .unwrap_or_else(|| DEFAULT_VOICE.to_string()),
            event_buffer: self.event_buffer.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            http_client: self.http_client,
            settings_store,
            navigator,
        };

        config.validate()?;
        Ok(config)
    }
}
