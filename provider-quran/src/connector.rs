//! Quran content API connector
//!
//! Implements the `ContentSource` trait against the upstream content API.

use async_trait::async_trait;
use bridge_traits::content::{ChapterPayload, ContentSource, LeadInAudio, VersePayload};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::{QuranProviderError, Result};
use crate::types::{ChapterDto, LeadInDto};

/// Number of chapters in the scripture.
const CHAPTER_COUNT: u16 = 114;

/// Capacity of the per-voice lead-in audio cache. Users rarely switch
/// between more than a couple of voices in one session.
const LEAD_IN_CACHE_CAPACITY: usize = 8;

/// Quran content API connector
///
/// Implements [`ContentSource`] for the upstream content API.
///
/// # Features
///
/// - Chapter verse data with translation and per-voice audio locators
/// - Retry with exponential backoff for transient statuses (via the
///   injected `HttpClient`'s retry policy)
/// - Payload validation before anything reaches the playback core
/// - LRU-cached lead-in audio resolution keyed by voice
///
/// # Example
///
/// ```ignore
/// use provider_quran::QuranContentSource;
/// use bridge_traits::content::ContentSource;
///
/// let source = QuranContentSource::new(http_client, base_url);
/// let chapter = source.fetch_chapter(2, "alafasy").await?;
/// ```
pub struct QuranContentSource {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Base URL of the content API
    base_url: String,

    /// Lead-in audio locators, keyed by voice identifier
    lead_in_cache: Mutex<LruCache<String, LeadInAudio>>,
}

impl QuranContentSource {
    /// Create a new connector.
    ///
    /// # Arguments
    ///
    /// * `http_client` - HTTP client implementation
    /// * `base_url` - Content API base URL, without trailing slash
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let capacity = NonZeroUsize::new(LEAD_IN_CACHE_CAPACITY).expect("capacity is non-zero");
        Self {
            http_client,
            base_url: base_url.into(),
            lead_in_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    async fn get_json(&self, url: String) -> Result<HttpResponse> {
        let request = HttpRequest::get(url).header("Accept", "application/json");

        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::default())
            .await
            .map_err(|e| QuranProviderError::NetworkError(e.to_string()))?;

        if !response.is_success() {
            return Err(QuranProviderError::ApiError {
                status_code: response.status,
                message: response.text().unwrap_or_else(|_| "<binary body>".into()),
            });
        }

        Ok(response)
    }

    /// Check a parsed chapter against the structural expectations the
    /// playback core's index invariants rely on.
    fn validate_chapter(requested: u16, dto: &ChapterDto) -> Result<()> {
        if dto.chapter != requested {
            return Err(QuranProviderError::InvalidPayload(format!(
                "requested chapter {} but response is for chapter {}",
                requested, dto.chapter
            )));
        }

        if dto.verses.is_empty() {
            return Err(QuranProviderError::InvalidPayload(format!(
                "chapter {} response contains no verses",
                dto.chapter
            )));
        }

        let mut expected = 1u16;
        for verse in &dto.verses {
            if verse.verse_number != expected {
                return Err(QuranProviderError::InvalidPayload(format!(
                    "chapter {}: expected verse {} but found {}",
                    dto.chapter, expected, verse.verse_number
                )));
            }
            if verse.audio_url.is_empty() {
                return Err(QuranProviderError::InvalidPayload(format!(
                    "chapter {} verse {}: empty audio locator",
                    dto.chapter, verse.verse_number
                )));
            }
            expected += 1;
        }

        Ok(())
    }

    fn convert_chapter(dto: ChapterDto) -> ChapterPayload {
        ChapterPayload {
            chapter: dto.chapter,
            name: dto.name_arabic,
            transliterated_name: dto.name_transliterated,
            verses: dto
                .verses
                .into_iter()
                .map(|v| VersePayload {
                    ordinal: v.verse_number,
                    text: v.text,
                    translation: v.translation,
                    audio_url: v.audio_url,
                    alternate_urls: v.alternate_audio_urls,
                })
                .collect(),
        }
    }

    #[instrument(skip(self))]
    async fn fetch_chapter_inner(&self, chapter: u16, voice: &str) -> Result<ChapterPayload> {
        if chapter == 0 || chapter > CHAPTER_COUNT {
            return Err(QuranProviderError::ChapterOutOfRange { chapter });
        }

        let url = format!(
            "{}/chapters/{}/verses?voice={}",
            self.base_url, chapter, voice
        );
        let response = self.get_json(url).await?;

        let dto: ChapterDto = response
            .json()
            .map_err(|e| QuranProviderError::ParseError(e.to_string()))?;

        Self::validate_chapter(chapter, &dto)?;

        debug!(
            chapter = chapter,
            verses = dto.verses.len(),
            voice = voice,
            "Fetched chapter"
        );

        Ok(Self::convert_chapter(dto))
    }

    #[instrument(skip(self))]
    async fn lead_in_audio_inner(&self, voice: &str) -> Result<LeadInAudio> {
        if let Some(cached) = self.lead_in_cache.lock().get(voice) {
            debug!(voice = voice, "Lead-in audio served from cache");
            return Ok(cached.clone());
        }

        let url = format!("{}/voices/{}/bismillah", self.base_url, voice);
        let response = self.get_json(url).await?;

        let dto: LeadInDto = response
            .json()
            .map_err(|e| QuranProviderError::ParseError(e.to_string()))?;

        if dto.audio_url.is_empty() {
            return Err(QuranProviderError::InvalidPayload(
                "empty lead-in audio locator".to_string(),
            ));
        }

        let audio = LeadInAudio {
            audio_url: dto.audio_url,
            alternate_urls: dto.alternate_audio_urls,
        };

        self.lead_in_cache
            .lock()
            .put(voice.to_string(), audio.clone());

        Ok(audio)
    }
}

#[async_trait]
impl ContentSource for QuranContentSource {
    async fn fetch_chapter(&self, chapter: u16, voice: &str) -> BridgeResult<ChapterPayload> {
        self.fetch_chapter_inner(chapter, voice).await.map_err(|e| {
            warn!(chapter = chapter, error = %e, "Chapter fetch failed");
            e.into()
        })
    }

    async fn lead_in_audio(&self, voice: &str) -> BridgeResult<LeadInAudio> {
        self.lead_in_audio_inner(voice).await.map_err(|e| {
            warn!(voice = voice, error = %e, "Lead-in resolution failed");
            e.into()
        })
    }
}
