//! Thumbnail cache.
//!
//! Maps an image identifier to something a tile can show as its
//! background. Entries come from one batch preload per menu opening, or
//! from single lazy fetches; a cache miss never blocks rendering, it
//! resolves to a deterministic fallback instead.
//!
//! Entries are never evicted individually. The backend prunes its own
//! thumbnail store once per session through [`cleanup_stale_once`].

use std::collections::HashMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use web_time::Instant;

use crate::api::GalleryApi;
use crate::config::{FallbackMode, GalleryConfig};
use crate::constants::{
    KEY_SEPARATOR_ESCAPE, NO_FILE_SENTINEL, OUTPUT_KEY_PREFIX, PLACEHOLDER_DATA_URI,
};
use crate::session::SessionFlags;

/// Whether an identifier names a real file.
pub fn is_concrete_file(identifier: &str) -> bool {
    !identifier.is_empty() && identifier != NO_FILE_SENTINEL
}

/// Backend lookup key of an identifier.
///
/// Identifiers under `output_prefix` lose the prefix, get `OP_` in front
/// and have `/`, `\` and spaces escaped. Anything else is used as-is.
pub fn remote_key(identifier: &str, output_prefix: &str) -> String {
    match identifier.strip_prefix(output_prefix) {
        Some(rest) if !output_prefix.is_empty() => {
            let escaped = rest
                .replace(['\\', '/'], KEY_SEPARATOR_ESCAPE)
                .replace(' ', "_");
            format!("{}{}", OUTPUT_KEY_PREFIX, escaped)
        }
        _ => identifier.to_string(),
    }
}

/// MIME type of encoded image bytes, sniffed from the magic number.
pub fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

/// Inline `data:` URI for encoded image bytes.
pub fn data_uri(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", sniff_mime(bytes), STANDARD.encode(bytes))
}

/// Something a tile can display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailRef {
    /// Inline image from the batch route
    DataUri(String),
    /// Raw bytes from the single-thumbnail route
    Blob {
        /// Sniffed MIME type
        mime: &'static str,
        /// Encoded image
        bytes: Arc<[u8]>,
    },
    /// URL the host fetches itself
    Url(String),
}

impl ThumbnailRef {
    /// Wrap fetched bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::Blob {
            mime: sniff_mime(&bytes),
            bytes: bytes.into(),
        }
    }

    /// Value for a CSS `url(...)`.
    pub fn css_url(&self) -> String {
        match self {
            ThumbnailRef::DataUri(uri) | ThumbnailRef::Url(uri) => uri.clone(),
            ThumbnailRef::Blob { mime, bytes } => {
                format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
            }
        }
    }

    /// Whether this is a fallback rather than resolved image data.
    pub fn is_fallback(&self) -> bool {
        match self {
            ThumbnailRef::Url(_) => true,
            ThumbnailRef::DataUri(uri) => uri == PLACEHOLDER_DATA_URI,
            ThumbnailRef::Blob { .. } => false,
        }
    }
}

/// Identifier -> thumbnail, for the lifetime of the page session.
#[derive(Debug)]
pub struct ThumbnailCache {
    entries: HashMap<String, ThumbnailRef>,
    fallback: FallbackMode,
    output_prefix: String,
    thumbnail_url: String,
}

impl ThumbnailCache {
    /// Create an empty cache.
    pub fn new(config: &GalleryConfig) -> Self {
        Self {
            entries: HashMap::new(),
            fallback: config.thumbnails.fallback,
            output_prefix: config.thumbnails.output_prefix.clone(),
            thumbnail_url: config.url(&config.endpoints.thumbnail),
        }
    }

    /// Number of cached thumbnails.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached thumbnail of `identifier`.
    pub fn get(&self, identifier: &str) -> Option<&ThumbnailRef> {
        self.entries.get(identifier)
    }

    /// Backend key of `identifier` under this cache's prefix.
    pub fn remote_key(&self, identifier: &str) -> String {
        remote_key(identifier, &self.output_prefix)
    }

    /// Swap the whole cache contents. This is the only way entries leave
    /// the cache.
    pub fn replace_all(&mut self, entries: HashMap<String, ThumbnailRef>) {
        self.entries = entries;
    }

    /// Resolve many identifiers with one batch request.
    ///
    /// Already cached entries keep their reference, so repeated preloads
    /// never change what a tile shows. Failures are logged and leave the
    /// cache untouched. Returns the number of new entries.
    pub async fn preload_batch<A: GalleryApi>(&mut self, api: &A, identifiers: &[String]) -> usize {
        let filenames: Vec<String> = identifiers
            .iter()
            .filter(|id| is_concrete_file(id))
            .cloned()
            .collect();
        if filenames.is_empty() {
            return 0;
        }

        let start = Instant::now();
        let resolved = match api.fetch_thumbnails_batch(&filenames).await {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!("Error preloading thumbnails batch: {}", e);
                return 0;
            }
        };

        let returned = resolved.len();
        let mut added = 0;
        for (filename, uri) in resolved {
            self.entries.entry(filename).or_insert_with(|| {
                added += 1;
                ThumbnailRef::DataUri(uri)
            });
        }

        log::info!(
            "Preloaded {} thumbnails ({} new) in {:.1}ms",
            returned,
            added,
            start.elapsed().as_secs_f64() * 1000.0
        );
        added
    }

    /// Resolve one identifier, fetching it on a cache miss.
    pub async fn fetch_one<A: GalleryApi>(
        &mut self,
        api: &A,
        identifier: &str,
    ) -> Option<ThumbnailRef> {
        if let Some(hit) = self.entries.get(identifier) {
            return Some(hit.clone());
        }
        if !is_concrete_file(identifier) {
            return None;
        }

        let key = self.remote_key(identifier);
        log::debug!("Fetching thumbnail for {} using key {}", identifier, key);
        match api.fetch_thumbnail(&key).await {
            Ok(Some(bytes)) => {
                let reference = ThumbnailRef::from_bytes(bytes);
                self.entries.insert(identifier.to_string(), reference.clone());
                Some(reference)
            }
            Ok(None) => {
                log::debug!("No thumbnail for {}", identifier);
                None
            }
            Err(e) => {
                log::error!("Error fetching thumbnail for {}: {}", identifier, e);
                None
            }
        }
    }

    /// What a tile for `identifier` should show right now.
    pub fn resolve_display_reference(&self, identifier: &str) -> ThumbnailRef {
        self.entries
            .get(identifier)
            .cloned()
            .unwrap_or_else(|| self.fallback_reference(identifier))
    }

    /// Deterministic stand-in for an uncached identifier.
    pub fn fallback_reference(&self, identifier: &str) -> ThumbnailRef {
        match self.fallback {
            FallbackMode::Placeholder => ThumbnailRef::DataUri(PLACEHOLDER_DATA_URI.to_string()),
            FallbackMode::RemoteUrl if is_concrete_file(identifier) => ThumbnailRef::Url(format!(
                "{}/{}",
                self.thumbnail_url,
                urlencoding::encode(&self.remote_key(identifier))
            )),
            FallbackMode::RemoteUrl => ThumbnailRef::DataUri(PLACEHOLDER_DATA_URI.to_string()),
        }
    }
}

/// Send the stale-thumbnail cleanup at most once per session.
///
/// The session marker is set as soon as the request goes out, so a
/// failed cleanup is not retried either. Returns true if a request was
/// sent.
pub async fn cleanup_stale_once<A, S>(
    api: &A,
    session: &mut S,
    session_key: &str,
    identifiers: &[String],
) -> bool
where
    A: GalleryApi,
    S: SessionFlags,
{
    if session.is_set(session_key) {
        return false;
    }
    let active: Vec<String> = identifiers
        .iter()
        .filter(|id| is_concrete_file(id))
        .cloned()
        .collect();
    if active.is_empty() {
        return false;
    }

    session.set(session_key);
    match api.cleanup_thumbnails(&active).await {
        Ok(message) => log::info!("{}", message),
        Err(e) => log::error!("Error during thumbnails cleanup: {}", e),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Endpoint, MemoryGalleryApi};
    use crate::session::MemorySession;
    use pollster::block_on;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_remote_key() {
        assert_eq!(remote_key("a.png", "[output]/"), "a.png");
        assert_eq!(remote_key("sub\\b.png", "[output]/"), "sub\\b.png");
        assert_eq!(
            remote_key("[output]/run 1/img 2.png", "[output]/"),
            "OP_run_1__img_2.png"
        );
        assert_eq!(remote_key("[output]/a\\b.png", "[output]/"), "OP_a__b.png");
        // Same input, same key
        assert_eq!(
            remote_key("[output]/x y.png", "[output]/"),
            remote_key("[output]/x y.png", "[output]/")
        );
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(PNG_MAGIC), "image/png");
        assert_eq!(sniff_mime(b"not an image"), "application/octet-stream");
        assert!(data_uri(PNG_MAGIC).starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_preload_merges_results() {
        let api = MemoryGalleryApi::new()
            .with_file("a.png", PNG_MAGIC)
            .with_file("b.png", PNG_MAGIC);
        let mut cache = ThumbnailCache::new(&GalleryConfig::default());

        let added = block_on(cache.preload_batch(&api, &ids(&["a.png", "b.png", "missing.png"])));
        assert_eq!(added, 2);
        assert!(matches!(cache.get("a.png"), Some(ThumbnailRef::DataUri(_))));
        assert!(cache.get("missing.png").is_none());
        assert_eq!(api.calls(Endpoint::ThumbnailsBatch), 1);
    }

    #[test]
    fn test_preload_is_idempotent() {
        let api = MemoryGalleryApi::new()
            .with_file("a.png", PNG_MAGIC)
            .with_file("b.png", PNG_MAGIC);
        let mut cache = ThumbnailCache::new(&GalleryConfig::default());

        block_on(cache.preload_batch(&api, &ids(&["a.png"])));
        let first = cache.get("a.png").cloned();

        // Backend content changes, cache entry must not
        api.set_thumbnail("a.png", b"GIF89a-other");
        let added = block_on(cache.preload_batch(&api, &ids(&["a.png", "b.png"])));
        assert_eq!(added, 1);
        assert_eq!(cache.get("a.png").cloned(), first);
    }

    #[test]
    fn test_replace_all_drops_entries() {
        let api = MemoryGalleryApi::new()
            .with_file("a.png", PNG_MAGIC)
            .with_file("b.png", PNG_MAGIC);
        let mut cache = ThumbnailCache::new(&GalleryConfig::default());
        block_on(cache.preload_batch(&api, &ids(&["a.png", "b.png"])));

        // A preload of fewer files keeps everything
        block_on(cache.preload_batch(&api, &ids(&["a.png"])));
        assert_eq!(cache.len(), 2);

        let kept = ThumbnailRef::Url("/get_thumbnail/b.png".to_string());
        cache.replace_all(HashMap::from([("b.png".to_string(), kept.clone())]));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("a.png").is_none());
        assert_eq!(cache.get("b.png"), Some(&kept));

        cache.replace_all(HashMap::new());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_preload_failure_is_swallowed() {
        let api = MemoryGalleryApi::new().with_file("a.png", PNG_MAGIC);
        api.fail(Endpoint::ThumbnailsBatch);
        let mut cache = ThumbnailCache::new(&GalleryConfig::default());

        assert_eq!(block_on(cache.preload_batch(&api, &ids(&["a.png"]))), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_preload_skips_sentinel_and_empty() {
        let api = MemoryGalleryApi::new();
        let mut cache = ThumbnailCache::new(&GalleryConfig::default());

        block_on(cache.preload_batch(&api, &ids(&[NO_FILE_SENTINEL])));
        block_on(cache.preload_batch(&api, &[]));
        assert_eq!(api.calls(Endpoint::ThumbnailsBatch), 0);
    }

    #[test]
    fn test_fetch_one() {
        let api = MemoryGalleryApi::new().with_file("[output]/x y.png", PNG_MAGIC);
        let mut cache = ThumbnailCache::new(&GalleryConfig::default());

        let fetched = block_on(cache.fetch_one(&api, "[output]/x y.png")).unwrap();
        assert!(matches!(fetched, ThumbnailRef::Blob { mime: "image/png", .. }));
        assert_eq!(api.last_thumbnail_key().as_deref(), Some("OP_x_y.png"));

        // Second call is served from the cache
        block_on(cache.fetch_one(&api, "[output]/x y.png")).unwrap();
        assert_eq!(api.calls(Endpoint::Thumbnail), 1);

        assert_eq!(block_on(cache.fetch_one(&api, "nope.png")), None);
        api.fail(Endpoint::Thumbnail);
        assert_eq!(block_on(cache.fetch_one(&api, "other.png")), None);
    }

    #[test]
    fn test_resolve_display_reference() {
        let api = MemoryGalleryApi::new().with_file("a.png", PNG_MAGIC);
        let mut cache = ThumbnailCache::new(&GalleryConfig::default());
        block_on(cache.preload_batch(&api, &ids(&["a.png"])));

        assert!(!cache.resolve_display_reference("a.png").is_fallback());

        let fallback = cache.resolve_display_reference("[output]/b c.png");
        assert_eq!(fallback, ThumbnailRef::Url("/get_thumbnail/OP_b_c.png".to_string()));
        assert!(fallback.is_fallback());

        let mut config = GalleryConfig::default();
        config.thumbnails.fallback = FallbackMode::Placeholder;
        let placeholder = ThumbnailCache::new(&config);
        assert_eq!(
            placeholder.resolve_display_reference("b.png").css_url(),
            PLACEHOLDER_DATA_URI
        );
    }

    #[test]
    fn test_cleanup_runs_once_per_session() {
        let api = MemoryGalleryApi::new()
            .with_file("a.png", PNG_MAGIC)
            .with_file("old.png", PNG_MAGIC);
        let mut session = MemorySession::new();
        let active = ids(&["a.png"]);

        assert!(block_on(cleanup_stale_once(&api, &mut session, "k", &active)));
        assert!(!block_on(cleanup_stale_once(&api, &mut session, "k", &active)));
        assert_eq!(api.calls(Endpoint::Cleanup), 1);
        assert_eq!(api.last_cleanup(), Some(active));
    }

    #[test]
    fn test_failed_cleanup_is_not_retried() {
        let api = MemoryGalleryApi::new();
        api.fail(Endpoint::Cleanup);
        let mut session = MemorySession::new();

        assert!(block_on(cleanup_stale_once(&api, &mut session, "k", &ids(&["a.png"]))));
        api.recover(Endpoint::Cleanup);
        assert!(!block_on(cleanup_stale_once(&api, &mut session, "k", &ids(&["a.png"]))));
        assert_eq!(api.calls(Endpoint::Cleanup), 1);
    }
}
