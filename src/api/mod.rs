//! Remote gallery backend.
//!
//! [`GalleryApi`] has one async method per backend route. The pipeline and
//! the stores are generic over it, so the same code runs against the real
//! HTTP service ([`HttpGalleryApi`]) or the in-process one
//! ([`MemoryGalleryApi`]).

mod http;
mod memory;

use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;

use crate::error::GalleryResult;
use crate::tags::TagData;

pub use http::HttpGalleryApi;
pub use memory::MemoryGalleryApi;

/// Backend routes, for logging and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ThumbnailsBatch,
    Thumbnail,
    ServiceCheck,
    Cleanup,
    DeleteFile,
    LoadTags,
    SaveTags,
    AddImageTag,
    RemoveImageTag,
}

/// Body of the batch thumbnail request.
#[derive(Debug, Serialize)]
pub struct BatchRequest<'a> {
    pub filenames: Vec<&'a str>,
}

/// Body of the stale-thumbnail cleanup request.
#[derive(Debug, Serialize)]
pub struct CleanupRequest<'a> {
    pub active_files: Vec<&'a str>,
}

/// Body of the delete request.
#[derive(Debug, Serialize)]
pub struct DeleteRequest<'a> {
    pub filename: &'a str,
}

/// Body of the add/remove image-tag link requests.
#[derive(Debug, Serialize)]
pub struct TagLinkRequest<'a> {
    pub filename: &'a str,
    #[serde(rename = "tab_name")]
    pub tag: &'a str,
}

/// Operations the gallery needs from its backend.
///
/// All methods complete on the caller's executor; nothing here spawns.
pub trait GalleryApi {
    /// Resolve many thumbnails at once: filename -> inline data URI.
    /// Unknown files are simply absent from the map.
    fn fetch_thumbnails_batch(
        &self,
        filenames: &[String],
    ) -> impl Future<Output = GalleryResult<HashMap<String, String>>>;

    /// Raw thumbnail bytes for one remote key, `None` if not found.
    fn fetch_thumbnail(&self, key: &str) -> impl Future<Output = GalleryResult<Option<Vec<u8>>>>;

    /// Whether the thumbnail service is up.
    fn check_service(&self) -> impl Future<Output = bool>;

    /// Ask the backend to evict thumbnails not in `active_files`.
    fn cleanup_thumbnails(
        &self,
        active_files: &[String],
    ) -> impl Future<Output = GalleryResult<String>>;

    /// Delete one file (and its thumbnail).
    fn delete_file(&self, filename: &str) -> impl Future<Output = GalleryResult<()>>;

    /// Fetch the full tag structure.
    fn load_tags(&self) -> impl Future<Output = GalleryResult<TagData>>;

    /// Replace the full tag structure.
    fn save_tags(&self, data: &TagData) -> impl Future<Output = GalleryResult<()>>;

    /// Link one image to one tag.
    fn add_image_tag(&self, filename: &str, tag: &str) -> impl Future<Output = GalleryResult<()>>;

    /// Unlink one image from one tag.
    fn remove_image_tag(
        &self,
        filename: &str,
        tag: &str,
    ) -> impl Future<Output = GalleryResult<()>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_bodies() {
        let link = TagLinkRequest {
            filename: "a.png",
            tag: "favs",
        };
        assert_eq!(
            serde_json::to_value(&link).unwrap(),
            serde_json::json!({ "filename": "a.png", "tab_name": "favs" })
        );

        let batch = BatchRequest {
            filenames: vec!["a.png", "sub\\b.png"],
        };
        assert_eq!(
            serde_json::to_value(&batch).unwrap(),
            serde_json::json!({ "filenames": ["a.png", "sub\\b.png"] })
        );

        let cleanup = CleanupRequest {
            active_files: vec!["a.png"],
        };
        assert_eq!(
            serde_json::to_value(&cleanup).unwrap(),
            serde_json::json!({ "active_files": ["a.png"] })
        );
    }
}
