//! In-process [`GalleryApi`] backend.
//!
//! Holds files, thumbnails and the tag structure in memory. Tags are kept
//! as serialized JSON so every `load_tags` parses what the last write
//! stored, like a reload against the real server. Endpoints can be made
//! to fail, and every call is counted.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap, HashSet};

use super::{Endpoint, GalleryApi};
use crate::constants::DEFAULT_OUTPUT_PREFIX;
use crate::error::{GalleryError, GalleryResult};
use crate::tags::TagData;
use crate::thumbnails::{data_uri, remote_key};

#[derive(Debug)]
struct Backend {
    files: BTreeSet<String>,
    thumbnails: HashMap<String, Vec<u8>>,
    tags_json: String,
    failing: HashSet<Endpoint>,
    calls: HashMap<Endpoint, usize>,
    last_cleanup: Option<Vec<String>>,
    last_thumbnail_key: Option<String>,
    available: bool,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            files: BTreeSet::new(),
            thumbnails: HashMap::new(),
            tags_json: r#"{"tags":[],"image_tabs":{}}"#.to_string(),
            failing: HashSet::new(),
            calls: HashMap::new(),
            last_cleanup: None,
            last_thumbnail_key: None,
            available: true,
        }
    }
}

/// Gallery backend living entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryGalleryApi {
    backend: RefCell<Backend>,
}

impl MemoryGalleryApi {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`add_file`](Self::add_file).
    pub fn with_file(self, name: &str, thumbnail: &[u8]) -> Self {
        self.add_file(name, thumbnail);
        self
    }

    /// Store a file together with its thumbnail bytes.
    pub fn add_file(&self, name: &str, thumbnail: &[u8]) {
        let mut backend = self.backend.borrow_mut();
        backend.files.insert(name.to_string());
        backend
            .thumbnails
            .insert(name.to_string(), thumbnail.to_vec());
    }

    /// Replace the thumbnail of a stored file.
    pub fn set_thumbnail(&self, name: &str, thumbnail: &[u8]) {
        self.backend
            .borrow_mut()
            .thumbnails
            .insert(name.to_string(), thumbnail.to_vec());
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.backend.borrow().files.contains(name)
    }

    pub fn has_thumbnail(&self, name: &str) -> bool {
        self.backend.borrow().thumbnails.contains_key(name)
    }

    /// Number of calls made to `endpoint`, failed ones included.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.backend
            .borrow()
            .calls
            .get(&endpoint)
            .copied()
            .unwrap_or(0)
    }

    /// Make every later call to `endpoint` fail.
    pub fn fail(&self, endpoint: Endpoint) {
        self.backend.borrow_mut().failing.insert(endpoint);
    }

    /// Undo [`fail`](Self::fail).
    pub fn recover(&self, endpoint: Endpoint) {
        self.backend.borrow_mut().failing.remove(&endpoint);
    }

    /// Toggle the service health answer.
    pub fn set_available(&self, available: bool) {
        self.backend.borrow_mut().available = available;
    }

    /// Active file list of the last cleanup request.
    pub fn last_cleanup(&self) -> Option<Vec<String>> {
        self.backend.borrow().last_cleanup.clone()
    }

    /// Key of the last single-thumbnail request.
    pub fn last_thumbnail_key(&self) -> Option<String> {
        self.backend.borrow().last_thumbnail_key.clone()
    }

    /// Count a call and fail it if the endpoint is marked failing.
    fn enter(&self, endpoint: Endpoint) -> GalleryResult<()> {
        let mut backend = self.backend.borrow_mut();
        *backend.calls.entry(endpoint).or_insert(0) += 1;
        if backend.failing.contains(&endpoint) {
            return Err(GalleryError::Unavailable(format!("{:?} is failing", endpoint)));
        }
        Ok(())
    }

    fn read_tags(&self) -> GalleryResult<TagData> {
        Ok(serde_json::from_str(&self.backend.borrow().tags_json)?)
    }

    fn write_tags(&self, data: &TagData) -> GalleryResult<()> {
        self.backend.borrow_mut().tags_json = serde_json::to_string(data)?;
        Ok(())
    }
}

impl GalleryApi for MemoryGalleryApi {
    async fn fetch_thumbnails_batch(
        &self,
        filenames: &[String],
    ) -> GalleryResult<HashMap<String, String>> {
        self.enter(Endpoint::ThumbnailsBatch)?;
        let backend = self.backend.borrow();
        Ok(filenames
            .iter()
            .filter_map(|name| {
                backend
                    .thumbnails
                    .get(name)
                    .map(|bytes| (name.clone(), data_uri(bytes)))
            })
            .collect())
    }

    async fn fetch_thumbnail(&self, key: &str) -> GalleryResult<Option<Vec<u8>>> {
        self.enter(Endpoint::Thumbnail)?;
        let mut backend = self.backend.borrow_mut();
        backend.last_thumbnail_key = Some(key.to_string());
        Ok(backend
            .thumbnails
            .iter()
            .find(|(name, _)| {
                name.as_str() == key || remote_key(name, DEFAULT_OUTPUT_PREFIX) == key
            })
            .map(|(_, bytes)| bytes.clone()))
    }

    async fn check_service(&self) -> bool {
        self.enter(Endpoint::ServiceCheck).is_ok() && self.backend.borrow().available
    }

    async fn cleanup_thumbnails(&self, active_files: &[String]) -> GalleryResult<String> {
        self.enter(Endpoint::Cleanup)?;
        let mut backend = self.backend.borrow_mut();
        let active: HashSet<&str> = active_files.iter().map(String::as_str).collect();
        let before = backend.thumbnails.len();
        backend
            .thumbnails
            .retain(|name, _| active.contains(name.as_str()));
        let removed = before - backend.thumbnails.len();
        backend.last_cleanup = Some(active_files.to_vec());
        Ok(format!("Cleaned up {} stale thumbnails", removed))
    }

    async fn delete_file(&self, filename: &str) -> GalleryResult<()> {
        self.enter(Endpoint::DeleteFile)?;
        let mut backend = self.backend.borrow_mut();
        if !backend.files.remove(filename) {
            return Err(GalleryError::status(
                crate::constants::routes::DELETE_FILE,
                404,
            ));
        }
        backend.thumbnails.remove(filename);
        Ok(())
    }

    async fn load_tags(&self) -> GalleryResult<TagData> {
        self.enter(Endpoint::LoadTags)?;
        self.read_tags()
    }

    async fn save_tags(&self, data: &TagData) -> GalleryResult<()> {
        self.enter(Endpoint::SaveTags)?;
        self.write_tags(data)
    }

    async fn add_image_tag(&self, filename: &str, tag: &str) -> GalleryResult<()> {
        self.enter(Endpoint::AddImageTag)?;
        let next = self.read_tags()?.linked(filename, tag);
        self.write_tags(&next)
    }

    async fn remove_image_tag(&self, filename: &str, tag: &str) -> GalleryResult<()> {
        self.enter(Endpoint::RemoveImageTag)?;
        let next = self.read_tags()?.unlinked(filename, tag);
        self.write_tags(&next)
    }
}
