//! User-defined image tags.
//!
//! The backend holds a single structure `{tags, image_tabs}`: the ordered
//! tag list plus, for every tagged image, the set of its tags. [`TagStore`]
//! keeps a local copy of it and applies every mutation in two phases:
//! the next state is computed, persisted remotely, and only committed
//! locally once the backend confirmed it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::api::GalleryApi;
use crate::constants::ALL_TAGS_LABEL;
use crate::error::{GalleryError, GalleryResult};

/// The persisted tag structure.
///
/// An image is present in `image_tags` only while it has at least one tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagData {
    /// Tag names in display order, unique
    #[serde(default)]
    pub tags: Vec<String>,
    /// Image identifier -> its tags
    #[serde(default, rename = "image_tabs")]
    pub image_tags: BTreeMap<String, BTreeSet<String>>,
}

impl TagData {
    /// Whether `tag` is in the tag list.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether `image` is linked to `tag`.
    pub fn is_linked(&self, image: &str, tag: &str) -> bool {
        self.image_tags
            .get(image)
            .is_some_and(|tags| tags.contains(tag))
    }

    /// Tags of one image, sorted.
    pub fn tags_for(&self, image: &str) -> Vec<String> {
        self.image_tags
            .get(image)
            .map(|tags| tags.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Images linked to `tag`, sorted.
    pub fn images_with(&self, tag: &str) -> Vec<&str> {
        self.image_tags
            .iter()
            .filter(|(_, tags)| tags.contains(tag))
            .map(|(image, _)| image.as_str())
            .collect()
    }

    /// Copy with `tag` appended to the tag list (no-op if present).
    pub fn with_tag(&self, tag: &str) -> Self {
        let mut next = self.clone();
        if !next.has_tag(tag) {
            next.tags.push(tag.to_string());
        }
        next
    }

    /// Copy with `image` linked to `tag`, registering the tag if needed.
    pub fn linked(&self, image: &str, tag: &str) -> Self {
        let mut next = self.with_tag(tag);
        next.image_tags
            .entry(image.to_string())
            .or_default()
            .insert(tag.to_string());
        next
    }

    /// Copy with the `image`/`tag` link removed; emptied entries are dropped.
    pub fn unlinked(&self, image: &str, tag: &str) -> Self {
        let mut next = self.clone();
        if let Some(tags) = next.image_tags.get_mut(image) {
            tags.remove(tag);
            if tags.is_empty() {
                next.image_tags.remove(image);
            }
        }
        next
    }

    /// Copy with `old` renamed to `new` in the list and in every image.
    pub fn renamed(&self, old: &str, new: &str) -> Self {
        let mut next = self.clone();
        for tag in next.tags.iter_mut().filter(|t| t.as_str() == old) {
            *tag = new.to_string();
        }
        for tags in next.image_tags.values_mut() {
            if tags.remove(old) {
                tags.insert(new.to_string());
            }
        }
        next
    }

    /// Copy with `tag` removed from the list and from every image.
    pub fn without_tag(&self, tag: &str) -> Self {
        let mut next = self.clone();
        next.tags.retain(|t| t != tag);
        next.image_tags.retain(|_, tags| {
            tags.remove(tag);
            !tags.is_empty()
        });
        next
    }

    /// Copy without any links of `image`.
    pub fn without_image(&self, image: &str) -> Self {
        let mut next = self.clone();
        next.image_tags.remove(image);
        next
    }

    /// Drop duplicate tag names and empty image entries.
    fn normalized(mut self) -> Self {
        let mut seen = BTreeSet::new();
        self.tags.retain(|t| seen.insert(t.clone()));
        self.image_tags.retain(|_, tags| !tags.is_empty());
        self
    }
}

/// Which rows the tag bar lets through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TagFilter {
    /// No tag filtering
    #[default]
    All,
    /// Only images linked to this tag
    Tag(String),
}

impl TagFilter {
    /// Label shown on the tag bar button.
    pub fn label(&self) -> &str {
        match self {
            TagFilter::All => ALL_TAGS_LABEL,
            TagFilter::Tag(name) => name,
        }
    }
}

fn validate_name(name: &str) -> GalleryResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        Err(GalleryError::EmptyTagName)
    } else {
        Ok(name)
    }
}

/// Client-side cache of the backend's tag structure.
#[derive(Debug, Default)]
pub struct TagStore {
    data: TagData,
    loaded: bool,
}

impl TagStore {
    /// Create an empty, not yet loaded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current local state.
    pub fn data(&self) -> &TagData {
        &self.data
    }

    /// Tag names in display order.
    pub fn tags(&self) -> &[String] {
        &self.data.tags
    }

    /// Whether `load` has succeeded at least once.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace local state with the backend's structure.
    ///
    /// On failure the previous local state is kept.
    pub async fn load<A: GalleryApi>(&mut self, api: &A) -> GalleryResult<&TagData> {
        let data = api.load_tags().await?;
        self.data = data.normalized();
        self.loaded = true;
        log::debug!(
            "Loaded {} tags covering {} images",
            self.data.tags.len(),
            self.data.image_tags.len()
        );
        Ok(&self.data)
    }

    /// Persist the full local structure. Failures are logged.
    pub async fn save<A: GalleryApi>(&self, api: &A) -> bool {
        match api.save_tags(&self.data).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to save tags: {}", e);
                false
            }
        }
    }

    /// Persist `next` and adopt it on success.
    async fn commit<A: GalleryApi>(&mut self, api: &A, next: TagData) -> GalleryResult<()> {
        api.save_tags(&next).await?;
        self.data = next;
        Ok(())
    }

    /// Add a new, unused tag.
    pub async fn create_tag<A: GalleryApi>(&mut self, api: &A, name: &str) -> GalleryResult<()> {
        let name = validate_name(name)?;
        if self.data.has_tag(name) {
            return Err(GalleryError::tag_exists(name));
        }
        let next = self.data.with_tag(name);
        self.commit(api, next).await?;
        log::info!("Created tag '{}'", name);
        Ok(())
    }

    /// Link `image` to `tag`.
    pub async fn add_image_tag<A: GalleryApi>(
        &mut self,
        api: &A,
        image: &str,
        tag: &str,
    ) -> GalleryResult<()> {
        let tag = validate_name(tag)?;
        if self.data.is_linked(image, tag) {
            return Ok(());
        }
        api.add_image_tag(image, tag).await?;
        self.data = self.data.linked(image, tag);
        log::debug!("Tagged '{}' with '{}'", image, tag);
        Ok(())
    }

    /// Unlink `image` from `tag`.
    pub async fn remove_image_tag<A: GalleryApi>(
        &mut self,
        api: &A,
        image: &str,
        tag: &str,
    ) -> GalleryResult<()> {
        let tag = validate_name(tag)?;
        if !self.data.is_linked(image, tag) {
            return Ok(());
        }
        api.remove_image_tag(image, tag).await?;
        self.data = self.data.unlinked(image, tag);
        log::debug!("Removed tag '{}' from '{}'", tag, image);
        Ok(())
    }

    /// Unlink `image` from `tag` if linked, link it otherwise.
    pub async fn toggle_image_tag<A: GalleryApi>(
        &mut self,
        api: &A,
        image: &str,
        tag: &str,
    ) -> GalleryResult<()> {
        let tag = validate_name(tag)?;
        if self.data.is_linked(image, tag) {
            self.remove_image_tag(api, image, tag).await
        } else {
            self.add_image_tag(api, image, tag).await
        }
    }

    /// Rename a tag everywhere. Rejected before any remote call if `new`
    /// already exists.
    pub async fn rename_tag<A: GalleryApi>(
        &mut self,
        api: &A,
        old: &str,
        new: &str,
    ) -> GalleryResult<()> {
        let new = validate_name(new)?;
        if !self.data.has_tag(old) {
            return Err(GalleryError::tag_not_found(old));
        }
        if old == new {
            return Ok(());
        }
        if self.data.has_tag(new) {
            return Err(GalleryError::tag_exists(new));
        }
        let next = self.data.renamed(old, new);
        self.commit(api, next).await?;
        log::info!("Renamed tag '{}' to '{}'", old, new);
        Ok(())
    }

    /// Delete a tag and every link to it.
    pub async fn delete_tag<A: GalleryApi>(&mut self, api: &A, name: &str) -> GalleryResult<()> {
        if !self.data.has_tag(name) {
            return Err(GalleryError::tag_not_found(name));
        }
        let next = self.data.without_tag(name);
        self.commit(api, next).await?;
        log::info!("Deleted tag '{}'", name);
        Ok(())
    }

    /// Forget every link of a deleted image.
    pub async fn purge_image<A: GalleryApi>(&mut self, api: &A, image: &str) -> GalleryResult<()> {
        if !self.data.image_tags.contains_key(image) {
            return Ok(());
        }
        let next = self.data.without_image(image);
        self.commit(api, next).await
    }

    /// Rows of `identifiers` the filter lets through; `None` for no filter.
    pub fn visible_rows<S: AsRef<str>>(
        &self,
        filter: &TagFilter,
        identifiers: &[S],
    ) -> Option<Vec<usize>> {
        match filter {
            TagFilter::All => None,
            TagFilter::Tag(tag) => Some(
                identifiers
                    .iter()
                    .enumerate()
                    .filter(|(_, id)| self.data.is_linked(id.as_ref(), tag))
                    .map(|(row, _)| row)
                    .collect(),
            ),
        }
    }
}
