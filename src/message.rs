//! Gallery event types.
//!
//! Every user action on an open menu is delivered to the pipeline as one
//! event, in the Elm architecture style.

use crate::tags::TagFilter;

/// Events that can be sent to an open gallery menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GalleryEvent {
    // Folder tabs
    /// Folder tab clicked in the tab row at `depth`
    TabClicked { depth: usize, name: String },

    // Tag bar
    /// Tag filter button clicked
    TagFilterSelected(TagFilter),
    /// New tag entered
    CreateTag(String),
    /// Tag renamed
    RenameTag { old: String, new: String },
    /// Tag deleted
    DeleteTag(String),

    // Tiles
    /// Tag checkbox on the tile at `index` toggled
    ToggleImageTag { index: usize, tag: String },
    /// Delete button on the tile at `index` clicked
    DeleteRequested(usize),

    /// The host closed the menu
    Closed,
}

impl GalleryEvent {
    /// Whether the event only changes which rows are visible.
    pub fn is_filter(&self) -> bool {
        matches!(
            self,
            GalleryEvent::TabClicked { .. } | GalleryEvent::TagFilterSelected(_)
        )
    }
}
