//! Global constants for the gallery menu

/// Option value an external combo-decoration layer uses when the real
/// file name has been blanked out. Never treated as a file.
pub const NO_FILE_SENTINEL: &str = "rgthreefolder";

/// Prefix marking an identifier relative to the output directory
pub const DEFAULT_OUTPUT_PREFIX: &str = "[output]/";

/// Prefix added to remote keys of output-directory identifiers
pub const OUTPUT_KEY_PREFIX: &str = "OP_";

/// Replacement for `/` and `\` in remote thumbnail keys
pub const KEY_SEPARATOR_ESCAPE: &str = "__";

/// sessionStorage key of the one-shot cleanup marker
pub const DEFAULT_CLEANUP_SESSION_KEY: &str = "galleryCleanupDone";

/// 1x1 transparent GIF shown when no thumbnail could be resolved
pub const PLACEHOLDER_DATA_URI: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

/// Label of the tag filter that shows every row
pub const ALL_TAGS_LABEL: &str = "All";

/// Grid layout defaults
pub mod grid {
    /// Width of one gallery cell (pixels)
    pub const CELL_WIDTH: f32 = 88.0;
    /// Narrowest grid the gallery renders
    pub const MIN_COLUMNS: usize = 4;
    /// Widest grid the gallery renders
    pub const MAX_COLUMNS: usize = 10;
    /// Row count above which the host is asked to reposition the menu
    pub const REPOSITION_THRESHOLD: usize = 30;
}

/// Default remote routes
pub mod routes {
    pub const THUMBNAILS_BATCH: &str = "/get_thumbnails_batch";
    pub const THUMBNAIL: &str = "/get_thumbnail";
    pub const SERVICE_CHECK: &str = "/check_thumbnails_service";
    pub const CLEANUP: &str = "/cleanup_thumbnails";
    pub const DELETE_FILE: &str = "/delete_file";
    pub const TAGS: &str = "/gallery_tags";
    pub const TAGS_SAVE: &str = "/gallery_tags/save";
    pub const TAG_ADD_IMAGE: &str = "/gallery_tags/add_image";
    pub const TAG_REMOVE_IMAGE: &str = "/gallery_tags/remove_image";
}
