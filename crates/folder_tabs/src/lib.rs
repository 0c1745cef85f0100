//! Folder tabs for flat option lists.
//!
//! Reconstructs a folder hierarchy from path-like option values
//! (`sub\b.png`, `a/b/c.png`) and tracks which tab is selected at each
//! nesting depth. Nothing here touches a UI surface: callers walk the
//! [`TabRow`]s produced by [`TabNavigator`] and render them however
//! their host widget wants.
//!
//! ```rust
//! use folder_tabs::{FolderTree, Separator, TabNavigator};
//!
//! let values = ["a.png", "sub\\b.png", "sub\\c.png"];
//! let tree = FolderTree::build(&values, Some(Separator::Backslash), |_| false);
//! let mut nav = TabNavigator::new();
//! nav.sync_to_row(&tree, 1);
//! assert_eq!(nav.active_path(), ["sub".to_string()]);
//! assert_eq!(nav.visible_rows(&tree), Some(vec![1, 2]));
//! ```

mod navigator;
mod separator;
mod tree;

pub use navigator::{TabNavigator, TabRow};
pub use separator::{detect_separator, Separator};
pub use tree::{FileEntry, FolderNode, FolderTree, ROOT_FOLDER};
