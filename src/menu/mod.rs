//! Boundary to the host's context menu widget.
//!
//! The host creates the menu, positions it and delivers clicks. The
//! pipeline only sees a [`MenuRequest`] describing the opening menu and a
//! [`MenuSurface`] through which it decorates, hides and removes rows.

mod headless;

pub use headless::HeadlessMenu;

use folder_tabs::TabRow;

use crate::config::EligibilityConfig;
use crate::constants::{ALL_TAGS_LABEL, NO_FILE_SENTINEL};
use crate::layout::GridLayout;
use crate::tags::TagFilter;
use crate::thumbnails::ThumbnailRef;

/// One option of the host combo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    /// Value shown by the host
    pub value: String,
    /// Real file name when an external decoration layer rewrote `value`
    pub original_value: Option<String>,
}

impl MenuOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            original_value: None,
        }
    }

    /// Option whose displayed value hides the real file name.
    pub fn decorated(value: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            original_value: Some(original.into()),
        }
    }

    fn original(&self) -> Option<&str> {
        self.original_value
            .as_deref()
            .filter(|original| !original.trim().is_empty())
    }
}

/// What kind of augmentation a menu gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    /// Left as the host rendered it
    Plain,
    /// Folder tabs only
    Tabs,
    /// Folder tabs, thumbnail tiles, deletion and tags
    Gallery,
}

/// A context menu that is being opened.
#[derive(Debug, Clone, Default)]
pub struct MenuRequest {
    /// CSS classes of the menu root
    pub class_name: String,
    /// Type of the node whose widget opened the menu
    pub node_type: Option<String>,
    /// Options in row order
    pub options: Vec<MenuOption>,
    /// Current value of the invoking widget
    pub current_value: Option<String>,
}

impl MenuRequest {
    /// Request for plain string options.
    pub fn new<S: AsRef<str>>(class_name: &str, node_type: Option<&str>, values: &[S]) -> Self {
        Self {
            class_name: class_name.to_string(),
            node_type: node_type.map(str::to_string),
            options: values.iter().map(|v| MenuOption::new(v.as_ref())).collect(),
            current_value: None,
        }
    }

    pub fn with_current_value(mut self, value: impl Into<String>) -> Self {
        self.current_value = Some(value.into());
        self
    }

    /// Decide how this menu is augmented.
    pub fn kind(&self, config: &EligibilityConfig) -> MenuKind {
        let has_class = self
            .class_name
            .split_whitespace()
            .any(|class| class == config.menu_class);
        if !has_class || self.options.is_empty() {
            return MenuKind::Plain;
        }

        let Some(node_type) = self.node_type.as_deref() else {
            return MenuKind::Tabs;
        };
        let is_loader = node_type.starts_with(&config.gallery_node_prefix)
            || config.gallery_node_types.iter().any(|t| t == node_type);
        if !is_loader || self.is_channel_list(node_type, config) {
            return MenuKind::Tabs;
        }
        MenuKind::Gallery
    }

    fn is_channel_list(&self, node_type: &str, config: &EligibilityConfig) -> bool {
        node_type == config.channel_node_type
            && self
                .options
                .iter()
                .any(|option| config.channel_names.contains(&option.value))
    }

    /// Identifiers in row order, and whether they came from an external
    /// decoration layer.
    ///
    /// When the last option carries an original value, every option is
    /// resolved to its original value, or to the no-file sentinel.
    pub fn identifiers(&self) -> (Vec<String>, bool) {
        let decorated = self
            .options
            .last()
            .is_some_and(|option| option.original().is_some());

        let identifiers = self
            .options
            .iter()
            .map(|option| {
                if decorated {
                    option.original().unwrap_or(NO_FILE_SENTINEL).to_string()
                } else {
                    option.value.clone()
                }
            })
            .collect();
        (identifiers, decorated)
    }

    /// Row of the invoking widget's current value, 0 if none matches.
    pub fn selected_index(&self) -> usize {
        self.current_value
            .as_deref()
            .and_then(|current| self.options.iter().position(|o| o.value == current))
            .unwrap_or(0)
    }
}

/// Decoration of one gallery row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub index: usize,
    pub identifier: String,
    pub thumbnail: ThumbnailRef,
    /// Tags the image is linked to
    pub tags: Vec<String>,
}

/// Tag filter buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagBar {
    /// User tags in display order
    pub tags: Vec<String>,
    pub active: TagFilter,
}

impl TagBar {
    /// Button labels, `All` first.
    pub fn labels(&self) -> Vec<&str> {
        std::iter::once(ALL_TAGS_LABEL)
            .chain(self.tags.iter().map(String::as_str))
            .collect()
    }
}

/// Operations the pipeline performs on a live host menu.
///
/// Row indices are positions in the current row list; removing a row
/// shifts the following ones down.
pub trait MenuSurface {
    /// Whether the menu is still attached to the page.
    fn is_open(&self) -> bool;

    /// Number of live rows.
    fn row_count(&self) -> usize;

    fn row_exists(&self, index: usize) -> bool {
        index < self.row_count()
    }

    fn set_row_visible(&mut self, index: usize, visible: bool);

    /// Turn a text row into a thumbnail tile with delete and tag controls.
    fn decorate_row(&mut self, tile: &Tile);

    /// Refresh the tag membership shown on one tile.
    fn set_row_tags(&mut self, index: usize, tags: &[String]);

    fn remove_row(&mut self, index: usize);

    /// Replace every rendered folder tab row.
    fn render_tab_rows(&mut self, rows: &[TabRow]);

    fn render_tag_bar(&mut self, bar: &TagBar);

    fn apply_grid(&mut self, layout: &GridLayout);

    /// Width available to the tab strip (pixels).
    fn tab_strip_width(&self) -> f32;

    /// Show a user-facing message.
    fn notify(&mut self, message: &str);

    /// Ask the host to move the menu back into the viewport.
    fn reposition(&mut self);
}
