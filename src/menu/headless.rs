//! A [`MenuSurface`] that records everything in memory.

use folder_tabs::TabRow;

use super::{MenuSurface, TagBar, Tile};
use crate::layout::GridLayout;

/// Approximate width of one label character (pixels)
const CHAR_WIDTH: f32 = 8.0;
/// Horizontal padding of one tab button (pixels)
const TAB_PADDING: f32 = 16.0;

#[derive(Debug, Clone)]
struct Row {
    label: String,
    visible: bool,
    tile: Option<Tile>,
}

/// Host menu without a page behind it.
#[derive(Debug, Clone)]
pub struct HeadlessMenu {
    rows: Vec<Row>,
    open: bool,
    width: Option<f32>,
    tab_rows: Vec<TabRow>,
    tag_bar: Option<TagBar>,
    grid: Option<GridLayout>,
    notifications: Vec<String>,
    repositions: usize,
}

impl HeadlessMenu {
    /// Open a menu with one visible text row per label.
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Self {
        Self {
            rows: labels
                .iter()
                .map(|label| Row {
                    label: label.as_ref().to_string(),
                    visible: true,
                    tile: None,
                })
                .collect(),
            open: true,
            width: None,
            tab_rows: Vec::new(),
            tag_bar: None,
            grid: None,
            notifications: Vec::new(),
            repositions: 0,
        }
    }

    /// Fix the tab strip width instead of estimating it from the tabs.
    pub fn with_width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    /// Detach the menu, as the host does when the user clicks away.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.label.as_str()).collect()
    }

    /// Indices of visible rows.
    pub fn visible_rows(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.visible)
            .map(|(index, _)| index)
            .collect()
    }

    /// Labels of visible rows.
    pub fn visible_labels(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter(|row| row.visible)
            .map(|row| row.label.as_str())
            .collect()
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.rows.get(index).and_then(|row| row.tile.as_ref())
    }

    pub fn tab_rows(&self) -> &[TabRow] {
        &self.tab_rows
    }

    pub fn tag_bar(&self) -> Option<&TagBar> {
        self.tag_bar.as_ref()
    }

    pub fn grid(&self) -> Option<&GridLayout> {
        self.grid.as_ref()
    }

    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn reposition_count(&self) -> usize {
        self.repositions
    }
}

impl MenuSurface for HeadlessMenu {
    fn is_open(&self) -> bool {
        self.open
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn set_row_visible(&mut self, index: usize, visible: bool) {
        if let Some(row) = self.rows.get_mut(index) {
            row.visible = visible;
        }
    }

    fn decorate_row(&mut self, tile: &Tile) {
        if let Some(row) = self.rows.get_mut(tile.index) {
            row.tile = Some(tile.clone());
        }
    }

    fn set_row_tags(&mut self, index: usize, tags: &[String]) {
        if let Some(tile) = self.rows.get_mut(index).and_then(|row| row.tile.as_mut()) {
            tile.tags = tags.to_vec();
        }
    }

    fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
            // Tiles remember their row
            for (i, row) in self.rows.iter_mut().enumerate().skip(index) {
                if let Some(tile) = row.tile.as_mut() {
                    tile.index = i;
                }
            }
        }
    }

    fn render_tab_rows(&mut self, rows: &[TabRow]) {
        self.tab_rows = rows.to_vec();
    }

    fn render_tag_bar(&mut self, bar: &TagBar) {
        self.tag_bar = Some(bar.clone());
    }

    fn apply_grid(&mut self, layout: &GridLayout) {
        self.grid = Some(*layout);
    }

    fn tab_strip_width(&self) -> f32 {
        if let Some(width) = self.width {
            return width;
        }
        self.tab_rows
            .first()
            .map(|row| {
                row.tabs
                    .iter()
                    .map(|tab| tab.chars().count() as f32 * CHAR_WIDTH + TAB_PADDING)
                    .sum()
            })
            .unwrap_or(0.0)
    }

    fn notify(&mut self, message: &str) {
        log::info!("Menu notification: {}", message);
        self.notifications.push(message.to_string());
    }

    fn reposition(&mut self) {
        self.repositions += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_row_shifts_tiles() {
        let mut menu = HeadlessMenu::new(&["a", "b", "c"]);
        for (index, label) in ["a", "b", "c"].iter().enumerate() {
            menu.decorate_row(&Tile {
                index,
                identifier: label.to_string(),
                thumbnail: crate::thumbnails::ThumbnailRef::Url(String::new()),
                tags: Vec::new(),
            });
        }

        menu.remove_row(1);
        assert_eq!(menu.labels(), vec!["a", "c"]);
        assert_eq!(menu.tile(1).map(|t| t.index), Some(1));
        assert_eq!(menu.tile(1).map(|t| t.identifier.as_str()), Some("c"));

        // Out of range is a no-op
        menu.remove_row(5);
        assert_eq!(menu.row_count(), 2);
    }

    #[test]
    fn test_estimated_width() {
        let mut menu = HeadlessMenu::new(&["a"]);
        assert_eq!(menu.tab_strip_width(), 0.0);
        menu.render_tab_rows(&[TabRow {
            depth: 0,
            tabs: vec!["Root".into(), "sub".into()],
            active: None,
        }]);
        assert_eq!(menu.tab_strip_width(), 4.0 * 8.0 + 16.0 + 3.0 * 8.0 + 16.0);
        assert_eq!(menu.with_width(500.0).tab_strip_width(), 500.0);
    }
}
