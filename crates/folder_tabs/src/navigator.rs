//! Stateful tab navigation over a [`FolderTree`].

use crate::tree::{FolderTree, ROOT_FOLDER};

/// One rendered row of tab buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabRow {
    /// Nesting depth (0 = top-level tabs)
    pub depth: usize,
    /// Tab labels in display order
    pub tabs: Vec<String>,
    /// The highlighted tab in this row, if any
    pub active: Option<String>,
}

/// Tracks the selected folder at each depth.
///
/// Selecting a tab at depth `d` discards every selection deeper than `d`,
/// which is what replaces a previously rendered sub-tab row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabNavigator {
    active: Vec<String>,
}

impl TabNavigator {
    /// Create a navigator with nothing selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected folder names from the top level down.
    pub fn active_path(&self) -> &[String] {
        &self.active
    }

    /// Click the tab `name` in the row at `depth`.
    ///
    /// Returns false (and leaves the selection alone) if no such tab is
    /// currently rendered.
    pub fn select(&mut self, tree: &FolderTree, depth: usize, name: &str) -> bool {
        if tree.is_flat() || depth > self.active.len() {
            return false;
        }

        let exists = tree
            .folder(&self.active[..depth])
            .is_some_and(|parent| parent.child(name).is_some());
        if !exists {
            log::debug!("Ignoring click on unknown tab '{}' at depth {}", name, depth);
            return false;
        }

        self.active.truncate(depth);
        self.active.push(name.to_string());
        true
    }

    /// Expand the tabs leading to the folder that owns `row`.
    ///
    /// Falls back to `Root` when the row is not in the tree.
    pub fn sync_to_row(&mut self, tree: &FolderTree, row: usize) {
        self.active.clear();
        if tree.is_flat() {
            return;
        }

        let path = tree
            .locate(row)
            .unwrap_or_else(|| vec![ROOT_FOLDER.to_string()]);
        for (depth, name) in path.iter().enumerate() {
            if !self.select(tree, depth, name) {
                break;
            }
        }
    }

    /// Drop selections that no longer exist after the tree was rebuilt.
    pub fn retain_valid(&mut self, tree: &FolderTree) {
        if tree.is_flat() {
            self.active.clear();
            return;
        }
        while !self.active.is_empty() && tree.folder(&self.active).is_none() {
            self.active.pop();
        }
        if self.active.is_empty() {
            self.active.push(ROOT_FOLDER.to_string());
        }
    }

    /// Rows visible under the current selection.
    ///
    /// `None` means the folder tabs impose no filter (flat list or nothing
    /// selected yet).
    pub fn visible_rows(&self, tree: &FolderTree) -> Option<Vec<usize>> {
        if tree.is_flat() || self.active.is_empty() {
            return None;
        }
        tree.folder(&self.active).map(|folder| folder.rows())
    }

    /// Tab rows to render, top level first.
    ///
    /// A sub-tab row appears below each selected folder that has child
    /// folders. Flat trees render no tabs at all.
    pub fn tab_rows(&self, tree: &FolderTree) -> Vec<TabRow> {
        if tree.is_flat() {
            return Vec::new();
        }

        let mut rows = vec![TabRow {
            depth: 0,
            tabs: tree.top_level().iter().map(|f| f.name.clone()).collect(),
            active: self.active.first().cloned(),
        }];

        for depth in 0..self.active.len() {
            let Some(folder) = tree.folder(&self.active[..=depth]) else {
                break;
            };
            if folder.children.is_empty() {
                break;
            }
            rows.push(TabRow {
                depth: depth + 1,
                tabs: folder.child_names(),
                active: self.active.get(depth + 1).cloned(),
            });
        }

        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::separator::{detect_separator, Separator};

    fn tree(values: &[&str]) -> FolderTree {
        FolderTree::build(values, detect_separator(values, true), |_| false)
    }

    #[test]
    fn test_flat_tree_has_no_tabs() {
        let t = tree(&["a.png", "b.png"]);
        let mut nav = TabNavigator::new();
        nav.sync_to_row(&t, 1);

        assert!(nav.tab_rows(&t).is_empty());
        assert_eq!(nav.visible_rows(&t), None);
        assert!(!nav.select(&t, 0, "Root"));
    }

    #[test]
    fn test_initial_sync_to_root() {
        let t = tree(&["a.png", "sub\\b.png", "sub\\c.png"]);
        let mut nav = TabNavigator::new();
        nav.sync_to_row(&t, 0);

        assert_eq!(nav.active_path(), ["Root".to_string()]);
        assert_eq!(nav.visible_rows(&t), Some(vec![0]));

        let rows = nav.tab_rows(&t);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].tabs, vec!["Root", "sub"]);
        assert_eq!(rows[0].active.as_deref(), Some("Root"));
    }

    #[test]
    fn test_sync_expands_nested_selection() {
        let t = tree(&["a/b/c.png", "a/d.png", "e.png"]);
        let mut nav = TabNavigator::new();
        nav.sync_to_row(&t, 0);

        assert_eq!(nav.active_path(), ["a".to_string(), "b".to_string()]);
        assert_eq!(nav.visible_rows(&t), Some(vec![0]));

        let rows = nav.tab_rows(&t);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[1].tabs, vec!["b"]);
        assert_eq!(rows[1].active.as_deref(), Some("b"));
    }

    #[test]
    fn test_clicking_replaces_deeper_rows() {
        let t = tree(&["a/b/c.png", "a/d.png", "x/y/z.png", "e.png"]);
        let mut nav = TabNavigator::new();
        nav.sync_to_row(&t, 0);
        assert_eq!(nav.tab_rows(&t).len(), 2);

        assert!(nav.select(&t, 0, "x"));
        assert_eq!(nav.active_path(), ["x".to_string()]);
        // x has no direct files, only the y sub-tab
        assert_eq!(nav.visible_rows(&t), Some(vec![]));

        let rows = nav.tab_rows(&t);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].tabs, vec!["y"]);
        assert_eq!(rows[1].active, None);

        assert!(nav.select(&t, 1, "y"));
        assert_eq!(nav.visible_rows(&t), Some(vec![2]));
    }

    #[test]
    fn test_select_rejects_unknown_tabs() {
        let t = tree(&["a/b.png", "c.png"]);
        let mut nav = TabNavigator::new();
        nav.sync_to_row(&t, 1);

        assert!(!nav.select(&t, 0, "missing"));
        assert!(!nav.select(&t, 3, "a"));
        assert_eq!(nav.active_path(), ["Root".to_string()]);
    }

    #[test]
    fn test_tab_nesting_matches_directory_prefix() {
        let values = ["p/q/r/1.png", "p/q/2.png", "p/3.png", "s/4.png", "5.png"];
        let t = FolderTree::build(&values, Some(Separator::Slash), |_| false);

        for (row, value) in values.iter().enumerate() {
            let segments: Vec<&str> = value.split('/').collect();
            let dirs = &segments[..segments.len() - 1];

            let mut nav = TabNavigator::new();
            if dirs.is_empty() {
                assert!(nav.select(&t, 0, ROOT_FOLDER));
            } else {
                for (depth, dir) in dirs.iter().enumerate() {
                    assert!(nav.select(&t, depth, dir), "tab {dir} at depth {depth}");
                }
            }
            assert!(nav.visible_rows(&t).unwrap().contains(&row));
        }
    }

    #[test]
    fn test_unknown_row_falls_back_to_root() {
        let t = tree(&["a/b.png", "c.png"]);
        let mut nav = TabNavigator::new();
        nav.sync_to_row(&t, 99);
        assert_eq!(nav.active_path(), ["Root".to_string()]);
    }

    #[test]
    fn test_retain_valid_after_rebuild() {
        let before = tree(&["a/b/c.png", "d.png"]);
        let mut nav = TabNavigator::new();
        nav.sync_to_row(&before, 0);

        let after = tree(&["a/x.png", "d.png"]);
        nav.retain_valid(&after);
        assert_eq!(nav.active_path(), ["a".to_string()]);

        let gone = tree(&["d.png", "e/f.png"]);
        nav.retain_valid(&gone);
        assert_eq!(nav.active_path(), ["Root".to_string()]);
    }
}
