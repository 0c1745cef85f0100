//! Folder tree construction from a flat, ordered list of option values.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::separator::Separator;

/// Name of the folder holding values without any separator.
pub const ROOT_FOLDER: &str = "Root";

/// A leaf value placed inside a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Index of the owning row in the original value list
    pub row: usize,
    /// Final path segment (the file name)
    pub name: String,
}

/// A folder and everything nested directly beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FolderNode {
    /// Folder name (a single path segment)
    pub name: String,
    /// Files directly inside this folder, in list order
    pub files: Vec<FileEntry>,
    /// Child folders, in first-seen order
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Create an empty folder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Find a direct child folder by name.
    pub fn child(&self, name: &str) -> Option<&FolderNode> {
        self.children.iter().find(|c| c.name == name)
    }

    fn child_or_insert(&mut self, name: &str) -> &mut FolderNode {
        let idx = match self.children.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                self.children.push(FolderNode::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[idx]
    }

    /// Rows of the files directly inside this folder.
    pub fn rows(&self) -> Vec<usize> {
        self.files.iter().map(|f| f.row).collect()
    }

    /// Names of the direct child folders.
    pub fn child_names(&self) -> Vec<String> {
        self.children.iter().map(|c| c.name.clone()).collect()
    }

    /// Total number of files in this folder and all descendants.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.children.iter().map(FolderNode::file_count).sum::<usize>()
    }

    fn locate(&self, row: usize, path: &mut Vec<String>) -> bool {
        path.push(self.name.clone());
        if self.files.iter().any(|f| f.row == row) {
            return true;
        }
        for child in &self.children {
            if child.locate(row, path) {
                return true;
            }
        }
        path.pop();
        false
    }
}

/// Serializes as `{ "files": [...], "<child>": { ... }, ... }`.
impl Serialize for FolderNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.children.len()))?;
        let names: Vec<&str> = self.files.iter().map(|f| f.name.as_str()).collect();
        map.serialize_entry("files", &names)?;
        for child in &self.children {
            map.serialize_entry(&child.name, child)?;
        }
        map.end()
    }
}

/// The complete folder hierarchy of one option list.
///
/// The top level always starts with the [`ROOT_FOLDER`] tab, followed by
/// the top-level folders in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderTree {
    separator: Option<Separator>,
    top: FolderNode,
}

impl FolderTree {
    /// Partition `values` into folders.
    ///
    /// Every segment but the last becomes a folder key; the last maps the
    /// row into that folder's file list. Values without a separator (or
    /// every value, when `separator` is `None`) land in `Root`. Values for
    /// which `skip` returns true are left out entirely.
    pub fn build<S, F>(values: &[S], separator: Option<Separator>, skip: F) -> Self
    where
        S: AsRef<str>,
        F: Fn(&str) -> bool,
    {
        let mut top = FolderNode::new("");
        top.children.push(FolderNode::new(ROOT_FOLDER));

        for (row, value) in values.iter().enumerate() {
            let value = value.as_ref();
            if skip(value) {
                continue;
            }

            let segments = match separator {
                Some(sep) => sep.split(value),
                None => vec![value],
            };

            let Some((file, dirs)) = segments.split_last() else {
                continue;
            };

            let folder = if dirs.is_empty() {
                top.child_or_insert(ROOT_FOLDER)
            } else {
                dirs.iter()
                    .fold(&mut top, |node, dir| node.child_or_insert(dir))
            };

            folder.files.push(FileEntry {
                row,
                name: (*file).to_string(),
            });
        }

        log::debug!(
            "Built folder tree: {} top-level tabs, separator {:?}",
            top.children.len(),
            separator
        );

        Self { separator, top }
    }

    /// The separator used to build this tree, if any.
    pub fn separator(&self) -> Option<Separator> {
        self.separator
    }

    /// Whether the list stayed flat (no hierarchy, no tabs).
    pub fn is_flat(&self) -> bool {
        self.separator.is_none()
    }

    /// Top-level folders, `Root` first.
    pub fn top_level(&self) -> &[FolderNode] {
        &self.top.children
    }

    /// The `Root` folder.
    pub fn root(&self) -> &FolderNode {
        &self.top.children[0]
    }

    /// Resolve a folder by its path of names from the top level.
    pub fn folder(&self, path: &[String]) -> Option<&FolderNode> {
        path.iter().try_fold(&self.top, |node, name| node.child(name))
    }

    /// Folder path of the folder owning `row`, or `None` if the row was
    /// skipped or is out of range.
    pub fn locate(&self, row: usize) -> Option<Vec<String>> {
        let mut path = Vec::new();
        for folder in &self.top.children {
            if folder.locate(row, &mut path) {
                return Some(path);
            }
        }
        None
    }

    /// Total number of files placed in the tree.
    pub fn file_count(&self) -> usize {
        self.top.file_count()
    }
}

impl Serialize for FolderTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.top.children.len()))?;
        for folder in &self.top.children {
            map.serialize_entry(&folder.name, folder)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::separator::detect_separator;

    fn names(node: &FolderNode) -> Vec<&str> {
        node.files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_flat_list_goes_to_root() {
        let values = ["a.png", "b.png", "c.png"];
        let tree = FolderTree::build(&values, detect_separator(&values, true), |_| false);

        assert!(tree.is_flat());
        assert_eq!(tree.top_level().len(), 1);
        assert_eq!(tree.root().rows(), vec![0, 1, 2]);
        assert!(tree.root().children.is_empty());
    }

    #[test]
    fn test_backslash_scenario() {
        let values = ["a.png", "sub\\b.png", "sub\\c.png"];
        let tree = FolderTree::build(&values, detect_separator(&values, true), |_| false);

        let tabs: Vec<&str> = tree.top_level().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(tabs, vec!["Root", "sub"]);
        assert_eq!(names(tree.root()), vec!["a.png"]);

        let sub = tree.folder(&["sub".to_string()]).unwrap();
        assert_eq!(names(sub), vec!["b.png", "c.png"]);
        assert_eq!(sub.rows(), vec![1, 2]);
    }

    #[test]
    fn test_serialized_shape() {
        let values = ["a.png", "sub\\b.png", "sub\\deep\\c.png"];
        let tree = FolderTree::build(&values, Some(Separator::Backslash), |_| false);

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "Root": { "files": ["a.png"] },
                "sub": {
                    "files": ["b.png"],
                    "deep": { "files": ["c.png"] }
                }
            })
        );
    }

    #[test]
    fn test_every_leaf_in_exactly_one_folder() {
        let values = [
            "x/1.png",
            "x/y/2.png",
            "x/y/3.png",
            "z/4.png",
            "5.png",
            "x/y/w/6.png",
        ];
        let tree = FolderTree::build(&values, Some(Separator::Slash), |_| false);

        assert_eq!(tree.file_count(), values.len());
        for (row, value) in values.iter().enumerate() {
            let path = tree.locate(row).unwrap();
            let prefix: Vec<&str> = value.split('/').collect();
            let dirs = &prefix[..prefix.len() - 1];
            if dirs.is_empty() {
                assert_eq!(path, vec![ROOT_FOLDER.to_string()]);
            } else {
                assert_eq!(path, dirs.iter().map(|s| s.to_string()).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_skipped_values_are_excluded() {
        let values = ["keep/a.png", "rgthreefolder", "b.png"];
        let tree = FolderTree::build(&values, Some(Separator::Slash), |v| v == "rgthreefolder");

        assert_eq!(tree.file_count(), 2);
        assert_eq!(tree.locate(1), None);
        assert_eq!(tree.root().rows(), vec![2]);
    }

    #[test]
    fn test_root_named_folder_merges() {
        let values = ["Root/a.png", "b.png"];
        let tree = FolderTree::build(&values, Some(Separator::Slash), |_| false);

        assert_eq!(tree.top_level().len(), 1);
        assert_eq!(tree.root().rows(), vec![0, 1]);
    }

    #[test]
    fn test_folder_lookup_missing() {
        let values = ["a/b.png"];
        let tree = FolderTree::build(&values, Some(Separator::Slash), |_| false);
        assert!(tree.folder(&["nope".to_string()]).is_none());
        assert!(tree.folder(&["a".to_string(), "b.png".to_string()]).is_none());
    }
}
