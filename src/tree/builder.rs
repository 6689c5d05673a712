//! ArchiveTree - builds the nested tree from parsed listing entries

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::record::{EntryKind, PathEntry};

use super::node::{Directory, Leaf, TreeNode};
use super::summary::TreeSummary;

/// The archived filesystem as a tree rooted at `/`.
///
/// Missing ancestors are created as empty directories on demand. A path can never be
/// both a leaf and a directory; inserting such an entry fails with
/// [`Error::ConflictingEntry`]. Apart from that, insertion order does not change the
/// resulting tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveTree {
    root: Directory,
}

impl ArchiveTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from entries, stopping at the first conflict.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = PathEntry>,
    {
        let mut tree = Self::new();
        for entry in entries {
            tree.insert(entry)?;
        }
        Ok(tree)
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    /// Look up a node by its `/`-separated path.
    pub fn get(&self, path: &str) -> Option<&TreeNode> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |node, segment| {
            node.as_dir()?.get(segment)
        })
    }

    pub fn summary(&self) -> TreeSummary {
        TreeSummary::collect(&self.root)
    }

    /// Insert one parsed entry.
    ///
    /// - a directory entry over an existing directory keeps that directory's children
    /// - a leaf entry over an existing leaf replaces it (later archive members win)
    /// - anything that would turn a leaf into a directory or back is a conflict
    pub fn insert(&mut self, entry: PathEntry) -> Result<()> {
        if entry.is_root() {
            return Ok(());
        }

        let is_dir = entry.kind == EntryKind::Directory;
        let names = match entry.segments.split_last() {
            Some((last, parents)) if is_dir && last.is_empty() => parents,
            _ => &entry.segments[..],
        };
        let Some((name, parents)) = names.split_last() else {
            return Ok(());
        };

        let mut dir = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            dir = match dir.child_or_empty_dir(segment) {
                TreeNode::Directory(child) => child,
                TreeNode::Leaf(_) => return Err(conflict(&names[..=depth])),
            };
        }

        trace!(path = %entry.path(), kind = ?entry.kind, size = entry.size, "insert");

        match dir.get_mut(name) {
            None if is_dir => dir.insert(name, TreeNode::empty_dir()),
            None => dir.insert(name, TreeNode::Leaf(leaf_of(&entry))),
            Some(TreeNode::Directory(_)) if is_dir => {}
            Some(TreeNode::Leaf(existing)) if !is_dir => {
                warn!(path = %entry.path(), "duplicate archive member, keeping the later one");
                *existing = leaf_of(&entry);
            }
            Some(_) => return Err(conflict(names)),
        }

        Ok(())
    }
}

fn leaf_of(entry: &PathEntry) -> Leaf {
    Leaf {
        size: entry.size,
        kind: entry.kind,
        mtime: entry.mtime,
    }
}

fn conflict(names: &[String]) -> Error {
    Error::ConflictingEntry {
        path: names.join("/"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, size: u64) -> PathEntry {
        entry(path, size, EntryKind::File)
    }

    fn dir(path: &str) -> PathEntry {
        entry(path, 0, EntryKind::Directory)
    }

    fn entry(path: &str, size: u64, kind: EntryKind) -> PathEntry {
        let mut segments: Vec<String> = path.split('/').map(String::from).collect();
        if kind == EntryKind::Directory && segments.last().is_some_and(|s| !s.is_empty()) {
            segments.push(String::new());
        }
        PathEntry {
            segments,
            size,
            kind,
            mtime: None,
        }
    }

    fn build(entries: Vec<PathEntry>) -> ArchiveTree {
        ArchiveTree::from_entries(entries).expect("entries should not conflict")
    }

    // ==================== Structure Tests ====================

    #[test]
    fn test_scenario_tree() {
        let tree = build(vec![
            dir("var/"),
            file("var/log.txt", 1024),
            entry("var/cur", 0, EntryKind::Symlink),
        ]);

        let var = tree.get("var").and_then(TreeNode::as_dir).expect("var dir");
        assert_eq!(var.len(), 2);
        assert_eq!(
            tree.get("var/log.txt").and_then(TreeNode::as_leaf),
            Some(&Leaf::new(1024, EntryKind::File))
        );
        assert_eq!(
            tree.get("var/cur").and_then(TreeNode::as_leaf),
            Some(&Leaf::new(0, EntryKind::Symlink))
        );
    }

    #[test]
    fn test_missing_ancestors_are_created() {
        let tree = build(vec![file("a/b/c/d.txt", 4)]);
        assert!(tree.get("a").is_some_and(TreeNode::is_dir));
        assert!(tree.get("a/b/c").is_some_and(TreeNode::is_dir));
        assert!(tree.get("a/b/c/d.txt").is_some_and(|n| !n.is_dir()));
    }

    #[test]
    fn test_empty_directory_stays_empty() {
        let tree = build(vec![dir("empty/")]);
        let empty = tree.get("empty").and_then(TreeNode::as_dir).expect("dir");
        assert!(empty.is_empty());
    }

    #[test]
    fn test_directory_entry_after_children_keeps_them() {
        let tree = build(vec![file("etc/hosts", 10), dir("etc/")]);
        let etc = tree.get("etc").and_then(TreeNode::as_dir).expect("dir");
        assert_eq!(etc.len(), 1);
    }

    #[test]
    fn test_root_entry_is_ignored() {
        let root = PathEntry {
            segments: vec![String::new()],
            size: 0,
            kind: EntryKind::Directory,
            mtime: None,
        };
        let tree = build(vec![root, file("a", 1)]);
        assert_eq!(tree.root().len(), 1);
    }

    #[test]
    fn test_duplicate_leaf_keeps_later_entry() {
        let tree = build(vec![file("a.txt", 1), file("a.txt", 2)]);
        assert_eq!(
            tree.get("a.txt").and_then(TreeNode::as_leaf).map(|l| l.size),
            Some(2)
        );
    }

    // ==================== Order Independence Tests ====================

    #[test]
    fn test_order_independence() {
        let entries = vec![
            dir("usr/"),
            dir("usr/bin/"),
            file("usr/bin/ls", 100),
            entry("usr/bin/dir", 0, EntryKind::Symlink),
            file("usr/share/doc/README", 5),
            dir("tmp/"),
            file("top.txt", 7),
        ];
        let expected = build(entries.clone());

        // Every rotation and its reverse.
        for shift in 0..entries.len() {
            let mut rotated = entries.clone();
            rotated.rotate_left(shift);
            assert_eq!(build(rotated.clone()), expected, "rotation {}", shift);
            rotated.reverse();
            assert_eq!(build(rotated), expected, "reversed rotation {}", shift);
        }
    }

    // ==================== Conflict Tests ====================

    #[test]
    fn test_descending_through_leaf_conflicts() {
        let mut tree = ArchiveTree::new();
        tree.insert(file("a/b", 1)).unwrap();
        let err = tree.insert(file("a/b/c", 1)).unwrap_err();
        match err {
            Error::ConflictingEntry { path } => assert_eq!(path, "a/b"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_leaf_over_ancestor_conflicts() {
        let mut tree = ArchiveTree::new();
        tree.insert(file("a/b/c", 1)).unwrap();
        let err = tree.insert(file("a/b", 1)).unwrap_err();
        assert!(matches!(err, Error::ConflictingEntry { ref path } if path == "a/b"));
    }

    #[test]
    fn test_directory_over_leaf_conflicts() {
        let mut tree = ArchiveTree::new();
        tree.insert(file("x", 1)).unwrap();
        let err = tree.insert(dir("x/")).unwrap_err();
        assert!(matches!(err, Error::ConflictingEntry { ref path } if path == "x"));
    }

    #[test]
    fn test_leaf_over_directory_conflicts() {
        let mut tree = ArchiveTree::new();
        tree.insert(dir("x/")).unwrap();
        let err = tree.insert(file("x", 1)).unwrap_err();
        assert!(matches!(err, Error::ConflictingEntry { ref path } if path == "x"));
    }
}
