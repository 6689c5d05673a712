//! Aggregate counts over a built tree

use std::fmt;

use crate::record::EntryKind;

use super::node::{Directory, TreeNode};

/// Entry counts and total apparent size of a tree. The root is not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub files: usize,
    pub directories: usize,
    pub symlinks: usize,
    pub special: usize,
    pub total_size: u64,
}

impl TreeSummary {
    pub(crate) fn collect(root: &Directory) -> Self {
        let mut summary = Self::default();
        summary.record_dir(root);
        summary
    }

    fn record_dir(&mut self, dir: &Directory) {
        for (_, node) in dir.iter() {
            match node {
                TreeNode::Directory(child) => {
                    self.directories += 1;
                    self.record_dir(child);
                }
                TreeNode::Leaf(leaf) => {
                    match leaf.kind {
                        EntryKind::Symlink => self.symlinks += 1,
                        EntryKind::Special => self.special += 1,
                        EntryKind::File | EntryKind::Directory => self.files += 1,
                    }
                    self.total_size += leaf.size;
                }
            }
        }
    }
}

impl fmt::Display for TreeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} directories, {} files, {} symlinks",
            self.directories, self.files, self.symlinks
        )?;
        if self.special > 0 {
            write!(f, ", {} special", self.special)?;
        }
        write!(f, ", {} bytes", self.total_size)
    }
}
