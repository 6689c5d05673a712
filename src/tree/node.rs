//! Tree node types

use std::collections::HashMap;

use crate::record::EntryKind;

/// A node of the archive tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Directory(Directory),
    Leaf(Leaf),
}

impl TreeNode {
    pub fn empty_dir() -> Self {
        TreeNode::Directory(Directory::new())
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory(_))
    }

    pub fn as_dir(&self) -> Option<&Directory> {
        match self {
            TreeNode::Directory(dir) => Some(dir),
            TreeNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            TreeNode::Leaf(leaf) => Some(leaf),
            TreeNode::Directory(_) => None,
        }
    }
}

/// Metadata of a non-directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Leaf {
    pub size: u64,
    pub kind: EntryKind,
    pub mtime: Option<i64>,
}

impl Leaf {
    pub fn new(size: u64, kind: EntryKind) -> Self {
        Self {
            size,
            kind,
            mtime: None,
        }
    }
}

/// Children keyed by name.
///
/// Iteration follows the order in which names were first inserted. Equality compares
/// the mapping only, so two directories built from the same entries in a different
/// order are equal.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    children: HashMap<String, TreeNode>,
    order: Vec<String>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TreeNode> {
        self.children.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut TreeNode> {
        self.children.get_mut(name)
    }

    /// Children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TreeNode)> {
        self.order
            .iter()
            .filter_map(|name| self.children.get(name).map(|node| (name.as_str(), node)))
    }

    /// Insert a new child, replacing any existing node while keeping its position.
    pub(crate) fn insert(&mut self, name: &str, node: TreeNode) {
        if self.children.insert(name.to_string(), node).is_none() {
            self.order.push(name.to_string());
        }
    }

    /// Get the named child, creating an empty directory if it is missing.
    pub(crate) fn child_or_empty_dir(&mut self, name: &str) -> &mut TreeNode {
        if !self.children.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.children
            .entry(name.to_string())
            .or_insert_with(TreeNode::empty_dir)
    }
}

impl PartialEq for Directory {
    fn eq(&self, other: &Self) -> bool {
        self.children == other.children
    }
}

impl Eq for Directory {}
