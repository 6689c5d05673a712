//! Archive tree construction
//!
//! Parsed listing entries are inserted one at a time into an [`ArchiveTree`], a
//! nested map of [`TreeNode`]s keyed by path segment. The tree is complete before
//! anything is exported.

mod builder;
mod node;
mod summary;

pub use builder::ArchiveTree;
pub use node::{Directory, Leaf, TreeNode};
pub use summary::TreeSummary;
