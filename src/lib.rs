//! tarncdu - browse tar archives in ncdu without extracting them
//!
//! The pipeline reads a `tar -tv` listing line by line ([`record`]), builds a nested
//! tree of the archived filesystem ([`tree`]), and flattens it into ncdu's JSON export
//! format ([`output`]). [`index`] produces and caches the listing for an archive.

pub mod error;
pub mod index;
pub mod listing;
pub mod output;
pub mod record;
pub mod tree;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Error, RecordError, Result};
pub use index::{IndexOptions, ensure_index, index_path_for};
pub use listing::{build_tree, parse_listing, read_index};
pub use output::{
    ExportConfig, ExportDocument, ExportNode, export, flatten, render_json, write_json,
};
pub use record::{EntryKind, PathEntry, parse_line};
pub use tree::{ArchiveTree, Directory, Leaf, TreeNode, TreeSummary};
