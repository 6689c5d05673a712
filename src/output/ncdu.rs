//! Flattening an [`ArchiveTree`] into the ncdu export format
//!
//! ncdu's JSON export is an array `[major, minor, metadata, root]`. A directory is an
//! array whose first element is the directory's info object and whose remaining
//! elements are its children; a file is a plain info object:
//!
//! ```text
//! [1, 0, {"progname": "tarncdu", "progver": "0.1.0", "timestamp": 1704110400},
//!   [{"name": "/"},
//!     [{"name": "var"},
//!       {"name": "log.txt", "asize": 1024, "dsize": 1024, "notreg": false}]]]
//! ```

use serde::Serialize;
use serde::ser::{SerializeSeq, SerializeTuple, Serializer};

use crate::tree::{ArchiveTree, Directory, Leaf, TreeNode};

use super::config::ExportConfig;

pub const MAJOR_VERSION: u32 = 1;
pub const MINOR_VERSION: u32 = 0;

const ROOT_NAME: &str = "/";

/// Info object of an exported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    pub name: String,
    pub asize: u64,
    pub dsize: u64,
    pub notreg: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtime: Option<i64>,
}

/// Info object of an exported directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirInfo {
    pub name: String,
}

/// One exported node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportNode {
    File(FileInfo),
    Dir {
        info: DirInfo,
        children: Vec<ExportNode>,
    },
}

impl ExportNode {
    pub fn name(&self) -> &str {
        match self {
            ExportNode::File(info) => &info.name,
            ExportNode::Dir { info, .. } => &info.name,
        }
    }
}

impl Serialize for ExportNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExportNode::File(info) => info.serialize(serializer),
            ExportNode::Dir { info, children } => {
                let mut seq = serializer.serialize_seq(Some(children.len() + 1))?;
                seq.serialize_element(info)?;
                for child in children {
                    seq.serialize_element(child)?;
                }
                seq.end()
            }
        }
    }
}

/// Metadata object of the export envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportMeta {
    pub progname: String,
    pub progver: String,
    pub timestamp: i64,
}

/// The complete export: version, metadata and root directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDocument {
    pub major: u32,
    pub minor: u32,
    pub meta: ExportMeta,
    pub root: ExportNode,
}

impl Serialize for ExportDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.major)?;
        tuple.serialize_element(&self.minor)?;
        tuple.serialize_element(&self.meta)?;
        tuple.serialize_element(&self.root)?;
        tuple.end()
    }
}

/// Wrap the flattened tree in the export envelope.
pub fn export(tree: &ArchiveTree, config: &ExportConfig) -> ExportDocument {
    ExportDocument {
        major: MAJOR_VERSION,
        minor: MINOR_VERSION,
        meta: ExportMeta {
            progname: config.progname.clone(),
            progver: config.progver.clone(),
            timestamp: config.timestamp,
        },
        root: flatten(tree, config),
    }
}

/// Flatten the tree depth-first. The root is always named `/`; children appear in
/// the order they were first seen in the listing.
pub fn flatten(tree: &ArchiveTree, config: &ExportConfig) -> ExportNode {
    flatten_dir(ROOT_NAME, tree.root(), config)
}

fn flatten_dir(name: &str, dir: &Directory, config: &ExportConfig) -> ExportNode {
    let children = dir
        .iter()
        .map(|(child_name, node)| match node {
            TreeNode::Directory(child) => flatten_dir(child_name, child, config),
            TreeNode::Leaf(leaf) => flatten_leaf(child_name, leaf, config),
        })
        .collect();

    ExportNode::Dir {
        info: DirInfo {
            name: name.to_string(),
        },
        children,
    }
}

fn flatten_leaf(name: &str, leaf: &Leaf, config: &ExportConfig) -> ExportNode {
    ExportNode::File(FileInfo {
        name: name.to_string(),
        asize: leaf.size,
        dsize: leaf.size,
        notreg: !leaf.kind.is_regular(),
        mtime: if config.extended { leaf.mtime } else { None },
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::listing::parse_listing;

    use super::*;

    const SCENARIO: &str = "\
drwxr-xr-x user group 0 2024-01-01 12:00 var/
-rw-r--r-- user group 1024 2024-01-01 12:00 var/log.txt
lrwxrwxrwx user group 0 2024-01-01 12:00 var/cur -> log.txt
";

    fn config() -> ExportConfig {
        ExportConfig::new("tarncdu", "0.1.0").with_timestamp(1_700_000_000)
    }

    /// Collect every file info object in the export.
    fn files(node: &ExportNode, out: &mut Vec<FileInfo>) {
        match node {
            ExportNode::File(info) => out.push(info.clone()),
            ExportNode::Dir { children, .. } => {
                for child in children {
                    files(child, out);
                }
            }
        }
    }

    // ==================== Structure Tests ====================

    #[test]
    fn test_scenario_export_root() {
        let tree = parse_listing(SCENARIO).unwrap();
        let root = flatten(&tree, &config());

        assert_eq!(
            serde_json::to_value(&root).unwrap(),
            json!([
                {"name": "/"},
                [
                    {"name": "var"},
                    {"name": "log.txt", "asize": 1024, "dsize": 1024, "notreg": false},
                    {"name": "cur", "asize": 0, "dsize": 0, "notreg": true}
                ]
            ])
        );
    }

    #[test]
    fn test_envelope() {
        let tree = parse_listing(SCENARIO).unwrap();
        let value = serde_json::to_value(export(&tree, &config())).unwrap();

        assert_eq!(value[0], json!(1));
        assert_eq!(value[1], json!(0));
        assert_eq!(
            value[2],
            json!({"progname": "tarncdu", "progver": "0.1.0", "timestamp": 1_700_000_000})
        );
        assert_eq!(value[3][0], json!({"name": "/"}));
        assert_eq!(value.as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn test_root_named_slash_for_empty_tree() {
        let root = flatten(&ArchiveTree::new(), &config());
        assert_eq!(serde_json::to_value(&root).unwrap(), json!([{"name": "/"}]));
    }

    #[test]
    fn test_explicit_root_entry_is_not_duplicated() {
        let tree = parse_listing(
            "drwxr-xr-x root/root 0 2024-01-01 12:00 ./\n\
             -rw-r--r-- root/root 5 2024-01-01 12:00 ./a\n",
        )
        .unwrap();
        let root = flatten(&tree, &config());
        assert_eq!(
            serde_json::to_value(&root).unwrap(),
            json!([{"name": "/"}, {"name": "a", "asize": 5, "dsize": 5, "notreg": false}])
        );
    }

    #[test]
    fn test_empty_directory_exports_name_only() {
        let tree = parse_listing("drwxr-xr-x root/root 0 2024-01-01 12:00 empty/\n").unwrap();
        let root = flatten(&tree, &config());
        assert_eq!(
            serde_json::to_value(&root).unwrap(),
            json!([{"name": "/"}, [{"name": "empty"}]])
        );
    }

    #[test]
    fn test_children_follow_listing_order() {
        let tree = parse_listing(
            "-rw-r--r-- root/root 1 2024-01-01 12:00 zz\n\
             -rw-r--r-- root/root 1 2024-01-01 12:00 aa\n\
             -rw-r--r-- root/root 1 2024-01-01 12:00 mm/x\n",
        )
        .unwrap();
        let ExportNode::Dir { children, .. } = flatten(&tree, &config()) else {
            panic!("root must be a directory");
        };
        let names: Vec<&str> = children.iter().map(ExportNode::name).collect();
        assert_eq!(names, vec!["zz", "aa", "mm"]);
    }

    // ==================== Size And Flag Tests ====================

    #[test]
    fn test_sizes_are_preserved() {
        let tree = parse_listing(
            "-rw-r--r-- root/root 0 2024-01-01 12:00 a/empty\n\
             -rw-r--r-- root/root 4096 2024-01-01 12:00 a/b/page\n\
             -rw-r--r-- root/root 18446744073709551615 2024-01-01 12:00 huge\n",
        )
        .unwrap();
        let mut out = Vec::new();
        files(&flatten(&tree, &config()), &mut out);

        let sizes: Vec<(String, u64)> = out.iter().map(|f| (f.name.clone(), f.asize)).collect();
        assert_eq!(
            sizes,
            vec![
                ("empty".to_string(), 0),
                ("page".to_string(), 4096),
                ("huge".to_string(), u64::MAX),
            ]
        );
        assert!(out.iter().all(|f| f.asize == f.dsize));
    }

    #[test]
    fn test_special_files_are_not_regular() {
        let tree = parse_listing(
            "crw-rw-rw- root/root 1,3 2024-01-01 12:00 dev/null\n\
             hrw-r--r-- root/root 0 2024-01-01 12:00 dev/hard link to dev/null\n",
        )
        .unwrap();
        let mut out = Vec::new();
        files(&flatten(&tree, &config()), &mut out);
        let flags: Vec<(&str, bool)> = out.iter().map(|f| (f.name.as_str(), f.notreg)).collect();
        assert_eq!(flags, vec![("null", true), ("hard", false)]);
    }

    #[test]
    fn test_mtime_only_in_extended_mode() {
        let tree = parse_listing("-rw-r--r-- root/root 1 2024-01-01 12:00 a\n").unwrap();

        let plain = serde_json::to_value(flatten(&tree, &config())).unwrap();
        assert!(plain[1].get("mtime").is_none());

        let extended =
            serde_json::to_value(flatten(&tree, &config().with_extended(true))).unwrap();
        assert_eq!(extended[1]["mtime"], json!(1_704_110_400));
    }
}
