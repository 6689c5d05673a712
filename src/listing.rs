//! Reading a whole listing into an [`ArchiveTree`]

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::parse_line;
use crate::tree::ArchiveTree;

/// Parse every line of `reader` and insert it into a fresh tree.
///
/// `source` only names the input in error messages. The first malformed line or
/// conflicting entry aborts the build.
pub fn build_tree<R: BufRead>(mut reader: R, source: &Path) -> Result<ArchiveTree> {
    let mut tree = ArchiveTree::new();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| Error::io(source, e))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        // Names are escaped by tar, but don't trust every producer to do so.
        let line = String::from_utf8_lossy(&buf);
        let entry = match parse_line(&line) {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(reason) => {
                return Err(Error::MalformedRecord {
                    line_number,
                    line: line.trim_end_matches(['\n', '\r']).to_string(),
                    reason,
                });
            }
        };
        tree.insert(entry)?;
    }

    debug!(lines = line_number, source = %source.display(), "listing parsed");
    Ok(tree)
}

/// Open an index file and build its tree.
pub fn read_index(path: &Path) -> Result<ArchiveTree> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    build_tree(BufReader::new(file), path)
}

/// Build a tree from listing text held in memory.
pub fn parse_listing(text: &str) -> Result<ArchiveTree> {
    build_tree(text.as_bytes(), Path::new("<memory>"))
}
