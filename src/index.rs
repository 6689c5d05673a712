//! Locating and generating `<archive>.index` listing files
//!
//! The listing is produced by `tar --index-file <index> -tvf <archive>` and cached
//! next to the archive, so repeated runs over a large archive skip the scan.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

const INDEX_EXTENSION: &str = ".index";

/// How the index file is obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexOptions {
    /// Program invoked to list the archive.
    pub tar_program: String,
    /// Regenerate the index even if one already exists.
    pub refresh: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            tar_program: "tar".to_string(),
            refresh: false,
        }
    }
}

/// Path of the cached index for `archive`: the archive path with `.index` appended.
pub fn index_path_for(archive: &Path) -> PathBuf {
    let archive = std::path::absolute(archive).unwrap_or_else(|_| archive.to_path_buf());
    let mut name = OsString::from(archive.as_os_str());
    name.push(INDEX_EXTENSION);
    PathBuf::from(name)
}

/// Return the index path for `archive`, running tar first if there is no usable index.
pub fn ensure_index(archive: &Path, options: &IndexOptions) -> Result<PathBuf> {
    let index = index_path_for(archive);

    if index.is_file() && !options.refresh {
        debug!(index = %index.display(), "reusing cached index");
        return Ok(index);
    }

    if !archive.is_file() {
        return Err(Error::io(
            archive,
            io::Error::new(io::ErrorKind::NotFound, "archive not found"),
        ));
    }

    info!(archive = %archive.display(), program = %options.tar_program, "generating index");
    let start = Instant::now();

    let status = Command::new(&options.tar_program)
        .arg("--index-file")
        .arg(&index)
        .arg("-tvf")
        .arg(archive)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .status()
        .map_err(|e| Error::Archiver {
            program: options.tar_program.clone(),
            reason: format!("failed to start: {}", e),
        })?;

    if !status.success() {
        // A half-written index would be reused by the next run.
        match fs::remove_file(&index) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(index = %index.display(), "failed to remove partial index: {}", e),
        }
        return Err(Error::Archiver {
            program: options.tar_program.clone(),
            reason: format!("listing '{}' failed ({})", archive.display(), status),
        });
    }

    debug!(
        index = %index.display(),
        elapsed = %humantime::format_duration(start.elapsed()),
        "index generated"
    );
    Ok(index)
}
