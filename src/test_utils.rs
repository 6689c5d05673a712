//! Test utilities for listing fixtures.
//!
//! This module is only compiled for tests and benchmarks.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary directory holding listing files, archives and fake tar programs.
///
/// The directory is automatically cleaned up when dropped.
pub struct ListingFixture {
    dir: TempDir,
}

impl ListingFixture {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` inside the fixture directory.
    ///
    /// Creates parent directories as needed.
    pub fn write_index(&self, name: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(name);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Create a shell script that behaves like `tar --index-file <index> -tvf <archive>`
    /// by writing `listing` to the index file.
    #[cfg(unix)]
    pub fn fake_tar(&self, listing: &str) -> PathBuf {
        let script = format!(
            "#!/bin/sh\ncat > \"$2\" <<'LISTING'\n{}\nLISTING\n",
            listing.trim_end()
        );
        self.write_script("fake-tar", &script)
    }

    /// Create a tar stand-in that writes a partial index and then fails.
    #[cfg(unix)]
    pub fn failing_tar(&self) -> PathBuf {
        self.write_script(
            "failing-tar",
            "#!/bin/sh\necho partial > \"$2\"\necho 'tar: not an archive' >&2\nexit 2\n",
        )
    }

    /// Create a tar stand-in that fails before writing any index.
    #[cfg(unix)]
    pub fn early_failing_tar(&self) -> PathBuf {
        self.write_script("early-failing-tar", "#!/bin/sh\nexit 2\n")
    }

    #[cfg(unix)]
    fn write_script(&self, name: &str, content: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = self.write_index(name, content);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        path
    }
}

impl Default for ListingFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a GNU-style listing with `dirs` directories of `files_per_dir` files each,
/// plus one symlink per directory.
pub fn synthetic_listing(dirs: usize, files_per_dir: usize) -> String {
    let mut out = String::new();
    for d in 0..dirs {
        let _ = writeln!(
            out,
            "drwxr-xr-x user/group 0 2024-01-01 12:00 data/dir_{}/",
            d
        );
        for f in 0..files_per_dir {
            let _ = writeln!(
                out,
                "-rw-r--r-- user/group {} 2024-01-01 12:00 data/dir_{}/file {}.bin",
                (f + 1) * 512,
                d,
                f
            );
        }
        let _ = writeln!(
            out,
            "lrwxrwxrwx user/group 0 2024-01-01 12:00 data/dir_{}/latest -> file 0.bin",
            d
        );
    }
    out
}
