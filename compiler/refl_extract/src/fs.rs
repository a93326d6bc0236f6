//! File-system collaborator.
//!
//! The extractor never touches the disk directly; everything goes through
//! [`FileSystem`] so tests and embedders can substitute their own storage.

use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

/// Storage operations the extractor needs.
pub trait FileSystem: Send + Sync {
    /// Files under `root` accepted by `filter`, sorted by path.
    fn enumerate_files(
        &self,
        root: &Path,
        filter: &dyn Fn(&Path) -> bool,
        recursive: bool,
    ) -> io::Result<Vec<PathBuf>>;

    /// Last modification time in whole seconds since the Unix epoch.
    fn modify_time(&self, path: &Path) -> io::Result<u64>;

    fn file_exists(&self, path: &Path) -> bool;

    /// Create `path` and all missing parents.
    fn make_directory_tree(&self, path: &Path) -> io::Result<()>;

    fn read_file_binary(&self, path: &Path) -> io::Result<Vec<u8>>;

    fn write_file_binary(&self, path: &Path, bytes: &[u8]) -> io::Result<()>;
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Copy, Clone, Debug, Default)]
pub struct DiskFileSystem;

impl DiskFileSystem {
    fn collect(
        dir: &Path,
        filter: &dyn Fn(&Path) -> bool,
        recursive: bool,
        out: &mut Vec<PathBuf>,
    ) -> io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if recursive {
                    Self::collect(&path, filter, recursive, out)?;
                }
            } else if filter(&path) {
                out.push(path);
            }
        }
        Ok(())
    }
}

impl FileSystem for DiskFileSystem {
    fn enumerate_files(
        &self,
        root: &Path,
        filter: &dyn Fn(&Path) -> bool,
        recursive: bool,
    ) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        Self::collect(root, filter, recursive, &mut files)?;
        files.sort();
        Ok(files)
    }

    fn modify_time(&self, path: &Path) -> io::Result<u64> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs()))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn make_directory_tree(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn read_file_binary(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn write_file_binary(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        std::fs::write(path, bytes)
    }
}

/// Seconds since the Unix epoch, now.
pub fn now_seconds() -> u64 {
    std::time::SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
