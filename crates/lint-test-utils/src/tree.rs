//! [`ConfigTree`] builder for configuration and source trees on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use lint_fs::NormalizedPath;
use tempfile::TempDir;

/// A temporary project directory.
///
/// # Example
///
/// ```rust,no_run
/// use lint_test_utils::tree::ConfigTree;
///
/// let tree = ConfigTree::new()
///     .with_file(".lint.yml", "disabled_rules: [todo]\n")
///     .with_file("src/main.rs", "fn main() {}\n");
/// assert!(tree.path("src/main.rs").exists());
/// ```
pub struct ConfigTree {
    temp_dir: TempDir,
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigTree {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root as a normalized path.
    pub fn normalized_root(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Absolute path of `relative` as a string.
    pub fn path_str(&self, relative: &str) -> String {
        self.normalized_root().join(relative).as_str().to_string()
    }

    /// Write `contents` to `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    /// Builder-style [`write`](Self::write).
    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        self.write(relative, contents);
        self
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// Move a file's modification time forward without changing its contents.
    pub fn touch(&self, relative: &str) {
        let file = fs::File::options().write(true).open(self.path(relative)).unwrap();
        let current = file.metadata().unwrap().modified().unwrap();
        let later = current.max(SystemTime::now()) + Duration::from_secs(10);
        file.set_modified(later).unwrap();
    }
}
