//! Well-known file and directory names.

use std::path::Path;

/// Fixed paths the engine reads or writes relative to a working directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintPath {
    /// Default configuration file looked up in the working directory
    DefaultConfig,
    /// Root of the downloaded remote configuration cache
    RemoteCacheRoot,
    /// Current on-disk format version of the remote configuration cache
    RemoteCacheVersion,
    /// The repository `.gitignore`
    Gitignore,
    /// Directory name used under the user cache dir for lint results
    ResultCacheDir,
}

impl LintPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DefaultConfig => ".lint.yml",
            Self::RemoteCacheRoot => ".swiftlint/RemoteConfigCache",
            Self::RemoteCacheVersion => "v1",
            Self::Gitignore => ".gitignore",
            Self::ResultCacheDir => "lint",
        }
    }
}

impl AsRef<Path> for LintPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for LintPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for LintPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
