//! The file handle passed to rules

use std::any::Any;
use std::sync::Arc;

use lint_fs::NormalizedPath;

/// A source file as seen by rules: contents, optional path, and whatever
/// syntax information the host attached for language-aware analyzers.
#[derive(Clone)]
pub struct SourceFile {
    path: Option<NormalizedPath>,
    contents: String,
    lines: Vec<String>,
    syntax: Option<Arc<dyn Any + Send + Sync>>,
}

impl SourceFile {
    /// A file that lives on disk.
    pub fn new(path: NormalizedPath, contents: impl Into<String>) -> Self {
        Self::build(Some(path), contents.into())
    }

    /// In-memory contents with no backing file.
    pub fn from_contents(contents: impl Into<String>) -> Self {
        Self::build(None, contents.into())
    }

    fn build(path: Option<NormalizedPath>, contents: String) -> Self {
        let lines = contents.lines().map(str::to_string).collect();
        Self {
            path,
            contents,
            lines,
            syntax: None,
        }
    }

    /// Attach host-provided syntax data (tokens, a parse tree, ...).
    pub fn with_syntax<T: Any + Send + Sync>(mut self, syntax: T) -> Self {
        self.syntax = Some(Arc::new(syntax));
        self
    }

    pub fn syntax<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.syntax.as_deref().and_then(|s| s.downcast_ref::<T>())
    }

    pub fn path(&self) -> Option<&NormalizedPath> {
        self.path.as_ref()
    }

    /// Path as a string for violation locations.
    pub fn display_path(&self) -> Option<String> {
        self.path.as_ref().map(|p| p.as_str().to_string())
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// 1-based line access.
    pub fn line(&self, number: usize) -> Option<&str> {
        number
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .map(String::as_str)
    }

    /// True for `""` and `"\n"`, which are never linted.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty() || self.contents == "\n"
    }

    pub fn starts_with_shebang(&self) -> bool {
        self.contents.starts_with("#!")
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("path", &self.path)
            .field("lines", &self.lines.len())
            .field("has_syntax", &self.syntax.is_some())
            .finish()
    }
}
