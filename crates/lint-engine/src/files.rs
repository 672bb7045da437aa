//! Discovery of the files a run lints

use std::collections::BTreeSet;

use lint_config::PathFilter;
use lint_fs::{NormalizedPath, io};
use lint_rules::SourceFile;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::{Error, Result};

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Files under `paths` that `filter` lets through, sorted.
///
/// Hidden files and directories are skipped while walking. A path named
/// directly is linted even if hidden, but never when excluded. An empty
/// `extensions` list accepts every extension.
pub fn collect_files(
    paths: &[NormalizedPath],
    filter: &PathFilter,
    extensions: &[String],
) -> Result<Vec<NormalizedPath>> {
    let wanted = |path: &NormalizedPath| {
        extensions.is_empty()
            || path
                .extension()
                .is_some_and(|ext| extensions.iter().any(|e| e.trim_start_matches('.') == ext))
    };

    let mut files = BTreeSet::new();
    for root in paths {
        if root.is_file() {
            if !filter.is_excluded(root) && wanted(root) {
                files.insert(root.clone());
            }
            continue;
        }

        let walker = WalkDir::new(root.to_native())
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry) && !filter.is_excluded(&NormalizedPath::new(entry.path())));
        for entry in walker {
            let entry = entry.map_err(|e| Error::Walk {
                path: root.to_native(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = NormalizedPath::new(entry.path());
            if filter.is_lintable(&path) && wanted(&path) {
                files.insert(path);
            }
        }
    }

    tracing::debug!(count = files.len(), "Collected lintable files");
    Ok(files.into_iter().collect())
}

/// Read `paths` in parallel, skipping files that are not UTF-8 text.
pub fn read_source_files(paths: &[NormalizedPath]) -> Vec<SourceFile> {
    paths
        .par_iter()
        .filter_map(|path| match io::read_text(path) {
            Ok(contents) => Some(SourceFile::new(path.clone(), contents)),
            Err(e) => {
                tracing::debug!(%path, error = %e, "Skipping unreadable file");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lint_config::{Configuration, ParseContext, WarningSession};
    use lint_rules::ConfigValue;
    use lint_test_utils::{catalog::sample_catalog, tree::ConfigTree};
    use pretty_assertions::assert_eq;

    fn filter_for(tree: &ConfigTree, yaml: &str) -> PathFilter {
        let catalog = sample_catalog();
        let session = WarningSession::new();
        let version = lint_config::Version::new(0, 0, 0);
        let ctx = ParseContext {
            catalog: &catalog,
            session: &session,
            enable_all_rules: false,
            tool_version: &version,
        };
        Configuration::from_document(
            &ConfigValue::from_yaml_str(yaml).unwrap(),
            "test",
            &tree.normalized_root(),
            ctx,
        )
        .unwrap()
        .path_filter()
        .unwrap()
    }

    fn relative(tree: &ConfigTree, files: &[NormalizedPath]) -> Vec<String> {
        let root = tree.normalized_root();
        files.iter().filter_map(|f| f.relative_to(&root)).collect()
    }

    #[test]
    fn skips_hidden_and_excluded() {
        let tree = ConfigTree::new()
            .with_file("src/a.rs", "a\n")
            .with_file("src/gen/b.rs", "b\n")
            .with_file(".git/config", "x\n")
            .with_file("src/.hidden.rs", "h\n");
        let filter = filter_for(&tree, "excluded: [src/gen]\n");

        let files = collect_files(&[tree.normalized_root()], &filter, &[]).unwrap();
        assert_eq!(relative(&tree, &files), vec!["src/a.rs"]);
    }

    #[test]
    fn honours_included_and_extensions() {
        let tree = ConfigTree::new()
            .with_file("src/a.rs", "a\n")
            .with_file("src/notes.md", "n\n")
            .with_file("scripts/run.rs", "r\n");
        let filter = filter_for(&tree, "included: [src]\n");

        let files = collect_files(&[tree.normalized_root()], &filter, &["rs".to_string()]).unwrap();
        assert_eq!(relative(&tree, &files), vec!["src/a.rs"]);
    }

    #[test]
    fn binary_files_are_skipped() {
        let tree = ConfigTree::new().with_file("a.rs", "a\n");
        std::fs::write(tree.path("blob.bin"), [0xff, 0xfe, 0x00]).unwrap();
        let root = tree.normalized_root();

        let files = read_source_files(&[root.join("a.rs"), root.join("blob.bin")]);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].contents(), "a\n");
    }

    #[test]
    fn explicit_file_bypasses_includes() {
        let tree = ConfigTree::new().with_file("scripts/run.rs", "r\n");
        let filter = filter_for(&tree, "included: [src]\n");

        let explicit = tree.normalized_root().join("scripts/run.rs");
        let files = collect_files(&[explicit], &filter, &[]).unwrap();
        assert_eq!(relative(&tree, &files), vec!["scripts/run.rs"]);
    }
}
