//! Idempotent `.gitignore` maintenance

use crate::{NormalizedPath, Result, io};

/// Make sure `entry` appears as a line of the `.gitignore` at `path`.
///
/// Creates the file when absent and appends (separated by a blank line)
/// when the entry is missing. Returns `true` when the file was changed.
pub fn ensure_entry(path: &NormalizedPath, comment: &str, entry: &str) -> Result<bool> {
    let block = format!("# {comment}\n{entry}");

    if !path.exists() {
        io::write_text(path, &format!("{block}\n"))?;
        tracing::debug!(%path, entry, "Created .gitignore");
        return Ok(true);
    }

    let existing = io::read_text(path)?;
    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }

    let separator = if existing.is_empty() {
        ""
    } else if existing.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    };
    io::write_text(path, &format!("{existing}{separator}{block}\n"))?;
    tracing::debug!(%path, entry, "Appended .gitignore entry");
    Ok(true)
}
