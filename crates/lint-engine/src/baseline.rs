//! Baselines of accepted violations
//!
//! A baseline records the violations of an earlier run so later runs only
//! report new ones. Entries store the file path relative to the project root
//! and the text of the offending line. Matching goes through the line text
//! rather than its number, so violations survive code moving up or down.

use std::collections::{BTreeMap, HashMap, HashSet};

use lint_fs::{DocumentStore, NormalizedPath, io};
use lint_rules::Violation;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One accepted violation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BaselineViolation {
    pub violation: Violation,
    /// The offending line as it read when the baseline was written
    pub text: String,
}

impl BaselineViolation {
    fn key(&self) -> (&str, &str) {
        (&self.text, &self.violation.reason)
    }
}

/// Accepted violations grouped by relative file path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Baseline {
    files: BTreeMap<String, Vec<BaselineViolation>>,
}

impl Baseline {
    /// Build a baseline from the violations of a run.
    pub fn from_violations(violations: &[Violation], root: &NormalizedPath) -> Self {
        let mut lines = LineReader::default();
        let mut files: BTreeMap<String, Vec<BaselineViolation>> = BTreeMap::new();
        for violation in violations {
            let entry = relative_violation(violation, root, &mut lines);
            let file = entry.violation.location.file.clone().unwrap_or_default();
            files.entry(file).or_default().push(entry);
        }
        Self { files }
    }

    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let entries: Vec<BaselineViolation> = DocumentStore::new().load(path).map_err(|e| match e {
            lint_fs::Error::DocumentParse { message, .. } => Error::InvalidBaseline {
                path: path.to_native(),
                message,
            },
            other => other.into(),
        })?;
        let mut files: BTreeMap<String, Vec<BaselineViolation>> = BTreeMap::new();
        for entry in entries {
            let file = entry.violation.location.file.clone().unwrap_or_default();
            files.entry(file).or_default().push(entry);
        }
        tracing::debug!(%path, files = files.len(), "Loaded baseline");
        Ok(Self { files })
    }

    pub fn save(&self, path: &NormalizedPath) -> Result<()> {
        let entries: Vec<&BaselineViolation> = self.files.values().flatten().collect();
        DocumentStore::new().save(path, &entries)?;
        tracing::debug!(%path, violations = entries.len(), "Wrote baseline");
        Ok(())
    }

    /// Record `violations` at `path`.
    pub fn write(path: &NormalizedPath, violations: &[Violation], root: &NormalizedPath) -> Result<()> {
        Self::from_violations(violations, root).save(path)
    }

    pub fn len(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Violations not accounted for by the baseline.
    ///
    /// Within one file and rule, violations sharing line text and reason
    /// are compared by count: the whole group is reported once it outgrows
    /// its baseline counterpart.
    pub fn filter(&self, violations: &[Violation], root: &NormalizedPath) -> Vec<Violation> {
        let mut lines = LineReader::default();
        let mut by_file: BTreeMap<String, Vec<(usize, BaselineViolation)>> = BTreeMap::new();
        for (idx, violation) in violations.iter().enumerate() {
            let entry = relative_violation(violation, root, &mut lines);
            let file = entry.violation.location.file.clone().unwrap_or_default();
            by_file.entry(file).or_default().push((idx, entry));
        }

        let mut kept: HashSet<usize> = HashSet::new();
        for (file, current) in &by_file {
            let Some(accepted) = self.files.get(file) else {
                kept.extend(current.iter().map(|(idx, _)| *idx));
                continue;
            };
            let current_entries: Vec<&BaselineViolation> = current.iter().map(|(_, e)| e).collect();
            if current_entries.iter().copied().eq(accepted.iter()) {
                continue;
            }
            kept.extend(new_in_file(current, accepted));
        }

        violations
            .iter()
            .enumerate()
            .filter(|(idx, _)| kept.contains(idx))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

/// Indices of `current` violations the `accepted` ones of the same file do not cover.
fn new_in_file(current: &[(usize, BaselineViolation)], accepted: &[BaselineViolation]) -> Vec<usize> {
    let mut accepted_counts: HashMap<(&str, (&str, &str)), usize> = HashMap::new();
    for entry in accepted {
        *accepted_counts
            .entry((entry.violation.rule_id.as_str(), entry.key()))
            .or_default() += 1;
    }

    let mut groups: HashMap<(&str, (&str, &str)), Vec<usize>> = HashMap::new();
    for (idx, entry) in current {
        groups
            .entry((entry.violation.rule_id.as_str(), entry.key()))
            .or_default()
            .push(*idx);
    }

    groups
        .into_iter()
        .filter(|(key, members)| members.len() > accepted_counts.get(key).copied().unwrap_or(0))
        .flat_map(|(_, members)| members)
        .collect()
}

fn relative_violation(violation: &Violation, root: &NormalizedPath, lines: &mut LineReader) -> BaselineViolation {
    let mut relative = violation.clone();
    let text = match &violation.location.file {
        Some(file) => {
            let path = NormalizedPath::new(file);
            if let Some(stripped) = path.relative_to(root) {
                relative.location.file = Some(stripped);
            }
            lines.line(&path, violation.location.line)
        }
        None => String::new(),
    };
    BaselineViolation {
        violation: relative,
        text,
    }
}

/// Reads each file at most once.
#[derive(Default)]
struct LineReader {
    files: HashMap<String, Vec<String>>,
}

impl LineReader {
    fn line(&mut self, path: &NormalizedPath, number: usize) -> String {
        let lines = self.files.entry(path.as_str().to_string()).or_insert_with(|| {
            io::read_text(path)
                .map(|text| text.lines().map(str::to_string).collect())
                .unwrap_or_default()
        });
        number
            .checked_sub(1)
            .and_then(|idx| lines.get(idx))
            .cloned()
            .unwrap_or_default()
    }
}
