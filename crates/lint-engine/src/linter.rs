//! Run orchestration
//!
//! A run has two passes over the files. The collect pass lets collecting
//! rules gather cross-file information into a [`RuleStorage`]; the validate
//! pass runs every active rule on every file, applies suppression regions and
//! synthesizes suppression hygiene violations. Both passes fan out over files
//! with rayon, and the validate pass also fans out over rules within a file.

use std::collections::BTreeSet;

use lint_config::{Configuration, WarningSession};
use lint_fs::{NormalizedPath, checksum, io};
use lint_rules::{Rule, RuleCatalog, RuleStorage, SUPERFLUOUS_DISABLE_COMMAND, Severity, SourceFile, Violation};
use rayon::prelude::*;

use crate::cache::LinterCache;
use crate::rules::configured_severity;
use crate::suppression::{MetaRule, Suppressions};
use crate::Result;

/// Lints files against one effective policy.
pub struct Linter<'a> {
    configuration: &'a Configuration,
    session: &'a WarningSession,
    rules: Vec<Box<dyn Rule>>,
    fingerprint: String,
    cache: Option<&'a LinterCache>,
    analysis_arguments: Vec<String>,
    arguments_hash: String,
    meta: Option<MetaRule>,
    valid_identifiers: BTreeSet<String>,
}

impl<'a> Linter<'a> {
    /// Instantiate every rule the policy activates.
    pub fn new(catalog: &RuleCatalog, configuration: &'a Configuration, session: &'a WarningSession) -> Result<Self> {
        let rules = configuration.rules.instantiate(catalog)?;

        let meta = match catalog.descriptor(SUPERFLUOUS_DISABLE_COMMAND) {
            Some(descriptor) if rules.iter().any(|r| r.descriptor().identifier == SUPERFLUOUS_DISABLE_COMMAND) => {
                let config = configuration.rules.config_for(SUPERFLUOUS_DISABLE_COMMAND);
                let severity = configured_severity(config.as_ref(), SUPERFLUOUS_DISABLE_COMMAND, Severity::Warning)
                    .map_err(|source| lint_rules::Error::InvalidRuleConfiguration {
                        identifier: SUPERFLUOUS_DISABLE_COMMAND.to_string(),
                        source,
                    })?;
                Some(MetaRule {
                    descriptor: descriptor.clone(),
                    severity,
                })
            }
            _ => None,
        };

        let mut valid_identifiers = catalog.all_valid_identifiers();
        valid_identifiers.extend(configuration.rules.declared_custom_rules.iter().cloned());

        tracing::debug!(rules = rules.len(), "Instantiated rules");
        Ok(Self {
            configuration,
            session,
            rules,
            fingerprint: configuration.fingerprint(catalog),
            cache: None,
            analysis_arguments: Vec::new(),
            arguments_hash: checksum::compute_parts_checksum(std::iter::empty()),
            meta,
            valid_identifiers,
        })
    }

    pub fn with_cache(mut self, cache: &'a LinterCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Compiler arguments for analyzer rules; analyzer rules only run when
    /// some are given.
    pub fn with_analysis_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments_hash = checksum::compute_parts_checksum(arguments.iter().map(String::as_str));
        self.analysis_arguments = arguments;
        self
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn configuration(&self) -> &Configuration {
        self.configuration
    }

    fn runs(&self, rule: &dyn Rule) -> bool {
        !rule.descriptor().is_analyzer_only() || !self.analysis_arguments.is_empty()
    }

    fn running_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| &**rule).filter(|rule| self.runs(*rule))
    }

    /// Identifiers of the rules that will run, sorted.
    pub fn rule_identifiers(&self) -> Vec<&str> {
        self.running_rules().map(|r| r.descriptor().identifier.as_str()).collect()
    }

    /// Lint `files`: collect, then validate, sorted by location.
    pub fn lint(&self, files: &[SourceFile]) -> Vec<Violation> {
        let storage = RuleStorage::new();
        self.collect(files, &storage);

        let mut violations: Vec<Violation> = files
            .par_iter()
            .flat_map_iter(|file| self.lint_file(file, &storage))
            .collect();
        violations.sort_by(|a, b| a.location.cmp(&b.location).then_with(|| a.rule_id.cmp(&b.rule_id)));
        tracing::debug!(files = files.len(), violations = violations.len(), "Lint finished");
        violations
    }

    /// Let collecting rules gather information from every file.
    pub fn collect(&self, files: &[SourceFile], storage: &RuleStorage) {
        let collecting: Vec<&dyn Rule> = self
            .running_rules()
            .filter(|r| r.descriptor().capabilities.collecting)
            .collect();
        if collecting.is_empty() {
            return;
        }

        files.par_iter().filter(|file| !file.is_empty()).for_each(|file| {
            let key = file.display_path().unwrap_or_default();
            for rule in &collecting {
                let id = &rule.descriptor().identifier;
                let cached = match (self.cache, file.path()) {
                    (Some(cache), Some(path)) => {
                        cache.collected_info(&self.fingerprint, path, id, &self.arguments_hash)
                    }
                    _ => None,
                };
                let info = match cached {
                    Some(info) => Some(info),
                    None => {
                        let info = rule.collect(file, storage);
                        if let (Some(cache), Some(path), Some(info)) = (self.cache, file.path(), &info) {
                            cache.cache_collected_info(&self.fingerprint, path, id, &self.arguments_hash, info.clone());
                        }
                        info
                    }
                };
                if let Some(info) = info {
                    storage.collect(id, &key, info);
                }
            }
        });
    }

    /// Violations of one file after suppression, including suppression
    /// hygiene violations.
    pub fn lint_file(&self, file: &SourceFile, storage: &RuleStorage) -> Vec<Violation> {
        if file.is_empty() {
            return Vec::new();
        }
        if let (Some(cache), Some(path)) = (self.cache, file.path()) {
            if let Some(violations) = cache.violations(&self.fingerprint, path) {
                return violations;
            }
        }

        let suppressions = Suppressions::new(file);
        let rules: Vec<&dyn Rule> = self.running_rules().collect();
        let mut violations: Vec<Violation> = rules
            .par_iter()
            .flat_map_iter(|rule| self.apply(*rule, file, storage, &suppressions))
            .collect();

        if let Some(meta) = &self.meta {
            violations.extend(
                suppressions
                    .unknown_identifier_violations(&self.valid_identifiers, meta)
                    .into_iter()
                    .filter(|v| !suppressions.suppresses(v, &meta.descriptor)),
            );
        }
        violations.sort_by(|a, b| a.location.cmp(&b.location).then_with(|| a.rule_id.cmp(&b.rule_id)));

        if let (Some(cache), Some(path)) = (self.cache, file.path()) {
            cache.cache_violations(&self.fingerprint, path, &violations);
        }
        violations
    }

    fn apply(&self, rule: &dyn Rule, file: &SourceFile, storage: &RuleStorage, suppressions: &Suppressions) -> Vec<Violation> {
        let descriptor = rule.descriptor();
        let violations = rule.validate(file, storage);

        for region in suppressions.regions() {
            for alias in region.deprecated_aliases_disabling(descriptor) {
                self.session.warn_once(
                    format!("deprecated-alias:{alias}"),
                    format!(
                        "'{alias}' rule has been renamed to '{}' and will be completely removed in a future release.",
                        descriptor.identifier
                    ),
                );
            }
        }

        let (suppressed, mut kept): (Vec<Violation>, Vec<Violation>) = violations
            .into_iter()
            .partition(|v| suppressions.suppresses(v, descriptor));

        if let Some(meta) = &self.meta {
            let own: BTreeSet<&str> = descriptor.all_identifiers().collect();
            let all: Vec<Violation> = suppressed.iter().chain(&kept).cloned().collect();
            let mut superfluous = suppressions.superfluous_violations(&own, &descriptor.identifier, &all, meta);

            for sub in rule.reported_identifiers() {
                let ids: BTreeSet<&str> = [sub.as_str()].into();
                let matching: Vec<Violation> = all.iter().filter(|v| v.rule_id == sub).cloned().collect();
                superfluous.extend(suppressions.superfluous_violations(&ids, &sub, &matching, meta));
            }
            kept.extend(superfluous);
        }
        // Line 1 of a shebang file is never reported, whatever produced the violation.
        if file.starts_with_shebang() {
            kept.retain(|v| v.location.line != 1);
        }
        kept
    }

    /// Apply every correctable rule to `files` and rewrite the ones that change.
    ///
    /// A rule does not correct a file in which any region disables it.
    /// Rewritten files are dropped from the cache.
    pub fn correct(&self, files: &[SourceFile]) -> Result<Vec<NormalizedPath>> {
        let correctable: Vec<&dyn Rule> = self
            .running_rules()
            .filter(|r| r.descriptor().capabilities.correctable)
            .collect();
        if correctable.is_empty() {
            return Ok(Vec::new());
        }

        let corrected: Vec<Option<NormalizedPath>> = files
            .par_iter()
            .filter(|file| !file.is_empty())
            .map(|file| -> Result<Option<NormalizedPath>> {
                let Some(path) = file.path() else {
                    return Ok(None);
                };
                let suppressions = Suppressions::new(file);
                let mut current = file.clone();
                let mut changed = false;
                for rule in &correctable {
                    if suppressions.regions().iter().any(|r| r.disables(rule.descriptor())) {
                        continue;
                    }
                    if let Some(contents) = rule.correct(&current) {
                        current = SourceFile::new(path.clone(), contents);
                        changed = true;
                    }
                }
                if !changed {
                    return Ok(None);
                }
                io::write_text(path, current.contents())?;
                if let Some(cache) = self.cache {
                    cache.invalidate(path);
                }
                tracing::debug!(%path, "Corrected file");
                Ok(Some(path.clone()))
            })
            .collect::<Result<_>>()?;
        Ok(corrected.into_iter().flatten().collect())
    }
}
