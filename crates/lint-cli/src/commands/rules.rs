//! `lint rules`: the catalog and what the configuration makes of it

use std::path::Path;

use colored::Colorize;
use lint_config::WarningSession;
use lint_engine::builtin_catalog;
use lint_fs::NormalizedPath;

use super::load_configuration;
use crate::cli::RulesArgs;
use crate::error::Result;

/// `yes`/`no` padded to `width` before coloring so escape codes do not skew columns.
fn flag(value: bool, width: usize) -> String {
    if value {
        format!("{:<width$}", "yes").green().to_string()
    } else {
        format!("{:<width$}", "no").dimmed().to_string()
    }
}

pub fn run_rules(cwd: &Path, args: &RulesArgs) -> Result<()> {
    let cwd = NormalizedPath::new(cwd);
    let catalog = builtin_catalog()?;
    let session = WarningSession::new();
    let configuration = load_configuration(&cwd, &args.config, &catalog, &session)?;
    let active = configuration.rules.active_identifiers(&catalog);

    println!(
        "{:<30} {:<8} {:<12} {:<9} {:<8} {}",
        "identifier".bold(),
        "opt-in".bold(),
        "correctable".bold(),
        "analyzer".bold(),
        "enabled".bold(),
        "configuration".bold()
    );
    for descriptor in catalog.descriptors() {
        let enabled = active.contains(&descriptor.identifier);
        if args.enabled && !enabled {
            continue;
        }
        let config = configuration
            .rules
            .config_for(&descriptor.identifier)
            .map(|value| serde_json::to_string(&value))
            .transpose()?
            .unwrap_or_default();
        println!(
            "{:<30} {} {} {} {} {}",
            descriptor.identifier,
            flag(descriptor.is_opt_in(), 8),
            flag(descriptor.capabilities.correctable, 12),
            flag(descriptor.is_analyzer_only(), 9),
            flag(enabled, 8),
            config
        );
    }
    Ok(())
}

