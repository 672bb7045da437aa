//! The default command: lint files and report violations

use std::io::Write;
use std::path::Path;

use colored::Colorize;
use lint_config::WarningSession;
use lint_engine::{
    Baseline, Linter, LinterCache, Report, ReportFormat, builtin_catalog, collect_files, read_source_files,
};
use lint_fs::NormalizedPath;

use super::{load_configuration, tool_version};
use crate::cli::LintArgs;
use crate::error::{CliError, Result};

/// Exit code when the run found errors or reached the warning threshold.
pub const EXIT_VIOLATIONS: i32 = 2;

fn absolute(path: &Path, cwd: &NormalizedPath) -> NormalizedPath {
    NormalizedPath::new(path).absolutize(cwd)
}

/// Run a lint and return the process exit code.
pub fn run_lint(cwd: &Path, args: &LintArgs) -> Result<i32> {
    let cwd = NormalizedPath::new(cwd);
    let catalog = builtin_catalog()?;
    let session = WarningSession::new();
    let mut configuration = load_configuration(&cwd, &args.config, &catalog, &session)?;
    if args.strict {
        configuration.strict = Some(true);
    }

    let roots: Vec<NormalizedPath> = if args.paths.is_empty() {
        vec![cwd.clone()]
    } else {
        args.paths.iter().map(|p| absolute(p, &cwd)).collect()
    };
    let filter = configuration.path_filter()?;
    let files = collect_files(&roots, &filter, &args.extensions)?;
    if files.is_empty() && !configuration.allows_zero_lintable_files() {
        let listed: Vec<&str> = roots.iter().map(NormalizedPath::as_str).collect();
        return Err(CliError::user(format!(
            "No lintable files found at paths: '{}'",
            listed.join(", ")
        )));
    }

    let version = tool_version()?;
    let cache = if args.no_cache {
        None
    } else {
        args.cache_path
            .as_deref()
            .map(|p| absolute(p, &cwd))
            .or_else(|| configuration.cache_path.clone())
            .or_else(LinterCache::default_directory)
            .map(|dir| LinterCache::new(dir, version.to_string()))
    };

    let mut linter = Linter::new(&catalog, &configuration, &session)?
        .with_analysis_arguments(args.analyzer_args.clone());
    if let Some(cache) = &cache {
        linter = linter.with_cache(cache);
    }

    let mut sources = read_source_files(&files);
    if args.fix {
        let corrected = linter.correct(&sources)?;
        for path in &corrected {
            eprintln!("{} {}", "Corrected".green(), path);
        }
        if !corrected.is_empty() {
            sources = read_source_files(&files);
        }
    }
    let mut violations = linter.lint(&sources);

    if let Some(path) = args
        .write_baseline
        .as_deref()
        .map(|p| absolute(p, &cwd))
        .or_else(|| configuration.write_baseline.clone())
    {
        Baseline::write(&path, &violations, &cwd)?;
    }
    if let Some(path) = args
        .baseline
        .as_deref()
        .map(|p| absolute(p, &cwd))
        .or_else(|| configuration.baseline.clone())
    {
        violations = Baseline::load(&path)?.filter(&violations, &cwd);
    }

    if let Some(cache) = &cache {
        if let Err(e) = cache.save() {
            tracing::warn!(error = %e, "Failed to save the result cache");
        }
    }

    let report = Report::new(violations, &configuration);
    let format = ReportFormat::from_name(args.reporter.as_deref().or(configuration.reporter.as_deref()));
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(report.render(format)?.as_bytes())?;
    if format == ReportFormat::Json {
        writeln!(stdout)?;
    }
    eprintln!("{}", report.summary(sources.len()));

    Ok(if report.is_failure() { EXIT_VIOLATIONS } else { 0 })
}
