//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Lint source files against a hierarchy of configuration files
#[derive(Parser, Debug)]
#[command(name = "lint")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub lint: LintArgs,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Lint files (the default when no command is given)
    Lint(LintArgs),

    /// List the available rules and whether the configuration enables them
    Rules(RulesArgs),
}

/// How the effective configuration is resolved.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigArgs {
    /// Configuration file or URL; repeat to layer, later files win
    #[arg(long = "config", value_name = "PATH", env = "LINT_CONFIG", value_delimiter = ',')]
    pub configs: Vec<String>,

    /// Enable every rule, opt-in rules included
    #[arg(long)]
    pub enable_all_rules: bool,

    /// Run only this rule; repeat for more
    #[arg(long = "only-rule", value_name = "ID")]
    pub only_rules: Vec<String>,

    /// Never fetch remote configurations; use cached copies only
    #[arg(long)]
    pub offline: bool,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct LintArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Do not read or write the result cache
    #[arg(long)]
    pub no_cache: bool,

    /// Directory of the result cache
    #[arg(long, value_name = "DIR")]
    pub cache_path: Option<PathBuf>,

    /// Only report violations not recorded in this baseline
    #[arg(long, value_name = "PATH")]
    pub baseline: Option<PathBuf>,

    /// Record this run's violations as a baseline
    #[arg(long, value_name = "PATH")]
    pub write_baseline: Option<PathBuf>,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Correct what correctable rules can before linting
    #[arg(long)]
    pub fix: bool,

    /// Output format: text or json
    #[arg(long, value_name = "NAME")]
    pub reporter: Option<String>,

    /// Only lint files with this extension; repeat for more
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Compiler argument for analyzer rules; analyzer rules run when any is given
    #[arg(long = "analyzer-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub analyzer_args: Vec<String>,

    /// Files or directories to lint (defaults to the working directory)
    pub paths: Vec<PathBuf>,
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Only list rules the configuration enables
    #[arg(long)]
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_default_lint_invocation() {
        let cli = Cli::try_parse_from(["lint", "--config", "a.yml", "--config", "b.yml", "--strict", "src"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.lint.config.configs, vec!["a.yml", "b.yml"]);
        assert!(cli.lint.strict);
        assert_eq!(cli.lint.paths, vec![PathBuf::from("src")]);
    }

    #[test]
    fn parses_rules_subcommand() {
        let cli = Cli::try_parse_from(["lint", "rules", "--enabled", "--only-rule", "todo"]).unwrap();
        let Some(Commands::Rules(args)) = cli.command else {
            panic!("expected rules command");
        };
        assert!(args.enabled);
        assert_eq!(args.config.only_rules, vec!["todo"]);
    }
}
