use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise warnings only, or everything from the
/// lint crates down to `debug` with `--verbose`.
pub fn init(verbose: bool) {
    let default = if verbose {
        "warn,lint_fs=debug,lint_rules=debug,lint_config=debug,lint_engine=debug,lint=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact();

    // A second init (tests) is not an error worth surfacing.
    let _ = tracing_subscriber::registry().with(filter).with(fmt_layer).try_init();
}
