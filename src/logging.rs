use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides every other log setting.
pub const LOG_ENV: &str = "MUN_MARKER_LOG";

/// Resolve the filter directive from CLI flags and config.
///
/// `--verbose` wins over the configured level; with neither, only warnings
/// are shown.
pub fn filter_directive(verbose: bool, configured: Option<&str>) -> String {
    let level = match (verbose, configured) {
        (true, _) => "debug",
        (false, Some(level)) => level,
        (false, None) => "warn",
    };
    if level.contains('=') {
        level.to_string()
    } else {
        format!("mun_marker={}", level)
    }
}

/// Install the global subscriber, writing compact lines to stderr.
pub fn init_tracing(verbose: bool, configured: Option<&str>) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(filter_directive(verbose, configured)))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
