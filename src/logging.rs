use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "PATHUNI_LOG";

/// Logs go to stderr; stdout carries the value meant for `eval`.
///
/// `PATHUNI_LOG` wins when set. Otherwise the level is `warn`, or `debug`
/// with `verbose`. Safe to call more than once.
pub fn setup_logging(filter_directive: Option<&str>, verbose: bool) {
    let filter = filter_directive
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .try_init();
}

fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "warn"
    }
}
