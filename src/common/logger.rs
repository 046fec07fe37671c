use tracing_subscriber::EnvFilter;

use crate::configs::LoggingConfig;

/// Initializes the global tracing subscriber from the logging config.
///
/// `RUST_LOG` takes precedence over the configured level. Embedders that
/// install their own subscriber should skip this.
pub fn init(config: Option<&LoggingConfig>) {
    let level = config.and_then(|l| l.level.as_deref()).unwrap_or("info");
    let filters = config.and_then(|l| l.filters.as_deref()).unwrap_or("");

    let filter_str = if filters.is_empty() {
        level.to_string()
    } else {
        format!("{},{}", level, filters)
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
