//! Log filter and subscriber for the binary: INFO unless RUST_LOG says otherwise.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from RUST_LOG, INFO when it is unset or holds no valid directive.
pub fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Same defaults as [`env_filter`], from an explicit directive string.
pub fn filter_from(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

pub fn init() {
    fmt().with_target(false).with_env_filter(env_filter()).init();
}
