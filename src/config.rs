//! Process-level setup shared by the binaries: `.env` loading and logging.

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

pub const SEED_ENV: &str = "DIALOGUE_PREP_SEED";
pub const TARGET_COUNT_ENV: &str = "DIALOGUE_PREP_TARGET_COUNT";

const DEFAULT_LOG_FILTER: &str = "info";

/// Load `.env` from the working directory or its ancestors, if there is one.
///
/// Must run before argument parsing so `.env` values reach clap's env fallbacks.
pub fn load_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Logs go to stderr so stdout stays free for reports.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
