//! Utilities: logging setup (tracing-subscriber on stderr, level from -v / -q).
//!
//! Key items:
//!   derive_level(verbose, quiet) -> LevelFilter
//!   init_logging(level)

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// `-q` -> error, default -> warn, `-v` -> info, `-vv` -> debug, `-vvv` -> trace.
pub fn derive_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: LevelFilter) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
