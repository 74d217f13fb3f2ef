#![forbid(unsafe_code)]

//! Logging facade.
//!
//! With the `tracing` feature the standard `tracing` macros are re-exported
//! here (and at the crate root) so downstream crates can log without
//! depending on `tracing` directly. Without it, nothing is compiled.
//!
//! With `tracing-json`, [`init_json_logging`] installs a global subscriber
//! that writes one JSON object per event to stderr, filtered by the
//! `TESSEL_LOG` environment variable (`EnvFilter` syntax, default `info`).
//!
//! # Targets
//!
//! | Target | Emitted by |
//! |---|---|
//! | `tessel.item` | content updates on grid items |
//! | `tessel.layout` | collision resolution, placement, compaction |
//! | `tessel.scheduler` | debounce and throttle |
//! | `tessel.flip` | FLIP transitions |
//! | `tessel.keyboard` | keyboard controller |
//! | `tessel.session` | grid session wiring |

#[cfg(feature = "tracing")]
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Environment variable holding the log filter directive.
#[cfg(feature = "tracing-json")]
pub const LOG_ENV: &str = "TESSEL_LOG";

/// Install a JSON subscriber for production logging.
///
/// Returns an error if a global subscriber has already been installed.
#[cfg(feature = "tracing-json")]
pub fn init_json_logging()
-> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .try_init()
}
