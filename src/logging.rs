//! Structured logging, carried as part of the ambient stack regardless of
//! which protocol features are in or out of scope: every accepted
//! connection, parser rejection, and response status is logged through the
//! `log` facade rather than printed directly, with `env_logger` as the
//! default backend (`RUST_LOG` selects verbosity, same as upstream).

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the global logger. Safe to call more than once; only the first
/// call takes effect.
pub fn init() {
    INIT.call_once(|| {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .init();
    });
}
