use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Env var holding the filter directives, e.g. `SPENDLENS_LOG=spendlens_insights=debug`
pub const LOG_ENV: &str = "SPENDLENS_LOG";

/// Install the stderr subscriber. Defaults to `warn` when `SPENDLENS_LOG` is
/// unset or unparsable; stdout stays reserved for command output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
