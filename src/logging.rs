//! `tracing` setup for the command-line tool.

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset. Parser traffic from the HTTP stack
/// is kept at `warn` so per-sentence requests do not flood the log.
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("{level},hyper=warn,hyper_util=warn,reqwest=warn")
}

/// Install the global subscriber. Logs go to stderr; stdout carries the
/// tree dumps and evaluation tables.
pub fn init_tracing(verbosity: u8) -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbosity)))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(verbosity > 0)
        .with_file(verbosity > 1)
        .with_line_number(verbosity > 1)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(fmt_layer).try_init()?;
    tracing::debug!(verbosity, "logging ready");
    Ok(())
}
