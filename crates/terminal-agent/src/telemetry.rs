// terminal-agent/crates/terminal-agent/src/telemetry.rs

use tracing_subscriber::{fmt, EnvFilter};

/// Diagnostics go to stderr so they never interleave with the chat surface on stdout.
/// Quiet (`warn`) unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_target(true)
        .with_level(true)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
