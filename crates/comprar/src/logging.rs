//! Tracing initialization for suite runs.

/// Initialize the global tracing subscriber.
///
/// Filter comes from `COMPRAR_LOG` (default `info`). Safe to call from every
/// test; only the first call installs the subscriber.
pub fn try_init_logging() {
    let filter = std::env::var("COMPRAR_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
