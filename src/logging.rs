//! File-based logging setup.
//!
//! Stdout belongs to the fullscreen UI, so log lines go to a file under the
//! store's `logs/` directory through a non-blocking appender. `RUST_LOG`
//! overrides the default filter.

use std::path::Path;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_NAME: &str = "arbor.log";

/// Installs the global subscriber. The returned guard flushes buffered log
/// lines on drop and must outlive the session.
pub fn init(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "arbor=debug,conversation_tree=debug,chat_store=debug,chat_provider_completions_api=debug,warn"
                .into()
        }))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    guard
}
