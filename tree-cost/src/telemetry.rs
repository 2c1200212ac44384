use std::{io::IsTerminal, sync::Once};

use tracing_appender::{
    non_blocking::NonBlocking,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "tree-cost";
/// Two days of hourly files.
const MAX_LOG_FILES: usize = 48;
const DEFAULT_CONSOLE_FILTER: &str = "info";
const FILE_FILTER: &str = "info,tree_cost=debug";

static INIT: Once = Once::new();

/// Installs the global tracing subscriber once per process.
///
/// Console logs go to stderr, leaving stdout to the `table` output. They honor
/// `RUST_LOG` and are colored only when stderr is a terminal. A second layer
/// keeps debug logs of this crate in hourly files under `logs/`; it is left
/// out when that directory cannot be created.
pub fn setup_telemetry() {
    INIT.call_once(|| {
        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .with_filter(console_filter);

        let file_layer = log_file_writer().map(|writer| {
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(FILE_FILTER))
        });

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .init();
    });
}

fn log_file_writer() -> Option<NonBlocking> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::HOURLY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(LOG_DIR);
    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            // Flushes on drop; the subscriber lives until exit.
            std::mem::forget(guard);
            Some(writer)
        }
        Err(e) => {
            eprintln!("Log files disabled, cannot write to {}/: {}", LOG_DIR, e);
            None
        }
    }
}
