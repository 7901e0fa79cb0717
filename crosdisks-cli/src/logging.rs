// SPDX-License-Identifier: GPL-3.0-only

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LoggingConfig;

const LOG_PREFIX: &str = "crosdisks.log";

/// Install the global subscriber. Keep the returned guard alive for as long as
/// file logging should keep flushing.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let directive = config.level.as_directive();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("warn")
            .add_directive(
                format!("crosdisks={directive}")
                    .parse()
                    .expect("Invalid log directive: crosdisks level"),
            )
            .add_directive(
                format!("crosdisks_client={directive}")
                    .parse()
                    .expect("Invalid log directive: crosdisks_client level"),
            )
    });

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let Some(dir) = &config.directory else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return None;
    };

    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!(
            "crosdisks: failed to create log directory {}: {e}",
            dir.display()
        );
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(dir, LOG_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Some(guard)
}
