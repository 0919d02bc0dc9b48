//! Logging setup
//!
//! Stdout by default; a daily rolling file when a log directory is configured.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "restaurant_server=info,tower_http=info";

/// Initialize the global subscriber.
///
/// `RUST_LOG` overrides the default filter. When `log_dir` exists, output goes to a
/// daily rolling `restaurant-server.<date>` file inside it.
pub fn init_logger(log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "restaurant-server");
            subscriber.with_ansi(false).with_writer(file_appender).init();
            return;
        }
        eprintln!("Log directory {dir} does not exist, logging to stdout");
    }

    subscriber.init();
}
