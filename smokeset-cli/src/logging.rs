// ============================================================================
// smokeset-cli/src/logging.rs
// ============================================================================
//
// LOGGING SETUP: env_logger backend for the `log` facade
//
// The core library logs through `log` macros; the CLI installs env_logger to
// print them on stderr. `--verbose` raises the default level to debug and
// RUST_LOG still overrides both.

use env_logger::Env;
use log::{LevelFilter, debug};

use std::io::Write;

/// Installs the global logger. Later calls are ignored.
pub fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let result = env_logger::Builder::from_env(Env::default().default_filter_or(level.as_str()))
        .format(|buf, record| {
            let level_str = match record.level() {
                log::Level::Error => "ERROR",
                log::Level::Warn => "WARN ",
                log::Level::Info => "INFO ",
                log::Level::Debug => "DEBUG",
                log::Level::Trace => "TRACE",
            };
            writeln!(
                buf,
                "{} {} {}",
                chrono::Local::now().format("%H:%M:%S"),
                level_str,
                record.args()
            )
        })
        .try_init();

    if result.is_ok() {
        debug!("Logger initialized with level: {}", level);
    }
}
