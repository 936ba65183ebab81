use colored::Colorize;
use env_logger::Builder;
use log::{Level, LevelFilter};
use std::io::Write;

/// Initialize the env_logger backend: warnings only from dependencies, the
/// requested level for this crate. Safe to call once per process.
pub fn setup_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    Builder::from_default_env()
        .filter_level(LevelFilter::Warn)
        .filter_module(env!("CARGO_PKG_NAME"), level)
        .format(move |buf, record| {
            let name = env!("CARGO_PKG_NAME").cyan();
            let line = match record.level() {
                Level::Warn => format!("[{} {}] {}", name, "WARN".yellow(), record.args()),
                Level::Error => format!("[{} {}] {}", name, "ERROR".red(), record.args()),
                Level::Debug | Level::Trace => {
                    format!("[{} {}] {}", name, record.target().white(), record.args())
                }
                _ => format!("[{}] {}", name, record.args()),
            };
            writeln!(buf, "{}", line)
        })
        .init();
}
