//! Logger initialisation for the binary and tests.
use env_logger::{Builder, Env};
use log::LevelFilter;

/// Filter used when `RUST_LOG` is unset.
///
/// Other crates stay at `warn`; this crate logs at `debug` when `verbose`
/// and at `info` otherwise.
#[must_use]
pub fn default_filter(verbose: bool) -> String {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    format!("warn,tumble={}", level.as_str().to_ascii_lowercase())
}

/// Initializes the global logger. `RUST_LOG` overrides the default filter.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);

    // Only fails when a logger is already installed.
    if builder.try_init().is_err() {
        log::debug!("logger already initialised");
    }
}

/// Installs a logger that writes through the test harness capture.
pub fn init_for_tests() {
    let env = Env::default().default_filter_or(default_filter(true));
    if Builder::from_env(env).is_test(true).try_init().is_err() {
        log::trace!("test logger already initialised");
    }
}
