//! Logger setup for embedders and tests. Library code only uses the `log`
//! macros; nothing is printed until one of these is called.

use log::LevelFilter;

/// Install `env_logger`. `RUST_LOG` wins when set; otherwise the level is
/// `info`, or `debug` when `verbose`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(default_level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        log::debug!("Logger already initialized");
    }
}

/// Logger for tests: output is captured by the test harness
pub fn init_for_tests() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
