//! Process-wide logger setup.
//!
//! `RUST_LOG` always wins; otherwise the level comes from the `-v`/`-q`
//! count passed on the command line.

use log::LevelFilter;

pub fn level_for(verbosity: i8) -> LevelFilter {
    match verbosity {
        i8::MIN..=-2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Safe to call more than once; later calls are ignored.
pub fn init(verbosity: i8) {
    let _ = env_logger::Builder::new()
        .filter_level(level_for(verbosity))
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
