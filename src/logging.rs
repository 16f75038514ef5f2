//! Log output for the command line tools

use tracing::Level;

/// Level for a count of `-v` flags
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Send logs to stderr, keeping stdout free for reports and maze files
pub fn init_tracing(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_max_level(level_for(verbosity))
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1)
        .init();
}
