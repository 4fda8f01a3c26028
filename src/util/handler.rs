use tracing::{Level, event};

use crate::core::common::LoggingOptions;
use crate::core::konst::APP_NAME;

/// Progress output: always logged, echoed to stdout unless quiet.
pub fn log_handler(msg: &str, logging_options: &LoggingOptions) {
    if !logging_options.quiet {
        println!("{msg}");
    }
    event!(target: APP_NAME, Level::INFO, "{msg}");
}

/// Recoverable errors: always reported on stderr and logged as warnings.
pub fn error_handler(msg: &str) {
    eprintln!("{msg}");
    event!(target: APP_NAME, Level::WARN, "{msg}");
}
