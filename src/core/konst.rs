pub const APP_NAME: &str = "mlookup";
pub const CLI_HEADER_MSG: &str = "mlookup - concurrent bulk hostname resolver";

pub const CONFIG_FILE: &str = "mlookup.toml";
pub const LOGFILE_NAME: &str = "mlookup.log";
pub const CURRENT_DIR: &str = ".";

// Pipeline
pub const QUEUE_CAPACITY: usize = 5;
pub const MAX_INPUT_SOURCES: usize = 10;
pub const RESOLVER_WORKERS: usize = 10;
pub const MAX_RESOLVER_WORKERS: usize = 10;
pub const MAX_NAME_LENGTH: usize = 1024;

// Lookup
pub const LOOKUP_TIMEOUT: u16 = 5000;
pub const DNS_PORT: u16 = 53;

// Logging
pub const LOGGING_JSON: bool = false;
pub const LOGGING_QUIET: bool = false;
