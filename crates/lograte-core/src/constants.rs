//! Constants and default values for lograte

/// Name of the backend every default registry starts with
pub const DEFAULT_BACKEND_NAME: &str = "console";

/// Suffix format for daily rotation (chrono strftime)
pub const DAY_SUFFIX_FORMAT: &str = "%Y%m%d";

/// Suffix format for hourly rotation (chrono strftime)
pub const HOUR_SUFFIX_FORMAT: &str = "%Y%m%d%H";

/// First suffix of the size-based sequence
pub const FIRST_SEQUENCE_SUFFIX: &str = "0";

/// Date part of the line prefix
pub const LINE_DATE_FORMAT: &str = "%Y/%m/%d";

/// Time part of the line prefix
pub const LINE_TIME_FORMAT: &str = "%H:%M:%S";

/// Time part of the line prefix with microseconds
pub const LINE_TIME_MICROS_FORMAT: &str = "%H:%M:%S%.6f";

/// ANSI reset sequence closing a colored line
pub const COLOR_RESET: &str = "\x1b[0m";

/// Permission bits for newly created log files (before umask)
pub const LOG_FILE_MODE: u32 = 0o666;

/// Process exit status after a fatal-severity emission
pub const FATAL_EXIT_CODE: i32 = 255;

/// Default config file names to search for (in priority order)
pub const CONFIG_FILES: &[&str] = &[
    "lograte.toml",
    "lograte.yaml",
    "lograte.yml",
    "lograte.json",
];
