// loginsight - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "loginsight";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "loginsight";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Date filter bounds
// =============================================================================

/// Earliest year accepted by the date filter generator (inclusive).
pub const MIN_FILTER_YEAR: i32 = 1971;

/// Latest year accepted by the date filter generator (inclusive).
pub const MAX_FILTER_YEAR: i32 = 2030;

/// Highest valid minute value.
pub const MAX_MINUTE: u32 = 59;

/// Highest valid hour value.
pub const MAX_HOUR: u32 = 23;

/// Highest valid day-of-month value. Calendar validity is checked separately.
pub const MAX_DAY: u32 = 31;

/// Highest valid month value.
pub const MAX_MONTH: u32 = 12;

/// Token accepted on the command line for a wildcard minute or hour.
pub const WILDCARD_TOKEN: &str = "*";

// =============================================================================
// Record format
// =============================================================================

/// chrono format of the normalised DATETIME field (`2016-04-24 06:26:37`).
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Locale-independent English month abbreviations, January first.
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// =============================================================================
// Parsing limits
// =============================================================================

/// Maximum length of a regex pattern (profile grammar or user filter).
/// Patterns longer than this are rejected to bound compile cost.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

/// Maximum number of per-record date errors kept in an extraction result.
pub const MAX_RECORDED_PARSE_ERRORS: usize = 1_000;

/// File size in bytes above which log files are memory-mapped instead of read.
pub const LARGE_FILE_THRESHOLD: u64 = 64 * 1024 * 1024; // 64 MB

/// Retry schedule (ms) for transient I/O errors while reading a log file.
pub const READ_RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default logging level.
pub const DEFAULT_LOG_LEVEL: &str = "info";
