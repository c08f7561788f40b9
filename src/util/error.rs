// loginsight - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation; every error keeps its cause for
// diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all loginsight operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum LogInsightError {
    /// Service profile lookup, loading or validation failed.
    Profile(ProfileError),

    /// Date filter arguments were out of range or inconsistent.
    DateFilter(DateFilterError),

    /// Line filtering could not run.
    Filter(FilterError),

    /// Export operation failed.
    Export(ExportError),
}

impl fmt::Display for LogInsightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Profile(e) => write!(f, "Profile error: {e}"),
            Self::DateFilter(e) => write!(f, "Date filter error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
        }
    }
}

impl std::error::Error for LogInsightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Profile(e) => Some(e),
            Self::DateFilter(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile errors
// ---------------------------------------------------------------------------

/// Errors related to service profile lookup and validation.
#[derive(Debug)]
pub enum ProfileError {
    /// The requested service name is not in the registry.
    UnknownService { name: String },

    /// Embedded TOML definition could not be parsed.
    TomlParse {
        source_name: String,
        source: toml::de::Error,
    },

    /// A required field is missing or empty.
    MissingField {
        profile_id: String,
        field: &'static str,
    },

    /// A regex pattern in the profile is invalid.
    InvalidRegex {
        profile_id: String,
        field: &'static str,
        pattern: String,
        source: regex::Error,
    },

    /// A regex pattern exceeds the maximum allowed length.
    RegexTooLong {
        profile_id: String,
        field: &'static str,
        length: usize,
        max_length: usize,
    },

    /// The line grammar does not have the capture-group count its kind needs.
    CaptureGroupMismatch {
        profile_id: String,
        expected: usize,
        found: usize,
    },

    /// A date component index points outside the date sub-pattern's groups.
    DateIndexOutOfRange {
        profile_id: String,
        component: &'static str,
        index: usize,
        groups: usize,
    },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownService { name } => {
                write!(f, "Service \"{name}\" doesn't exist")
            }
            Self::TomlParse {
                source_name,
                source,
            } => write!(f, "Failed to parse profile '{source_name}': {source}"),
            Self::MissingField { profile_id, field } => {
                write!(
                    f,
                    "Profile '{profile_id}': missing required field '{field}'"
                )
            }
            Self::InvalidRegex {
                profile_id,
                field,
                pattern,
                source,
            } => write!(
                f,
                "Profile '{profile_id}': invalid regex in '{field}' ('{pattern}'): {source}"
            ),
            Self::RegexTooLong {
                profile_id,
                field,
                length,
                max_length,
            } => write!(
                f,
                "Profile '{profile_id}': regex in '{field}' is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::CaptureGroupMismatch {
                profile_id,
                expected,
                found,
            } => write!(
                f,
                "Profile '{profile_id}': line grammar has {found} capture groups, \
                 expected {expected}"
            ),
            Self::DateIndexOutOfRange {
                profile_id,
                component,
                index,
                groups,
            } => write!(
                f,
                "Profile '{profile_id}': date component '{component}' uses group {index} \
                 but the date pattern has only {groups} groups"
            ),
        }
    }
}

impl std::error::Error for ProfileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ProfileError> for LogInsightError {
    fn from(e: ProfileError) -> Self {
        Self::Profile(e)
    }
}

// ---------------------------------------------------------------------------
// Date filter errors
// ---------------------------------------------------------------------------

/// Invalid date component passed to the date filter generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFilterError {
    /// A component is outside its domain.
    OutOfRange {
        component: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    /// A concrete minute was given with a wildcard hour.
    MinuteWithoutHour { minute: u32 },

    /// The components are in range but do not form a calendar date.
    InvalidCalendarDate { year: i32, month: u32, day: u32 },
}

impl fmt::Display for DateFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                component,
                value,
                min,
                max,
            } => write!(
                f,
                "Invalid date component: {component} = {value} is outside {min}-{max}"
            ),
            Self::MinuteWithoutHour { minute } => write!(
                f,
                "Invalid date component: minute {minute} given with a wildcard hour"
            ),
            Self::InvalidCalendarDate { year, month, day } => write!(
                f,
                "Invalid date component: {year:04}-{month:02}-{day:02} is not a calendar date"
            ),
        }
    }
}

impl std::error::Error for DateFilterError {}

impl From<DateFilterError> for LogInsightError {
    fn from(e: DateFilterError) -> Self {
        Self::DateFilter(e)
    }
}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// A raw log date fragment could not be turned into a canonical date-time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The date sub-pattern did not match the raw date text.
    DatePatternMismatch { raw_date: String, pattern: String },

    /// The month abbreviation is not in the fixed English table.
    UnknownMonth { raw_date: String, month: String },

    /// A numeric component could not be converted.
    InvalidNumber {
        raw_date: String,
        component: &'static str,
        text: String,
    },

    /// Components were numeric but do not form a valid date-time.
    InvalidDateTime { raw_date: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DatePatternMismatch { raw_date, pattern } => write!(
                f,
                "date pattern '{pattern}' did not match '{raw_date}'"
            ),
            Self::UnknownMonth { raw_date, month } => {
                write!(f, "unknown month '{month}' in '{raw_date}'")
            }
            Self::InvalidNumber {
                raw_date,
                component,
                text,
            } => write!(f, "invalid {component} '{text}' in '{raw_date}'"),
            Self::InvalidDateTime { raw_date } => {
                write!(f, "'{raw_date}' is not a valid date-time")
            }
        }
    }
}

impl std::error::Error for ParseError {}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to line filtering.
#[derive(Debug)]
pub enum FilterError {
    /// Neither raw text nor a file was supplied.
    MissingInput,

    /// User-provided regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// User-provided regex exceeds the maximum allowed length.
    RegexTooLong { length: usize, max_length: usize },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput => write!(f, "Either raw text or a file path must be provided"),
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid filter regex '{pattern}': {source}")
            }
            Self::RegexTooLong { length, max_length } => write!(
                f,
                "Filter regex is {length} chars, exceeds maximum of {max_length}"
            ),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<FilterError> for LogInsightError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to rendering records.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output.
    Io { source: io::Error },

    /// CSV serialisation error.
    Csv { source: csv::Error },

    /// JSON serialisation error.
    Json { source: serde_json::Error },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { source } => write!(f, "Export I/O error: {source}"),
            Self::Csv { source } => write!(f, "CSV export error: {source}"),
            Self::Json { source } => write!(f, "JSON export error: {source}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source } => Some(source),
            Self::Csv { source } => Some(source),
            Self::Json { source } => Some(source),
        }
    }
}

impl From<ExportError> for LogInsightError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Problems found while loading config.toml. Surfaced as startup warnings;
/// the defaults are used instead.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for loginsight results.
pub type Result<T> = std::result::Result<T, LogInsightError>;
