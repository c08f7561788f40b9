// loginsight - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no
// platform dependencies.
//
// These types are the shared vocabulary across all layers.

use crate::util::constants;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

// =============================================================================
// Service kind
// =============================================================================

/// Log family a profile belongs to. Selects the extraction procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    /// Combined-log-like web access logs (nginx, Apache).
    Web,
    /// Syslog-style authentication logs.
    Auth,
}

impl ServiceKind {
    /// Number of capture groups the line grammar must declare.
    ///
    /// Web: ip, date, method, route, status, referrer, useragent.
    /// Auth: date, service tag, message body.
    pub fn grammar_groups(&self) -> usize {
        match self {
            ServiceKind::Web => 7,
            ServiceKind::Auth => 3,
        }
    }

    /// Web grammars are matched case-insensitively, auth grammars are not.
    pub fn case_insensitive_grammar(&self) -> bool {
        matches!(self, ServiceKind::Web)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ServiceKind::Web => "web",
            ServiceKind::Auth => "auth",
        }
    }
}

// =============================================================================
// Service profile (runtime representation)
// =============================================================================

/// Positions (1-based capture group indices) of each date component inside
/// the date sub-pattern. `year` is `None` for year-less syslog dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DateComponentOrder {
    #[serde(default)]
    pub year: Option<usize>,
    pub month: usize,
    pub day: usize,
    pub hour: usize,
    pub minute: usize,
    pub second: usize,
}

impl DateComponentOrder {
    /// All (name, index) pairs, for validation against the pattern.
    pub fn indices(&self) -> Vec<(&'static str, usize)> {
        let mut out = Vec::with_capacity(6);
        if let Some(year) = self.year {
            out.push(("year", year));
        }
        out.extend([
            ("month", self.month),
            ("day", self.day),
            ("hour", self.hour),
            ("minute", self.minute),
            ("second", self.second),
        ]);
        out
    }
}

/// Secondary grammar pulling individual components out of a raw date capture.
#[derive(Debug, Clone)]
pub struct DateGrammar {
    pub pattern: Regex,
    pub order: DateComponentOrder,
}

/// chrono format templates used to build textual date filters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DateFilterTemplates {
    /// Minute precision, e.g. `[%d/%b/%Y:%H:%M`.
    pub minutes: String,
    /// Hour precision, e.g. `[%d/%b/%Y:%H`.
    pub hours: String,
    /// Day precision, e.g. `[%d/%b/%Y`.
    pub days: String,
}

/// Runtime representation of a service profile after TOML parsing and
/// regex compilation. Immutable once built.
#[derive(Debug, Clone)]
pub struct ServiceProfile {
    /// Registry identifier (e.g. "nginx").
    pub id: String,

    /// Human-readable name.
    pub name: String,

    /// Description of the log family.
    pub description: String,

    /// Alternative names accepted by the registry.
    pub aliases: Vec<String>,

    /// Selects the extraction procedure.
    pub kind: ServiceKind,

    /// Compiled line grammar; case-insensitive for web profiles.
    pub line_grammar: Regex,

    /// Date sub-grammar. `None` keeps DATETIME as the raw capture.
    pub date: Option<DateGrammar>,

    /// Templates for the date filter generator.
    pub filter_templates: DateFilterTemplates,

    /// Directory holding this service's logs by default.
    pub log_dir: PathBuf,

    /// Default access log file name inside `log_dir`.
    pub access_log: String,

    /// Error log file name for web services.
    pub error_log: Option<String>,
}

impl ServiceProfile {
    /// Default file read when the caller supplies neither text nor a path.
    pub fn default_log_path(&self) -> PathBuf {
        self.log_dir.join(&self.access_log)
    }

    /// Error log location for services that write one.
    pub fn error_log_path(&self) -> Option<PathBuf> {
        self.error_log.as_ref().map(|f| self.log_dir.join(f))
    }

    /// True when `name` is the id or one of the aliases (case-insensitive).
    pub fn answers_to(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

// =============================================================================
// Date filter request
// =============================================================================

/// A minute or hour value that may be left open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeField {
    Exact(u32),
    Any,
}

impl FromStr for TimeField {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == constants::WILDCARD_TOKEN {
            Ok(TimeField::Any)
        } else {
            s.parse().map(TimeField::Exact)
        }
    }
}

/// Precision of a generated date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Minute,
    Hour,
    Day,
}

/// A point in time with possible wildcards. Unset components are filled from
/// the current moment supplied to the generator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFilterSpec {
    pub minute: Option<TimeField>,
    pub hour: Option<TimeField>,
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl DateFilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn minute(mut self, minute: TimeField) -> Self {
        self.minute = Some(minute);
        self
    }

    pub fn hour(mut self, hour: TimeField) -> Self {
        self.hour = Some(hour);
        self
    }

    pub fn day(mut self, day: u32) -> Self {
        self.day = Some(day);
        self
    }

    pub fn month(mut self, month: u32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Every component given, wildcards allowed on minute and hour.
    pub fn at(minute: TimeField, hour: TimeField, day: u32, month: u32, year: i32) -> Self {
        Self::new()
            .minute(minute)
            .hour(hour)
            .day(day)
            .month(month)
            .year(year)
    }

    /// A fully concrete calendar minute.
    pub fn exact(minute: u32, hour: u32, day: u32, month: u32, year: i32) -> Self {
        Self::at(
            TimeField::Exact(minute),
            TimeField::Exact(hour),
            day,
            month,
            year,
        )
    }
}

// =============================================================================
// Line predicate
// =============================================================================

/// One filtering rule. A set of predicates is AND-combined.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinePredicate {
    pub pattern: String,
    pub is_regex: bool,
    pub case_sensitive: bool,
    pub negate: bool,
}

impl LinePredicate {
    /// Case-sensitive substring containment.
    pub fn substring(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: false,
            case_sensitive: true,
            negate: false,
        }
    }

    /// Case-sensitive regex search.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            is_regex: true,
            ..Self::substring(pattern)
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    pub fn negated(mut self) -> Self {
        self.negate = true;
        self
    }
}

// =============================================================================
// Log records (output of extraction)
// =============================================================================

/// One web access log request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WebRecord {
    /// `YYYY-MM-DD HH:MM:SS`, or the raw capture when the profile has no
    /// date sub-grammar.
    pub datetime: String,
    pub ip: String,
    pub method: String,
    pub route: String,
    pub code: String,
    pub referrer: String,
    pub useragent: String,
}

/// Signals pulled out of an authentication message body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AuthDetails {
    pub ip: Option<String>,
    pub invalid_user: Option<String>,
    pub invalid_pass_user: Option<String>,
    pub is_preauth: bool,
    pub is_closed: bool,
}

/// One authentication log event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AuthRecord {
    pub datetime: String,
    pub service: String,
    #[serde(flatten)]
    pub details: AuthDetails,
}

/// A structured record produced from one matched log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LogRecord {
    Web(WebRecord),
    Auth(AuthRecord),
}

impl LogRecord {
    /// Normalised (or raw) DATETIME value.
    pub fn datetime(&self) -> &str {
        match self {
            LogRecord::Web(r) => &r.datetime,
            LogRecord::Auth(r) => &r.datetime,
        }
    }

    /// Client IP, when one is known.
    pub fn ip(&self) -> Option<&str> {
        match self {
            LogRecord::Web(r) => Some(&r.ip),
            LogRecord::Auth(r) => r.details.ip.as_deref(),
        }
    }

    /// Field names in output order for this record's kind.
    pub fn field_names(&self) -> &'static [&'static str] {
        match self {
            LogRecord::Web(_) => &[
                "DATETIME",
                "IP",
                "METHOD",
                "ROUTE",
                "CODE",
                "REFERRER",
                "USERAGENT",
            ],
            LogRecord::Auth(_) => &[
                "DATETIME",
                "SERVICE",
                "IP",
                "INVALID_USER",
                "INVALID_PASS_USER",
                "IS_PREAUTH",
                "IS_CLOSED",
            ],
        }
    }

    /// Field values aligned with `field_names`. `None` marks a null field.
    pub fn field_values(&self) -> Vec<Option<String>> {
        match self {
            LogRecord::Web(r) => vec![
                Some(r.datetime.clone()),
                Some(r.ip.clone()),
                Some(r.method.clone()),
                Some(r.route.clone()),
                Some(r.code.clone()),
                Some(r.referrer.clone()),
                Some(r.useragent.clone()),
            ],
            LogRecord::Auth(r) => vec![
                Some(r.datetime.clone()),
                Some(r.service.clone()),
                r.details.ip.clone(),
                r.details.invalid_user.clone(),
                r.details.invalid_pass_user.clone(),
                Some(r.details.is_preauth.to_string()),
                Some(r.details.is_closed.to_string()),
            ],
        }
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let values = self.field_values();
        for (i, (name, value)) in self.field_names().iter().zip(values).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={}", value.as_deref().unwrap_or("-"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_field_parses_wildcard_and_numbers() {
        assert_eq!("*".parse::<TimeField>().unwrap(), TimeField::Any);
        assert_eq!(" 13 ".parse::<TimeField>().unwrap(), TimeField::Exact(13));
        assert!("x".parse::<TimeField>().is_err());
    }

    #[test]
    fn test_predicate_builders() {
        let p = LinePredicate::regex(r"\d+").case_insensitive().negated();
        assert!(p.is_regex);
        assert!(!p.case_sensitive);
        assert!(p.negate);

        let s = LinePredicate::substring("x");
        assert!(!s.is_regex && s.case_sensitive && !s.negate);
    }

    #[test]
    fn test_auth_record_json_uses_upper_case_flat_fields() {
        let record = LogRecord::Auth(AuthRecord {
            datetime: "2016-05-04 22:00:32".to_string(),
            service: "sshd".to_string(),
            details: AuthDetails {
                ip: Some("10.0.0.5".to_string()),
                invalid_user: None,
                invalid_pass_user: Some("root".to_string()),
                is_preauth: false,
                is_closed: true,
            },
        });
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["SERVICE"], "sshd");
        assert_eq!(json["IP"], "10.0.0.5");
        assert!(json["INVALID_USER"].is_null());
        assert_eq!(json["INVALID_PASS_USER"], "root");
        assert_eq!(json["IS_CLOSED"], true);
    }

    #[test]
    fn test_record_display_marks_nulls() {
        let record = LogRecord::Auth(AuthRecord {
            datetime: "2016-05-04 22:00:32".to_string(),
            service: "CRON".to_string(),
            details: AuthDetails::default(),
        });
        let text = record.to_string();
        assert!(text.starts_with("DATETIME=2016-05-04 22:00:32 SERVICE=CRON IP=-"));
        assert!(text.ends_with("IS_PREAUTH=false IS_CLOSED=false"));
        assert_eq!(record.ip(), None);
    }
}
