// loginsight - core/timestamp.rs
//
// Converts the raw date captured from a log line into the canonical
// `YYYY-MM-DD HH:MM:SS` form. No timezone conversion is applied: the value
// stays in the log file's own local time.

use crate::core::model::{DateComponentOrder, DateGrammar};
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Captures;

/// Normalise `raw_date` with the profile's date grammar.
///
/// `now` is only consulted for year-less dates (see [`infer_log_year`]).
pub fn to_iso8601(
    raw_date: &str,
    grammar: &DateGrammar,
    now: NaiveDateTime,
) -> Result<String, ParseError> {
    normalize(raw_date, grammar, now)
        .map(|dt| dt.format(constants::ISO_DATETIME_FORMAT).to_string())
}

/// Parse `raw_date` into a `NaiveDateTime` using the first match of the
/// date sub-pattern.
pub fn normalize(
    raw_date: &str,
    grammar: &DateGrammar,
    now: NaiveDateTime,
) -> Result<NaiveDateTime, ParseError> {
    let caps = grammar
        .pattern
        .captures(raw_date)
        .ok_or_else(|| ParseError::DatePatternMismatch {
            raw_date: raw_date.to_string(),
            pattern: grammar.pattern.as_str().to_string(),
        })?;

    let order: &DateComponentOrder = &grammar.order;

    let year = match order.year {
        Some(idx) => number(raw_date, &caps, idx, "year")? as i32,
        None => infer_log_year(now),
    };

    let month_text = group(&caps, order.month);
    let month = month_number(month_text).ok_or_else(|| ParseError::UnknownMonth {
        raw_date: raw_date.to_string(),
        month: month_text.to_string(),
    })?;

    let day = number(raw_date, &caps, order.day, "day")?;
    let hour = number(raw_date, &caps, order.hour, "hour")?;
    let minute = number(raw_date, &caps, order.minute, "minute")?;
    let second = number(raw_date, &caps, order.second, "second")?;

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(|| ParseError::InvalidDateTime {
            raw_date: raw_date.to_string(),
        })
}

/// Year to assume for logs that do not record one.
///
/// Syslog-style auth logs roll over silently at midnight on January 1st, so
/// during the first hour of the year the lines most likely belong to the
/// previous year. Outside that hour the current year is used. Lines older
/// than a few minutes read during that hour can still be mis-dated.
pub fn infer_log_year(now: NaiveDateTime) -> i32 {
    if now.month() == 1 && now.day() == 1 && now.hour() == 0 {
        now.year() - 1
    } else {
        now.year()
    }
}

/// Map an English three-letter month abbreviation to 1-12.
/// Matching ignores ASCII case; anything else is `None`.
pub fn month_number(abbr: &str) -> Option<u32> {
    let abbr = abbr.trim();
    constants::MONTH_ABBREVIATIONS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbr))
        .map(|i| i as u32 + 1)
}

fn group<'t>(caps: &Captures<'t>, idx: usize) -> &'t str {
    caps.get(idx).map(|m| m.as_str()).unwrap_or("")
}

/// Numeric component; surrounding whitespace (fixed-width day fields) is
/// trimmed first.
fn number(
    raw_date: &str,
    caps: &Captures<'_>,
    idx: usize,
    component: &'static str,
) -> Result<u32, ParseError> {
    let text = group(caps, idx);
    text.trim()
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber {
            raw_date: raw_date.to_string(),
            component,
            text: text.to_string(),
        })
}
