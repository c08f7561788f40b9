// loginsight - core/parser.rs
//
// Record extraction: applies a service profile's line grammar to text and
// turns each match into a structured record.
// Core layer: works on text already in memory, never touches the filesystem.

use crate::core::auth;
use crate::core::model::{AuthRecord, LogRecord, ServiceKind, ServiceProfile, WebRecord};
use crate::core::timestamp;
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::NaiveDateTime;
use regex::Captures;

/// Result of extracting records from one block of text.
#[derive(Debug, Default)]
pub struct ExtractResult {
    /// Records in match order (which is line order).
    pub records: Vec<LogRecord>,
    /// Date normalisation failures (capped at MAX_RECORDED_PARSE_ERRORS).
    pub errors: Vec<ParseError>,
    /// Matched lines dropped because their date could not be normalised.
    pub skipped: usize,
}

impl ExtractResult {
    fn record_failure(&mut self, profile: &ServiceProfile, err: ParseError) {
        tracing::warn!(
            profile = %profile.id,
            error = %err,
            "Skipping record with unparseable date"
        );
        self.skipped += 1;
        if self.errors.len() < constants::MAX_RECORDED_PARSE_ERRORS {
            self.errors.push(err);
        }
    }
}

/// Extract records from `text`, dispatching on the profile's kind.
///
/// Lines that do not match the grammar produce nothing. A matched line
/// whose date cannot be normalised is skipped and its error recorded; the
/// rest of the batch is still extracted.
///
/// `now` is used for year inference on year-less dates.
pub fn extract(text: &str, profile: &ServiceProfile, now: NaiveDateTime) -> ExtractResult {
    let result = match profile.kind {
        ServiceKind::Web => extract_web(text, profile, now),
        ServiceKind::Auth => extract_auth(text, profile, now),
    };

    tracing::debug!(
        profile = %profile.id,
        records = result.records.len(),
        skipped = result.skipped,
        "Extraction complete"
    );

    result
}

/// Web access log extraction: ip, date, method, route, status, referrer,
/// useragent per match.
pub fn extract_web(text: &str, profile: &ServiceProfile, now: NaiveDateTime) -> ExtractResult {
    let mut result = ExtractResult::default();

    for caps in profile.line_grammar.captures_iter(text) {
        let datetime = match normalize_date(group(&caps, 2), profile, now) {
            Ok(dt) => dt,
            Err(e) => {
                result.record_failure(profile, e);
                continue;
            }
        };

        result.records.push(LogRecord::Web(WebRecord {
            datetime,
            ip: group(&caps, 1).to_string(),
            method: group(&caps, 3).to_string(),
            route: group(&caps, 4).to_string(),
            code: group(&caps, 5).to_string(),
            referrer: group(&caps, 6).to_string(),
            useragent: group(&caps, 7).to_string(),
        }));
    }

    result
}

/// Auth log extraction: date, service tag and message body per match; the
/// body is decomposed into IP, invalid users and session flags.
pub fn extract_auth(text: &str, profile: &ServiceProfile, now: NaiveDateTime) -> ExtractResult {
    let mut result = ExtractResult::default();

    for caps in profile.line_grammar.captures_iter(text) {
        let datetime = match normalize_date(group(&caps, 1), profile, now) {
            Ok(dt) => dt,
            Err(e) => {
                result.record_failure(profile, e);
                continue;
            }
        };

        result.records.push(LogRecord::Auth(AuthRecord {
            datetime,
            service: group(&caps, 2).to_string(),
            details: auth::decompose(group(&caps, 3)),
        }));
    }

    result
}

/// Normalised date when the profile has a date grammar, raw text otherwise.
fn normalize_date(
    raw: &str,
    profile: &ServiceProfile,
    now: NaiveDateTime,
) -> Result<String, ParseError> {
    match &profile.date {
        Some(grammar) => timestamp::to_iso8601(raw, grammar, now),
        None => Ok(raw.to_string()),
    }
}

fn group<'t>(caps: &Captures<'t>, idx: usize) -> &'t str {
    caps.get(idx).map(|m| m.as_str()).unwrap_or("")
}
