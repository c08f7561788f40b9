// loginsight - core/datefilter.rs
//
// Turns a calendar moment plus a granularity into the textual prefix a
// service writes at the start of its date field, so that a plain substring
// filter can narrow a log to one minute, hour, or day.
// Core layer: the current moment is passed in by the caller.

use crate::core::model::{DateFilterSpec, Granularity, ServiceProfile, TimeField};
use crate::util::constants;
use crate::util::error::DateFilterError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Build the date filter string for `profile`.
///
/// Unset components in `spec` take their value from `now`. With both
/// minute and hour concrete the minute template is used; a wildcard minute
/// selects the hour template; wildcard minute and hour select the day
/// template. A concrete minute under a wildcard hour is rejected.
pub fn build_filter(
    profile: &ServiceProfile,
    spec: &DateFilterSpec,
    now: NaiveDateTime,
) -> Result<String, DateFilterError> {
    let minute = spec.minute.unwrap_or(TimeField::Exact(now.minute()));
    let hour = spec.hour.unwrap_or(TimeField::Exact(now.hour()));
    let day = spec.day.unwrap_or(now.day());
    let month = spec.month.unwrap_or(now.month());
    let year = spec.year.unwrap_or(now.year());

    check_range(
        "year",
        year as i64,
        constants::MIN_FILTER_YEAR as i64,
        constants::MAX_FILTER_YEAR as i64,
    )?;
    check_range("month", month as i64, 1, constants::MAX_MONTH as i64)?;
    check_range("day", day as i64, 1, constants::MAX_DAY as i64)?;
    if let TimeField::Exact(h) = hour {
        check_range("hour", h as i64, 0, constants::MAX_HOUR as i64)?;
    }
    if let TimeField::Exact(m) = minute {
        check_range("minute", m as i64, 0, constants::MAX_MINUTE as i64)?;
    }

    let (granularity, h, m) = match (minute, hour) {
        (TimeField::Exact(m), TimeField::Exact(h)) => (Granularity::Minute, h, m),
        (TimeField::Any, TimeField::Exact(h)) => (Granularity::Hour, h, 0),
        (TimeField::Any, TimeField::Any) => (Granularity::Day, 0, 0),
        (TimeField::Exact(m), TimeField::Any) => {
            return Err(DateFilterError::MinuteWithoutHour { minute: m });
        }
    };

    let moment = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(h, m, 0))
        .ok_or(DateFilterError::InvalidCalendarDate { year, month, day })?;

    let template = template_for(profile, granularity);
    let filter = moment.format(template).to_string();

    tracing::debug!(
        profile = %profile.id,
        granularity = ?granularity,
        filter = %filter,
        "Built date filter"
    );

    Ok(filter)
}

/// The profile's template for a given granularity.
pub fn template_for(profile: &ServiceProfile, granularity: Granularity) -> &str {
    match granularity {
        Granularity::Minute => &profile.filter_templates.minutes,
        Granularity::Hour => &profile.filter_templates.hours,
        Granularity::Day => &profile.filter_templates.days,
    }
}

fn check_range(
    component: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), DateFilterError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(DateFilterError::OutOfRange {
            component,
            value,
            min,
            max,
        })
    }
}
