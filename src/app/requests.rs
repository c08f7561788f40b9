// loginsight - app/requests.rs
//
// Request retrieval: picks the input (raw text, an explicit file, or the
// service's default log), applies line filters, and extracts records.
//
// "No data" (`None`) means a log file could not be read. It is kept apart
// from "no matching lines", which yields an empty result.

use crate::core::filter::PredicateSet;
use crate::core::model::{LinePredicate, ServiceProfile};
use crate::core::parser::{self, ExtractResult};
use crate::core::profile;
use crate::platform::config::AppConfig;
use crate::platform::fs;
use crate::util::error::{FilterError, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Filter raw text or a file's content line by line.
///
/// The file wins when both are supplied; empty text counts as absent.
/// Neither is an error. A file that cannot be read is logged and yields
/// `Ok(None)`. Predicates are compiled before any input is read, so an
/// invalid regex is always reported.
pub fn filter_data(
    text: Option<&str>,
    file: Option<&Path>,
    predicates: &[LinePredicate],
) -> Result<Option<String>> {
    let set = PredicateSet::compile(predicates)?;
    let text = text.filter(|t| !t.is_empty());

    if file.is_none() && text.is_none() {
        return Err(FilterError::MissingInput.into());
    }

    Ok(load_content(text, file, &set))
}

/// Extract the records of `service_name` from a file, text, or the default
/// log location.
///
/// The file wins when both are supplied; empty text counts as absent. With
/// neither, the profile's default log path is read unless `config`
/// overrides it. With no predicates the content is used verbatim. An
/// unreadable file yields `Ok(None)`.
pub fn get_requests(
    service_name: &str,
    text: Option<&str>,
    file: Option<&Path>,
    predicates: &[LinePredicate],
    config: &AppConfig,
    now: NaiveDateTime,
) -> Result<Option<ExtractResult>> {
    let profile = profile::resolve(service_name)?;
    let set = PredicateSet::compile(predicates)?;
    let text = text.filter(|t| !t.is_empty());

    let default_path;
    let file = match (file, text) {
        (None, None) => {
            default_path = default_log_path(profile, config);
            tracing::debug!(
                service = %profile.id,
                path = %default_path.display(),
                "Using default log location"
            );
            Some(default_path.as_path())
        }
        (file, _) => file,
    };

    let Some(content) = load_content(text, file, &set) else {
        return Ok(None);
    };

    if content.is_empty() {
        tracing::debug!(service = %profile.id, "No content left to extract");
        return Ok(Some(ExtractResult::default()));
    }

    Ok(Some(parser::extract(&content, profile, now)))
}

/// Read the chosen input (file first, then text) and apply `set` unless it
/// is empty. `None` when the file cannot be read.
fn load_content(text: Option<&str>, file: Option<&Path>, set: &PredicateSet) -> Option<String> {
    let content = match file {
        Some(path) => read_log(path)?,
        None => text.unwrap_or_default().to_string(),
    };

    if set.is_empty() {
        Some(content)
    } else {
        Some(set.apply(&content))
    }
}

/// Profile default (log_dir + access log), or the configured override.
pub fn default_log_path(profile: &ServiceProfile, config: &AppConfig) -> PathBuf {
    config
        .log_path_override(&profile.id, &profile.log_dir, &profile.access_log)
        .unwrap_or_else(|| profile.default_log_path())
}

fn read_log(path: &Path) -> Option<String> {
    match fs::read_file_lossy(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(
                file = %path.display(),
                error = %e,
                "Cannot read log file"
            );
            None
        }
    }
}
