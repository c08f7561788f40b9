// loginsight - core/profile.rs
//
// Service profile loading, validation, and the fixed service registry.
// Core layer: accepts TOML strings, never touches the filesystem.
// The built-in definitions are embedded at compile time.

use crate::core::model::{
    DateComponentOrder, DateFilterTemplates, DateGrammar, ServiceKind, ServiceProfile,
};
use crate::util::constants;
use crate::util::error::ProfileError;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::OnceLock;

// =============================================================================
// TOML deserialization structures (raw input)
// =============================================================================

/// Raw TOML profile definition.
/// This is validated and compiled into a `ServiceProfile` for runtime use.
#[derive(Debug, Deserialize)]
pub struct ProfileDefinition {
    pub profile: ProfileMeta,
    pub location: LocationDef,
    pub parsing: ParsingDef,
    pub filter_templates: DateFilterTemplates,
}

#[derive(Debug, Deserialize)]
pub struct ProfileMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub kind: ServiceKind,
}

#[derive(Debug, Deserialize)]
pub struct LocationDef {
    pub log_dir: String,
    pub access_log: String,
    #[serde(default)]
    pub error_log: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParsingDef {
    pub line_pattern: String,
    #[serde(default)]
    pub date: Option<DateDef>,
}

#[derive(Debug, Deserialize)]
pub struct DateDef {
    pub pattern: String,
    pub order: DateComponentOrder,
}

// =============================================================================
// Profile validation and compilation
// =============================================================================

/// Parse a TOML string into a `ProfileDefinition`.
///
/// `source_name` is used for error messages only.
pub fn parse_profile_toml(
    toml_content: &str,
    source_name: &str,
) -> Result<ProfileDefinition, ProfileError> {
    toml::from_str(toml_content).map_err(|e| ProfileError::TomlParse {
        source_name: source_name.to_string(),
        source: e,
    })
}

/// Validate a `ProfileDefinition` and compile it into a runtime `ServiceProfile`.
///
/// Validates:
/// - Required fields are present and non-empty
/// - Regex patterns are valid and within size limits
/// - The line grammar has exactly the capture groups its kind extracts
/// - Every date component index points at a group of the date pattern
pub fn validate_and_compile(def: ProfileDefinition) -> Result<ServiceProfile, ProfileError> {
    let id = def.profile.id.clone();

    if id.is_empty() {
        return Err(ProfileError::MissingField {
            profile_id: "(empty)".to_string(),
            field: "profile.id",
        });
    }
    if def.parsing.line_pattern.is_empty() {
        return Err(ProfileError::MissingField {
            profile_id: id,
            field: "parsing.line_pattern",
        });
    }
    if def.location.access_log.is_empty() {
        return Err(ProfileError::MissingField {
            profile_id: id,
            field: "location.access_log",
        });
    }
    for (field, template) in [
        ("filter_templates.minutes", &def.filter_templates.minutes),
        ("filter_templates.hours", &def.filter_templates.hours),
        ("filter_templates.days", &def.filter_templates.days),
    ] {
        if template.is_empty() {
            return Err(ProfileError::MissingField {
                profile_id: id,
                field,
            });
        }
    }

    let kind = def.profile.kind;
    let line_grammar = compile_regex(
        &id,
        "parsing.line_pattern",
        &def.parsing.line_pattern,
        kind.case_insensitive_grammar(),
    )?;

    let found = line_grammar.captures_len() - 1;
    if found != kind.grammar_groups() {
        return Err(ProfileError::CaptureGroupMismatch {
            profile_id: id,
            expected: kind.grammar_groups(),
            found,
        });
    }

    let date = match def.parsing.date {
        Some(date_def) => {
            let pattern = compile_regex(&id, "parsing.date.pattern", &date_def.pattern, false)?;
            let groups = pattern.captures_len() - 1;
            for (component, index) in date_def.order.indices() {
                if index == 0 || index > groups {
                    return Err(ProfileError::DateIndexOutOfRange {
                        profile_id: id,
                        component,
                        index,
                        groups,
                    });
                }
            }
            if kind == ServiceKind::Web && date_def.order.year.is_none() {
                tracing::warn!(
                    profile_id = %id,
                    "Web profile date order has no year; the year will be inferred"
                );
            }
            Some(DateGrammar {
                pattern,
                order: date_def.order,
            })
        }
        None => {
            tracing::debug!(profile_id = %id, "Profile has no date grammar; DATETIME stays raw");
            None
        }
    };

    Ok(ServiceProfile {
        id,
        name: def.profile.name,
        description: def.profile.description,
        aliases: def.profile.aliases,
        kind,
        line_grammar,
        date,
        filter_templates: def.filter_templates,
        log_dir: PathBuf::from(def.location.log_dir),
        access_log: def.location.access_log,
        error_log: def.location.error_log,
    })
}

/// Compile a regex pattern with length validation to bound compile cost.
fn compile_regex(
    profile_id: &str,
    field: &'static str,
    pattern: &str,
    case_insensitive: bool,
) -> Result<Regex, ProfileError> {
    if pattern.len() > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(ProfileError::RegexTooLong {
            profile_id: profile_id.to_string(),
            field,
            length: pattern.len(),
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }

    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| ProfileError::InvalidRegex {
            profile_id: profile_id.to_string(),
            field,
            pattern: pattern.to_string(),
            source: e,
        })
}

// =============================================================================
// Built-in registry
// =============================================================================

/// The closed set of services this build knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinService {
    Nginx,
    Apache2,
    Auth,
}

impl BuiltinService {
    pub const ALL: [BuiltinService; 3] = [
        BuiltinService::Nginx,
        BuiltinService::Apache2,
        BuiltinService::Auth,
    ];

    /// Embedded (file name, TOML content) for this service.
    pub fn source(&self) -> (&'static str, &'static str) {
        match self {
            BuiltinService::Nginx => ("nginx.toml", include_str!("../../profiles/nginx.toml")),
            BuiltinService::Apache2 => (
                "apache2.toml",
                include_str!("../../profiles/apache2.toml"),
            ),
            BuiltinService::Auth => ("auth.toml", include_str!("../../profiles/auth.toml")),
        }
    }
}

/// Load and validate all built-in profiles.
///
/// Invalid profiles are logged as errors and skipped; the unit tests make
/// sure every shipped definition compiles.
pub fn load_builtin_profiles() -> Vec<ServiceProfile> {
    let mut profiles = Vec::with_capacity(BuiltinService::ALL.len());

    for service in BuiltinService::ALL {
        let (filename, content) = service.source();
        match parse_profile_toml(content, filename).and_then(validate_and_compile) {
            Ok(profile) => {
                tracing::debug!(profile_id = %profile.id, "Loaded built-in profile");
                profiles.push(profile);
            }
            Err(e) => {
                tracing::error!(file = filename, error = %e, "Failed to load built-in profile");
            }
        }
    }

    profiles
}

/// Process-wide compiled registry, built on first use.
pub fn builtin_profiles() -> &'static [ServiceProfile] {
    static REGISTRY: OnceLock<Vec<ServiceProfile>> = OnceLock::new();
    REGISTRY.get_or_init(load_builtin_profiles)
}

/// Look up a service profile by id or alias.
pub fn resolve(name: &str) -> Result<&'static ServiceProfile, ProfileError> {
    builtin_profiles()
        .iter()
        .find(|p| p.answers_to(name.trim()))
        .ok_or_else(|| ProfileError::UnknownService {
            name: name.to_string(),
        })
}

/// Ids of every registered service, for help text and error messages.
pub fn service_ids() -> Vec<&'static str> {
    builtin_profiles().iter().map(|p| p.id.as_str()).collect()
}

// =============================================================================
// Tests
// =============================================================================
