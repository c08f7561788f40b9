// loginsight - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// validation. Bad values produce warnings and fall back to defaults; a broken
// config never stops the tool from running.

use crate::core::export::OutputFormat;
use crate::core::profile;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Resolved platform paths.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/loginsight/).
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths, falling back to the current
    /// directory when the platform directories cannot be determined.
    pub fn resolve() -> Self {
        match ProjectDirs::from("", "", constants::APP_ID) {
            Some(dirs) => {
                let config_dir = dirs.config_dir().to_path_buf();
                tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
                Self { config_dir }
            }
            None => {
                tracing::warn!("Could not determine platform directories, using current directory");
                Self {
                    config_dir: PathBuf::from("."),
                }
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml. Unknown keys are ignored.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[services.<name>]` tables.
    pub services: HashMap<String, ServiceSection>,
    /// `[output]` section.
    pub output: OutputSection,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

/// `[services.<name>]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ServiceSection {
    /// Directory replacing the profile's default log directory.
    pub log_dir: Option<String>,
    /// File name replacing the profile's default access log name.
    pub log_file: Option<String>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "text", "json" or "csv".
    pub format: Option<String>,
}

/// Per-service override of the default log location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServicePaths {
    pub log_dir: Option<PathBuf>,
    pub log_file: Option<String>,
}

/// Validated application configuration.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Logging level from `[logging] level`, if valid.
    pub log_level: Option<String>,
    /// Overrides keyed by registry id (aliases are folded to the id).
    pub service_paths: HashMap<String, ServicePaths>,
    /// Default output format.
    pub output_format: OutputFormat,
}

impl AppConfig {
    /// Default log path for `service_id`, honouring any configured override.
    /// `None` when no override exists.
    pub fn log_path_override(
        &self,
        service_id: &str,
        default_dir: &Path,
        default_file: &str,
    ) -> Option<PathBuf> {
        let paths = self.service_paths.get(service_id)?;
        let dir = paths.log_dir.as_deref().unwrap_or(default_dir);
        let file = paths.log_file.as_deref().unwrap_or(default_file);
        Some(dir.join(file))
    }
}

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Load and validate config.toml at `config_path`.
///
/// Returns the validated config and a list of non-fatal warnings. A missing
/// file yields defaults with no warnings; an unreadable or unparseable file
/// yields defaults with one warning.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw(config_path) {
        Ok(raw) => raw,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");

    let config = validate(raw, &mut warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

fn read_raw(config_path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(config_path).map_err(|e| ConfigError::Io {
        path: config_path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })
}

/// Validate each section, accumulating one warning per rejected value.
fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> AppConfig {
    let mut config = AppConfig::default();

    if let Some(level) = raw.logging.level {
        if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "[logging] level".to_string(),
                    value: level,
                    expected: LOG_LEVELS.join(", "),
                }
                .to_string(),
            );
        }
    }

    for (name, section) in raw.services {
        let Ok(service) = profile::resolve(&name) else {
            warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "[services]".to_string(),
                    value: name,
                    expected: profile::service_ids().join(", "),
                }
                .to_string(),
            );
            continue;
        };
        let paths = ServicePaths {
            log_dir: section.log_dir.filter(|d| !d.is_empty()).map(PathBuf::from),
            log_file: section.log_file.filter(|f| !f.is_empty()),
        };
        if paths != ServicePaths::default() {
            config.service_paths.insert(service.id.clone(), paths);
        }
    }

    if let Some(format) = raw.output.format {
        match format.parse::<OutputFormat>() {
            Ok(f) => config.output_format = f,
            Err(_) => warnings.push(
                ConfigError::ValueOutOfRange {
                    field: "[output] format".to_string(),
                    value: format,
                    expected: "text, json, csv".to_string(),
                }
                .to_string(),
            ),
        }
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(constants::CONFIG_FILE_NAME);
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(&dir.path().join("absent.toml"));
        assert!(warnings.is_empty());
        assert!(config.log_level.is_none());
        assert!(config.service_paths.is_empty());
        assert_eq!(config.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_valid_config() {
        let (_dir, path) = write_config(
            r#"
[logging]
level = "debug"

[services.nginx]
log_dir = "/srv/logs/nginx"

[services.apache]
log_file = "other_vhosts_access.log"

[output]
format = "json"
"#,
        );
        let (config, warnings) = load_config(&path);
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.output_format, OutputFormat::Json);

        assert_eq!(
            config.log_path_override("nginx", Path::new("/var/log/nginx/"), "access.log"),
            Some(PathBuf::from("/srv/logs/nginx/access.log"))
        );
        assert_eq!(
            config.log_path_override("apache2", Path::new("/var/log/apache2/"), "access.log"),
            Some(PathBuf::from("/var/log/apache2/other_vhosts_access.log"))
        );
        assert_eq!(
            config.log_path_override("auth", Path::new("/var/log/"), "auth.log"),
            None
        );
    }

    #[test]
    fn test_invalid_values_warn_and_fall_back() {
        let (_dir, path) = write_config(
            r#"
[logging]
level = "loud"

[services.mysql]
log_dir = "/var/log/mysql"

[output]
format = "xml"
"#,
        );
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 3);
        assert!(config.log_level.is_none());
        assert!(config.service_paths.is_empty());
        assert_eq!(config.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_unparseable_file_warns() {
        let (_dir, path) = write_config("[logging\nlevel = ");
        let (config, warnings) = load_config(&path);
        assert_eq!(warnings.len(), 1);
        assert!(config.log_level.is_none());
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let (_dir, path) = write_config("[ui]\ntheme = \"dark\"\n");
        let (_config, warnings) = load_config(&path);
        assert!(warnings.is_empty());
    }
}
