// loginsight - util/logging.rs
//
// Structured logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr only, so records on stdout can be piped cleanly.

use super::constants;
use tracing_subscriber::EnvFilter;

/// Where the active log level came from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LevelSource {
    Env,
    DebugFlag,
    Config(String),
    Default,
}

/// Priority: RUST_LOG env var > CLI --debug flag > config level > default.
fn level_source(env_set: bool, debug_flag: bool, config_level: Option<&str>) -> LevelSource {
    if env_set {
        LevelSource::Env
    } else if debug_flag {
        LevelSource::DebugFlag
    } else if let Some(level) = config_level {
        LevelSource::Config(level.to_lowercase())
    } else {
        LevelSource::Default
    }
}

/// Initialise the logging subsystem.
///
/// `debug_flag` is true when the user passed --debug on the CLI.
/// `config_level` is the validated level from config.toml, if any.
/// Safe to call more than once; later calls are no-ops.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let source = level_source(std::env::var_os("RUST_LOG").is_some(), debug_flag, config_level);

    let filter = match &source {
        LevelSource::Env => EnvFilter::from_default_env(),
        LevelSource::DebugFlag => EnvFilter::new("debug"),
        LevelSource::Config(level) => EnvFilter::new(level),
        LevelSource::Default => EnvFilter::new(constants::DEFAULT_LOG_LEVEL),
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .try_init();

    tracing::debug!(
        app = constants::APP_NAME,
        version = constants::APP_VERSION,
        source = ?source,
        "Logging initialised"
    );
}
