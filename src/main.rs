// loginsight - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation
// 3. Building line and date predicates
// 4. Request retrieval and rendering to stdout

use clap::Parser;
use loginsight::app::requests;
use loginsight::core::datefilter;
use loginsight::core::export::{self, OutputFormat};
use loginsight::core::model::{DateFilterSpec, LinePredicate, ServiceProfile, TimeField};
use loginsight::core::profile;
use loginsight::platform::config::{self, PlatformPaths};
use loginsight::util::{self, error::ExportError, error::Result};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// loginsight - Parse nginx, Apache and auth logs into structured records.
///
/// Reads the service's default log unless --logfile is given. Filters are
/// applied line by line before extraction; all filters must match.
#[derive(Parser, Debug)]
#[command(name = "loginsight", version, about)]
struct Cli {
    /// Service whose log format to use (nginx, apache2, auth).
    #[arg(short = 's', long = "service", required_unless_present = "list_services")]
    service: Option<String>,

    /// List the known services with their default log locations and exit.
    #[arg(long = "list-services")]
    list_services: bool,

    /// Log file to read instead of the service's default location.
    #[arg(short = 'l', long = "logfile")]
    logfile: Option<PathBuf>,

    /// Keep only lines containing this pattern (repeatable).
    #[arg(short = 'f', long = "filter")]
    filters: Vec<String>,

    /// Treat --filter patterns as regular expressions.
    #[arg(short = 'r', long = "regex")]
    regex: bool,

    /// Match --filter patterns case-insensitively.
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Keep lines that do NOT match the --filter patterns.
    #[arg(short = 'v', long = "invert")]
    invert: bool,

    /// Date filter minute (0-59, or * for any).
    #[arg(long = "minute")]
    minute: Option<TimeField>,

    /// Date filter hour (0-23, or * for any).
    #[arg(long = "hour")]
    hour: Option<TimeField>,

    /// Date filter day of month (1-31).
    #[arg(long = "day")]
    day: Option<u32>,

    /// Date filter month (1-12).
    #[arg(long = "month")]
    month: Option<u32>,

    /// Date filter year (1971-2030).
    #[arg(long = "year")]
    year: Option<i32>,

    /// Output format: text, json or csv (overrides config).
    #[arg(long = "format")]
    format: Option<OutputFormat>,

    /// Path to config.toml (defaults to the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

impl Cli {
    fn date_spec(&self) -> Option<DateFilterSpec> {
        let any = self.minute.is_some()
            || self.hour.is_some()
            || self.day.is_some()
            || self.month.is_some()
            || self.year.is_some();
        any.then_some(DateFilterSpec {
            minute: self.minute,
            hour: self.hour,
            day: self.day,
            month: self.month,
            year: self.year,
        })
    }

    fn line_predicates(&self) -> Vec<LinePredicate> {
        self.filters
            .iter()
            .map(|pattern| {
                let mut p = if self.regex {
                    LinePredicate::regex(pattern.as_str())
                } else {
                    LinePredicate::substring(pattern.as_str())
                };
                if self.ignore_case {
                    p = p.case_insensitive();
                }
                if self.invert {
                    p = p.negated();
                }
                p
            })
            .collect()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::debug!(
        version = util::constants::APP_VERSION,
        service = ?cli.service,
        "loginsight starting"
    );

    match run(&cli, &app_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Request failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, app_config: &config::AppConfig) -> Result<()> {
    let Some(service_name) = cli.service.as_deref().filter(|_| !cli.list_services) else {
        let stdout = std::io::stdout();
        return write_service_list(app_config, stdout.lock());
    };

    let now = chrono::Local::now().naive_local();
    let service = profile::resolve(service_name)?;

    let mut predicates = cli.line_predicates();
    if let Some(spec) = cli.date_spec() {
        let date_filter = datefilter::build_filter(service, &spec, now)?;
        predicates.push(LinePredicate::substring(date_filter));
    }

    let Some(result) = requests::get_requests(
        &service.id,
        None,
        cli.logfile.as_deref(),
        &predicates,
        app_config,
        now,
    )?
    else {
        eprintln!("No data: the log file could not be read");
        return Ok(());
    };

    if result.skipped > 0 {
        tracing::warn!(
            skipped = result.skipped,
            "Some matched lines were skipped because their date could not be parsed"
        );
    }

    let format = cli.format.unwrap_or(app_config.output_format);
    let stdout = std::io::stdout();
    let count = export::export(&result.records, format, stdout.lock())?;

    tracing::debug!(records = count, format = format.label(), "Output written");
    Ok(())
}

/// One block per registered service: name, description, aliases and the
/// log locations that would be read (config overrides applied).
fn write_service_list<W: Write>(app_config: &config::AppConfig, mut out: W) -> Result<()> {
    for p in profile::builtin_profiles() {
        write_service(&mut out, p, app_config).map_err(|e| ExportError::Io { source: e })?;
    }
    Ok(())
}

fn write_service<W: Write>(
    out: &mut W,
    p: &ServiceProfile,
    app_config: &config::AppConfig,
) -> std::io::Result<()> {
    let aliases = if p.aliases.is_empty() {
        "-".to_string()
    } else {
        p.aliases.join(", ")
    };
    let error_log = p
        .error_log_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "-".to_string());

    writeln!(out, "{} ({}, {})", p.id, p.name, p.kind.label())?;
    writeln!(out, "    {}", p.description)?;
    writeln!(out, "    aliases:    {aliases}")?;
    writeln!(
        out,
        "    access log: {}",
        requests::default_log_path(p, app_config).display()
    )?;
    writeln!(out, "    error log:  {error_log}")
}
