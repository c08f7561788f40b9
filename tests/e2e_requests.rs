// loginsight - tests/e2e_requests.rs
//
// End-to-end tests for request retrieval: real fixture files on disk, real
// embedded profiles, real line filters and date filters, real export.
// No mocks.

use chrono::{NaiveDate, NaiveDateTime};
use loginsight::app::requests::{filter_data, get_requests};
use loginsight::core::datefilter::build_filter;
use loginsight::core::export::{export, OutputFormat};
use loginsight::core::model::{DateFilterSpec, LinePredicate, LogRecord, TimeField};
use loginsight::core::parser::ExtractResult;
use loginsight::core::profile;
use loginsight::platform::config::{load_config, AppConfig};
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Fixed reading moment so year inference on auth logs is deterministic.
fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2016, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn requests_from(service: &str, file: &str, predicates: &[LinePredicate]) -> ExtractResult {
    get_requests(
        service,
        None,
        Some(&fixture(file)),
        predicates,
        &AppConfig::default(),
        now(),
    )
    .expect("request must succeed")
    .expect("fixture must be readable")
}

fn field(record: &LogRecord, name: &str) -> Option<String> {
    let idx = record.field_names().iter().position(|n| *n == name)?;
    record.field_values().remove(idx)
}

// =============================================================================
// Web logs
// =============================================================================

#[test]
fn e2e_nginx_all_matching_lines_become_records() {
    let result = requests_from("nginx", "nginx_access.log", &[]);
    assert_eq!(result.records.len(), 5, "malformed line must be skipped");
    assert!(result.errors.is_empty());

    let methods: Vec<_> = result
        .records
        .iter()
        .map(|r| field(r, "METHOD").unwrap())
        .collect();
    assert_eq!(methods, ["GET", "POST", "GET", "GET", "get"]);

    let robots = &result.records[3];
    assert_eq!(field(robots, "CODE").as_deref(), Some("404"));
    assert_eq!(field(robots, "ROUTE").as_deref(), Some("/robots.txt"));
}

#[test]
fn e2e_nginx_ip_filter() {
    let result = requests_from(
        "nginx",
        "nginx_access.log",
        &[LinePredicate::substring("192.10.1.1")],
    );
    assert_eq!(result.records.len(), 2);

    let first = &result.records[0];
    assert!(field(first, "ROUTE").unwrap().contains("daedalu5"));
    assert_eq!(first.datetime(), "2016-04-24 06:26:37");
}

#[test]
fn e2e_nginx_date_filters_narrow_by_granularity() {
    let nginx = profile::resolve("nginx").unwrap();

    let day = build_filter(
        nginx,
        &DateFilterSpec::at(TimeField::Any, TimeField::Any, 24, 4, 2016),
        now(),
    )
    .unwrap();
    let hour = build_filter(
        nginx,
        &DateFilterSpec::at(TimeField::Any, TimeField::Exact(6), 24, 4, 2016),
        now(),
    )
    .unwrap();
    let minute = build_filter(nginx, &DateFilterSpec::exact(28, 6, 24, 4, 2016), now()).unwrap();

    let count = |filter: String| {
        requests_from("nginx", "nginx_access.log", &[LinePredicate::substring(filter)])
            .records
            .len()
    };
    assert_eq!(count(day), 3);
    assert_eq!(count(hour), 2);
    assert_eq!(count(minute), 1);
}

#[test]
fn e2e_nginx_negated_filter_excludes_ip() {
    let result = requests_from(
        "web-server-nginx",
        "nginx_access.log",
        &[LinePredicate::substring("192.10.1.1").negated()],
    );
    assert_eq!(result.records.len(), 3);
    assert!(result.records.iter().all(|r| r.ip() != Some("192.10.1.1")));
}

#[test]
fn e2e_apache_ip_filter() {
    let result = requests_from(
        "apache2",
        "apache_access.log",
        &[LinePredicate::substring("127.0.1.1")],
    );
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].datetime(), "2016-05-04 11:31:39");
}

#[test]
fn e2e_apache_ipv6_lines_do_not_match() {
    let result = requests_from("apache", "apache_access.log", &[]);
    assert_eq!(result.records.len(), 2);
}

// =============================================================================
// Auth logs
// =============================================================================

#[test]
fn e2e_auth_ip_and_date_filter() {
    let auth = profile::resolve("auth").unwrap();
    let date_filter = build_filter(
        auth,
        &DateFilterSpec::new()
            .minute(TimeField::Any)
            .hour(TimeField::Exact(22))
            .day(4)
            .month(5),
        now(),
    )
    .unwrap();
    assert_eq!(date_filter, "May  4 22:");

    let result = requests_from(
        "auth",
        "auth.log",
        &[
            LinePredicate::substring("120.25.229.167"),
            LinePredicate::substring(date_filter),
        ],
    );
    assert_eq!(result.records.len(), 4);

    let last = &result.records[3];
    assert_eq!(field(last, "INVALID_PASS_USER").as_deref(), Some("root"));
    assert_eq!(last.datetime(), "2016-05-04 22:01:02");

    let first = &result.records[0];
    assert_eq!(field(first, "INVALID_USER").as_deref(), Some("admin"));
    assert_eq!(field(first, "SERVICE").as_deref(), Some("sshd"));
}

#[test]
fn e2e_auth_session_flags() {
    let result = requests_from("auth", "auth.log", &[]);
    assert_eq!(result.records.len(), 7);

    let closed = &result.records[3];
    assert_eq!(field(closed, "IS_CLOSED").as_deref(), Some("true"));
    assert_eq!(field(closed, "IS_PREAUTH").as_deref(), Some("true"));

    let cron = &result.records[5];
    assert_eq!(field(cron, "SERVICE").as_deref(), Some("CRON"));
    assert_eq!(cron.ip(), None);

    assert_eq!(result.records[6].datetime(), "2016-05-14 08:02:11");
}

// =============================================================================
// Inputs, config and output
// =============================================================================

#[test]
fn e2e_filter_data_on_file() {
    let filtered = filter_data(
        None,
        Some(&fixture("auth.log")),
        &[LinePredicate::regex(r"^May 14 ")],
    )
    .unwrap()
    .unwrap();
    assert_eq!(filtered.lines().count(), 1);
    assert!(filtered.ends_with("ssh2\n"));
}

#[test]
fn e2e_file_takes_precedence_over_text() {
    let text = "1.1.1.1 - - [24/Apr/2016:06:26:37 +0000] \"GET / HTTP/1.1\" 200 1 \"-\" \"ua\"\n";
    let result = get_requests(
        "nginx",
        Some(text),
        Some(&fixture("nginx_access.log")),
        &[],
        &AppConfig::default(),
        now(),
    )
    .unwrap()
    .unwrap();
    assert_eq!(result.records.len(), 5);
    assert!(result.records.iter().all(|r| r.ip() != Some("1.1.1.1")));
}

#[test]
fn e2e_missing_log_file_is_no_data() {
    let result = get_requests(
        "nginx",
        None,
        Some(&fixture("does_not_exist.log")),
        &[],
        &AppConfig::default(),
        now(),
    )
    .unwrap();
    assert!(result.is_none());
}

#[test]
fn e2e_config_overrides_default_location() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    let fixtures_dir = fixture("");
    std::fs::write(
        &config_path,
        format!(
            "[services.auth]\nlog_dir = {:?}\n\n[output]\nformat = \"csv\"\n",
            fixtures_dir.display().to_string()
        ),
    )
    .unwrap();

    let (config, warnings) = load_config(&config_path);
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(config.output_format, OutputFormat::Csv);

    let result = get_requests("auth", None, None, &[], &config, now())
        .unwrap()
        .unwrap();
    assert_eq!(result.records.len(), 7);
}

#[test]
fn e2e_export_formats() {
    let result = requests_from("nginx", "nginx_access.log", &[LinePredicate::substring("POST")]);

    let mut csv_out = Vec::new();
    export(&result.records, OutputFormat::Csv, &mut csv_out).unwrap();
    let csv_text = String::from_utf8(csv_out).unwrap();
    assert_eq!(csv_text.lines().count(), 2);
    assert!(csv_text.contains("/login"));

    let mut json_out = Vec::new();
    export(&result.records, OutputFormat::Json, &mut json_out).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&json_out).unwrap();
    assert_eq!(value[0]["CODE"], "302");
    assert_eq!(value[0]["REFERRER"], "http://example.com/");
}
