//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the user's config and environment.
fn assess(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("assess").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("ASSESSMENT_DATA_FILE")
        .env_remove("ASSESSMENT_LOCALE")
        .env_remove("RUST_LOG");
    cmd
}

fn data_file(dir: &TempDir) -> PathBuf {
    dir.path().join("db").join("assessments.json")
}

fn create(dir: &TempDir, name: &str, date: &str, discipline: &str, skill: &str) {
    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(dir))
        .args(["create", "--name", name, "--date", date])
        .args(["--discipline", discipline, "--skill", skill])
        .args(["--completed", "3", "--total", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created assessment"));
}

fn json_output(dir: &TempDir, args: &[&str]) -> serde_json::Value {
    let output = assess(dir.path())
        .arg("--data-file")
        .arg(data_file(dir))
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn help_output() {
    let dir = TempDir::new().unwrap();
    assess(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Student assessment tracker"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn version_output() {
    let dir = TempDir::new().unwrap();
    assess(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("assess"));
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();
    assess(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created assessment.toml"));
    assert!(dir.path().join("assessment.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    assess(dir.path()).arg("init").assert().success();
    assess(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn create_then_list() {
    let dir = TempDir::new().unwrap();
    create(&dir, "Ann", "2024-01-01", "4", "85");

    assert!(data_file(&dir).exists());
    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ann"))
        .stdout(predicate::str::contains("75.0%"))
        .stdout(predicate::str::contains("1 assessment(s)"));
}

#[test]
fn show_json_includes_derived_rate() {
    let dir = TempDir::new().unwrap();
    create(&dir, "Ann", "2024-01-01", "4", "85");

    let record = json_output(&dir, &["show", "1", "--json"]);
    assert_eq!(record["id"], 1);
    assert_eq!(record["studentName"], "Ann");
    assert_eq!(record["assessmentDate"], "2024-01-01");
    assert_eq!(record["taskCompletionRate"], 75.0);

    let stored = std::fs::read_to_string(data_file(&dir)).unwrap();
    assert!(!stored.contains("taskCompletionRate"));
}

#[test]
fn create_rejects_invalid_fields() {
    let dir = TempDir::new().unwrap();
    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["create", "--name", "Ann", "--discipline", "6", "--skill", "85"])
        .args(["--completed", "3", "--total", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("discipline score"));

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["create", "--name", "Ann", "--discipline", "3", "--skill", "85"])
        .args(["--completed", "1", "--total", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid task counts"));

    assert!(!data_file(&dir).exists());
}

#[test]
fn update_keeps_date_when_omitted() {
    let dir = TempDir::new().unwrap();
    create(&dir, "Ann", "2024-01-01", "3", "70");

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["update", "1", "--name", "Anna", "--discipline", "5"])
        .args(["--skill", "95", "--completed", "4", "--total", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated assessment 1"));

    let record = json_output(&dir, &["show", "1", "--json"]);
    assert_eq!(record["studentName"], "Anna");
    assert_eq!(record["assessmentDate"], "2024-01-01");
    assert_eq!(record["disciplineScore"], 5);
}

#[test]
fn delete_and_missing_ids() {
    let dir = TempDir::new().unwrap();
    create(&dir, "Ann", "2024-01-01", "3", "70");

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["delete", "1"])
        .assert()
        .success();

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["delete", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("assessment 1 not found"));

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["show", "7"])
        .assert()
        .failure();
}

#[test]
fn queries_filter_records() {
    let dir = TempDir::new().unwrap();
    create(&dir, "Ann Lee", "2024-01-05", "4", "80");
    create(&dir, "Bo", "2024-03-01", "3", "95");
    create(&dir, "Ann Lee", "2024-01-01", "5", "90");

    let by_student = json_output(&dir, &["student", "Ann Lee", "--json"]);
    let dates: Vec<_> = by_student
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["assessmentDate"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-05"]);

    let found = json_output(&dir, &["search", "lee", "--json"]);
    assert_eq!(found.as_array().unwrap().len(), 2);

    let in_range = json_output(
        &dir,
        &["range", "--from", "2024-02-01", "--to", "2024-03-31", "--json"],
    );
    assert_eq!(in_range[0]["studentName"], "Bo");

    let excellent = json_output(&dir, &["excellent", "--json"]);
    assert_eq!(excellent.as_array().unwrap().len(), 2);
    assert!(excellent
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["studentName"] == "Ann Lee"));
}

#[test]
fn stats_on_empty_store_are_zero() {
    let dir = TempDir::new().unwrap();
    let stats = json_output(&dir, &["stats", "--json"]);
    assert_eq!(stats["averageDisciplineScore"], 0.0);
    assert_eq!(stats["averageSkillCompletionRate"], 0.0);
    assert_eq!(stats["averageTaskCompletionRate"], 0.0);
    assert_eq!(stats["totalAssessments"], 0);
    assert_eq!(stats["skillTrend"].as_array().unwrap().len(), 0);
}

#[test]
fn stats_group_trends_by_day() {
    let dir = TempDir::new().unwrap();
    create(&dir, "Ann", "2024-01-01", "4", "80");
    create(&dir, "Bo", "2024-01-01", "4", "90");
    create(&dir, "Cy", "2024-01-02", "4", "70");

    let stats = json_output(&dir, &["stats", "--json"]);
    assert_eq!(stats["totalAssessments"], 3);
    assert_eq!(stats["skillTrend"][0]["date"], "2024-01-01");
    assert_eq!(stats["skillTrend"][0]["value"], 85.0);
    assert_eq!(stats["skillTrend"][1]["value"], 70.0);

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daily trends"))
        .stdout(predicate::str::contains("2024-01-02"));
}

#[test]
fn report_writes_pdf() {
    let dir = TempDir::new().unwrap();
    create(&dir, "张三", "2024-01-01", "4", "80");
    let out = dir.path().join("out").join("report.pdf");

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["report", "--locale", "zh-CN", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let bytes = std::fs::read(&out).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn report_defaults_to_dated_name_in_report_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("assessment.toml"),
        "report_dir = \"generated\"\ndefault_locale = \"en\"\n",
    )
    .unwrap();

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .arg("report")
        .assert()
        .success()
        .stdout(predicate::str::contains("assessment_report_"));

    let written: Vec<_> = std::fs::read_dir(dir.path().join("generated"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("assessment_report_"));
    assert!(written[0].ends_with(".pdf"));
}

#[test]
fn report_markdown_to_stdout() {
    let dir = TempDir::new().unwrap();
    create(&dir, "Ann", "2024-01-01", "4", "80");

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["report", "--format", "markdown", "--locale", "en"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Assessment System Statistics Report"))
        .stdout(predicate::str::contains("## 2. Assessment Records"))
        .stdout(predicate::str::contains("| Ann | 2024-01-01 | 4/5 | 80.0% | 3 | 4 |"));
}

#[test]
fn report_rejects_unknown_locale_and_format() {
    let dir = TempDir::new().unwrap();
    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["report", "--locale", "fr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown locale"));

    assess(dir.path())
        .arg("--data-file")
        .arg(data_file(&dir))
        .args(["report", "--format", "docx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown report format"));
}

#[test]
fn health_reports_ok() {
    let dir = TempDir::new().unwrap();
    let health = json_output(&dir, &["health", "--json"]);
    assert_eq!(health["status"], "OK");
    assert_eq!(health["totalAssessments"], 0);
}

#[test]
fn missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    assess(dir.path())
        .args(["--config", "nope.toml", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn data_file_env_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("env.json");
    assess(dir.path())
        .env("ASSESSMENT_DATA_FILE", &path)
        .args(["create", "--name", "Ann", "--discipline", "3", "--skill", "50"])
        .args(["--completed", "1", "--total", "2"])
        .assert()
        .success();
    assert!(path.exists());
}
