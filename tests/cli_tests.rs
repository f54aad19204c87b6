use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn invoicing_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("invoicing"))
}

const CLIENTS: &str = r#"[acme]
name = "Acme Corp NV"
address_line_1 = "2 Market Square"
address_line_2 = "2000 Antwerp"
vat_number = "BE0123456789"
"#;

const PROJECTS: &str = r#"[platform]
client = "acme"
name = "Platform Rebuild"
rate = 500
vat_rate = 0.21
toggl_id = 555
default_description = "Software development"
"#;

const ENTRIES: &str = r#"[[entries]]
project = "platform"
start = "2024-01-03T10:00:00"
duration = "4"

[[entries]]
project = "platform"
start = "2024-01-09T09:00:00"
duration = "6.5"
description = "Sprint review"

[[entries]]
project = "platform"
start = "2024-01-10T09:00:00"
duration = "2"
billable = false
"#;

/// Initialize a config dir and replace the templates with a known setup
fn setup(temp_dir: &TempDir) -> PathBuf {
    let config_path = temp_dir.path().join("invoicing-config");

    invoicing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    fs::write(config_path.join("clients.toml"), CLIENTS).unwrap();
    fs::write(config_path.join("projects.toml"), PROJECTS).unwrap();
    fs::write(config_path.join("entries.toml"), ENTRIES).unwrap();

    config_path
}

fn run_in(config_path: &Path, args: &[&str]) -> assert_cmd::assert::Assert {
    invoicing_cmd()
        .arg("-C")
        .arg(config_path)
        .args(args)
        .assert()
}

#[test]
fn test_help() {
    invoicing_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Timesheets and VAT invoices for freelance projects",
        ));
}

#[test]
fn test_version() {
    invoicing_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("invoicing"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invoicing-config");

    invoicing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized invoicing config"));

    assert!(config_path.join("config.toml").exists());
    assert!(config_path.join("clients.toml").exists());
    assert!(config_path.join("projects.toml").exists());
    assert!(config_path.join("output").is_dir());
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invoicing-config");

    invoicing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    invoicing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_status_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    invoicing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_template_lists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("invoicing-config");

    invoicing_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    run_in(&config_path, &["clients"])
        .success()
        .stdout(predicate::str::contains("example-client"))
        .stdout(predicate::str::contains("Example Client NV"));

    run_in(&config_path, &["projects"])
        .success()
        .stdout(predicate::str::contains("example-project"))
        .stdout(predicate::str::contains("€500.00"))
        .stdout(predicate::str::contains("21%"));
}

#[test]
fn test_status() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(&config_path, &["status"])
        .success()
        .stdout(predicate::str::contains("Invoicing Status"))
        .stdout(predicate::str::contains("Time entries:     3"))
        .stdout(predicate::str::contains("Next invoice:"))
        .stdout(predicate::str::contains("-001"));
}

#[test]
fn test_timesheet_grid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "timesheet",
            "--project",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-14",
        ],
    )
    .success()
    .stdout(predicate::str::contains("2024_01"))
    .stdout(predicate::str::contains("2024_02"))
    .stdout(predicate::str::contains("03: 4"))
    .stdout(predicate::str::contains("09: 6.5"))
    .stdout(predicate::str::contains("Total: 1.6 days"));
}

#[test]
fn test_timesheet_billable_hours() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "timesheet",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-14",
            "--unit",
            "hours",
            "--billable",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Total: 10.5 hours"));
}

#[test]
fn test_timesheet_invalid_unit() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "timesheet",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-07",
            "--unit",
            "weeks",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Unsupported unit 'weeks'"));
}

#[test]
fn test_timesheet_invalid_range() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "timesheet",
            "-p",
            "platform",
            "--start",
            "2024-01-07",
            "--end",
            "2024-01-01",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid date range"));
}

#[test]
fn test_entries_list() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(&config_path, &["entries", "-p", "platform", "--start", "2024-01-09"])
        .success()
        .stdout(predicate::str::contains("Sprint review"))
        .stdout(predicate::str::contains("Total: 8.5 hours in 2 entries"));
}

#[test]
fn test_generate_show_and_mark_paid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--days",
            "10",
            "--no-pdf",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Generated invoice"))
    .stdout(predicate::str::contains("€6,050.00"));

    assert!(config_path.join("state.toml").exists());

    run_in(&config_path, &["show", "1"])
        .success()
        .stdout(predicate::str::contains("Software development"))
        .stdout(predicate::str::contains("Subtotal: €5,000.00"))
        .stdout(predicate::str::contains("VAT:      €1,050.00"))
        .stdout(predicate::str::contains("Total:    €6,050.00"))
        .stdout(predicate::str::contains("UNPAID"));

    run_in(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("STATUS"))
        .stdout(predicate::str::contains("Outstanding: €6,050.00"));

    run_in(&config_path, &["mark-paid", "1"])
        .success()
        .stdout(predicate::str::contains("Marked invoice 1 as paid"));

    run_in(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("Outstanding: €0.00"));
}

#[test]
fn test_generate_days_from_timesheet_with_items() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    // 10.5 billable hours in the period, billed as exactly 1.3125 days
    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-14",
            "--item",
            "Hardware=200@0",
            "--no-pdf",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Days:    1.3125"))
    .stdout(predicate::str::contains("€994.06"));

    run_in(&config_path, &["show", "1"])
        .success()
        .stdout(predicate::str::contains("Hardware"))
        .stdout(predicate::str::contains("Subtotal: €856.25"))
        .stdout(predicate::str::contains("VAT:      €137.81"));
}

#[test]
fn test_generate_zero_vat_is_exempt() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--days",
            "2",
            "--vat-rate",
            "0",
            "--no-pdf",
        ],
    )
    .success();

    run_in(&config_path, &["show", "1"])
        .success()
        .stdout(predicate::str::contains("customer is VAT exempt"))
        .stdout(predicate::str::contains("Total:    €1,000.00"));
}

#[test]
fn test_generate_duplicate_number() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);
    let args = [
        "generate",
        "-p",
        "platform",
        "--start",
        "2024-01-01",
        "--end",
        "2024-01-31",
        "--days",
        "1",
        "--number",
        "7",
        "--no-pdf",
    ];

    run_in(&config_path, &args).success();
    run_in(&config_path, &args)
        .failure()
        .stderr(predicate::str::contains("Invoice number 7 is already in use"));
}

#[test]
fn test_generate_missing_project() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "nonexistent",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--no-pdf",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Project 'nonexistent' not found"));
}

#[test]
fn test_generate_invalid_item() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--item",
            "Hardware",
            "--no-pdf",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid item format"));
}

#[test]
fn test_generate_negative_days() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--days=-1",
            "--no-pdf",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Invalid amount for days"));

    assert!(!config_path.join("state.toml").exists());
}

#[test]
fn test_show_unknown_invoice() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(&config_path, &["show", "42"])
        .failure()
        .stderr(predicate::str::contains("Invoice 42 not found"));
}

#[test]
fn test_list_stored_invoices() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    fs::write(
        config_path.join("state.toml"),
        r#"[[invoices]]
number = 1
project = "platform"
date = "2026-01-10"
start = "2025-12-01"
end = "2025-12-31"
days = "2"
rate = "500"
vat_rate = "0.21"
paid = true
file = "invoice-2026-001.pdf"

[[invoices]]
number = 2
project = "platform"
date = "2026-02-10"
start = "2026-01-01"
end = "2026-01-31"
days = "1"
rate = "500"
vat_rate = "0.21"
file = "invoice-2026-002.pdf"

[[invoices.items]]
description = "Travel"
price = "100"
"#,
    )
    .unwrap();

    run_in(&config_path, &["list", "--limit", "1"])
        .success()
        .stdout(predicate::str::contains("2026-002"))
        .stdout(predicate::str::contains("2026-001").not())
        .stdout(predicate::str::contains("Outstanding: €726.00"));

    run_in(&config_path, &["mark-unpaid", "1"])
        .success()
        .stdout(predicate::str::contains("Marked invoice 1 as unpaid"));

    run_in(&config_path, &["list"])
        .success()
        .stdout(predicate::str::contains("Total: 2 invoices"))
        .stdout(predicate::str::contains("Outstanding: €1,936.00"));
}

#[test]
fn test_open_missing_pdf() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--days",
            "1",
            "--no-pdf",
        ],
    )
    .success();

    run_in(&config_path, &["open", "1"])
        .failure()
        .stderr(predicate::str::contains("PDF file not found"));
}

#[test]
fn test_open_uses_custom_output_path() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);
    let custom = temp_dir.path().join("custom").join("acme-january.pdf");

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--days",
            "1",
            "--output",
            custom.to_str().unwrap(),
            "--no-pdf",
        ],
    )
    .success()
    .stdout(predicate::str::contains("acme-january.pdf"));

    let state = fs::read_to_string(config_path.join("state.toml")).unwrap();
    assert!(state.contains("acme-january.pdf"));

    run_in(&config_path, &["open", "1"])
        .failure()
        .stderr(predicate::str::contains("PDF file not found"))
        .stderr(predicate::str::contains("acme-january.pdf"));
}

#[test]
fn test_credit_note() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "generate",
            "-p",
            "platform",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
            "--days",
            "4",
            "--vat-rate",
            "0.06",
            "--no-pdf",
        ],
    )
    .success();

    run_in(
        &config_path,
        &[
            "credit-note",
            "-p",
            "platform",
            "--invoice",
            "1",
            "--amount",
            "100",
            "--no-pdf",
        ],
    )
    .success()
    .stdout(predicate::str::contains("Generated credit note CN-"))
    .stdout(predicate::str::contains("€-6.00"))
    .stdout(predicate::str::contains("€-106.00"));

    run_in(&config_path, &["credit-notes"])
        .success()
        .stdout(predicate::str::contains("INVOICE"))
        .stdout(predicate::str::contains("CN-"))
        .stdout(predicate::str::contains("€-106.00"));
}

#[test]
fn test_credit_note_unknown_invoice() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(
        &config_path,
        &[
            "credit-note",
            "-p",
            "platform",
            "--invoice",
            "9",
            "--amount",
            "100",
            "--no-pdf",
        ],
    )
    .failure()
    .stderr(predicate::str::contains("Invoice 9 not found"));
}

#[test]
fn test_overview() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    run_in(&config_path, &["overview"])
        .success()
        .stdout(predicate::str::contains("platform"))
        .stdout(predicate::str::contains("2024"))
        .stdout(predicate::str::contains("12.5"))
        .stdout(predicate::str::contains("1.56"));
}

#[test]
fn test_import_without_token() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = setup(&temp_dir);

    invoicing_cmd()
        .env_remove("TOGGL_API_TOKEN")
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "import",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-31",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Toggl API token"));
}

#[test]
fn test_business_days() {
    invoicing_cmd()
        .args(["business-days", "--from", "2024-01-01", "--to", "2024-01-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10"));
}

#[test]
fn test_invalid_date_argument() {
    invoicing_cmd()
        .args(["business-days", "--from", "01/02/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected YYYY-MM-DD"));
}
