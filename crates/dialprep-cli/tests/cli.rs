use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const HEADER: &str = "CompanyName,CanonicalEntryURL,Top_Number_1,Top_Type_1,Top_SourceURL_1,\
Top_Number_2,Top_Type_2,MainOffice_Number,MainOffice_Type,MainOffice_SourceURL,\
Company Phone,SuspectedOtherOrgNumbers,sales_pitch";

fn write_input(dir: &Path) -> PathBuf {
    let pitch = "\"Hallo, Ich rufe Sie an, weil wir bereits sehr erfolgreich ein \
ähnliches Projekt umgesetzt haben XYZ 42 Leads generiert. Für dieses Projekt\"";
    let rows = [
        format!(
            "Acme GmbH,acme.de,+49 30 1234567,Main Office,https://acme.de/impressum,,,,,,,,{pitch}"
        ),
        "acme  gmbh,https://www.acme.de/,,,,,,,,,,,".to_string(),
        "Beta AG,beta.ch,+49 30 5556677,Fax,,,,+41 44 1112233,Zentrale,https://beta.ch/kontakt,,,"
            .to_string(),
        "Gamma KG,gamma.at,069 7654321,,,,,,,,,,".to_string(),
    ];
    let path = dir.join("leads.csv");
    fs::write(&path, format!("{HEADER}\n{}\n", rows.join("\n"))).expect("write input");
    path
}

fn run_cmd(args: &[&str]) -> String {
    let output = cargo_bin_cmd!("dialprep")
        .args(args)
        .output()
        .expect("run command");
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).expect("utf8")
}

fn run_cmd_json(args: &[&str]) -> Value {
    let output = cargo_bin_cmd!("dialprep")
        .arg("--json")
        .args(args)
        .output()
        .expect("run command");
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("parse json")
}

#[test]
fn prepare_resolves_dedupes_and_writes_outputs() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path());

    let stdout = run_cmd(&["prepare", "--input", input.to_str().expect("path")]);
    assert!(stdout.contains("kept 3 of 4 rows"));

    let kept = fs::read_to_string(temp.path().join("leads_prepared.csv")).expect("kept file");
    let header_line = kept.lines().next().expect("header");
    assert!(header_line.starts_with('\u{FEFF}'));
    assert!(header_line.contains("CompanyName"));
    assert!(header_line.contains("resolved_number"));
    assert!(header_line.contains("excerpt_count"));
    // first-call numbers are text-protected
    assert!(kept.contains("'+49301234567"));
    assert!(kept.contains("'+41441112233"));
    // the fax-typed Top 1 number never shows up as a resolved number
    assert!(!kept.contains("'+49305556677"));
    // the unreachable row is retained by default
    assert!(kept.contains("Gamma KG"));
    // excerpt fields populated from the pitch
    assert!(kept.contains("XYZ 42 Leads generiert."));

    let removed =
        fs::read_to_string(temp.path().join("leads_prepared_removed.csv")).expect("removed file");
    assert!(removed.lines().next().expect("header").contains("removal_reason"));
    assert!(removed.contains("acme  gmbh"));
    assert!(removed.contains("DuplicateOf:0"));
}

#[test]
fn prepare_summary_reports_counts() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path());

    let summary = run_cmd_json(&["prepare", "--input", input.to_str().expect("path")]);
    assert_eq!(summary["input_rows"], 4);
    assert_eq!(summary["kept_rows"], 3);
    assert_eq!(summary["removed_duplicate"], 1);
    assert_eq!(summary["removed_non_dach_or_invalid"], 0);

    let on_disk: Value = serde_json::from_str(
        &fs::read_to_string(temp.path().join("leads_prepared_summary.json")).expect("summary"),
    )
    .expect("parse summary");
    assert_eq!(on_disk, summary);
}

#[test]
fn prepare_drop_unreachable_moves_rows_to_removed() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path());

    let summary = run_cmd_json(&[
        "prepare",
        "--input",
        input.to_str().expect("path"),
        "--drop-unreachable",
    ]);
    assert_eq!(summary["kept_rows"], 2);
    assert_eq!(summary["removed_non_dach_or_invalid"], 1);

    let kept = fs::read_to_string(temp.path().join("leads_prepared.csv")).expect("kept file");
    assert!(!kept.contains("Gamma KG"));
    let removed =
        fs::read_to_string(temp.path().join("leads_prepared_removed.csv")).expect("removed file");
    assert!(removed.contains("Gamma KG"));
    assert!(removed.contains("NonDachOrInvalid"));
}

#[test]
fn prepare_is_byte_identical_across_runs() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path());

    run_cmd(&["prepare", "--input", input.to_str().expect("path")]);
    let first_kept = fs::read(temp.path().join("leads_prepared.csv")).expect("kept");
    let first_removed = fs::read(temp.path().join("leads_prepared_removed.csv")).expect("removed");

    run_cmd(&["prepare", "--input", input.to_str().expect("path")]);
    assert_eq!(fs::read(temp.path().join("leads_prepared.csv")).expect("kept"), first_kept);
    assert_eq!(
        fs::read(temp.path().join("leads_prepared_removed.csv")).expect("removed"),
        first_removed
    );
}

#[test]
fn excerpt_appends_text_and_count() {
    let temp = TempDir::new().expect("temp dir");
    let input = write_input(temp.path());

    let summary = run_cmd_json(&["excerpt", "--input", input.to_str().expect("path")]);
    assert_eq!(summary["input_rows"], 4);
    assert_eq!(summary["kept_rows"], 4);
    assert_eq!(summary["rows_with_excerpt"], 1);
    assert_eq!(summary["rows_with_count"], 1);

    let output = fs::read_to_string(temp.path().join("leads_excerpts.csv")).expect("output");
    assert!(output.lines().next().expect("header").contains("excerpt_text"));
    assert!(output.contains("XYZ 42 Leads generiert.,42"));
    assert!(!temp.path().join("leads_excerpts_removed.csv").exists());
}

#[test]
fn missing_required_column_exits_with_invalid_input() {
    let temp = TempDir::new().expect("temp dir");
    let input = temp.path().join("bad.csv");
    fs::write(&input, "Foo,Bar\n1,2\n").expect("write input");

    let output = cargo_bin_cmd!("dialprep")
        .args(["prepare", "--input", input.to_str().expect("path")])
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("CompanyName"));
    assert!(!temp.path().join("bad_prepared.csv").exists());
}

#[test]
fn missing_input_file_exits_not_found() {
    let output = cargo_bin_cmd!("dialprep")
        .args(["prepare", "--input", "/nonexistent/leads.csv"])
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(2));
}
