use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn vama(work_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vama").unwrap();
    cmd.current_dir(work_dir)
        .env_remove("VAMA_EXTRACTOR")
        .env_remove("RUST_LOG");
    cmd
}

/// Writes an executable script that prints `stdout` and exits with `code`.
#[cfg(unix)]
fn fake_extractor(dir: &Path, stdout: &str, code: i32) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let json_path = dir.join("extractor-output.json");
    fs::write(&json_path, stdout).unwrap();

    let script = dir.join("fake-extractor.sh");
    fs::write(
        &script,
        format!(
            "#!/bin/sh\ncat '{}'\nexit {}\n",
            json_path.display(),
            code
        ),
    )
    .unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    script
}

fn declaration_folder(root: &Path, name: &str) -> PathBuf {
    let folder = root.join(name);
    fs::create_dir(&folder).unwrap();
    fs::write(folder.join("dvi-1.pdf"), b"%PDF-1.4").unwrap();
    folder
}

const BATCH: &str = r#"[
  {"file": "dvi-1.pdf", "nrDestinatar": "RO123", "mrn": "24ROCT1900001", "nrArticole": "2",
   "nrContainer": "MSKU7", "referintaDocument": "ROCT1900 / 05.03.2024"},
  {"file": "scan.pdf", "error": "no text layer"}
]"#;

#[cfg(unix)]
#[test]
fn writes_csv_and_reports_skipped_files() {
    let temp_dir = TempDir::new().unwrap();
    let folder = declaration_folder(temp_dir.path(), "martie");
    let extractor = fake_extractor(temp_dir.path(), BATCH, 0);

    vama(temp_dir.path())
        .arg(&folder)
        .arg("--extractor")
        .arg(&extractor)
        .arg("--output-format")
        .arg("plain")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Parsed successfully: dvi-1.pdf"))
        .stderr(predicate::str::contains("Failed to parse: scan.pdf → no text layer"))
        .stdout(predicate::str::contains("Rows: 4"));

    let content = fs::read_to_string(folder.join("output.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[1].contains("\"MRN 24ROCT1900001 - CONTAINERMSKU7\""));
    assert!(lines[4].contains("\"CT - ROCT1900 / 05.03.2024\""));
}

#[cfg(unix)]
#[test]
fn extractor_failure_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let folder = declaration_folder(temp_dir.path(), "martie");
    let extractor = fake_extractor(temp_dir.path(), "boom", 1);

    vama(temp_dir.path())
        .arg(&folder)
        .env("VAMA_EXTRACTOR", &extractor)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("boom"));

    assert!(!folder.join("output.csv").exists());
}

#[cfg(unix)]
#[test]
fn malformed_output_has_its_own_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    let folder = declaration_folder(temp_dir.path(), "martie");
    let extractor = fake_extractor(temp_dir.path(), "{}", 0);

    vama(temp_dir.path())
        .arg(&folder)
        .arg("--extractor")
        .arg(&extractor)
        .assert()
        .code(4);

    assert!(!folder.join("output.csv").exists());
}

#[cfg(unix)]
#[test]
fn detects_fara_fizic_from_folder_name() {
    let temp_dir = TempDir::new().unwrap();
    let folder = declaration_folder(temp_dir.path(), "martie-fara-fizic");
    let extractor = fake_extractor(temp_dir.path(), BATCH, 0);

    vama(temp_dir.path())
        .arg(&folder)
        .arg("--extractor")
        .arg(&extractor)
        .arg("--output-name")
        .arg("martie.csv")
        .arg("-q")
        .assert()
        .code(2);

    let content = fs::read_to_string(folder.join("martie.csv")).unwrap();
    assert!(content.starts_with("\"nr.crt\",\"CIF/CNP\",\"gestiune\""));
    assert!(!content.contains("PHYSICAL CONTROL"));
}

#[test]
fn missing_folder_is_invalid_path() {
    let temp_dir = TempDir::new().unwrap();

    vama(temp_dir.path())
        .arg(temp_dir.path().join("does-not-exist"))
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Invalid folder"));
}

#[test]
fn generate_config_writes_sample() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("vama.toml");

    vama(temp_dir.path())
        .arg("--generate-config")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated sample configuration file"));

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[template.prices]"));
}

#[test]
fn dry_run_never_calls_extractor() {
    let temp_dir = TempDir::new().unwrap();
    let folder = declaration_folder(temp_dir.path(), "martie");

    vama(temp_dir.path())
        .arg(&folder)
        .arg("--extractor")
        .arg(temp_dir.path().join("no-such-extractor"))
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("PDF files: 1"))
        .stdout(predicate::str::contains("output.csv"));

    assert!(!folder.join("output.csv").exists());
}

#[test]
fn config_file_in_working_directory_is_picked_up() {
    let temp_dir = TempDir::new().unwrap();
    let folder = declaration_folder(temp_dir.path(), "martie");
    fs::write(
        temp_dir.path().join("vama.toml"),
        "[extractor]\nprogram = \"/opt/custom-extractor\"\n\n\
         [output]\nfile_name = \"din-config.csv\"\natomic_write = true\n\n\
         [template]\nvariant = \"cu-fizic\"\ncurrency = \"eur\"\nunit = \"BUC\"\n\
         series_label = \"nu e cazul\"\ndefault_vat_rate = \"0\"\ncommission_rate = \"0.025\"\n\
         default_location_tag = \"CT\"\n\n\
         [template.prices]\nprimary = \"50\"\ntransit = \"75\"\nadditional_hs_code = \"5\"\n\
         physical_control = \"22\"\n",
    )
    .unwrap();

    vama(temp_dir.path())
        .arg(&folder)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("/opt/custom-extractor"))
        .stdout(predicate::str::contains("din-config.csv"));
}
