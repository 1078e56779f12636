//! Integration tests for the reqbundle CLI

use assert_cmd::Command;
use predicates::prelude::*;

const BUNDLE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data/regular-bundle.txt");

fn reqbundle() -> Command {
    Command::cargo_bin("reqbundle").unwrap()
}

#[test]
fn test_version() {
    reqbundle()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reqbundle"));
}

#[test]
fn test_help() {
    reqbundle()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Inspect distribution bundle requirement manifests",
        ));
}

#[test]
fn test_invalid_command() {
    reqbundle().arg("invalid").assert().failure();
}

#[test]
fn test_list_bundle() {
    reqbundle()
        .args(["list", BUNDLE])
        .assert()
        .success()
        .stdout(predicate::str::contains("jedi==0.18.*"))
        .stdout(predicate::str::contains("14 entries"));
}

#[test]
fn test_list_json() {
    reqbundle()
        .args(["list", BUNDLE, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"dbus-next\""))
        .stdout(predicate::str::contains("sys_platform == \\\"linux\\\""));
}

#[test]
fn test_check_bundle_ok() {
    reqbundle()
        .args(["check", BUNDLE])
        .assert()
        .success()
        .stdout(predicate::str::contains("consistent on all 3 targets"));
}

#[test]
fn test_resolve_linux() {
    reqbundle()
        .args(["resolve", BUNDLE, "--platform", "linux"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ptyprocess==0.7.*"))
        .stdout(predicate::str::contains("dbus-next==0.2.*"))
        .stdout(predicate::str::contains("adafruit_board_toolkit").not());
}

#[test]
fn test_resolve_win32() {
    reqbundle()
        .args(["resolve", BUNDLE, "--platform", "win32"])
        .assert()
        .success()
        .stdout(predicate::str::contains("adafruit_board_toolkit==1.1.*"))
        .stdout(predicate::str::contains("ptyprocess").not())
        .stdout(predicate::str::contains("dbus-next").not());
}

#[test]
fn test_resolve_json() {
    reqbundle()
        .args(["resolve", BUNDLE, "--platform", "win32", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"adafruit_board_toolkit\": \"1.1.*\""));
}

#[test]
fn test_resolve_unknown_platform() {
    reqbundle()
        .args(["resolve", BUNDLE, "--platform", "freebsd"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown platform 'freebsd'"));
}

#[test]
fn test_fmt_round_trips() {
    reqbundle()
        .args(["fmt", BUNDLE])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ptyprocess==0.7.*; sys_platform == \"linux\" or sys_platform == \"darwin\"",
        ))
        .stdout(predicate::str::contains("# BLE workflows need the system bus"));
}

#[test]
fn test_check_reports_syntax_error_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.txt");
    std::fs::write(&path, "jedi==0.18.*\nnot a requirement\n").unwrap();

    reqbundle()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_check_reports_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conflict.txt");
    std::fs::write(
        &path,
        "pyserial==3.5\npyserial==3.4; sys_platform == \"linux\"\n",
    )
    .unwrap();

    reqbundle()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("conflicting requirements for 'pyserial' on linux"));
}

#[test]
fn test_fmt_write_rewrites_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bundle.txt");
    std::fs::write(&path, "  jedi==0.18.*   # completion\n\n\npyserial==3.5\n").unwrap();

    reqbundle()
        .arg("fmt")
        .arg(&path)
        .arg("--write")
        .assert()
        .success();

    let rewritten = std::fs::read_to_string(&path).unwrap();
    assert_eq!(rewritten, "jedi==0.18.*  # completion\npyserial==3.5\n");
}
