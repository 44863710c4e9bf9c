//! Integration tests for the `yaoxiang-solve` binary

use crate::common::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn yaoxiang_solve() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_yaoxiang-solve"));
    command
        .env_remove("YXSOLVE_OVERFLOW_DEPTH")
        .env_remove("YXSOLVE_MAX_SIZE")
        .env_remove("YXSOLVE_NO_CACHE");
    command
}

#[test]
fn test_solve_prints_verdicts() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "traits.ron", &traits_file());

    let output = yaoxiang_solve()
        .current_dir(dir.path())
        .arg("solve")
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 6);
    assert!(stdout.contains("eq_i32"));
    assert!(stdout.contains("No solution"));
}

#[test]
fn test_solve_json() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "traits.ron", &traits_file());

    let output = yaoxiang_solve()
        .current_dir(dir.path())
        .args(["solve", "--json"])
        .arg(&path)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0]["name"], "eq_i32");
    assert_eq!(entries[0]["verdict"], "unique");
    assert_eq!(entries[1]["verdict"], "no_solution");
    assert!(entries[1]["solution"].is_null());
}

#[test]
fn test_solve_overflow_flag_and_config() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "even.ron", &even_file());

    let output = yaoxiang_solve()
        .current_dir(dir.path())
        .args(["solve", "--json", "--overflow-depth", "1"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["verdict"], "ambiguous");
    assert_eq!(json[0]["solution"], "Ambiguous; overflow");

    // discovered from the working directory
    fs::write(dir.path().join("yaoxiang-solve.ron"), "(overflow_depth: 1)").unwrap();
    let output = yaoxiang_solve()
        .current_dir(dir.path())
        .args(["solve", "--json"])
        .arg(&path)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["solution"], "Ambiguous; overflow");

    // flags win over the file
    let output = yaoxiang_solve()
        .current_dir(dir.path())
        .args(["solve", "--json", "--overflow-depth", "50"])
        .arg(&path)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["verdict"], "unique");
}

#[test]
fn test_invalid_env_override() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "even.ron", &even_file());

    let output = yaoxiang_solve()
        .current_dir(dir.path())
        .env("YXSOLVE_MAX_SIZE", "0")
        .arg("solve")
        .arg(&path)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("max_size"));
}

#[test]
fn test_check() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "traits.ron", &traits_file());

    let output = yaoxiang_solve().arg("check").arg(&path).output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("3 clauses, 6 goals"));

    let broken = dir.path().join("broken.ron");
    fs::write(&broken, "not a program").unwrap();
    let output = yaoxiang_solve().arg("check").arg(&broken).output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn test_version() {
    let output = yaoxiang_solve().arg("version").output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
