//! Library entry points over program files on disk

use crate::common::*;
use std::fs;
use tempfile::TempDir;
use yaoxiang_solve::util::config::SolverConfig;
use yaoxiang_solve::{
    solve_goals, solve_program_file, Guidance, ProgramError, ProgramFile, SolveFileError, Solution,
    Solver, SolverChoice,
};

fn answers(file: &ProgramFile) -> Vec<(String, Option<Solution>)> {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "program.ron", file);
    solve_program_file(&path, SolverChoice::default())
        .unwrap()
        .into_iter()
        .map(|report| (report.name, report.answer.unwrap()))
        .collect()
}

/// Every named goal gets a verdict, in file order
#[test]
fn test_solve_traits_file() {
    let answers = answers(&traits_file());
    let names: Vec<_> = answers.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        ["eq_i32", "eq_string", "eq_var", "hypothetical", "either", "not_foo_string"]
    );

    let verdict = |name: &str| {
        answers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, answer)| answer.clone())
            .unwrap()
    };
    assert!(verdict("eq_i32").unwrap().is_trivial_and_always_true());
    assert_eq!(verdict("eq_string"), None);
    // the only PartialEq impl forces ?0 = i32
    assert!(verdict("eq_var").unwrap().is_unique());
    assert!(verdict("hypothetical").unwrap().is_unique());
    assert!(verdict("either").unwrap().is_unique());
    assert!(verdict("not_foo_string").unwrap().is_unique());
}

/// Reports render as `name: verdict`
#[test]
fn test_report_display() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "program.ron", &traits_file());
    let reports = solve_program_file(&path, SolverChoice::default()).unwrap();
    assert!(reports[0].to_string().starts_with("eq_i32: Unique"));
    assert_eq!(reports[1].to_string(), "eq_string: No solution");
}

/// Depth limits from a config file surface as overflow
#[test]
fn test_config_limits_overflow() {
    let file = even_file();
    let config = SolverConfig::from_ron_str("(overflow_depth: 2)").unwrap();
    let solver = Solver::new(config.into_choice()).unwrap();
    let reports = solve_goals(&file, &solver);
    assert_eq!(
        reports[0].answer,
        Ok(Some(Solution::Ambig(Guidance::Overflow)))
    );

    let solver = Solver::new(SolverConfig::default().into_choice()).unwrap();
    assert!(solve_goals(&file, &solver)[0]
        .answer
        .as_ref()
        .unwrap()
        .as_ref()
        .unwrap()
        .is_unique());
}

/// Broken files are reported, not solved
#[test]
fn test_bad_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.ron");
    fs::write(&path, "(program: (clauses: [").unwrap();
    assert!(matches!(
        solve_program_file(&path, SolverChoice::default()),
        Err(SolveFileError::Program(ProgramError::Parse(_)))
    ));

    assert!(matches!(
        solve_program_file(&dir.path().join("absent.ron"), SolverChoice::default()),
        Err(SolveFileError::Program(ProgramError::Io { .. }))
    ));
}

/// A saved program file loads back equal
#[test]
fn test_program_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let file = traits_file();
    let path = write_file(&dir, "program.ron", &file);
    assert_eq!(ProgramFile::load(&path).unwrap(), file);
}
