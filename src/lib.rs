//! YaoXiang Solve
//!
//! A recursive trait solver: decides logic goals (`i32: Eq`,
//! `forall<T> { if (T: Foo) { Vec<T>: Foo } }`, ...) against a set of
//! program clauses, with cycle detection, fixed-point iteration and an
//! answer cache.
//!
//! # Example
//!
//! ```no_run
//! use yaoxiang_solve::{solve_program_file, SolverChoice};
//! use std::path::Path;
//!
//! let reports = solve_program_file(Path::new("traits.ron"), SolverChoice::default()).unwrap();
//! for report in reports {
//!     println!("{}", report);
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod infer;
pub mod ir;
pub mod program;
pub mod solve;

// Utility modules
pub mod util;

// Re-exports
pub use program::{NamedGoal, Program, ProgramError, ProgramFile};
pub use solve::{
    Database, DatabaseError, Guidance, OverflowPolicy, QueryAnswer, Solution, Solver, SolverChoice,
    SolverError,
};

use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "YaoXiang Solve (爻象)";

/// Outcome of one named goal of a program file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalReport {
    pub name: String,
    /// Canonical form of the goal that was solved
    pub goal: String,
    /// `Ok(None)` means the goal was refuted
    pub answer: Result<Option<Solution>, SolverError>,
}

impl fmt::Display for GoalReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.answer {
            Ok(Some(solution)) => write!(f, "{}: {}", self.name, solution),
            Ok(None) => write!(f, "{}: No solution", self.name),
            Err(err) => write!(f, "{}: error: {}", self.name, err),
        }
    }
}

/// Errors from [`solve_program_file`]
#[derive(Debug, thiserror::Error)]
pub enum SolveFileError {
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Solve every goal of a loaded program file, in parallel.
///
/// Reports come back in the order the goals are listed.
pub fn solve_goals(
    file: &ProgramFile,
    solver: &Solver,
) -> Vec<GoalReport> {
    let queries: Vec<_> = file.goals.iter().map(NamedGoal::to_query).collect();
    let goals: Vec<_> = queries.iter().map(|query| query.goal.clone()).collect();
    debug!(goals = goals.len(), "solving program goals");

    let answers = solver.solve_batch(&file.program, &goals);
    file.goals
        .iter()
        .zip(goals)
        .zip(answers)
        .map(|((named, goal), answer)| GoalReport {
            name: named.name.clone(),
            goal: goal.to_string(),
            answer,
        })
        .collect()
}

/// Load a RON program file and solve its goals with a fresh solver.
pub fn solve_program_file(
    path: &Path,
    choice: SolverChoice,
) -> Result<Vec<GoalReport>, SolveFileError> {
    let file = ProgramFile::load(path)?;
    let solver = Solver::new(choice)?;
    let reports = solve_goals(&file, &solver);
    let stats = solver.cache_stats();
    info!(
        goals = reports.len(),
        cache_entries = stats.entries,
        cache_hits = stats.hits,
        "solved {}",
        path.display()
    );
    Ok(reports)
}
