//! YaoXiang Solve - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use yaoxiang_solve::util::config::SolverConfig;
use yaoxiang_solve::util::logger::{self, LogLevel};
use yaoxiang_solve::{solve_goals, GoalReport, ProgramFile, Solution, Solver, NAME, VERSION};

/// Recursive trait solver over RON program files
#[derive(Parser, Debug)]
#[command(name = "yaoxiang-solve")]
#[command(author = "YaoXiang Team")]
#[command(version = VERSION)]
#[command(about = NAME, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Solve every goal of a program file
    Solve {
        /// Program file (RON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print answers as JSON
        #[arg(long)]
        json: bool,

        /// Maximum number of goals on the solver stack
        #[arg(long, value_name = "N")]
        overflow_depth: Option<usize>,

        /// Maximum type size of a subgoal
        #[arg(long, value_name = "N")]
        max_size: Option<usize>,

        /// Disable the answer cache
        #[arg(long)]
        no_cache: bool,

        /// Config file (defaults to ./yaoxiang-solve.ron if present)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Load and validate a program file without solving
    Check {
        /// Program file (RON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print version information
    Version,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_with_level(LogLevel::from_verbosity(args.verbose));

    match args.command {
        Commands::Solve {
            file,
            json,
            overflow_depth,
            max_size,
            no_cache,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(depth) = overflow_depth {
                config.overflow_depth = depth;
            }
            if let Some(size) = max_size {
                config.max_size = size;
            }
            if no_cache {
                config.caching = false;
            }

            let program = load_program(&file)?;
            let solver = Solver::new(config.into_choice()).context("Invalid solver configuration")?;
            let reports = solve_goals(&program, &solver);
            if json {
                print_json(&reports)?;
            } else {
                for report in &reports {
                    print_report(report);
                }
            }
        }
        Commands::Check { file } => {
            let program = load_program(&file)?;
            eprintln!(
                "{} {} clauses, {} goals",
                "ok:".green().bold(),
                program.program.clauses.len(),
                program.goals.len()
            );
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SolverConfig> {
    let config = match path {
        Some(path) => SolverConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => SolverConfig::discover().context("Failed to load config")?,
    };
    config
        .with_env_overrides()
        .context("Invalid environment override")
}

fn load_program(path: &Path) -> Result<ProgramFile> {
    ProgramFile::load(path).with_context(|| format!("Failed to load program: {}", path.display()))
}

fn print_report(report: &GoalReport) {
    let name = report.name.bold();
    match &report.answer {
        Ok(Some(solution @ Solution::Unique(_))) => println!("{}: {}", name, solution.green()),
        Ok(Some(solution)) => println!("{}: {}", name, solution.yellow()),
        Ok(None) => println!("{}: {}", name, "No solution".red()),
        Err(err) => println!("{}: {} {}", name, "error:".red().bold(), err),
    }
}

fn print_json(reports: &[GoalReport]) -> Result<()> {
    let entries: Vec<_> = reports
        .iter()
        .map(|report| {
            let (verdict, solution, error) = match &report.answer {
                Ok(Some(solution)) => {
                    let verdict = if solution.is_unique() { "unique" } else { "ambiguous" };
                    (verdict, Some(solution.to_string()), None)
                }
                Ok(None) => ("no_solution", None, None),
                Err(err) => ("error", None, Some(err.to_string())),
            };
            serde_json::json!({
                "name": report.name,
                "goal": report.goal,
                "verdict": verdict,
                "solution": solution,
                "error": error,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}
