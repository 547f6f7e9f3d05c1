//! Command-line front end: reads the five-line text format, prints the
//! schedule one session per line (or `None`).

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sched_core::{load, render_solution, SolveEnvelope, SolveParams, SolveResult, Solver};
use solver_bnb::BnbSolver;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "unitable")]
#[command(about = "Weekly course timetabling with makespan minimization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an instance and print the schedule.
    Solve {
        /// Instance file, `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
        /// Stop at the first schedule found
        #[arg(long)]
        no_optimize: bool,
        /// Value trials per search round
        #[arg(long, env = "UNITABLE_STEP_LIMIT")]
        step_limit: Option<u64>,
        /// Wall-clock limit for the whole solve
        #[arg(long, env = "UNITABLE_TIME_LIMIT_MS")]
        time_limit_ms: Option<u64>,
    },

    /// Check an instance for format and structural errors.
    Validate {
        #[arg(default_value = "-")]
        input: PathBuf,
    },

    /// Print the JSON schema of a solve request.
    Schema,
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    }
}

fn solve(text: &str, params: SolveParams) -> Result<SolveResult> {
    let instance = load(text)?;
    BnbSolver::new().solve(&SolveEnvelope { instance, params })
}

fn render(res: &SolveResult, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(res)?;
        out.push('\n');
        return Ok(out);
    }
    let schedule = res.status.has_schedule().then_some(res.assignments.as_slice());
    let mut out = render_solution(schedule);
    if schedule.is_none() {
        out.push('\n');
    }
    Ok(out)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Solve {
            input,
            output,
            json,
            no_optimize,
            step_limit,
            time_limit_ms,
        } => {
            let text = read_input(&input)?;
            let params = SolveParams {
                optimize: !no_optimize,
                step_limit,
                time_limit_ms,
            };
            let res = solve(&text, params)?;
            info!(status = ?res.status, cost = ?res.cost, stats = %res.stats, "solved");
            if res.status == types::SolveStatus::Overtime {
                warn!("budget exhausted before any schedule was found");
            }

            let out = render(&res, json)?;
            match output {
                Some(path) => std::fs::write(&path, out)
                    .with_context(|| format!("writing {}", path.display()))?,
                None => print!("{out}"),
            }
        }

        Commands::Validate { input } => {
            let inst = load(&read_input(&input)?)?;
            println!(
                "ok: {} timeslots, {} rooms, {} classes, {} sessions, {} associations",
                inst.timeslots.len(),
                inst.rooms.len(),
                inst.classes.len(),
                inst.sessions.len(),
                inst.associations.len()
            );
        }

        Commands::Schema => {
            let schema = schemars::schema_for!(SolveEnvelope);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_solve_flags() {
        let cli = Cli::try_parse_from([
            "unitable",
            "solve",
            "week.txt",
            "--no-optimize",
            "--step-limit",
            "500",
        ])
        .unwrap();
        let Commands::Solve {
            input,
            no_optimize,
            step_limit,
            json,
            ..
        } = cli.command
        else {
            panic!("expected solve");
        };
        assert_eq!(input, PathBuf::from("week.txt"));
        assert!(no_optimize);
        assert!(!json);
        assert_eq!(step_limit, Some(500));
    }

    #[test]
    fn text_round_trip_through_the_solver() {
        let res = solve(
            "T Mon,9 Tue,9\nR R1\nS C1\nW Math,L,1 Math,L,2\nA C1,Math\n",
            SolveParams::default(),
        )
        .unwrap();
        assert_eq!(
            render(&res, false).unwrap(),
            "Math,L,1 Mon,9 R1\nMath,L,2 Tue,9 R1\n"
        );
        let json: serde_json::Value = serde_json::from_str(&render(&res, true).unwrap()).unwrap();
        assert_eq!(json["status"], "optimal");
        assert_eq!(json["cost"], 9);
    }

    #[test]
    fn infeasible_prints_none() {
        let res = solve(
            "T Mon,9\nR R1\nS C1\nW Math,L,1 Phys,L,1\nA C1,Math C1,Phys\n",
            SolveParams::default(),
        )
        .unwrap();
        assert_eq!(render(&res, false).unwrap(), "None\n");
    }

    #[test]
    fn load_errors_surface() {
        let err = solve("T Mon,9\n", SolveParams::default()).unwrap_err();
        assert!(err.to_string().contains("expected 5 lines"));
    }
}
