//! Branch-and-bound over the makespan.
//!
//! One unbounded search finds any schedule, then each further round asks for
//! a schedule strictly cheaper than the best so far. The first round that
//! comes back unsatisfiable proves the incumbent optimal.

use sched_core::CostBound;
use solver_csp::{CspError, Outcome, SearchConfig, SearchStats};
use tracing::{info, warn};
use types::SolveStatus;

use crate::model::ProblemModel;

#[derive(Debug)]
enum Phase {
    Search,
    Tighten { best: Vec<usize>, cost: u32 },
    Done(Optimization),
}

/// Final state of an optimization run.
#[derive(Clone, Debug)]
pub struct Optimization {
    pub status: SolveStatus,
    /// Solver values of the incumbent, present iff the status carries one.
    pub values: Option<Vec<usize>>,
    pub cost: Option<u32>,
    pub rounds: u32,
    pub stats: SearchStats,
}

struct Run<'m, 'a> {
    model: &'m ProblemModel<'a>,
    config: &'m SearchConfig,
    rounds: u32,
    stats: SearchStats,
}

impl Run<'_, '_> {
    fn round(&mut self, bound: CostBound) -> Result<Outcome<usize>, CspError> {
        self.rounds += 1;
        let report = self.model.csp(bound)?.solve(self.config);
        self.stats.steps += report.stats.steps;
        self.stats.backtracks += report.stats.backtracks;
        self.stats.pruned += report.stats.pruned;
        info!(
            round = self.rounds,
            ?bound,
            steps = report.stats.steps,
            outcome = outcome_name(&report.outcome),
            "round finished"
        );
        Ok(report.outcome)
    }

    fn done(&self, status: SolveStatus, values: Option<Vec<usize>>) -> Phase {
        let cost = values.as_deref().and_then(|v| self.model.cost(v));
        Phase::Done(Optimization {
            status,
            values,
            cost,
            rounds: self.rounds,
            stats: self.stats,
        })
    }
}

/// Runs SEARCH, then TIGHTEN until the bound becomes unsatisfiable or the
/// budget in `config` runs out. With `optimize` off the first schedule found
/// is returned as feasible.
pub fn optimize(
    model: &ProblemModel<'_>,
    config: &SearchConfig,
    optimize: bool,
) -> Result<Optimization, CspError> {
    let mut run = Run {
        model,
        config,
        rounds: 0,
        stats: SearchStats::default(),
    };
    let mut phase = Phase::Search;

    loop {
        phase = match phase {
            Phase::Search => match run.round(CostBound::Unbounded)? {
                Outcome::Unsatisfiable => run.done(SolveStatus::Infeasible, None),
                Outcome::Overtime => run.done(SolveStatus::Overtime, None),
                Outcome::Solved(values) => match model.cost(&values) {
                    // nothing scheduled, nothing to improve
                    None => run.done(SolveStatus::Optimal, Some(values)),
                    Some(_) if !optimize => run.done(SolveStatus::Feasible, Some(values)),
                    Some(cost) => Phase::Tighten { best: values, cost },
                },
            },
            Phase::Tighten { best, cost } => match CostBound::below(cost) {
                None => run.done(SolveStatus::Optimal, Some(best)),
                Some(bound) => match run.round(bound)? {
                    Outcome::Unsatisfiable => run.done(SolveStatus::Optimal, Some(best)),
                    Outcome::Overtime => run.done(SolveStatus::Feasible, Some(best)),
                    Outcome::Solved(values) => match model.cost(&values) {
                        Some(next) if next < cost => Phase::Tighten {
                            best: values,
                            cost: next,
                        },
                        other => {
                            warn!(cost, ?other, "bounded round did not improve, stopping");
                            run.done(SolveStatus::Feasible, Some(best))
                        }
                    },
                },
            },
            Phase::Done(result) => {
                info!(
                    status = ?result.status,
                    cost = ?result.cost,
                    rounds = result.rounds,
                    "optimization finished"
                );
                return Ok(result);
            }
        };
    }
}

fn outcome_name<V>(outcome: &Outcome<V>) -> &'static str {
    match outcome {
        Outcome::Solved(_) => "solved",
        Outcome::Unsatisfiable => "unsatisfiable",
        Outcome::Overtime => "overtime",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{Association, Day, Instance, Session, TimeSlot};

    fn two_lectures(timeslots: Vec<TimeSlot>) -> Instance {
        Instance {
            timeslots,
            rooms: vec!["R1".into()],
            classes: vec!["C1".into()],
            sessions: vec![Session::new("Math", "L", "1"), Session::new("Math", "L", "2")],
            associations: vec![Association::new("C1", "Math")],
        }
    }

    #[test]
    fn tightens_until_unsatisfiable() {
        let inst = two_lectures(vec![
            TimeSlot::new(Day::Tue, 8),
            TimeSlot::new(Day::Mon, 9),
            TimeSlot::new(Day::Wed, 10),
        ]);
        let model = ProblemModel::build(&inst);
        let out = optimize(&model, &SearchConfig::default(), true).unwrap();
        assert_eq!(out.status, SolveStatus::Optimal);
        assert_eq!(out.cost, Some(9));
        // search (10), tighten to 9 (9), tighten to 8 (unsat)
        assert_eq!(out.rounds, 3);
    }

    #[test]
    fn without_optimization_first_schedule_is_feasible() {
        let inst = two_lectures(vec![TimeSlot::new(Day::Mon, 9), TimeSlot::new(Day::Tue, 9)]);
        let model = ProblemModel::build(&inst);
        let out = optimize(&model, &SearchConfig::default(), false).unwrap();
        assert_eq!(out.status, SolveStatus::Feasible);
        assert_eq!(out.rounds, 1);
        assert!(out.values.is_some());
    }

    #[test]
    fn infeasible_search_carries_no_schedule() {
        let inst = two_lectures(vec![TimeSlot::new(Day::Mon, 9), TimeSlot::new(Day::Mon, 10)]);
        let model = ProblemModel::build(&inst);
        let out = optimize(&model, &SearchConfig::default(), true).unwrap();
        assert_eq!(out.status, SolveStatus::Infeasible);
        assert!(out.values.is_none());
        assert_eq!(out.cost, None);
    }

    #[test]
    fn hour_zero_cannot_be_tightened() {
        let inst = two_lectures(vec![TimeSlot::new(Day::Mon, 0), TimeSlot::new(Day::Tue, 0)]);
        let model = ProblemModel::build(&inst);
        let out = optimize(&model, &SearchConfig::default(), true).unwrap();
        assert_eq!(out.status, SolveStatus::Optimal);
        assert_eq!(out.cost, Some(0));
        assert_eq!(out.rounds, 1);
    }
}
