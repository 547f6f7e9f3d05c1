pub mod driver;
pub mod model;

use std::time::{Duration, Instant};

use anyhow::Context;
use sched_core::{validate, SolveEnvelope, SolveParams, SolveResult, Solver};
use solver_csp::SearchConfig;

pub use driver::{optimize, Optimization};
pub use model::ProblemModel;

/// Exact makespan minimization: constraint search with forward checking,
/// repeated under a shrinking cost bound.
#[derive(Clone, Debug, Default)]
pub struct BnbSolver {
    search: SearchConfig,
}

impl BnbSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides variable ordering and inference. Budgets still come from
    /// the request parameters.
    pub fn with_search(search: SearchConfig) -> Self {
        Self { search }
    }

    fn config(&self, params: &SolveParams, start: Instant) -> SearchConfig {
        SearchConfig {
            max_steps: params.step_limit,
            deadline: params
                .time_limit_ms
                .map(|ms| start + Duration::from_millis(ms)),
            ..self.search.clone()
        }
    }
}

impl Solver for BnbSolver {
    fn solve(&self, env: &SolveEnvelope) -> anyhow::Result<SolveResult> {
        let start = Instant::now();
        validate(&env.instance)?;

        let model = ProblemModel::build(&env.instance);
        let config = self.config(&env.params, start);
        let out = optimize(&model, &config, env.params.optimize)
            .context("building the search problem")?;

        let assignments = out
            .values
            .as_deref()
            .map(|v| model.decode(v))
            .unwrap_or_default();

        Ok(SolveResult {
            status: out.status,
            cost: out.cost,
            assignments,
            stats: serde_json::json!({
                "method": "csp+bnb",
                "rounds": out.rounds,
                "steps": out.stats.steps,
                "backtracks": out.stats.backtracks,
                "pruned": out.stats.pruned,
                "elapsedMs": start.elapsed().as_millis() as u64,
            }),
        })
    }
}
