use parking_lot::RwLock;
use sched_core::{SolveEnvelope, SolveResult, SolveStatus, Solver};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    /// A schedule was produced, optimal or not.
    Solved { result: SolveResult },
    Infeasible { result: SolveResult },
    Overtime { result: SolveResult },
    Failed { message: String },
}

impl JobStatus {
    fn finished(result: SolveResult) -> Self {
        match result.status {
            SolveStatus::Optimal | SolveStatus::Feasible => JobStatus::Solved { result },
            SolveStatus::Infeasible => JobStatus::Infeasible { result },
            SolveStatus::Overtime => JobStatus::Overtime { result },
        }
    }

    pub fn result(&self) -> Option<&SolveResult> {
        match self {
            JobStatus::Solved { result }
            | JobStatus::Infeasible { result }
            | JobStatus::Overtime { result } => Some(result),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Queued | JobStatus::Running)
    }
}

/// Finished jobs kept by [`InMemJobs::new`] before the oldest are dropped.
pub const DEFAULT_RETAINED: usize = 1024;

#[derive(Default)]
struct Registry {
    statuses: HashMap<String, JobStatus>,
    /// Finished job ids, oldest first.
    finished: VecDeque<String>,
}

impl Registry {
    fn finish(&mut self, id: String, status: JobStatus, retained: usize) {
        self.statuses.insert(id.clone(), status);
        self.finished.push_back(id);
        while self.finished.len() > retained {
            if let Some(old) = self.finished.pop_front() {
                self.statuses.remove(&old);
            }
        }
    }
}

/// Job registry backed by a map; solves run on the blocking thread pool.
/// Only the most recent `retained` finished jobs are kept.
#[derive(Clone)]
pub struct InMemJobs<S: Solver> {
    inner: Arc<RwLock<Registry>>,
    solver: Arc<S>,
    retained: usize,
}

impl<S: Solver> InMemJobs<S> {
    pub fn new(solver: S) -> Self {
        Self::with_retained(solver, DEFAULT_RETAINED)
    }

    pub fn with_retained(solver: S, retained: usize) -> Self {
        Self {
            inner: Default::default(),
            solver: Arc::new(solver),
            retained,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn enqueue(&self, env: SolveEnvelope) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner
            .write()
            .statuses
            .insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let solver = self.solver.clone();
        let retained = self.retained;
        let id_for_task = id.clone();

        tokio::task::spawn_blocking(move || {
            map.write()
                .statuses
                .insert(id_for_task.clone(), JobStatus::Running);
            let status = match solver.solve(&env) {
                Ok(res) => {
                    info!(job = %id_for_task, status = ?res.status, cost = ?res.cost, "job finished");
                    JobStatus::finished(res)
                }
                Err(e) => {
                    error!(job = %id_for_task, ?e, "job failed");
                    JobStatus::Failed {
                        message: format!("{e:#}"),
                    }
                }
            };
            map.write().finish(id_for_task, status, retained);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().statuses.get(id).cloned()
    }
}
