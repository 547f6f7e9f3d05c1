use jobs::InMemJobs;
use solver_bnb::BnbSolver;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub jobs: Arc<InMemJobs<BnbSolver>>,
}

impl AppState {
    pub fn new_default() -> Self {
        Self {
            jobs: Arc::new(InMemJobs::new(BnbSolver::new())),
        }
    }
}
