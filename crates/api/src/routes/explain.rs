use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sched_core::scoring;
use types::{Assignment, Instance, Violation};

#[derive(Deserialize, ToSchema)]
pub struct ExplainIn {
    pub instance: Instance,
    pub assignments: Vec<Assignment>,
}

#[derive(Serialize, ToSchema)]
pub struct ExplainOut {
    /// Latest hour used, absent for an empty schedule.
    pub cost: Option<u32>,
    pub valid: bool,
    pub violations: Vec<Violation>,
}

#[utoipa::path(
    post,
    path = "/v1/explain",
    request_body = ExplainIn,
    responses((status = 200, description = "Cost and hard-constraint violations of a schedule", body = ExplainOut))
)]
pub async fn explain(Json(input): Json<ExplainIn>) -> Json<ExplainOut> {
    let report = scoring::explain(&input.instance, &input.assignments);
    Json(ExplainOut {
        cost: report.cost,
        valid: report.is_valid(),
        violations: report.violations,
    })
}
