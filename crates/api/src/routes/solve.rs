use crate::{error::ApiError, state::AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use types::{SolveEnvelope, SolveParams};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCreated {
    pub job_id: String,
    pub status: &'static str,
}

impl From<jobs::JobId> for JobCreated {
    fn from(id: jobs::JobId) -> Self {
        Self {
            job_id: id.0,
            status: "queued",
        }
    }
}

#[utoipa::path(
    post,
    path = "/v1/solve",
    request_body = SolveEnvelope,
    responses((status = 200, description = "Job enqueued", body = JobCreated))
)]
pub async fn solve(
    State(state): State<AppState>,
    Json(env): Json<SolveEnvelope>,
) -> Json<JobCreated> {
    Json(state.jobs.enqueue(env).into())
}

/// Same as `/v1/solve` but takes the five-line text format as the body and
/// solver parameters from the query string.
#[utoipa::path(
    post,
    path = "/v1/solve/text",
    request_body(content = String, content_type = "text/plain"),
    params(
        ("optimize" = Option<bool>, Query, description = "Tighten the bound until optimal"),
        ("stepLimit" = Option<u64>, Query, description = "Value trials per search round"),
        ("timeLimitMs" = Option<u64>, Query, description = "Deadline for the whole solve")
    ),
    responses(
        (status = 200, description = "Job enqueued", body = JobCreated),
        (status = 400, description = "Malformed or invalid instance")
    )
)]
pub async fn solve_text(
    State(state): State<AppState>,
    Query(params): Query<SolveParams>,
    body: String,
) -> Result<Json<JobCreated>, ApiError> {
    let instance = sched_core::load(&body)?;
    let id = state.jobs.enqueue(SolveEnvelope { instance, params });
    Ok(Json(id.into()))
}
