mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod explain;
    pub mod health;
    pub mod jobs;
    pub mod solve;
    pub mod validate;
}

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::solve::solve,
        routes::solve::solve_text,
        routes::jobs::status,
        routes::jobs::result,
        routes::validate::validate_handler,
        routes::explain::explain,
    ),
    components(schemas(
        types::Instance, types::TimeSlot, types::Day, types::RoomId, types::ClassId,
        types::CourseId, types::SessionKind, types::Session, types::Association,
        types::Assignment, types::SolveParams, types::SolveEnvelope, types::SolveStatus,
        types::SolveResult, types::Violation, types::ViolationKind,
        jobs::JobId, jobs::JobStatus,
        routes::validate::ValidationReport,
        routes::solve::JobCreated,
        routes::explain::ExplainIn,
        routes::explain::ExplainOut,
    )),
    tags(
        (name = "unitable", description = "Weekly timetable solving API")
    )
)]
struct ApiDoc;

fn app(state: state::AppState) -> Router {
    let router = Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/solve", post(routes::solve::solve))
        .route("/v1/solve/text", post(routes::solve::solve_text))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/explain", post(routes::explain::explain))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .with_state(state);
    telemetry::wrap(router)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(?e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let port = std::env::var("UNITABLE__SERVER__PORT").unwrap_or_else(|_| "8080".into());
    let addr: std::net::SocketAddr = format!("0.0.0.0:{port}")
        .parse()
        .with_context(|| format!("invalid listen port {port:?}"))?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state::AppState::new_default()))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
