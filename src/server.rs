use crate::solver::{self, SolveOutput, SolveRequest};
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use log::{error, info};

async fn solve_handler(
    Json(request): Json<SolveRequest>,
) -> Result<Json<SolveOutput>, (StatusCode, String)> {
    let result = tokio::task::spawn_blocking(move || solver::solve(&request))
        .await
        .map_err(|e| {
            error!("Solve task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    match result {
        Ok(output) => Ok(Json(output)),
        Err(e) => Err((StatusCode::BAD_REQUEST, e.to_string())),
    }
}

pub fn router() -> Router {
    Router::new().route("/v1/assignment/solve", post(solve_handler))
}

pub async fn run_server(addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
