use axum::extract::State;

use crate::{context::ApiContext, error::ApiError};

pub mod certs;
pub mod config;
pub mod roles;

#[utoipa::path(
    get,
    path = "/v1/health",
    tags = ["system"],
    responses((status = 200, description = "Service and storage are reachable", body = String))
)]
pub async fn health_check(State(ctx): State<ApiContext>) -> Result<&'static str, ApiError> {
    ctx.engine.ping(&ctx.request()).await?;
    Ok("Healthy")
}
