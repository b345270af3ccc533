use axum::{Json, extract::State};
use certward_common::{params::IssuanceDefaultsParams, views::IssuanceDefaults};

use crate::{context::ApiContext, error::ApiError};

#[utoipa::path(
    get,
    path = "/v1/config",
    tags = ["config"],
    responses((status = 200, description = "Current issuance defaults", body = IssuanceDefaults))
)]
pub async fn get_config(State(ctx): State<ApiContext>) -> Json<IssuanceDefaults> {
    Json(ctx.engine.defaults())
}

/// Replace the issuance defaults. Requests already in flight keep the values
/// they started with.
#[utoipa::path(
    put,
    path = "/v1/config",
    tags = ["config"],
    request_body = IssuanceDefaultsParams,
    responses((status = 200, description = "Issuance defaults replaced", body = IssuanceDefaults))
)]
pub async fn put_config(
    State(ctx): State<ApiContext>,
    Json(params): Json<IssuanceDefaultsParams>,
) -> Result<Json<IssuanceDefaults>, ApiError> {
    if params.ca.is_empty() {
        return Err(ApiError::BadRequest("ca must be provided".into()));
    }

    Ok(Json(ctx.engine.reload_defaults(IssuanceDefaults {
        ca: params.ca,
        template: params.template,
    })))
}
