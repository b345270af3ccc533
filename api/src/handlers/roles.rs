use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use certward_common::{
    params::RoleParams,
    views::{PaginatedList, Role},
};

use crate::{context::ApiContext, error::ApiError};

#[utoipa::path(
    get,
    path = "/v1/roles",
    tags = ["roles"],
    responses((status = 200, description = "Names of all roles", body = PaginatedList<String>))
)]
pub async fn list_roles(
    State(ctx): State<ApiContext>,
) -> Result<Json<PaginatedList<String>>, ApiError> {
    let names = ctx.engine.list_roles(&ctx.request()).await?;
    Ok(Json(PaginatedList::complete(names)))
}

#[utoipa::path(
    get,
    path = "/v1/roles/{name}",
    tags = ["roles"],
    params(("name" = String, Path, description = "Role name")),
    responses(
        (status = 200, description = "Resolved role", body = Role),
        (status = 404, description = "Role not found"),
    )
)]
pub async fn get_role(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
) -> Result<Json<Role>, ApiError> {
    ctx.engine
        .read_role(&ctx.request(), &name)
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

/// Create a role, or replace an existing one with the same name.
#[utoipa::path(
    put,
    path = "/v1/roles/{name}",
    tags = ["roles"],
    params(("name" = String, Path, description = "Role name")),
    request_body = RoleParams,
    responses((status = 200, description = "Role written", body = Role))
)]
pub async fn put_role(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
    Json(params): Json<RoleParams>,
) -> Result<Json<Role>, ApiError> {
    let role = ctx.engine.write_role(&ctx.request(), &name, params).await?;
    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/v1/roles/{name}",
    tags = ["roles"],
    params(("name" = String, Path, description = "Role name")),
    responses((status = 204, description = "Role deleted"))
)]
pub async fn delete_role(
    State(ctx): State<ApiContext>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.engine.delete_role(&ctx.request(), &name).await?;
    Ok(StatusCode::NO_CONTENT)
}
