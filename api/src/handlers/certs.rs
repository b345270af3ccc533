use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use certward_common::{
    params::{IssueCertificateParams, RevokeCertificateParams, SignCertificateParams},
    views::{Certificate, IssuedCertificate, PaginatedList, Revocation, SignedCertificate},
};

use crate::{
    context::ApiContext,
    engine::{FetchOutcome, RevokeOutcome},
    error::ApiError,
};

/// Issue a certificate for a server-generated key pair.
///
/// The common name and DNS SANs must be permitted by the role. The private
/// key is returned once and never stored.
#[utoipa::path(
    post,
    path = "/v1/issue/{role}",
    tags = ["certs"],
    params(("role" = String, Path, description = "Role to issue under")),
    request_body = IssueCertificateParams,
    responses(
        (status = 200, description = "Certificate issued", body = IssuedCertificate),
        (status = 400, description = "Request denied by the role's policy or malformed"),
    )
)]
pub async fn issue_certificate(
    State(ctx): State<ApiContext>,
    Path(role): Path<String>,
    Json(params): Json<IssueCertificateParams>,
) -> Result<Json<IssuedCertificate>, ApiError> {
    let issued = ctx.engine.issue(&ctx.request(), &role, params).await?;
    Ok(Json(issued))
}

/// Enroll a caller-supplied CSR.
#[utoipa::path(
    post,
    path = "/v1/sign/{role}",
    tags = ["certs"],
    params(("role" = String, Path, description = "Role to sign under")),
    request_body = SignCertificateParams,
    responses(
        (status = 200, description = "Certificate issued", body = SignedCertificate),
        (status = 400, description = "Malformed CSR or metadata"),
    )
)]
pub async fn sign_certificate(
    State(ctx): State<ApiContext>,
    Path(role): Path<String>,
    Json(params): Json<SignCertificateParams>,
) -> Result<Json<SignedCertificate>, ApiError> {
    let signed = ctx.engine.sign(&ctx.request(), &role, params).await?;
    Ok(Json(signed))
}

fn revocation_response(outcome: RevokeOutcome) -> Response {
    match outcome.revocation() {
        Some(revocation) => Json(revocation).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Revoke a certificate by serial number.
///
/// Revoking an already revoked certificate returns the original record.
#[utoipa::path(
    post,
    path = "/v1/revoke",
    tags = ["certs"],
    request_body = RevokeCertificateParams,
    responses(
        (status = 200, description = "Certificate revoked", body = Revocation),
        (status = 204, description = "Nothing to revoke"),
        (status = 400, description = "Invalid serial number"),
        (status = 404, description = "Certificate not found"),
    )
)]
pub async fn revoke_certificate(
    State(ctx): State<ApiContext>,
    Json(params): Json<RevokeCertificateParams>,
) -> Result<Response, ApiError> {
    let outcome = ctx.engine.revoke(&ctx.request(), &params.serial).await?;
    Ok(revocation_response(outcome))
}

/// Revoke a certificate whose lease expired. A certificate that is no
/// longer stored is not an error.
#[utoipa::path(
    post,
    path = "/v1/leases/revoke",
    tags = ["certs"],
    request_body = RevokeCertificateParams,
    responses(
        (status = 200, description = "Certificate revoked", body = Revocation),
        (status = 204, description = "Nothing to revoke"),
        (status = 400, description = "Invalid serial number"),
    )
)]
pub async fn revoke_lease(
    State(ctx): State<ApiContext>,
    Json(params): Json<RevokeCertificateParams>,
) -> Result<Response, ApiError> {
    let outcome = ctx
        .engine
        .revoke_for_lease(&ctx.request(), &params.serial)
        .await?;
    Ok(revocation_response(outcome))
}

#[utoipa::path(
    get,
    path = "/v1/certs",
    tags = ["certs"],
    responses((status = 200, description = "Serial numbers of stored certificates", body = PaginatedList<String>))
)]
pub async fn list_certificates(
    State(ctx): State<ApiContext>,
) -> Result<Json<PaginatedList<String>>, ApiError> {
    let serials = ctx.engine.list_certificates(&ctx.request()).await?;
    Ok(Json(PaginatedList::complete(serials)))
}

async fn fetch(ctx: &ApiContext, serial: &str) -> Result<Certificate, ApiError> {
    match ctx.engine.fetch_certificate(&ctx.request(), serial).await {
        FetchOutcome::Found(certificate) => Ok(certificate),
        FetchOutcome::NotFound => Err(ApiError::not_found()),
        FetchOutcome::UserError(e) | FetchOutcome::InternalError(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/v1/certs/{serial}",
    tags = ["certs"],
    params(("serial" = String, Path, description = "Serial number, colon- or hyphen-separated hex")),
    responses(
        (status = 200, description = "Stored certificate", body = Certificate),
        (status = 404, description = "Certificate not found"),
    )
)]
pub async fn get_certificate(
    State(ctx): State<ApiContext>,
    Path(serial): Path<String>,
) -> Result<Json<Certificate>, ApiError> {
    Ok(Json(fetch(&ctx, &serial).await?))
}

/// The stored certificate as a bare PEM document.
#[utoipa::path(
    get,
    path = "/v1/certs/{serial}/pem",
    tags = ["certs"],
    params(("serial" = String, Path, description = "Serial number, colon- or hyphen-separated hex")),
    responses(
        (status = 200, description = "PEM-encoded certificate", body = String, content_type = "application/pem-certificate-chain"),
        (status = 404, description = "Certificate not found"),
    )
)]
pub async fn get_certificate_pem(
    State(ctx): State<ApiContext>,
    Path(serial): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let certificate = fetch(&ctx, &serial).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/pem-certificate-chain")],
        certificate.certificate,
    ))
}
