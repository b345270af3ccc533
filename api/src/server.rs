use std::sync::Arc;

use axum::{
    Router,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
};
use certward_common::views::ApiErrorResponse;
use certward_db::storage::memory::MemoryStorage;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info_span;
use utoipa::{
    ToSchema,
    openapi::{Components, Info, License, OpenApi, RefOr, path::Operation},
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::{
    ca::CommandClient,
    config::{CertwardConfig, ConfigHandle},
    context::ApiContext,
    crypto::RcgenCsrGenerator,
    engine::Engine,
    handlers,
};

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the engine from configuration and the router serving it.
pub fn make(cfg: &CertwardConfig) -> anyhow::Result<(Router, OpenApi, Arc<Engine>)> {
    let ca = CommandClient::new(cfg.ca_client_config()?)?;

    let engine = Arc::new(Engine::new(
        Arc::new(MemoryStorage::new()),
        Arc::new(ca),
        Arc::new(RcgenCsrGenerator),
        ConfigHandle::new(cfg.engine_config()),
    ));

    let (router, api) = build(engine.clone(), cfg)?;
    Ok((router, api, engine))
}

/// Router and OpenAPI document for an existing engine.
pub fn build(engine: Arc<Engine>, cfg: &CertwardConfig) -> anyhow::Result<(Router, OpenApi)> {
    let context = ApiContext::new(engine, cfg.request_timeout());

    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            x_request_id.clone(),
            MakeRequestUuid,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &Request<_>| {
                    let span = info_span!(
                        "http_request",
                        method = req.method().to_string(),
                        request_id = Option::<&str>::None,
                        path = Option::<&str>::None,
                    );

                    if let Some(request_id) = req
                        .headers()
                        .get(REQUEST_ID_HEADER)
                        .and_then(|id| id.to_str().ok())
                    {
                        span.record("request_id", request_id);
                    };

                    if let Some(path) = req.extensions().get::<MatchedPath>() {
                        span.record("path", path.as_str())
                    } else {
                        span.record("path", req.uri().path())
                    };

                    span
                }),
        )
        .layer(
            CorsLayer::new()
                .allow_credentials(true)
                .allow_origin(cfg.public_url.parse::<HeaderValue>()?)
        )
        .layer(PropagateRequestIdLayer::new(x_request_id));

    let openapi = OpenApi::builder()
        .info(
            Info::builder()
                .title("Certward API Reference")
                .version(env!("CARGO_PKG_VERSION"))
                .license(Some(
                    License::builder()
                        .name("Apache 2.0 License")
                        .identifier(Some(env!("CARGO_PKG_LICENSE")))
                        .build()
                ))
        )
        .components(Some(
            Components::builder()
                .schema_from::<ApiErrorResponse>()
                .build()
        ))
        .build();

    let (r, mut a) = OpenApiRouter::with_openapi(openapi)
        .routes(routes!(handlers::health_check))
        .routes(routes!(handlers::certs::issue_certificate))
        .routes(routes!(handlers::certs::sign_certificate))
        .routes(routes!(handlers::certs::revoke_certificate))
        .routes(routes!(handlers::certs::revoke_lease))
        .routes(routes!(handlers::certs::list_certificates))
        .routes(routes!(handlers::certs::get_certificate))
        .routes(routes!(handlers::certs::get_certificate_pem))
        .routes(routes!(handlers::roles::list_roles))
        .routes(routes!(
            handlers::roles::get_role,
            handlers::roles::put_role,
            handlers::roles::delete_role
        ))
        .routes(routes!(handlers::config::get_config, handlers::config::put_config))
        .layer(middleware)
        .with_state(context)
        .split_for_parts();

    a.paths.paths.iter_mut().for_each(|(_path, item)| {
        apply_default_errors(&mut item.get);
        apply_default_errors(&mut item.post);
        apply_default_errors(&mut item.put);
        apply_default_errors(&mut item.delete);
    });

    Ok((r, a))
}

fn apply_default_errors(item: &mut Option<Operation>) {
    if let Some(item) = item {
        for (status, summary) in [("400", "Bad request"), ("500", "Internal server error")] {
            item.responses.responses.insert(
                status.into(),
                RefOr::Ref(
                    utoipa::openapi::Ref::builder()
                        .summary(summary)
                        .ref_location_from_schema_name(ApiErrorResponse::name())
                        .build()
                )
            );
        }
    }
}
