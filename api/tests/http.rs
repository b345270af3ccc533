use axum::{Router, body::Body};
use certward_api::{config::CertwardConfig, server};
use clap::Parser;
use http::{Method, Request, StatusCode};
use httptest::{Expectation, Server, matchers::*, responders::*};
use serde_json::{Value, json};
use tower::ServiceExt;

fn router(ca: &Server) -> Router {
    let ca_url = ca.url_str("");
    let config = CertwardConfig::parse_from([
        "certward-api",
        "--ca-url",
        ca_url.as_str(),
        "--ca-username",
        "svc",
        "--ca-password",
        "hunter2",
        "--default-ca",
        "issuing-ca",
        "--default-template",
        "WebServer",
    ]);
    let (router, _api, _engine) = server::make(&config).unwrap();
    router
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn put_role(router: &Router) {
    let (status, role) = call(
        router,
        Method::PUT,
        "/v1/roles/web",
        Some(json!({
            "allowed_domains": "example.com, example.org",
            "allow_subdomains": true,
            "key_type": "ec"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(role["key_type"], "ecdsa");
    assert_eq!(role["allowed_domains"], json!(["example.com", "example.org"]));
}

fn expect_enrollment(ca: &Server) {
    ca.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/KeyfactorAPI/Enrollment/CSR"),
            request::body(json_decoded(|body: &Value| {
                body["CertificateAuthority"] == "issuing-ca" && body["Template"] == "WebServer"
            })),
        ])
        .respond_with(json_encoded(json!({
            "CertificateInformation": {
                "SerialNumber": "6D00A1",
                "KeyfactorID": 42,
                "Certificates": ["leaf-pem", "ca-pem"]
            }
        }))),
    );
}

#[tokio::test]
async fn issue_fetch_and_revoke() {
    let ca = Server::run();
    let router = router(&ca);
    put_role(&router).await;

    expect_enrollment(&ca);
    let (status, issued) = call(
        &router,
        Method::POST,
        "/v1/issue/web",
        Some(json!({
            "common_name": "www.example.com",
            "dns_sans": "www.example.com,api.example.com",
            "ip_sans": ["10.0.0.1"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{issued}");
    assert_eq!(issued["serial_number"], "6d:00:a1");
    assert_eq!(issued["certificate"], "leaf-pem");
    assert_eq!(issued["issuing_ca"], "ca-pem");
    assert_eq!(issued["private_key_type"], "ecdsa");

    let (status, list) = call(&router, Method::GET, "/v1/certs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["items"], json!(["6d:00:a1"]));

    ca.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/KeyfactorAPI/Certificates/Revoke"),
            request::body(json_decoded(|body: &Value| {
                body["CertificateIds"] == json!([42]) && body["Reason"] == 0
            })),
        ])
        .times(1)
        .respond_with(status_code(204)),
    );

    let (status, first) = call(
        &router,
        Method::POST,
        "/v1/revoke",
        Some(json!({"serial": "6D-00-A1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{first}");
    assert!(first["revocation_time"].as_i64().unwrap() > 0);

    let (status, second) = call(
        &router,
        Method::POST,
        "/v1/revoke",
        Some(json!({"serial": "6d:00:a1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);

    let (status, cert) = call(&router, Method::GET, "/v1/certs/6d:00:a1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cert["certificate"], "leaf-pem");
    assert_eq!(cert["revocation_time"], first["revocation_time"]);
}

#[tokio::test]
async fn denied_names_never_reach_the_ca() {
    let ca = Server::run();
    let router = router(&ca);
    put_role(&router).await;

    let (status, err) = call(
        &router,
        Method::POST,
        "/v1/issue/web",
        Some(json!({"common_name": "evil.net", "dns_sans": ["evil.net"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "common name not allowed for role");

    let (status, err) = call(
        &router,
        Method::POST,
        "/v1/issue/web",
        Some(json!({
            "common_name": "www.example.com",
            "dns_sans": ["www.example.com"],
            "metadata": "not json"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "'not json' is not a valid JSON string");
}

#[tokio::test]
async fn missing_things_are_reported() {
    let ca = Server::run();
    let router = router(&ca);

    let (status, _) = call(&router, Method::GET, "/v1/certs/01:02", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&router, Method::GET, "/v1/roles/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, err) = call(
        &router,
        Method::POST,
        "/v1/issue/nope",
        Some(json!({"common_name": "a.com", "dns_sans": ["a.com"]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["message"], "unknown role: nope");

    let (status, _) = call(
        &router,
        Method::POST,
        "/v1/revoke",
        Some(json!({"serial": "not hex"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_and_config_reload() {
    let ca = Server::run();
    let router = router(&ca);

    let (status, _) = call(&router, Method::GET, "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, defaults) = call(&router, Method::GET, "/v1/config", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults, json!({"ca": "issuing-ca", "template": "WebServer"}));

    let (status, defaults) = call(
        &router,
        Method::PUT,
        "/v1/config",
        Some(json!({"ca": "other-ca", "template": "Client"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(defaults["ca"], "other-ca");

    put_role(&router).await;
    ca.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/KeyfactorAPI/Enrollment/CSR"),
            request::body(json_decoded(|body: &Value| body["CertificateAuthority"] == "other-ca")),
        ])
        .respond_with(json_encoded(json!({
            "CertificateInformation": {
                "SerialNumber": "01",
                "KeyfactorID": 7,
                "Certificates": ["leaf-pem"]
            }
        }))),
    );

    let (status, issued) = call(
        &router,
        Method::POST,
        "/v1/issue/web",
        Some(json!({"common_name": "example.org", "dns_sans": ["example.org"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{issued}");
    assert_eq!(issued["issuing_ca"], "");
}

#[tokio::test]
async fn lease_revoke_of_unknown_serial_on_tainted_engine_is_no_content() {
    let ca = Server::run();
    let ca_url = ca.url_str("");
    let config = CertwardConfig::parse_from(["certward-api", "--ca-url", ca_url.as_str()]);
    let (router, _api, engine) = server::make(&config).unwrap();
    engine.set_tainted(true);

    let (status, _) = call(
        &router,
        Method::POST,
        "/v1/leases/revoke",
        Some(json!({"serial": "ff:ff"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
