//! REST client for a Keyfactor Command style CA.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{CaError, CertificateAuthority, Enrollment, EnrollmentRequest, RevocationRequest};

const ENROLL_PATH: &str = "/Enrollment/CSR";
const REVOKE_PATH: &str = "/Certificates/Revoke";
const REQUESTED_WITH_HEADER: &str = "x-keyfactor-requested-with";
const API_VERSION_HEADER: &str = "x-keyfactor-api-version";

#[derive(Debug, Clone)]
pub struct CommandClientConfig {
    /// Scheme and host, e.g. `https://ca.example.com`.
    pub base_url: String,
    /// Path prefix of the API, e.g. `KeyfactorAPI`.
    pub api_path: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    /// How long an idle pooled connection is kept before it is closed.
    pub pool_idle_timeout: Duration,
}

pub struct CommandClient {
    client: Client,
    endpoint: String,
    username: Option<String>,
    password: Option<String>,
}

impl CommandClient {
    pub fn new(config: CommandClientConfig) -> Result<Self, CaError> {
        let client = Client::builder()
            .user_agent(format!("certward/{}", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .build()?;

        let endpoint = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.api_path.trim_matches('/')
        )
        .trim_end_matches('/')
        .to_string();

        Ok(Self {
            client,
            endpoint,
            username: config.username,
            password: config.password,
        })
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let mut req = self
            .client
            .post(format!("{}{}", self.endpoint, path))
            .header(REQUESTED_WITH_HEADER, "APIClient")
            .header(API_VERSION_HEADER, "1");

        if let Some(username) = &self.username {
            req = req.basic_auth(username, self.password.as_ref());
        }

        req
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EnrollCsrBody<'a> {
    #[serde(rename = "CSR")]
    csr: &'a str,
    certificate_authority: &'a str,
    template: &'a str,
    include_chain: bool,
    metadata: &'a serde_json::Value,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EnrollCsrResponse {
    certificate_information: CertificateInformation,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CertificateInformation {
    serial_number: String,
    #[serde(rename = "KeyfactorID")]
    keyfactor_id: i64,
    #[serde(default)]
    certificates: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RevokeBody<'a> {
    certificate_ids: &'a [i64],
    reason: i32,
    comment: &'a str,
    effective_date: String,
}

#[async_trait]
impl CertificateAuthority for CommandClient {
    #[instrument(skip(self, request), fields(ca = %request.ca, template = %request.template))]
    async fn enroll(&self, request: EnrollmentRequest) -> Result<Enrollment, CaError> {
        let body = EnrollCsrBody {
            csr: &request.csr_pem,
            certificate_authority: &request.ca,
            template: &request.template,
            include_chain: true,
            metadata: &request.metadata,
            timestamp: chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        debug!("Submitting CSR for enrollment");
        let response = self.post(ENROLL_PATH).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "Enrollment rejected by CA");
            return Err(CaError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let info = response
            .json::<EnrollCsrResponse>()
            .await
            .map_err(|e| CaError::InvalidResponse(format!("Failed to parse enrollment: {e}")))?
            .certificate_information;

        let mut certificates = info.certificates.into_iter();
        let certificate_pem = certificates.next().ok_or_else(|| {
            CaError::InvalidResponse("Enrollment response contained no certificates".into())
        })?;
        let issuing_ca_pem = certificates.next().unwrap_or_else(|| {
            warn!("Enrollment response did not include the issuing CA");
            String::new()
        });

        info!(serial = %info.serial_number, id = info.keyfactor_id, "Certificate enrolled");

        Ok(Enrollment {
            certificate_pem,
            issuing_ca_pem,
            serial_number: info.serial_number,
            external_id: info.keyfactor_id,
        })
    }

    #[instrument(skip(self, request), fields(ids = ?request.certificate_ids))]
    async fn revoke(&self, request: RevocationRequest) -> Result<(), CaError> {
        let body = RevokeBody {
            certificate_ids: &request.certificate_ids,
            reason: request.reason,
            comment: &request.comment,
            effective_date: request
                .effective_date
                .to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        debug!("Sending revocation request");
        let response = self.post(REVOKE_PATH).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), body = %text, "Revocation response received");

        if status != StatusCode::OK && status != StatusCode::NO_CONTENT {
            warn!(status = status.as_u16(), body = %text, "Revocation rejected by CA");
            return Err(CaError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(())
    }
}
