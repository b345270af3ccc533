//! The external certificate authority that actually issues and revokes
//! certificates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod command;

pub use command::{CommandClient, CommandClientConfig};

#[async_trait]
pub trait CertificateAuthority: Send + Sync {
    /// Submit a CSR for enrollment and return the issued certificate.
    async fn enroll(&self, request: EnrollmentRequest) -> Result<Enrollment, CaError>;

    /// Revoke previously issued certificates by their CA-assigned ids.
    async fn revoke(&self, request: RevocationRequest) -> Result<(), CaError>;
}

#[derive(Debug, Clone)]
pub struct EnrollmentRequest {
    pub csr_pem: String,
    /// Logical CA name, e.g. `"ca.example.com\\Issuing CA"`.
    pub ca: String,
    pub template: String,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct Enrollment {
    pub certificate_pem: String,
    pub issuing_ca_pem: String,
    /// Serial as reported by the CA; not yet normalized.
    pub serial_number: String,
    pub external_id: i64,
}

#[derive(Debug, Clone)]
pub struct RevocationRequest {
    pub certificate_ids: Vec<i64>,
    /// RFC 5280 CRLReason code.
    pub reason: i32,
    pub comment: String,
    pub effective_date: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum CaError {
    #[error("Request to CA failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("CA returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid CA response: {0}")]
    InvalidResponse(String),
}
