use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::KeyType;

/// A certificate issued from a server-generated key pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssuedCertificate {
    /// Leaf certificate in PEM format
    pub certificate: String,
    /// Certificate of the issuing CA in PEM format
    pub issuing_ca: String,
    /// PKCS#8 private key in PEM format. Only ever returned once.
    pub private_key: String,
    pub private_key_type: KeyType,
    /// Canonical (lowercase, colon-separated) serial number
    pub serial_number: String,
}

/// A certificate issued for a caller-supplied CSR.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignedCertificate {
    pub certificate: String,
    pub issuing_ca: String,
    pub serial_number: String,
}

/// The outcome of revoking a certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Revocation {
    /// Revocation time as seconds since the Unix epoch.
    pub revocation_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_time_rfc3339: Option<String>,
}

/// A stored certificate and its revocation status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Certificate {
    /// Certificate in PEM format
    pub certificate: String,
    /// Revocation time as seconds since the Unix epoch, or `0` if the
    /// certificate has not been revoked.
    pub revocation_time: i64,
}
