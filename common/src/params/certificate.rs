use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for issuing a certificate with a server-generated key.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct IssueCertificateParams {
    pub common_name: String,

    /// DNS subject alternative names, as an array or a comma-separated
    /// string. At least one must equal `common_name`.
    #[serde(default, deserialize_with = "super::comma_separated")]
    #[schema(value_type = Vec<String>)]
    pub dns_sans: Vec<String>,

    /// IP subject alternative names, as an array or a comma-separated string.
    #[serde(default, deserialize_with = "super::comma_separated")]
    #[schema(value_type = Vec<String>)]
    pub ip_sans: Vec<String>,

    /// CA to enroll against. Falls back to the configured default.
    #[serde(default)]
    pub ca: Option<String>,

    /// Certificate template. Falls back to the configured default.
    #[serde(default)]
    pub template: Option<String>,

    /// JSON object, encoded as a string, attached to the enrollment.
    #[serde(default)]
    pub metadata: Option<String>,
}

/// Request body for signing a caller-supplied CSR.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct SignCertificateParams {
    /// PEM-encoded certificate signing request.
    pub csr: String,

    #[serde(default)]
    pub ca: Option<String>,

    #[serde(default)]
    pub template: Option<String>,

    #[serde(default)]
    pub metadata: Option<String>,
}

/// Request body for revoking a certificate.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RevokeCertificateParams {
    /// Serial number in colon- or hyphen-separated hex, any case.
    #[serde(default)]
    pub serial: String,
}
