use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use certward_common::views::Revocation;

use super::Serial;

/// A certificate returned by the CA. Persisted as two entries:
/// `certs/<serial>` holds the PEM bytes and `kfId/<serial>` the CA's id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbCertificate {
    pub serial: Serial,
    pub certificate_pem: String,
    pub issuing_ca_pem: String,
    /// Identifier the CA assigned to the certificate; needed to revoke it.
    pub external_id: i64,
}

/// Written once, to `revoked/<serial>`, when a certificate is first revoked.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbRevocation {
    pub serial: Serial,

    /// Copy of the certificate as it was stored at revocation time.
    #[serde_as(as = "Base64")]
    pub certificate_bytes: Vec<u8>,

    /// Seconds since the Unix epoch.
    pub revocation_time: i64,

    pub revocation_time_utc: DateTime<Utc>,
}

impl DbRevocation {
    pub fn new(serial: Serial, certificate_bytes: Vec<u8>, revoked_at: DateTime<Utc>) -> Self {
        Self {
            serial,
            certificate_bytes,
            revocation_time: revoked_at.timestamp(),
            revocation_time_utc: revoked_at,
        }
    }
}

impl From<&DbRevocation> for Revocation {
    fn from(value: &DbRevocation) -> Self {
        Self {
            revocation_time: value.revocation_time,
            revocation_time_rfc3339: Some(
                value
                    .revocation_time_utc
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
        }
    }
}
