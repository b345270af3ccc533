use std::{net::IpAddr, sync::Arc};

use certward_common::{
    params::{IssueCertificateParams, SignCertificateParams},
    views::{IssuedCertificate, KeyType, SignedCertificate},
};
use certward_db::{
    models::{DbCertificate, DbRole, Serial},
    storage::CertStore,
};
use tracing::{debug, info, instrument, warn};

use super::{Engine, EngineError, RequestContext, policy};
use crate::{
    ca::{Enrollment, EnrollmentRequest},
    config::EngineConfig,
    crypto::{CsrSubject, inspect_csr},
};

/// Parse the caller's metadata string, treating an absent or empty value as
/// an empty object.
fn parse_metadata(metadata: Option<&str>) -> Result<serde_json::Value, EngineError> {
    let metadata = match metadata {
        None | Some("") => "{}",
        Some(m) => m,
    };

    serde_json::from_str(metadata).map_err(|_| {
        warn!(%metadata, "Rejecting invalid metadata");
        EngineError::InvalidRequest(format!("'{metadata}' is not a valid JSON string"))
    })
}

fn parse_ip_sans(ip_sans: &[String]) -> Result<Vec<IpAddr>, EngineError> {
    ip_sans
        .iter()
        .map(|ip| {
            ip.parse().map_err(|_| {
                EngineError::InvalidRequest(format!("'{ip}' is not a valid IP subject alternative name"))
            })
        })
        .collect()
}

fn resolve(explicit: Option<String>, default: &str) -> String {
    explicit
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

struct Issued {
    enrollment: Enrollment,
    serial: Serial,
}

impl Engine {
    /// Generate a key pair for an identity the role permits and enroll it
    /// with the CA.
    #[instrument(skip(self, ctx, params), fields(common_name = %params.common_name))]
    pub async fn issue(
        &self,
        ctx: &RequestContext,
        role_name: &str,
        params: IssueCertificateParams,
    ) -> Result<IssuedCertificate, EngineError> {
        let config = self.config.snapshot();
        let role = self.load_role(ctx, role_name).await?;

        if role.key_type == KeyType::Any {
            return Err(EngineError::InvalidRequest(
                "role key type \"any\" not allowed for issuing certificates, only signing".into(),
            ));
        }

        if params.common_name.is_empty() {
            return Err(EngineError::InvalidRequest(
                "common_name must be provided to issue certificate".into(),
            ));
        }
        if params.dns_sans.is_empty() {
            return Err(EngineError::InvalidRequest(
                "dns_sans must be provided to issue certificate".into(),
            ));
        }
        let ip_sans = parse_ip_sans(&params.ip_sans)?;

        policy::validate(&params.common_name, &params.dns_sans, &role)?;

        let metadata = parse_metadata(params.metadata.as_deref())?;

        let subject = CsrSubject {
            common_name: params.common_name,
            dns_sans: params.dns_sans,
            ip_sans,
            key_type: role.key_type,
            key_bits: role.key_bits,
        };

        debug!("Generating key pair and CSR");
        let generator = Arc::clone(&self.csr);
        let generated = ctx
            .run(tokio::task::spawn_blocking(move || generator.generate(&subject)))
            .await?
            .map_err(|e| EngineError::Internal(format!("key generation task failed: {e}")))?
            .map_err(EngineError::Csr)?;

        let issued = self
            .enroll(
                ctx,
                &config,
                &role,
                generated.csr_pem,
                params.ca,
                params.template,
                metadata,
            )
            .await?;

        Ok(IssuedCertificate {
            certificate: issued.enrollment.certificate_pem,
            issuing_ca: issued.enrollment.issuing_ca_pem,
            private_key: generated.private_key_pem,
            private_key_type: generated.key_type,
            serial_number: issued.serial.to_string(),
        })
    }

    /// Enroll a caller-supplied CSR. The role's domain policy is not applied.
    #[instrument(skip(self, ctx, params))]
    pub async fn sign(
        &self,
        ctx: &RequestContext,
        role_name: &str,
        params: SignCertificateParams,
    ) -> Result<SignedCertificate, EngineError> {
        let config = self.config.snapshot();
        let role = self.load_role(ctx, role_name).await?;

        let metadata = parse_metadata(params.metadata.as_deref())?;

        let common_name =
            inspect_csr(&params.csr).map_err(|e| EngineError::InvalidCsr(e.to_string()))?;
        debug!(common_name = ?common_name, "CSR accepted");

        let issued = self
            .enroll(
                ctx,
                &config,
                &role,
                params.csr,
                params.ca,
                params.template,
                metadata,
            )
            .await?;

        Ok(SignedCertificate {
            certificate: issued.enrollment.certificate_pem,
            issuing_ca: issued.enrollment.issuing_ca_pem,
            serial_number: issued.serial.to_string(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn enroll(
        &self,
        ctx: &RequestContext,
        config: &EngineConfig,
        role: &DbRole,
        csr_pem: String,
        ca: Option<String>,
        template: Option<String>,
        metadata: serde_json::Value,
    ) -> Result<Issued, EngineError> {
        let request = EnrollmentRequest {
            csr_pem,
            ca: resolve(ca, &config.default_ca),
            template: resolve(template, &config.default_template),
            metadata,
        };

        let enrollment = ctx
            .run(self.ca.enroll(request))
            .await?
            .map_err(EngineError::Enrollment)?;

        let serial: Serial = enrollment.serial_number.parse().map_err(|e| {
            EngineError::Internal(format!(
                "CA returned invalid serial number {:?}: {e}",
                enrollment.serial_number
            ))
        })?;

        if role.no_store {
            debug!(%serial, "Role has no_store set, not persisting certificate");
        } else {
            let record = DbCertificate {
                serial: serial.clone(),
                certificate_pem: enrollment.certificate_pem.clone(),
                issuing_ca_pem: enrollment.issuing_ca_pem.clone(),
                external_id: enrollment.external_id,
            };
            ctx.run(self.storage.put_certificate(&record)).await??;
        }

        info!(%serial, role = %role.name, "Certificate issued");

        Ok(Issued { enrollment, serial })
    }
}
