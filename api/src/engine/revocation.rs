use certward_common::views::Revocation;
use certward_db::{
    models::{DbRevocation, Serial},
    storage::CertStore,
};
use chrono::Utc;
use tracing::{debug, info, instrument, warn};

use super::{Engine, EngineError, RequestContext};
use crate::ca::RevocationRequest;

/// CRLReason `unspecified`.
const REVOCATION_REASON: i32 = 0;
const REVOCATION_COMMENT: &str = "revoked via certward";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    Revoked(DbRevocation),
    /// Nothing to do: the engine is tainted, or the certificate is gone and
    /// the revocation came from a lease expiry.
    NoOp,
}

impl RevokeOutcome {
    pub fn revocation(&self) -> Option<Revocation> {
        match self {
            RevokeOutcome::Revoked(record) => Some(record.into()),
            RevokeOutcome::NoOp => None,
        }
    }
}

impl Engine {
    /// Revoke a certificate on explicit request.
    pub async fn revoke(&self, ctx: &RequestContext, serial: &str) -> Result<RevokeOutcome, EngineError> {
        self.revoke_certificate(ctx, serial, false).await
    }

    /// Revoke a certificate because its lease expired. A certificate that no
    /// longer exists locally is not an error here.
    pub async fn revoke_for_lease(
        &self,
        ctx: &RequestContext,
        serial: &str,
    ) -> Result<RevokeOutcome, EngineError> {
        self.revoke_certificate(ctx, serial, true).await
    }

    #[instrument(skip(self, ctx))]
    async fn revoke_certificate(
        &self,
        ctx: &RequestContext,
        serial: &str,
        from_lease: bool,
    ) -> Result<RevokeOutcome, EngineError> {
        if self.is_tainted() {
            debug!("Engine is tainted, skipping revocation");
            return Ok(RevokeOutcome::NoOp);
        }

        let serial: Serial = serial.parse()?;

        if let Some(existing) = ctx.run(self.storage.revocation(&serial)).await?? {
            debug!(%serial, "Certificate already revoked");
            return Ok(RevokeOutcome::Revoked(existing));
        }

        let external_id = ctx
            .run(self.storage.external_id(&serial))
            .await??
            .ok_or_else(|| {
                EngineError::Internal(format!("no CA certificate id stored for serial {serial}"))
            })?;

        let request = RevocationRequest {
            certificate_ids: vec![external_id],
            reason: REVOCATION_REASON,
            comment: REVOCATION_COMMENT.to_owned(),
            effective_date: Utc::now(),
        };

        ctx.run(self.ca.revoke(request))
            .await?
            .map_err(EngineError::Revocation)?;

        let Some(certificate) = ctx.run(self.storage.certificate_bytes(&serial)).await?? else {
            if from_lease {
                warn!(%serial, "Expired certificate is no longer stored, nothing to record");
                return Ok(RevokeOutcome::NoOp);
            }
            return Err(EngineError::NotFound(format!(
                "certificate with serial {serial} not found"
            )));
        };

        let record = DbRevocation::new(serial, certificate, Utc::now());
        let stored = ctx.run(self.storage.insert_revocation(record)).await??;

        info!(serial = %stored.serial, revoked_at = %stored.revocation_time_utc, "Certificate revoked");

        Ok(RevokeOutcome::Revoked(stored))
    }
}
