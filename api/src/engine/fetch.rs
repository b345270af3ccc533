use certward_common::views::Certificate;
use certward_db::{models::Serial, storage::CertStore};
use tracing::{debug, instrument};

use super::{Engine, EngineError, RequestContext};

/// Result of looking up a certificate. Every failure is classified here
/// once, so callers only have to match.
#[derive(Debug)]
pub enum FetchOutcome {
    Found(Certificate),
    NotFound,
    /// The request was bad, e.g. an unparseable serial.
    UserError(EngineError),
    InternalError(EngineError),
}

impl From<EngineError> for FetchOutcome {
    fn from(err: EngineError) -> Self {
        if err.is_user_error() {
            FetchOutcome::UserError(err)
        } else {
            FetchOutcome::InternalError(err)
        }
    }
}

impl Engine {
    #[instrument(skip(self, ctx))]
    pub async fn fetch_certificate(&self, ctx: &RequestContext, serial: &str) -> FetchOutcome {
        match self.lookup(ctx, serial).await {
            Ok(Some(certificate)) => FetchOutcome::Found(certificate),
            Ok(None) => FetchOutcome::NotFound,
            Err(err) => err.into(),
        }
    }

    async fn lookup(&self, ctx: &RequestContext, serial: &str) -> Result<Option<Certificate>, EngineError> {
        let serial: Serial = serial.parse()?;

        let Some(bytes) = ctx.run(self.storage.certificate_bytes(&serial)).await?? else {
            debug!(%serial, "No certificate stored");
            return Ok(None);
        };

        let certificate = String::from_utf8(bytes).map_err(|_| {
            EngineError::Internal(format!("stored certificate {serial} is not valid UTF-8"))
        })?;

        let revocation_time = ctx
            .run(self.storage.revocation(&serial))
            .await??
            .map(|record| record.revocation_time)
            .unwrap_or(0);

        Ok(Some(Certificate {
            certificate,
            revocation_time,
        }))
    }
}
