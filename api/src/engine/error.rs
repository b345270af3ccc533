use certward_db::{models::SerialError, storage::StoreError};
use thiserror::Error;

use super::policy::PolicyDenial;
use crate::{ca::CaError, crypto::CsrError};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error(transparent)]
    Denied(#[from] PolicyDenial),

    #[error("{0}")]
    InvalidRequest(String),

    #[error(transparent)]
    InvalidSerial(#[from] SerialError),

    #[error("invalid CSR: {0}")]
    InvalidCsr(String),

    #[error("{0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("could not enroll certificate: {0}")]
    Enrollment(#[source] CaError),

    #[error("revocation failed: {0}")]
    Revocation(#[source] CaError),

    #[error("could not generate key: {0}")]
    Csr(#[source] CsrError),

    #[error("cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("{0}")]
    Internal(String),
}

impl EngineError {
    /// Errors caused by the request itself, as opposed to a failure of the
    /// service or one of its collaborators.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EngineError::UnknownRole(_)
                | EngineError::Denied(_)
                | EngineError::InvalidRequest(_)
                | EngineError::InvalidSerial(_)
                | EngineError::InvalidCsr(_)
                | EngineError::NotFound(_)
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}
