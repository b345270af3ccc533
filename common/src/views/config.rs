use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Issuance defaults applied when a request leaves `ca` or `template` unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IssuanceDefaults {
    /// Logical name of the CA certificates are enrolled against.
    pub ca: String,
    /// Certificate template used for enrollment.
    pub template: String,
}
