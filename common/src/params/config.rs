use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for replacing the issuance defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct IssuanceDefaultsParams {
    #[serde(default)]
    pub ca: String,
    #[serde(default)]
    pub template: String,
}
