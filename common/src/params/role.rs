use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::views::KeyType;

/// Request body for creating or replacing a role.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct RoleParams {
    /// Domains certificates may be issued for, as an array or a
    /// comma-separated string.
    #[serde(default, deserialize_with = "super::comma_separated")]
    #[schema(value_type = Vec<String>)]
    pub allowed_domains: Vec<String>,

    #[serde(default)]
    pub allow_subdomains: bool,

    #[serde(default)]
    pub key_type: KeyType,

    #[serde(default)]
    pub key_bits: u32,

    #[serde(default)]
    pub no_store: bool,
}
