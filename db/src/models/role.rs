use certward_common::views::{KeyType, Role};
use serde::{Deserialize, Serialize};

/// A role as stored under `roles/<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbRole {
    pub name: String,

    #[serde(default)]
    pub allowed_domains: Vec<String>,

    #[serde(default)]
    pub allow_subdomains: bool,

    #[serde(default)]
    pub key_type: KeyType,

    /// `0` selects the default size for `key_type`.
    #[serde(default)]
    pub key_bits: u32,

    #[serde(default)]
    pub no_store: bool,
}

impl From<DbRole> for Role {
    fn from(value: DbRole) -> Self {
        Self {
            name: value.name,
            allowed_domains: value.allowed_domains,
            allow_subdomains: value.allow_subdomains,
            key_type: value.key_type,
            key_bits: value.key_bits,
            no_store: value.no_store,
        }
    }
}
