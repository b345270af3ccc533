use std::fmt::Display;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Key algorithm a role issues certificates for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    #[default]
    Rsa,
    #[serde(alias = "ec")]
    Ecdsa,
    /// Any key type. Roles with this key type may only sign CSRs.
    Any,
}

impl Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyType::Rsa => write!(f, "rsa"),
            KeyType::Ecdsa => write!(f, "ecdsa"),
            KeyType::Any => write!(f, "any"),
        }
    }
}

/// An issuance policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub name: String,
    /// Domains certificates may be issued for. `*` allows any domain.
    pub allowed_domains: Vec<String>,
    /// Whether names below an allowed domain are permitted.
    pub allow_subdomains: bool,
    pub key_type: KeyType,
    /// Key size in bits; `0` selects the default for the key type.
    pub key_bits: u32,
    /// Skip persisting issued certificates.
    pub no_store: bool,
}
