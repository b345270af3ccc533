//! Input parameters for the various functions within Certward.

use serde::{Deserialize, Deserializer};

mod certificate;
pub use certificate::*;

mod config;
pub use config::*;

mod role;
pub use role::*;

#[derive(Deserialize)]
#[serde(untagged)]
enum NameList {
    Joined(String),
    Items(Vec<String>),
}

/// Deserialize a list of names given either as a JSON array or as a single
/// comma-separated string. Entries are trimmed and empty entries dropped.
pub(crate) fn comma_separated<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<NameList>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(NameList::Joined(joined)) => joined.split(',').map(str::to_owned).collect(),
        Some(NameList::Items(items)) => items,
    };

    Ok(items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect())
}
