use async_trait::async_trait;
use thiserror::Error;

pub mod certificate;
pub mod memory;
pub mod role;

pub use certificate::CertStore;
pub use role::RoleStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Malformed entry at {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode entry for {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// An ordered key-value store. Keys are `/`-separated paths such as
/// `certs/<serial>`; values are opaque bytes.
///
/// Every operation touches a single key. Implementations must make
/// [`Storage::put_if_absent`] atomic with respect to concurrent writers of the
/// same key.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Write `value` only if `key` does not exist yet. Returns `false`, and
    /// leaves the existing value untouched, if it does.
    async fn put_if_absent(&self, key: &str, value: Vec<u8>) -> Result<bool, StoreError>;

    /// List keys starting with `prefix`, with the prefix stripped, in key
    /// order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}

pub(crate) fn decode_json<T>(key: &str, bytes: &[u8]) -> Result<T, StoreError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_slice(bytes).map_err(|source| StoreError::Malformed {
        key: key.to_owned(),
        source,
    })
}

pub(crate) fn encode_json<T>(key: &str, value: &T) -> Result<Vec<u8>, StoreError>
where
    T: serde::Serialize,
{
    serde_json::to_vec(value).map_err(|source| StoreError::Encode {
        key: key.to_owned(),
        source,
    })
}
