use async_trait::async_trait;

use super::{StoreError, Storage, decode_json, encode_json};
use crate::models::DbRole;

pub const ROLES_PREFIX: &str = "roles/";

/// Roles, kept as JSON under `roles/<name>`.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_role(&self, name: &str) -> Result<Option<DbRole>, StoreError>;

    /// Create the role, or replace it if one with the same name exists.
    async fn put_role(&self, role: &DbRole) -> Result<(), StoreError>;

    async fn list_roles(&self) -> Result<Vec<String>, StoreError>;

    async fn delete_role(&self, name: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: Storage + ?Sized> RoleStore for T {
    async fn get_role(&self, name: &str) -> Result<Option<DbRole>, StoreError> {
        let key = format!("{ROLES_PREFIX}{name}");
        self.get(&key)
            .await?
            .map(|bytes| decode_json(&key, &bytes))
            .transpose()
    }

    async fn put_role(&self, role: &DbRole) -> Result<(), StoreError> {
        let key = format!("{ROLES_PREFIX}{}", role.name);
        let bytes = encode_json(&key, role)?;
        self.put(&key, bytes).await
    }

    async fn list_roles(&self) -> Result<Vec<String>, StoreError> {
        self.list(ROLES_PREFIX).await
    }

    async fn delete_role(&self, name: &str) -> Result<(), StoreError> {
        self.delete(&format!("{ROLES_PREFIX}{name}")).await
    }
}

#[cfg(test)]
mod tests {
    use certward_common::views::KeyType;

    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn role(name: &str) -> DbRole {
        DbRole {
            name: name.into(),
            allowed_domains: vec!["example.com".into()],
            allow_subdomains: true,
            key_type: KeyType::Ecdsa,
            key_bits: 0,
            no_store: false,
        }
    }

    #[tokio::test]
    async fn role_round_trips() {
        let storage = MemoryStorage::new();
        storage.put_role(&role("web")).await.unwrap();

        assert_eq!(storage.get_role("web").await.unwrap(), Some(role("web")));
        assert_eq!(storage.get_role("db").await.unwrap(), None);
    }

    #[tokio::test]
    async fn roles_are_listed_and_deleted_by_name() {
        let storage = MemoryStorage::new();
        storage.put_role(&role("web")).await.unwrap();
        storage.put_role(&role("api")).await.unwrap();

        assert_eq!(storage.list_roles().await.unwrap(), vec!["api", "web"]);

        storage.delete_role("api").await.unwrap();
        assert_eq!(storage.list_roles().await.unwrap(), vec!["web"]);
    }

    #[tokio::test]
    async fn missing_fields_take_defaults() {
        let storage = MemoryStorage::new();
        storage
            .put("roles/bare", br#"{"name": "bare"}"#.to_vec())
            .await
            .unwrap();

        let bare = storage.get_role("bare").await.unwrap().unwrap();
        assert!(bare.allowed_domains.is_empty());
        assert!(!bare.allow_subdomains);
        assert_eq!(bare.key_type, KeyType::Rsa);
    }

    #[tokio::test]
    async fn ec_alias_is_accepted_for_key_type() {
        let storage = MemoryStorage::new();
        storage
            .put("roles/ec", br#"{"name": "ec", "key_type": "ec"}"#.to_vec())
            .await
            .unwrap();

        let ec = storage.get_role("ec").await.unwrap().unwrap();
        assert_eq!(ec.key_type, KeyType::Ecdsa);
    }

    #[tokio::test]
    async fn malformed_role_is_reported_with_its_key() {
        let storage = MemoryStorage::new();
        storage.put("roles/bad", b"not json".to_vec()).await.unwrap();

        match storage.get_role("bad").await {
            Err(StoreError::Malformed { key, .. }) => assert_eq!(key, "roles/bad"),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }
}
