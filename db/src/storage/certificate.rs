use async_trait::async_trait;
use tracing::debug;

use super::{StoreError, Storage, decode_json, encode_json};
use crate::models::{DbCertificate, DbRevocation, Serial};

pub const CERTS_PREFIX: &str = "certs/";
pub const EXTERNAL_ID_PREFIX: &str = "kfId/";
pub const REVOKED_PREFIX: &str = "revoked/";

/// Issued certificates and their revocation records, keyed by canonical
/// serial.
#[async_trait]
pub trait CertStore: Send + Sync {
    /// Persist the certificate PEM and the CA's id for it.
    async fn put_certificate(&self, certificate: &DbCertificate) -> Result<(), StoreError>;

    async fn certificate_bytes(&self, serial: &Serial) -> Result<Option<Vec<u8>>, StoreError>;

    async fn external_id(&self, serial: &Serial) -> Result<Option<i64>, StoreError>;

    async fn revocation(&self, serial: &Serial) -> Result<Option<DbRevocation>, StoreError>;

    /// Store `revocation` unless a record for the same serial already exists.
    /// Returns whichever record ends up stored.
    async fn insert_revocation(
        &self,
        revocation: DbRevocation,
    ) -> Result<DbRevocation, StoreError>;

    async fn list_serials(&self) -> Result<Vec<String>, StoreError>;

    /// Remove the certificate entry. The CA id and any revocation record are
    /// kept.
    async fn delete_certificate(&self, serial: &Serial) -> Result<(), StoreError>;
}

#[async_trait]
impl<T: Storage + ?Sized> CertStore for T {
    async fn put_certificate(&self, certificate: &DbCertificate) -> Result<(), StoreError> {
        let serial = &certificate.serial;

        self.put(
            &format!("{CERTS_PREFIX}{serial}"),
            certificate.certificate_pem.clone().into_bytes(),
        )
        .await?;

        let id_key = format!("{EXTERNAL_ID_PREFIX}{serial}");
        let id = encode_json(&id_key, &certificate.external_id)?;
        self.put(&id_key, id).await
    }

    async fn certificate_bytes(&self, serial: &Serial) -> Result<Option<Vec<u8>>, StoreError> {
        self.get(&format!("{CERTS_PREFIX}{serial}")).await
    }

    async fn external_id(&self, serial: &Serial) -> Result<Option<i64>, StoreError> {
        let key = format!("{EXTERNAL_ID_PREFIX}{serial}");
        self.get(&key)
            .await?
            .map(|bytes| decode_json(&key, &bytes))
            .transpose()
    }

    async fn revocation(&self, serial: &Serial) -> Result<Option<DbRevocation>, StoreError> {
        let key = format!("{REVOKED_PREFIX}{serial}");
        self.get(&key)
            .await?
            .map(|bytes| decode_json(&key, &bytes))
            .transpose()
    }

    async fn insert_revocation(
        &self,
        revocation: DbRevocation,
    ) -> Result<DbRevocation, StoreError> {
        let key = format!("{REVOKED_PREFIX}{}", revocation.serial);
        let bytes = encode_json(&key, &revocation)?;

        if self.put_if_absent(&key, bytes.clone()).await? {
            return Ok(revocation);
        }

        debug!(serial = %revocation.serial, "Revocation already recorded, keeping existing entry");

        match self.get(&key).await? {
            Some(existing) => decode_json(&key, &existing),
            // Deleted between the two calls; ours is as good as any.
            None => {
                self.put(&key, bytes).await?;
                Ok(revocation)
            }
        }
    }

    async fn list_serials(&self) -> Result<Vec<String>, StoreError> {
        self.list(CERTS_PREFIX).await
    }

    async fn delete_certificate(&self, serial: &Serial) -> Result<(), StoreError> {
        self.delete(&format!("{CERTS_PREFIX}{serial}")).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::storage::memory::MemoryStorage;

    fn certificate(serial: &str) -> DbCertificate {
        DbCertificate {
            serial: serial.parse().unwrap(),
            certificate_pem: "-----BEGIN CERTIFICATE-----\n...".into(),
            issuing_ca_pem: "-----BEGIN CERTIFICATE-----\nca".into(),
            external_id: 42,
        }
    }

    #[tokio::test]
    async fn certificate_is_stored_under_both_keys() {
        let storage = MemoryStorage::new();
        storage.put_certificate(&certificate("AA-BB")).await.unwrap();

        assert_eq!(
            storage.get("certs/aa:bb").await.unwrap(),
            Some(b"-----BEGIN CERTIFICATE-----\n...".to_vec())
        );
        assert_eq!(storage.get("kfId/aa:bb").await.unwrap(), Some(b"42".to_vec()));
    }

    #[tokio::test]
    async fn differently_formatted_serials_address_the_same_record() {
        let storage = MemoryStorage::new();
        storage.put_certificate(&certificate("AA-BB-CC")).await.unwrap();

        let serial: Serial = "aa:bb:cc".parse().unwrap();
        assert!(storage.certificate_bytes(&serial).await.unwrap().is_some());
        assert_eq!(storage.external_id(&serial).await.unwrap(), Some(42));
        assert_eq!(storage.list_serials().await.unwrap(), vec!["aa:bb:cc"]);
    }

    #[tokio::test]
    async fn first_revocation_wins() {
        let storage = MemoryStorage::new();
        let serial: Serial = "aa".parse().unwrap();
        let first_at = Utc::now();

        let first = DbRevocation::new(serial.clone(), b"pem".to_vec(), first_at);
        let second = DbRevocation::new(
            serial.clone(),
            b"pem".to_vec(),
            first_at + Duration::seconds(5),
        );

        assert_eq!(storage.insert_revocation(first.clone()).await.unwrap(), first);
        assert_eq!(storage.insert_revocation(second).await.unwrap(), first);
        assert_eq!(storage.revocation(&serial).await.unwrap(), Some(first));
    }

    #[tokio::test]
    async fn delete_certificate_keeps_external_id() {
        let storage = MemoryStorage::new();
        let cert = certificate("0f");
        storage.put_certificate(&cert).await.unwrap();

        storage.delete_certificate(&cert.serial).await.unwrap();

        assert_eq!(storage.certificate_bytes(&cert.serial).await.unwrap(), None);
        assert_eq!(storage.external_id(&cert.serial).await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn malformed_external_id_is_an_error() {
        let storage = MemoryStorage::new();
        storage.put("kfId/aa", b"\"abc\"".to_vec()).await.unwrap();

        let serial: Serial = "aa".parse().unwrap();
        assert!(matches!(
            storage.external_id(&serial).await,
            Err(StoreError::Malformed { .. })
        ));
    }
}
