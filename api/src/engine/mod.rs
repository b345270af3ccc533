//! Certificate operations: policy checks, issuance through the CA,
//! revocation and lookups against the certificate store.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use certward_common::{
    params::RoleParams,
    views::{IssuanceDefaults, Role},
};
use certward_db::{
    models::DbRole,
    storage::{CertStore, RoleStore, Storage},
};
use tracing::{info, instrument};

use crate::{
    ca::CertificateAuthority,
    config::{ConfigHandle, EngineConfig},
    crypto::CsrGenerator,
};

mod context;
mod error;
mod fetch;
mod issuer;
pub mod policy;
mod revocation;

pub use context::RequestContext;
pub use error::EngineError;
pub use fetch::FetchOutcome;
pub use revocation::RevokeOutcome;

pub struct Engine {
    storage: Arc<dyn Storage>,
    ca: Arc<dyn CertificateAuthority>,
    csr: Arc<dyn CsrGenerator>,
    config: ConfigHandle,
    tainted: AtomicBool,
}

impl Engine {
    pub fn new(
        storage: Arc<dyn Storage>,
        ca: Arc<dyn CertificateAuthority>,
        csr: Arc<dyn CsrGenerator>,
        config: ConfigHandle,
    ) -> Self {
        Self {
            storage,
            ca,
            csr,
            config,
            tainted: AtomicBool::new(false),
        }
    }

    /// Mark the engine as being torn down. Revocations become no-ops from
    /// then on.
    pub fn set_tainted(&self, tainted: bool) {
        self.tainted.store(tainted, Ordering::SeqCst);
    }

    pub fn is_tainted(&self) -> bool {
        self.tainted.load(Ordering::SeqCst)
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    pub fn defaults(&self) -> IssuanceDefaults {
        IssuanceDefaults::from(self.config.snapshot().as_ref())
    }

    pub fn reload_defaults(&self, defaults: IssuanceDefaults) -> IssuanceDefaults {
        self.config.reload(EngineConfig {
            default_ca: defaults.ca,
            default_template: defaults.template,
        });
        info!("Issuance defaults reloaded");
        self.defaults()
    }

    pub async fn ping(&self, ctx: &RequestContext) -> Result<(), EngineError> {
        ctx.run(self.storage.ping()).await??;
        Ok(())
    }

    async fn load_role(&self, ctx: &RequestContext, name: &str) -> Result<DbRole, EngineError> {
        ctx.run(self.storage.get_role(name))
            .await??
            .ok_or_else(|| EngineError::UnknownRole(name.to_owned()))
    }

    #[instrument(skip(self, ctx, params))]
    pub async fn write_role(
        &self,
        ctx: &RequestContext,
        name: &str,
        params: RoleParams,
    ) -> Result<Role, EngineError> {
        if name.is_empty() {
            return Err(EngineError::InvalidRequest("role name must be provided".into()));
        }

        let role = DbRole {
            name: name.to_owned(),
            allowed_domains: params.allowed_domains,
            allow_subdomains: params.allow_subdomains,
            key_type: params.key_type,
            key_bits: params.key_bits,
            no_store: params.no_store,
        };

        ctx.run(self.storage.put_role(&role)).await??;
        info!(domains = ?role.allowed_domains, "Role written");

        Ok(role.into())
    }

    pub async fn read_role(&self, ctx: &RequestContext, name: &str) -> Result<Option<Role>, EngineError> {
        Ok(ctx.run(self.storage.get_role(name)).await??.map(Role::from))
    }

    pub async fn list_roles(&self, ctx: &RequestContext) -> Result<Vec<String>, EngineError> {
        Ok(ctx.run(self.storage.list_roles()).await??)
    }

    #[instrument(skip(self, ctx))]
    pub async fn delete_role(&self, ctx: &RequestContext, name: &str) -> Result<(), EngineError> {
        ctx.run(self.storage.delete_role(name)).await??;
        info!("Role deleted");
        Ok(())
    }

    /// Serials of every stored certificate, canonical form, in key order.
    pub async fn list_certificates(&self, ctx: &RequestContext) -> Result<Vec<String>, EngineError> {
        Ok(ctx.run(self.storage.list_serials()).await??)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Doubles shared by the engine's tests.

    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use certward_common::views::KeyType;
    use certward_db::storage::memory::MemoryStorage;

    use super::*;
    use crate::{
        ca::{CaError, Enrollment, EnrollmentRequest, RevocationRequest},
        crypto::RcgenCsrGenerator,
    };

    #[derive(Default)]
    pub struct MockCa {
        pub enrolls: AtomicUsize,
        pub revokes: AtomicUsize,
        pub fail_revoke: bool,
        pub last_enrollment: Mutex<Option<EnrollmentRequest>>,
    }

    #[async_trait]
    impl CertificateAuthority for MockCa {
        async fn enroll(&self, request: EnrollmentRequest) -> Result<Enrollment, CaError> {
            self.enrolls.fetch_add(1, Ordering::SeqCst);
            *self.last_enrollment.lock().unwrap() = Some(request);
            Ok(Enrollment {
                certificate_pem: "-----BEGIN CERTIFICATE-----\nleaf".into(),
                issuing_ca_pem: "-----BEGIN CERTIFICATE-----\nca".into(),
                serial_number: "6D00A1".into(),
                external_id: 42,
            })
        }

        async fn revoke(&self, _request: RevocationRequest) -> Result<(), CaError> {
            self.revokes.fetch_add(1, Ordering::SeqCst);
            if self.fail_revoke {
                return Err(CaError::Status {
                    status: 500,
                    body: "unavailable".into(),
                });
            }
            Ok(())
        }
    }

    pub struct Harness {
        pub engine: Engine,
        pub storage: Arc<MemoryStorage>,
        pub ca: Arc<MockCa>,
    }

    pub fn harness(ca: MockCa) -> Harness {
        let storage = Arc::new(MemoryStorage::new());
        let ca = Arc::new(ca);
        let engine = Engine::new(
            storage.clone(),
            ca.clone(),
            Arc::new(RcgenCsrGenerator),
            ConfigHandle::new(EngineConfig {
                default_ca: "issuing-ca".into(),
                default_template: "WebServer".into(),
            }),
        );
        Harness { engine, storage, ca }
    }

    pub async fn add_role(harness: &Harness, name: &str, no_store: bool) {
        harness
            .engine
            .write_role(
                &RequestContext::new(),
                name,
                RoleParams {
                    allowed_domains: vec!["example.com".into()],
                    allow_subdomains: true,
                    key_type: KeyType::Ecdsa,
                    key_bits: 0,
                    no_store,
                },
            )
            .await
            .unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::{testing::*, *};

    #[tokio::test]
    async fn roles_can_be_written_listed_and_deleted() {
        let h = harness(MockCa::default());
        let ctx = RequestContext::new();

        add_role(&h, "web", false).await;
        add_role(&h, "internal", true).await;

        assert_eq!(h.engine.list_roles(&ctx).await.unwrap(), vec!["internal", "web"]);
        let role = h.engine.read_role(&ctx, "internal").await.unwrap().unwrap();
        assert!(role.no_store);

        h.engine.delete_role(&ctx, "internal").await.unwrap();
        assert!(h.engine.read_role(&ctx, "internal").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reload_changes_defaults() {
        let h = harness(MockCa::default());
        let defaults = h.engine.reload_defaults(IssuanceDefaults {
            ca: "other-ca".into(),
            template: "Client".into(),
        });
        assert_eq!(defaults.ca, "other-ca");
        assert_eq!(h.engine.config().snapshot().default_template, "Client");
    }
}
