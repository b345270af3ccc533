use clap::Parser;
use std::{
    net::SocketAddr,
    path::PathBuf,
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use certward_common::views::IssuanceDefaults;

use crate::ca::CommandClientConfig;

#[derive(Clone, Debug, Parser)]
pub struct CertwardConfig {
    #[clap(
        short,
        long,
        env = "CERTWARD_BIND_ADDR",
        default_value = "0.0.0.0:4000"
    )]
    pub bind_addr: SocketAddr,

    #[clap(
        long,
        env = "CERTWARD_PUBLIC_URL",
        default_value = "http://localhost:4000"
    )]
    pub public_url: String,

    #[clap(long, env = "CERTWARD_DUMP_OPENAPI", default_value_t = false)]
    pub dump_openapi: bool,

    /// Base URL of the CA's REST API, e.g. `https://ca.example.com`.
    #[clap(long, env = "CERTWARD_CA_URL", default_value = "https://localhost")]
    pub ca_url: String,

    #[clap(long, env = "CERTWARD_CA_API_PATH", default_value = "KeyfactorAPI")]
    pub ca_api_path: String,

    #[clap(long, env = "CERTWARD_CA_USERNAME")]
    pub ca_username: Option<String>,

    /// Password for the CA API. Prefer `ca_password_file` so the secret does
    /// not show up in the process list.
    ///
    /// Mutually exclusive with `ca_password_file`.
    #[clap(long, env = "CERTWARD_CA_PASSWORD", hide_env_values = true)]
    pub ca_password: Option<String>,

    /// Path to a file holding the CA API password. Trailing whitespace is
    /// ignored.
    #[clap(long, env = "CERTWARD_CA_PASSWORD_FILE", conflicts_with = "ca_password")]
    pub ca_password_file: Option<PathBuf>,

    /// CA used when a request does not name one.
    #[clap(long, env = "CERTWARD_DEFAULT_CA", default_value = "")]
    pub default_ca: String,

    /// Template used when a request does not name one.
    #[clap(long, env = "CERTWARD_DEFAULT_TEMPLATE", default_value = "")]
    pub default_template: String,

    #[clap(long, env = "CERTWARD_CA_TIMEOUT_SECS", default_value_t = 30)]
    pub ca_timeout_secs: u64,

    /// How long idle connections to the CA are kept in the pool.
    #[clap(long, env = "CERTWARD_CA_POOL_IDLE_SECS", default_value_t = 90)]
    pub ca_pool_idle_secs: u64,

    /// Upper bound on how long a single API operation may take.
    #[clap(long, env = "CERTWARD_REQUEST_TIMEOUT_SECS", default_value_t = 60)]
    pub request_timeout_secs: u64,
}

impl CertwardConfig {
    /// Get the CA password from either inline config or file, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if `ca_password_file` is set but can't be read.
    pub fn ca_password(&self) -> anyhow::Result<Option<String>> {
        if let Some(ref password) = self.ca_password {
            return Ok(Some(password.clone()));
        }

        if let Some(ref path) = self.ca_password_file {
            return std::fs::read_to_string(path)
                .map(|p| Some(p.trim_end().to_owned()))
                .map_err(|e| anyhow::anyhow!("failed to read CA password file: {}", e));
        }

        Ok(None)
    }

    pub fn ca_client_config(&self) -> anyhow::Result<CommandClientConfig> {
        Ok(CommandClientConfig {
            base_url: self.ca_url.clone(),
            api_path: self.ca_api_path.clone(),
            username: self.ca_username.clone(),
            password: self.ca_password()?,
            timeout: Duration::from_secs(self.ca_timeout_secs),
            pool_idle_timeout: Duration::from_secs(self.ca_pool_idle_secs),
        })
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_ca: self.default_ca.clone(),
            default_template: self.default_template.clone(),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Settings the engine reads while serving a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub default_ca: String,
    pub default_template: String,
}

impl From<&EngineConfig> for IssuanceDefaults {
    fn from(value: &EngineConfig) -> Self {
        Self {
            ca: value.default_ca.clone(),
            template: value.default_template.clone(),
        }
    }
}

/// Shared, replaceable [`EngineConfig`].
///
/// Operations take a [`snapshot`](Self::snapshot) once when they start and
/// use it throughout; [`reload`](Self::reload) only affects operations that
/// start afterwards.
#[derive(Debug, Clone, Default)]
pub struct ConfigHandle(Arc<RwLock<Arc<EngineConfig>>>);

impl ConfigHandle {
    pub fn new(config: EngineConfig) -> Self {
        Self(Arc::new(RwLock::new(Arc::new(config))))
    }

    pub fn snapshot(&self) -> Arc<EngineConfig> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn reload(&self, config: EngineConfig) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reload_does_not_affect_existing_snapshots() {
        let handle = ConfigHandle::new(EngineConfig {
            default_ca: "ca-1".into(),
            default_template: "web".into(),
        });

        let before = handle.snapshot();
        handle.reload(EngineConfig {
            default_ca: "ca-2".into(),
            default_template: "web".into(),
        });

        assert_eq!(before.default_ca, "ca-1");
        assert_eq!(handle.snapshot().default_ca, "ca-2");
    }

    #[test]
    fn password_file_is_trimmed() {
        let path = std::env::temp_dir().join(format!("certward-pw-{}", std::process::id()));
        std::fs::write(&path, "s3cret\n").unwrap();

        let config = CertwardConfig::parse_from([
            "certward-api",
            "--ca-password-file",
            path.to_str().unwrap(),
        ]);
        assert_eq!(config.ca_password().unwrap().as_deref(), Some("s3cret"));

        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_password_file_is_an_error() {
        let config = CertwardConfig::parse_from([
            "certward-api",
            "--ca-password-file",
            "/nonexistent/certward/password",
        ]);
        assert!(config.ca_password().is_err());
    }
}
