//! Certward API service.
//!
//! Issues and revokes X.509 certificates through an external CA, enforcing
//! per-role domain policy on what may be issued.
//!
//! # Configuration
//!
//! See [`config::CertwardConfig`] for the CA connection and issuance
//! defaults.
//!
//! # Operations
//!
//! The operations themselves live on [`engine::Engine`]; the HTTP handlers
//! are a thin layer over it.

pub mod ca;
pub mod config;
pub mod crypto;
pub mod engine;
pub mod server;

pub(crate) mod context;
pub(crate) mod error;
pub(crate) mod handlers;
