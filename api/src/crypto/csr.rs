use std::net::IpAddr;

use certward_common::views::KeyType;
use rcgen::{
    CertificateParams, DistinguishedName, DnType, KeyPair, PKCS_ECDSA_P256_SHA256,
    PKCS_ECDSA_P384_SHA384, PKCS_RSA_SHA256, SanType, SignatureAlgorithm,
};
use x509_parser::prelude::*;

#[derive(Debug, thiserror::Error)]
pub enum CsrError {
    #[error("Unsupported key: {key_type} with {bits} bits")]
    UnsupportedKey { key_type: KeyType, bits: u32 },

    #[error("Failed to generate key pair: {0}")]
    KeyGeneration(#[source] rcgen::Error),

    #[error("Failed to create CSR: {0}")]
    Encoding(#[source] rcgen::Error),

    #[error("Invalid CSR: {0}")]
    Invalid(String),
}

/// Identity to put in a generated CSR.
#[derive(Debug, Clone)]
pub struct CsrSubject {
    pub common_name: String,
    pub dns_sans: Vec<String>,
    pub ip_sans: Vec<IpAddr>,
    pub key_type: KeyType,
    /// `0` selects the default size for `key_type`.
    pub key_bits: u32,
}

#[derive(Debug, Clone)]
pub struct GeneratedCsr {
    pub csr_pem: String,
    /// PKCS#8, PEM encoded.
    pub private_key_pem: String,
    pub key_type: KeyType,
}

/// Produces a fresh key pair and a CSR signed with it.
pub trait CsrGenerator: Send + Sync {
    fn generate(&self, subject: &CsrSubject) -> Result<GeneratedCsr, CsrError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RcgenCsrGenerator;

fn signature_algorithm(
    key_type: KeyType,
    bits: u32,
) -> Result<&'static SignatureAlgorithm, CsrError> {
    match (key_type, bits) {
        (KeyType::Rsa, 0 | 2048) => Ok(&PKCS_RSA_SHA256),
        (KeyType::Ecdsa, 0 | 256) => Ok(&PKCS_ECDSA_P256_SHA256),
        (KeyType::Ecdsa, 384) => Ok(&PKCS_ECDSA_P384_SHA384),
        (key_type, bits) => Err(CsrError::UnsupportedKey { key_type, bits }),
    }
}

impl CsrGenerator for RcgenCsrGenerator {
    fn generate(&self, subject: &CsrSubject) -> Result<GeneratedCsr, CsrError> {
        let alg = signature_algorithm(subject.key_type, subject.key_bits)?;
        let key_pair = KeyPair::generate_for(alg).map_err(CsrError::KeyGeneration)?;

        let mut params =
            CertificateParams::new(subject.dns_sans.clone()).map_err(CsrError::Encoding)?;
        params.subject_alt_names.extend(
            subject
                .ip_sans
                .iter()
                .copied()
                .map(SanType::IpAddress),
        );

        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, subject.common_name.as_str());
        params.distinguished_name = dn;

        let csr_pem = params
            .serialize_request(&key_pair)
            .and_then(|csr| csr.pem())
            .map_err(CsrError::Encoding)?;

        Ok(GeneratedCsr {
            csr_pem,
            private_key_pem: key_pair.serialize_pem(),
            key_type: subject.key_type,
        })
    }
}

/// Parse a PEM-encoded CSR and verify its self-signature. Returns the
/// subject's common name, if it has one.
pub fn inspect_csr(csr_pem: &str) -> Result<Option<String>, CsrError> {
    let (_, pem) = parse_x509_pem(csr_pem.as_bytes())
        .map_err(|e| CsrError::Invalid(format!("Failed to parse PEM: {e}")))?;

    if pem.label != "CERTIFICATE REQUEST" && pem.label != "NEW CERTIFICATE REQUEST" {
        return Err(CsrError::Invalid(format!(
            "Expected a certificate request, found {}",
            pem.label
        )));
    }

    let (_, csr) = X509CertificationRequest::from_der(&pem.contents)
        .map_err(|e| CsrError::Invalid(e.to_string()))?;

    csr.verify_signature()
        .map_err(|e| CsrError::Invalid(format!("Signature verification failed: {e}")))?;

    Ok(csr
        .certification_request_info
        .subject
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_owned))
}
