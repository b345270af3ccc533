//! Domain policy: which common names and DNS SANs a role may issue for.

use certward_db::models::DbRole;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyDenial {
    #[error("common name not allowed for role")]
    CommonNameNotAllowed,

    #[error("sub-domains not allowed for role")]
    CommonNameSubdomain,

    #[error("subject alternative name {0} not allowed for provided role")]
    SanNotAllowed(String),

    #[error("sub-domains not allowed for role")]
    SanSubdomain(String),

    #[error(
        "at least one DNS SAN is required to match the supplied Common Name for RFC 2818 compliance"
    )]
    CommonNameNotInSans,
}

/// How a single name fares against a role's allowed domains. Ordered so the
/// best outcome across domains is the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DomainMatch {
    DomainDenied,
    SubdomainDenied,
    Allowed,
}

fn match_domain(name: &str, domain: &str, allow_subdomains: bool) -> DomainMatch {
    if domain == "*" || name == domain {
        DomainMatch::Allowed
    } else if name.ends_with(domain) {
        if allow_subdomains {
            DomainMatch::Allowed
        } else {
            DomainMatch::SubdomainDenied
        }
    } else {
        DomainMatch::DomainDenied
    }
}

/// Evaluate `name` against every allowed domain of `role`.
pub fn evaluate(name: &str, role: &DbRole) -> DomainMatch {
    role.allowed_domains
        .iter()
        .map(|domain| match_domain(name, domain, role.allow_subdomains))
        .max()
        .unwrap_or(DomainMatch::DomainDenied)
}

/// Check a common name and its DNS SANs against `role`.
///
/// Every SAN is evaluated; when several are denied the reason reported is
/// the last one's.
pub fn validate(common_name: &str, dns_sans: &[String], role: &DbRole) -> Result<(), PolicyDenial> {
    match evaluate(common_name, role) {
        DomainMatch::Allowed => {}
        DomainMatch::SubdomainDenied => return Err(PolicyDenial::CommonNameSubdomain),
        DomainMatch::DomainDenied => return Err(PolicyDenial::CommonNameNotAllowed),
    }

    let mut denial = None;
    let mut cn_match = false;

    for san in dns_sans {
        match evaluate(san, role) {
            DomainMatch::Allowed => {}
            DomainMatch::SubdomainDenied => denial = Some(PolicyDenial::SanSubdomain(san.clone())),
            DomainMatch::DomainDenied => denial = Some(PolicyDenial::SanNotAllowed(san.clone())),
        }
        cn_match |= san == common_name;
    }

    if let Some(denial) = denial {
        return Err(denial);
    }
    if !cn_match {
        return Err(PolicyDenial::CommonNameNotInSans);
    }

    Ok(())
}
