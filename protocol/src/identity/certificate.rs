//! Creator certificate parsing.

use std::fmt;

use thiserror::Error;
use x509_parser::pem::parse_x509_pem;

const PEM_MARKER: &[u8] = b"-----";

/// Errors raised while resolving a caller.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// No PEM block was found in the credential.
    #[error("no PEM certificate in creator credential")]
    MissingPem,

    /// The PEM block could not be decoded.
    #[error("malformed PEM block: {0}")]
    Pem(String),

    /// The decoded bytes are not a valid X.509 certificate.
    #[error("malformed X.509 certificate: {0}")]
    Certificate(String),

    /// The certificate's issuer has no organization attribute.
    #[error("certificate issuer carries no organization")]
    MissingOrganization,

    /// The certificate's subject has no common name.
    #[error("certificate subject carries no common name")]
    MissingCommonName,
}

/// The resolved caller of an invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// Subject common name.
    pub common_name: String,
    /// First dot-separated label of the issuer organization.
    pub organization: String,
}

impl CallerIdentity {
    /// Builds an identity directly, bypassing certificate parsing.
    pub fn new(common_name: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            common_name: common_name.into(),
            organization: organization.into(),
        }
    }
}

impl fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.common_name, self.organization)
    }
}

/// Resolves the caller from a raw creator credential.
///
/// Everything before the first `-----` and after the last `-----` is
/// ignored, so a PEM certificate embedded in platform framing is accepted.
///
/// # Errors
///
/// Returns an [`IdentityError`] if no certificate can be decoded or if it
/// lacks an issuer organization or a subject common name.
pub fn resolve_caller(credential: &[u8]) -> Result<CallerIdentity, IdentityError> {
    let pem_bytes = extract_pem(credential).ok_or(IdentityError::MissingPem)?;

    let (_, pem) = parse_x509_pem(pem_bytes).map_err(|e| IdentityError::Pem(e.to_string()))?;
    let cert = pem
        .parse_x509()
        .map_err(|e| IdentityError::Certificate(e.to_string()))?;

    let organization = cert
        .issuer()
        .iter_organization()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .ok_or(IdentityError::MissingOrganization)?;

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .ok_or(IdentityError::MissingCommonName)?;

    Ok(CallerIdentity {
        common_name: common_name.to_string(),
        organization: short_organization(organization).to_string(),
    })
}

/// First dot-separated label of an organization name.
pub fn short_organization(organization: &str) -> &str {
    organization.split('.').next().unwrap_or(organization)
}

/// Slices out the span from the first PEM marker through the end of the last.
fn extract_pem(credential: &[u8]) -> Option<&[u8]> {
    let start = find(credential, PEM_MARKER)?;
    let last = rfind(credential, PEM_MARKER)?;
    let end = last + PEM_MARKER.len();
    (end > start).then(|| &credential[start..end])
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{Certificate, CertificateParams, DistinguishedName, DnType};

    fn certificate_pem(common_name: Option<&str>, organization: Option<&str>) -> String {
        let mut params = CertificateParams::new(vec!["peer0.transport-chain.nl".to_string()]);
        let mut dn = DistinguishedName::new();
        if let Some(cn) = common_name {
            dn.push(DnType::CommonName, cn);
        }
        if let Some(org) = organization {
            dn.push(DnType::OrganizationName, org);
        }
        params.distinguished_name = dn;
        Certificate::from_params(params)
            .unwrap()
            .serialize_pem()
            .unwrap()
    }

    #[test]
    fn resolves_common_name_and_short_org() {
        let pem = certificate_pem(Some("amsterdam"), Some("ns.transport-chain.nl"));
        let caller = resolve_caller(pem.as_bytes()).unwrap();
        assert_eq!(caller, CallerIdentity::new("amsterdam", "ns"));
        assert_eq!(caller.to_string(), "amsterdam@ns");
    }

    #[test]
    fn accepts_framed_credential() {
        let pem = certificate_pem(Some("rotterdam"), Some("veolia.transport-chain.nl"));
        let mut framed = vec![0x0a, 0x09];
        framed.extend_from_slice(b"VeoliaMSP");
        framed.extend_from_slice(&[0x12, 0xff, 0x04]);
        framed.extend_from_slice(pem.as_bytes());
        framed.extend_from_slice(&[0x00, 0x1a]);

        let caller = resolve_caller(&framed).unwrap();
        assert_eq!(caller.common_name, "rotterdam");
        assert_eq!(caller.organization, "veolia");
    }

    #[test]
    fn organization_without_dots_kept_whole() {
        let pem = certificate_pem(Some("service"), Some("bank"));
        assert_eq!(resolve_caller(pem.as_bytes()).unwrap().organization, "bank");
    }

    #[test]
    fn missing_organization_rejected() {
        let pem = certificate_pem(Some("amsterdam"), None);
        assert!(matches!(
            resolve_caller(pem.as_bytes()),
            Err(IdentityError::MissingOrganization)
        ));
    }

    #[test]
    fn missing_common_name_rejected() {
        let pem = certificate_pem(None, Some("ns.transport-chain.nl"));
        assert!(matches!(
            resolve_caller(pem.as_bytes()),
            Err(IdentityError::MissingCommonName)
        ));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(
            resolve_caller(b"not a certificate"),
            Err(IdentityError::MissingPem)
        ));
        assert!(resolve_caller(b"-----BEGIN CERTIFICATE-----\n!!!\n-----END CERTIFICATE-----").is_err());
        assert!(resolve_caller(b"").is_err());
    }

    #[test]
    fn short_organization_takes_first_label() {
        assert_eq!(short_organization("ns.transport-chain.nl"), "ns");
        assert_eq!(short_organization("plain"), "plain");
        assert_eq!(short_organization(""), "");
    }
}
