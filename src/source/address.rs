//! Provider source addresses: `[host/]namespace/type`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::{Result, SourceError};

pub const DEFAULT_REGISTRY_HOST: &str = "registry.terraform.io";
/// Namespace assumed for bare provider names.
pub const LEGACY_NAMESPACE: &str = "hashicorp";

static SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-z](?:[0-9a-z-]*[0-9a-z])?$").expect("segment pattern"));
static HOSTNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9a-z](?:[0-9a-z.-]*[0-9a-z])?(?::[0-9]+)?$").expect("hostname pattern"));

/// Fully qualified provider address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderAddress {
    pub hostname: String,
    pub namespace: String,
    pub kind: String,
}

impl ProviderAddress {
    pub fn new(hostname: impl Into<String>, namespace: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { hostname: hostname.into(), namespace: namespace.into(), kind: kind.into() }
    }

    /// Parse a source string. Missing parts fall back to the public registry and the legacy
    /// namespace; all parts are case-folded.
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason| SourceError::InvalidProviderSource { input: input.to_string(), reason };

        let normalized = input.trim().to_ascii_lowercase();
        let parts: Vec<&str> = normalized.split('/').collect();
        let (hostname, namespace, kind) = match parts.as_slice() {
            [kind] => (DEFAULT_REGISTRY_HOST, LEGACY_NAMESPACE, *kind),
            [namespace, kind] => (DEFAULT_REGISTRY_HOST, *namespace, *kind),
            [hostname, namespace, kind] => (*hostname, *namespace, *kind),
            _ => return Err(invalid("expected [hostname/]namespace/type")),
        };

        if !HOSTNAME.is_match(hostname) {
            return Err(invalid("invalid hostname"));
        }
        if !SEGMENT.is_match(namespace) {
            return Err(invalid("invalid namespace"));
        }
        if !SEGMENT.is_match(kind) {
            return Err(invalid("invalid provider type"));
        }
        if kind.starts_with("terraform-provider-") {
            return Err(invalid("provider type must not carry the terraform-provider- prefix"));
        }
        Ok(Self::new(hostname, namespace, kind))
    }
}

impl fmt::Display for ProviderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.hostname, self.namespace, self.kind)
    }
}

impl std::str::FromStr for ProviderAddress {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
