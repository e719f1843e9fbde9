//! Configured providers and their persisted schemas.
//!
//! Layout of a provider directory:
//!
//! ```text
//! <dir>/providers.json          { "<local name>": { "source": "<address>", "version": "<x.y.z>" } }
//! <dir>/schemas/<local>.json    `terraform providers schema -json` output
//! ```

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::address::ProviderAddress;
use super::error::{Result, SourceError};
use super::tfjson::{ProviderSchema, ProviderSchemasJson};
use super::version::{Version, VersionConstraint};
use crate::path_de::{from_slice_with_path, PathError};

pub const PROVIDERS_FILE: &str = "providers.json";
pub const SCHEMAS_DIR: &str = "schemas";

/// One entry of `providers.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub source: String,
    pub version: String,
}

#[derive(Debug, Clone)]
struct ConfiguredProvider {
    local_name: String,
    version: Version,
    schema_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ProviderStore {
    root: PathBuf,
    references: IndexMap<String, ProviderAddress>,
    providers: IndexMap<ProviderAddress, ConfiguredProvider>,
}

impl ProviderStore {
    /// Load `providers.json` from `dir`. Schema files are only checked for existence here; they
    /// are decoded on request.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let root = dir.as_ref().to_path_buf();
        let specs_path = root.join(PROVIDERS_FILE);
        let specs: IndexMap<String, ProviderSpec> = read_json(&specs_path)?;

        let mut references = IndexMap::with_capacity(specs.len());
        let mut providers = IndexMap::with_capacity(specs.len());
        for (local_name, spec) in specs {
            let address = ProviderAddress::parse(&spec.source)?;
            let version = Version::parse(&spec.version)?;
            let schema_file = root.join(SCHEMAS_DIR).join(format!("{local_name}.json"));
            if !schema_file.is_file() {
                return Err(SourceError::io(
                    &schema_file,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "provider schema file is missing"),
                ));
            }
            debug!(%local_name, %address, %version, "configured provider");

            references.insert(local_name.clone(), address.clone());
            let configured = ConfiguredProvider { local_name, version, schema_file };
            if let Some(previous) = providers.insert(address.clone(), configured) {
                warn!(%address, shadowed = %previous.local_name, "several local names share one provider address");
            }
        }
        info!(dir = %root.display(), providers = providers.len(), "opened provider store");
        Ok(Self { root, references, providers })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every configured address pinned to exactly its configured version.
    pub fn requirements(&self) -> IndexMap<ProviderAddress, VersionConstraint> {
        self.providers
            .iter()
            .map(|(address, provider)| (address.clone(), VersionConstraint::exact(&provider.version)))
            .collect()
    }

    /// Local name → address, in configuration order.
    pub fn references(&self) -> &IndexMap<String, ProviderAddress> {
        &self.references
    }

    /// Decode the schema of the provider at `address`, provided its configured version satisfies
    /// `constraint`.
    pub fn provider_schema(&self, address: &ProviderAddress, constraint: &VersionConstraint) -> Result<ProviderSchema> {
        let provider = self
            .providers
            .get(address)
            .ok_or_else(|| SourceError::ProviderNotFound { address: address.to_string() })?;

        if !constraint.check(&provider.version) {
            return Err(SourceError::VersionIncompatible {
                address: address.to_string(),
                version: provider.version.to_string(),
                constraint: constraint.to_string(),
            });
        }

        let mut document: ProviderSchemasJson = read_json(&provider.schema_file)?;
        let key = address.to_string();
        let schema = document
            .provider_schemas
            .swap_remove(&key)
            .ok_or(SourceError::SchemaNotFound { address: key })?;
        info!(
            %address,
            version = %provider.version,
            resources = schema.resource_schemas.len(),
            data_sources = schema.data_source_schemas.len(),
            "loaded provider schema"
        );
        Ok(schema.into())
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|err| SourceError::io(path, err))?;
    from_slice_with_path(&bytes).map_err(|PathError { path: json_path, message }| SourceError::Decode {
        file: path.to_path_buf(),
        path: json_path,
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};
    use serde_json::json;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, value: serde_json::Value) {
        let path = dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, serde_json::to_vec_pretty(&value).unwrap()).unwrap();
    }

    fn random_store() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "providers.json", json!({ "random": { "source": "hashicorp/random", "version": "3.6.0" } }));
        write(
            dir.path(),
            "schemas/random.json",
            json!({
                "format_version": "1.0",
                "provider_schemas": {
                    "registry.terraform.io/hashicorp/random": {
                        "provider": { "version": 0, "block": {} },
                        "resource_schemas": {
                            "random_id": { "version": 0, "block": { "attributes": { "hex": { "type": "string", "computed": true } } } }
                        }
                    }
                }
            }),
        );
        dir
    }

    fn random() -> ProviderAddress {
        ProviderAddress::parse("hashicorp/random").unwrap()
    }

    #[test]
    fn requirements_pin_configured_versions() {
        let dir = random_store();
        let store = ProviderStore::open(dir.path()).unwrap();
        let requirements = store.requirements();
        assert_eq!(requirements[&random()].to_string(), "= 3.6.0");
        assert_eq!(store.references()["random"], random());
    }

    #[test]
    fn loads_schema_for_matching_version() {
        let dir = random_store();
        let store = ProviderStore::open(dir.path()).unwrap();
        let schema = store.provider_schema(&random(), &VersionConstraint::parse(">= 3.0").unwrap()).unwrap();
        assert!(schema.resources["random_id"].attributes["hex"].is_computed);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let dir = random_store();
        let store = ProviderStore::open(dir.path()).unwrap();
        let err = store.provider_schema(&random(), &VersionConstraint::parse("= 3.5.0").unwrap()).unwrap_err();
        assert!(matches!(err, SourceError::VersionIncompatible { .. }));
        assert_eq!(Error::from(err).kind(), ErrorKind::ProviderResolution);
    }

    #[test]
    fn unknown_address_is_not_found() {
        let dir = random_store();
        let store = ProviderStore::open(dir.path()).unwrap();
        let err = store.provider_schema(&ProviderAddress::parse("hashicorp/aws").unwrap(), &VersionConstraint::default()).unwrap_err();
        assert!(matches!(err, SourceError::ProviderNotFound { .. }));
    }

    #[test]
    fn schema_file_without_address_entry() {
        let dir = random_store();
        write(dir.path(), "schemas/random.json", json!({ "format_version": "1.0", "provider_schemas": {} }));
        let store = ProviderStore::open(dir.path()).unwrap();
        let err = store.provider_schema(&random(), &VersionConstraint::default()).unwrap_err();
        assert!(matches!(err, SourceError::SchemaNotFound { ref address } if address == "registry.terraform.io/hashicorp/random"));
    }

    #[test]
    fn malformed_providers_file_reports_json_path() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "providers.json", json!({ "random": { "source": "hashicorp/random", "version": 3 } }));
        let err = ProviderStore::open(dir.path()).unwrap_err();
        let SourceError::Decode { path, .. } = &err else { panic!("expected decode error, got {err}") };
        assert_eq!(path, "random.version");
    }

    #[test]
    fn missing_directory_is_io() {
        let dir = TempDir::new().unwrap();
        let err = ProviderStore::open(dir.path().join("absent")).unwrap_err();
        assert_eq!(Error::from(err).kind(), ErrorKind::Io);
    }

    #[test]
    fn missing_schema_file_fails_open() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "providers.json", json!({ "aws": { "source": "hashicorp/aws", "version": "5.0.0" } }));
        assert!(matches!(ProviderStore::open(dir.path()), Err(SourceError::Io { .. })));
    }
}
