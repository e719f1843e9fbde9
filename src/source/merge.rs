//! Attaches provider schemas to the core module schema.

use std::collections::HashSet;

use tracing::{info, warn};

use super::address::ProviderAddress;
use super::error::{Result, SourceError};
use super::store::ProviderStore;
use super::tfjson::ProviderSchema;
use crate::schema::BodySchema;

pub struct SchemaMerger {
    core: BodySchema,
}

impl SchemaMerger {
    pub fn new(core: BodySchema) -> Self {
        Self { core }
    }

    /// Merge every provider configured in `store` into the core schema.
    ///
    /// Provider bodies are keyed by local name on the `provider` block; resource and data-source
    /// bodies are keyed by type name on `resource` and `data`, once per address.
    pub fn merge(mut self, store: &ProviderStore) -> Result<BodySchema> {
        let requirements = store.requirements();
        let mut attached: HashSet<&ProviderAddress> = HashSet::new();

        for (local_name, address) in store.references() {
            let constraint = requirements
                .get(address)
                .ok_or_else(|| SourceError::ProviderNotFound { address: address.to_string() })?;
            let ProviderSchema { provider, resources, data_sources } = store.provider_schema(address, constraint)?;

            self.attach("provider", local_name, provider);
            if !attached.insert(address) {
                continue;
            }
            info!(%local_name, %address, resources = resources.len(), data_sources = data_sources.len(), "merging provider");
            for (name, body) in resources {
                self.attach("resource", &name, body);
            }
            for (name, body) in data_sources {
                self.attach("data", &name, body);
            }
        }
        Ok(self.core)
    }

    fn attach(&mut self, block: &str, value: &str, body: BodySchema) {
        match self.core.blocks.get_mut(block) {
            Some(schema) => schema.add_dependent(0, value, body),
            None => warn!(block, value, "core schema lacks block; dependent body dropped"),
        }
    }
}
