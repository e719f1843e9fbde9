//! Schema source: resolves a provider directory into the merged module schema.
pub mod address;
pub mod builtin;
pub mod error;
pub mod merge;
pub mod store;
pub mod tfjson;
pub mod version;

pub use address::ProviderAddress;
pub use error::SourceError;
pub use merge::SchemaMerger;
pub use store::{ProviderSpec, ProviderStore};
pub use tfjson::ProviderSchema;
pub use version::{Version, VersionConstraint};

use crate::schema::BodySchema;

/// Core module schema with every provider configured under `dir` attached.
pub fn load_module_schema(dir: impl AsRef<std::path::Path>) -> error::Result<BodySchema> {
    let store = ProviderStore::open(dir)?;
    SchemaMerger::new(builtin::core_module_schema()).merge(&store)
}
