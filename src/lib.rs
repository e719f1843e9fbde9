//! Terraform provider schemas → configuration-contract IR.
//!
//! ```text
//! providers.json + schemas/*.json ──source──▶ BodySchema ──lower──▶ SchemaIr (JSON)
//! ```
pub mod error;
pub mod ir;
pub mod lower;
pub mod path;
pub mod path_de;
pub mod schema;
pub mod source;

pub use error::{Error, ErrorKind, Result};
pub use ir::{Attribute, FieldDescriptor, SchemaIr, Type};
pub use schema::BodySchema;

/// Resolve the providers configured under `dir` and lower the merged module schema.
pub fn generate(dir: impl AsRef<std::path::Path>) -> Result<SchemaIr> {
    let body = source::load_module_schema(dir)?;
    Ok(lower::lower_module(&body)?)
}
