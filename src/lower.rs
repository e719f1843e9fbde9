//! Lowering: merged module schema → IR.
//!
//! Depth-first and single pass. Bodies hand each attribute to the type extractor and each block
//! to the block assembler, which expands label cross-products and comes back here for the
//! bodies selected along the way. Every call returns the computed fields it discovered; parents
//! concatenate them, except beneath list cardinality where they are dropped.
pub mod block;
pub mod computed;
pub mod extract;
pub mod labels;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::ir::{Attribute, SchemaIr};
use crate::path::Path;
use crate::schema::{BlockType, BodySchema};

pub use block::{convert_block, effective_block_type};
pub use computed::{classify, Classification, ComputedFields};
pub use extract::{convert_attribute, extract_type};
pub use labels::{classify_labels, Label};

/// Schema shapes the lowering pass refuses to guess about.
#[derive(Debug, Error)]
pub enum LowerError {
    #[error("unsupported schema at {path}: {reason}")]
    UnsupportedSchema { path: Path, reason: &'static str },

    #[error("unrecognized block type {block_type:?} at {path}")]
    UnknownBlockType { path: Path, block_type: BlockType },
}

pub type Members = IndexMap<String, Attribute>;

// ------------------------------- Front API -------------------------------- //

/// Lower the root body of a module schema.
pub fn lower_module(body: &BodySchema) -> Result<SchemaIr, LowerError> {
    lower_bodies(&[body])
}

/// Lower several root bodies as one module; later bodies win on key collisions.
pub fn lower_bodies(bodies: &[&BodySchema]) -> Result<SchemaIr, LowerError> {
    let (schema, fields) = assemble_bodies(&Path::root(), bodies)?;
    info!(
        bodies = bodies.len(),
        attributes = schema.len(),
        computed_fields = fields.len(),
        "lowered module schema"
    );
    Ok(SchemaIr { computed_fields: fields.into_vec(), schema })
}

/// Merge the members several bodies contribute at the same path; a later body's key replaces
/// an earlier body's.
pub fn assemble_bodies(path: &Path, bodies: &[&BodySchema]) -> Result<(Members, ComputedFields), LowerError> {
    let mut merged = Members::new();
    let mut fields = ComputedFields::new();
    for body in bodies {
        let (members, body_fields) = assemble_body(path, body)?;
        fields.append(body_fields);
        for (key, attribute) in members {
            if merged.insert(key, attribute).is_some() {
                debug!(%path, "later body overrides an earlier member");
            }
        }
    }
    Ok((merged, fields))
}

/// Attributes first, then blocks; a block replaces an attribute of the same name.
pub fn assemble_body(path: &Path, body: &BodySchema) -> Result<(Members, ComputedFields), LowerError> {
    let mut members = Members::with_capacity(body.attributes.len() + body.blocks.len());
    let mut fields = ComputedFields::new();

    for (key, attr) in &body.attributes {
        let (attribute, attr_fields) = convert_attribute(&path.child(key.as_str()), attr);
        fields.append(attr_fields);
        members.insert(key.clone(), attribute);
    }

    for (key, block) in &body.blocks {
        let (attribute, block_fields) = convert_block(&path.child(key.as_str()), block)?;
        fields.append(block_fields);
        members.insert(key.clone(), attribute);
    }

    Ok((members, fields))
}

// ------------------------------- Tests ------------------------------------ //
