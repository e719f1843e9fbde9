use indexmap::IndexMap;
use tracing::{debug, trace};

use super::computed::ComputedFields;
use super::extract::convert_attribute;
use super::labels::{classify_labels, includes_wildcard, Label};
use super::{assemble_bodies, LowerError};
use crate::ir::{Attribute, Type};
use crate::path::{forces_object, is_open_object, Path};
use crate::schema::{BlockSchema, BlockType, BodySchema};

/// Convert a nested block at `path` into the attribute representing it.
pub fn convert_block(path: &Path, block: &BlockSchema) -> Result<(Attribute, ComputedFields), LowerError> {
    if let Some(body) = &block.body {
        if let Some(any) = &body.any_attribute {
            if !body.attributes.is_empty() || !body.blocks.is_empty() {
                return Err(LowerError::UnsupportedSchema {
                    path: path.clone(),
                    reason: "catch-all attribute declared next to explicit attributes or blocks",
                });
            }
            let (inner, fields) = convert_attribute(&path.wildcard(), any);
            let description = block.description.clone().unwrap_or_default();
            return Ok((Attribute::container(description, Type::dictionary(inner.ty)), fields));
        }
    }

    let assembly = BlockAssembly { block, labels: classify_labels(block) };
    let bodies: Vec<&BodySchema> = block.body.iter().collect();
    assembly.assemble(path, &assembly.labels, &bodies)
}

/// Effective cardinality of a block once all its labels are resolved.
pub fn effective_block_type(path: &Path, labels: &[Label<'_>], block: &BlockSchema) -> BlockType {
    if forces_object(path) || block.max_items == 1 {
        return BlockType::Object;
    }
    match block.block_type {
        BlockType::Nil if includes_wildcard(labels) => BlockType::Object,
        BlockType::Nil => BlockType::List,
        declared => declared,
    }
}

struct BlockAssembly<'s> {
    block: &'s BlockSchema,
    labels: Vec<Label<'s>>,
}

impl<'s> BlockAssembly<'s> {
    /// Expand the label cross-product depth first. `bodies` holds the block body followed by the
    /// dependent bodies chosen by already-resolved label positions.
    fn assemble(
        &self,
        path: &Path,
        remaining: &[Label<'s>],
        bodies: &[&'s BodySchema],
    ) -> Result<(Attribute, ComputedFields), LowerError> {
        let Some((label, rest)) = remaining.split_first() else {
            return self.finish(path, bodies);
        };
        let description = self.block.description.clone().unwrap_or_default();

        if label.wildcard {
            let (inner, fields) = self.assemble(&path.wildcard(), rest, bodies)?;
            return Ok((Attribute::container(description, Type::dictionary(inner.ty)), fields));
        }

        let mut fields = ComputedFields::new();
        let mut content = IndexMap::with_capacity(label.possible_values.len());
        for (value, body) in &label.possible_values {
            let mut selected = bodies.to_vec();
            selected.push(*body);
            let (attribute, branch_fields) = self.assemble(&path.child(value.as_str()), rest, &selected)?;
            fields.append(branch_fields);
            content.insert(value.clone(), attribute);
        }
        let ty = Type::object(is_open_object(path), content);
        Ok((Attribute::container(description, ty), fields))
    }

    fn finish(&self, path: &Path, bodies: &[&'s BodySchema]) -> Result<(Attribute, ComputedFields), LowerError> {
        let block_type = effective_block_type(path, &self.labels, self.block);
        let as_list = match block_type {
            BlockType::Object => false,
            BlockType::List | BlockType::Set => true,
            other => {
                return Err(LowerError::UnknownBlockType { path: path.clone(), block_type: other });
            }
        };
        trace!(%path, ?block_type, bodies = bodies.len(), "assembling block body");

        let (content, mut fields) = assemble_bodies(path, bodies)?;
        if as_list && !fields.is_empty() {
            debug!(%path, hidden = fields.len(), "dropping computed fields under list block");
            fields = ComputedFields::new();
        }

        let description = bodies
            .last()
            .and_then(|body| body.description.clone())
            .or_else(|| self.block.description.clone())
            .unwrap_or_default();

        let object = Type::object(is_open_object(path), content);
        let ty = if as_list {
            Type::list(self.block.min_items, self.block.max_items, object)
        } else {
            object
        };
        Ok((Attribute::container(description, ty), fields))
    }
}
