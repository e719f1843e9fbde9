use indexmap::IndexMap;
use tracing::trace;

use super::computed::{classify, ComputedFields};
use crate::ir::{Attribute, Type};
use crate::path::Path;
use crate::schema::{AttributeSchema, ExprConstraint, LiteralType};

/// Convert one attribute schema at `path`.
///
/// List-typed attributes are never reported as computed: the contracts cannot express computed
/// values beneath list cardinality.
pub fn convert_attribute(path: &Path, schema: &AttributeSchema) -> (Attribute, ComputedFields) {
    let (ty, mut fields) = extract_type(path, &schema.constraints);

    let (optional, computed) = if ty.is_list() {
        (true, false)
    } else {
        let class = classify(path, schema);
        if let Some(force) = class.report {
            fields.record(force, path);
        }
        (class.optional, class.computed)
    };

    let attribute = Attribute {
        description: schema.description.clone().unwrap_or_default(),
        optional,
        computed,
        ty,
    };
    (attribute, fields)
}

/// Pick an IR type from an attribute's constraint alternatives. First rule that matches wins:
/// object shape, then list/set shape, then a literal primitive type, else `Dynamic`.
pub fn extract_type(path: &Path, constraints: &[ExprConstraint]) -> (Type, ComputedFields) {
    if let Some(found) = object_type(path, constraints) {
        return found;
    }
    if let Some(ty) = list_type(path, constraints) {
        return (ty, ComputedFields::new());
    }
    (literal_type(constraints), ComputedFields::new())
}

fn object_type(path: &Path, constraints: &[ExprConstraint]) -> Option<(Type, ComputedFields)> {
    let attributes = constraints.iter().find_map(|c| match c {
        ExprConstraint::Object { attributes } => Some(attributes),
        _ => None,
    })?;

    let mut fields = ComputedFields::new();
    let mut content = IndexMap::with_capacity(attributes.len());
    for (key, member) in attributes {
        let (attribute, member_fields) = convert_attribute(&path.child(key.as_str()), member);
        fields.append(member_fields);
        content.insert(key.clone(), attribute);
    }
    Some((Type::object(false, content), fields))
}

fn list_type(path: &Path, constraints: &[ExprConstraint]) -> Option<Type> {
    constraints.iter().find_map(|c| match c {
        ExprConstraint::List { elem, min_items, max_items } | ExprConstraint::Set { elem, min_items, max_items } => {
            // element paths don't compose under iteration
            let (content, hidden) = extract_type(path, elem);
            if !hidden.is_empty() {
                trace!(%path, hidden = hidden.len(), "dropping computed fields inside list element");
            }
            Some(Type::list(*min_items, *max_items, content))
        }
        _ => None,
    })
}

fn literal_type(constraints: &[ExprConstraint]) -> Type {
    constraints
        .iter()
        .find_map(|c| match c {
            ExprConstraint::LiteralType(ty) => Some(primitive(ty)),
            _ => None,
        })
        .unwrap_or(Type::Dynamic)
}

fn primitive(ty: &LiteralType) -> Type {
    match ty {
        LiteralType::String => Type::String,
        LiteralType::Number => Type::Number,
        LiteralType::Bool => Type::Bool,
        _ => Type::Dynamic,
    }
}
