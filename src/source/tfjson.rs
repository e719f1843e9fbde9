//! `terraform providers schema -json` documents and their conversion into the schema model.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::schema::{AttributeSchema, BlockSchema, BlockType, BodySchema, ExprConstraint, LiteralType};

// ————————————————————————————————————————————————————————————————————————————
// DOCUMENT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSchemasJson {
    #[serde(default)]
    pub format_version: String,
    /// Keyed by fully qualified provider address.
    #[serde(default)]
    pub provider_schemas: IndexMap<String, ProviderSchemaJson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSchemaJson {
    #[serde(default)]
    pub provider: Option<SchemaJson>,
    #[serde(default)]
    pub resource_schemas: IndexMap<String, SchemaJson>,
    #[serde(default)]
    pub data_source_schemas: IndexMap<String, SchemaJson>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaJson {
    #[serde(default)]
    pub version: u64,
    pub block: BlockJson,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockJson {
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeJson>,
    #[serde(default)]
    pub block_types: IndexMap<String, BlockTypeJson>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeJson {
    #[serde(default, rename = "type")]
    pub ty: Option<LiteralType>,
    #[serde(default)]
    pub nested_type: Option<NestedTypeJson>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub deprecated: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NestedTypeJson {
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeJson>,
    pub nesting_mode: NestingMode,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockTypeJson {
    pub nesting_mode: NestingMode,
    #[serde(default)]
    pub block: BlockJson,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestingMode {
    Single,
    Group,
    List,
    Set,
    Map,
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSION
// ————————————————————————————————————————————————————————————————————————————

/// One provider's schemas in model form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSchema {
    pub provider: BodySchema,
    pub resources: IndexMap<String, BodySchema>,
    pub data_sources: IndexMap<String, BodySchema>,
}

impl From<ProviderSchemaJson> for ProviderSchema {
    fn from(json: ProviderSchemaJson) -> Self {
        let top_level = |schemas: IndexMap<String, SchemaJson>| -> IndexMap<String, BodySchema> {
            schemas.into_iter().map(|(name, schema)| (name, schema.block.into_body())).collect()
        };
        Self {
            provider: json.provider.map(|schema| schema.block.into_body()).unwrap_or_default(),
            resources: top_level(json.resource_schemas),
            data_sources: top_level(json.data_source_schemas),
        }
    }
}

impl BlockJson {
    /// The block's description lands on the body, where the assembler picks up descriptions of
    /// label-selected bodies.
    pub fn into_body(self) -> BodySchema {
        BodySchema {
            description: self.description.filter(|d| !d.is_empty()),
            attributes: self.attributes.into_iter().map(|(k, a)| (k, a.into_schema())).collect(),
            blocks: self.block_types.into_iter().map(|(k, b)| (k, b.into_schema())).collect(),
            any_attribute: None,
        }
    }
}

impl BlockTypeJson {
    pub fn into_schema(self) -> BlockSchema {
        let description = self.block.description.clone().filter(|d| !d.is_empty());
        let block = match self.nesting_mode {
            NestingMode::Single | NestingMode::Group => BlockSchema::new(BlockType::Object),
            NestingMode::List => BlockSchema::new(BlockType::List),
            NestingMode::Set => BlockSchema::new(BlockType::Set),
            // map-nested blocks are written with one free-form key label
            NestingMode::Map => BlockSchema::new(BlockType::Nil).label("key", false),
        };
        let mut block = block.items(self.min_items, self.max_items).body(self.block.into_body());
        block.description = description;
        block
    }
}

impl AttributeJson {
    pub fn into_schema(self) -> AttributeSchema {
        let constraints = match (self.nested_type, &self.ty) {
            (Some(nested), _) => nested.into_constraints(),
            (None, Some(ty)) => type_constraints(ty),
            (None, None) => Vec::new(),
        };
        AttributeSchema {
            description: self.description.filter(|d| !d.is_empty()),
            is_optional: self.optional,
            is_required: self.required,
            is_computed: self.computed,
            is_sensitive: self.sensitive,
            constraints,
        }
    }
}

impl NestedTypeJson {
    fn into_constraints(self) -> Vec<ExprConstraint> {
        let object = ExprConstraint::Object {
            attributes: self.attributes.into_iter().map(|(k, a)| (k, a.into_schema())).collect(),
        };
        let (min_items, max_items) = (self.min_items, self.max_items);
        let constraint = match self.nesting_mode {
            NestingMode::Single | NestingMode::Group => object,
            NestingMode::List => ExprConstraint::List { elem: vec![object], min_items, max_items },
            NestingMode::Set => ExprConstraint::Set { elem: vec![object], min_items, max_items },
            NestingMode::Map => ExprConstraint::Map { elem: vec![object] },
        };
        vec![constraint]
    }
}

/// Constraints accepted for a value of type `ty`.
pub fn type_constraints(ty: &LiteralType) -> Vec<ExprConstraint> {
    let constraint = match ty {
        LiteralType::List(elem) => ExprConstraint::List { elem: type_constraints(elem), min_items: 0, max_items: 0 },
        LiteralType::Set(elem) => ExprConstraint::Set { elem: type_constraints(elem), min_items: 0, max_items: 0 },
        LiteralType::Map(elem) => ExprConstraint::Map { elem: type_constraints(elem) },
        LiteralType::Object(fields) => ExprConstraint::Object {
            attributes: fields
                .iter()
                .map(|(key, field)| (key.clone(), AttributeSchema::optional(type_constraints(field))))
                .collect(),
        },
        LiteralType::Tuple(elems) => ExprConstraint::Tuple { elems: elems.iter().map(type_constraints).collect() },
        primitive => ExprConstraint::LiteralType(primitive.clone()),
    };
    vec![constraint]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attribute(value: serde_json::Value) -> AttributeSchema {
        serde_json::from_value::<AttributeJson>(value).unwrap().into_schema()
    }

    fn block_type(value: serde_json::Value) -> BlockSchema {
        serde_json::from_value::<BlockTypeJson>(value).unwrap().into_schema()
    }

    #[test]
    fn primitive_attribute_keeps_flags() {
        let attr = attribute(json!({ "type": "string", "optional": true, "computed": true, "description": "ARN" }));
        assert!(attr.is_optional && attr.is_computed && !attr.is_required);
        assert_eq!(attr.description.as_deref(), Some("ARN"));
        assert_eq!(attr.constraints, vec![ExprConstraint::string()]);
    }

    #[test]
    fn collection_types_nest() {
        let attr = attribute(json!({ "type": ["set", ["object", { "port": "number" }]], "optional": true }));
        let [ExprConstraint::Set { elem, .. }] = attr.constraints.as_slice() else { panic!("expected set") };
        let [ExprConstraint::Object { attributes }] = elem.as_slice() else { panic!("expected object") };
        assert_eq!(attributes["port"].constraints, vec![ExprConstraint::number()]);
        assert!(attributes["port"].is_optional);

        let attr = attribute(json!({ "type": ["map", "string"], "optional": true }));
        assert_eq!(attr.constraints, vec![ExprConstraint::Map { elem: vec![ExprConstraint::string()] }]);
    }

    #[test]
    fn dynamic_and_untyped_attributes() {
        assert_eq!(attribute(json!({ "type": "dynamic" })).constraints, vec![ExprConstraint::literal(LiteralType::Dynamic)]);
        assert!(attribute(json!({ "computed": true })).constraints.is_empty());
    }

    #[test]
    fn nested_type_attribute_becomes_object_shapes() {
        let attr = attribute(json!({
            "nested_type": {
                "attributes": { "id": { "type": "string", "computed": true } },
                "nesting_mode": "list",
                "max_items": 3
            },
            "optional": true
        }));
        let [ExprConstraint::List { elem, max_items, .. }] = attr.constraints.as_slice() else { panic!("expected list") };
        assert_eq!(*max_items, 3);
        assert!(matches!(elem.as_slice(), [ExprConstraint::Object { .. }]));
    }

    #[test]
    fn block_nesting_modes() {
        let single = block_type(json!({ "nesting_mode": "single", "block": { "description": "Timeouts" } }));
        assert_eq!(single.block_type, BlockType::Object);
        assert_eq!(single.description.as_deref(), Some("Timeouts"));

        let set = block_type(json!({ "nesting_mode": "set", "block": {}, "min_items": 1 }));
        assert_eq!((set.block_type, set.min_items, set.max_items), (BlockType::Set, 1, 0));

        let map = block_type(json!({ "nesting_mode": "map", "block": { "attributes": { "a": { "type": "bool" } } } }));
        assert_eq!(map.block_type, BlockType::Nil);
        assert_eq!(map.labels.len(), 1);
        assert!(!map.labels[0].completable);
        assert!(map.body.unwrap().attributes.contains_key("a"));
    }

    #[test]
    fn provider_document_converts() {
        let doc: ProviderSchemasJson = serde_json::from_value(json!({
            "format_version": "1.0",
            "provider_schemas": {
                "registry.terraform.io/hashicorp/random": {
                    "provider": { "version": 0, "block": {} },
                    "resource_schemas": {
                        "random_id": {
                            "version": 0,
                            "block": {
                                "description": "Random ID",
                                "attributes": { "hex": { "type": "string", "computed": true } }
                            }
                        }
                    }
                }
            }
        }))
        .unwrap();
        let schema = ProviderSchema::from(doc.provider_schemas[0].clone());
        assert_eq!(schema.resources["random_id"].description.as_deref(), Some("Random ID"));
        assert!(schema.resources["random_id"].attributes["hex"].is_computed);
        assert!(schema.data_sources.is_empty());
    }
}
