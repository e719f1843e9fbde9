//! Input schema tree: the merged module schema the lowering pass consumes.
//!
//! Mirrors the shape schema-resolution produces for a configuration module: bodies hold
//! attributes and nested blocks, blocks carry labels, cardinality and bodies that only apply for
//! particular label values. Everything (de)serializes, so a merged schema can be dumped and
//! lowered later.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ————————————————————————————————————————————————————————————————————————————
// BODIES & BLOCKS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodySchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, AttributeSchema>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub blocks: IndexMap<String, BlockSchema>,
    /// Catch-all accepting any attribute name with this schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_attribute: Option<Box<AttributeSchema>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LabelSchema>,
    #[serde(default)]
    pub block_type: BlockType,
    #[serde(default)]
    pub min_items: u64,
    #[serde(default)]
    pub max_items: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodySchema>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependent_body: Vec<DependentBody>,
}

/// Declared cardinality of a block. `Nil` means the schema left it unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    #[default]
    Nil,
    Object,
    List,
    Set,
    Map,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the label ranges over values known from dependent bodies.
    #[serde(default)]
    pub completable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentBody {
    pub keys: DependencyKeys,
    pub body: BodySchema,
}

/// Which literal label values select a dependent body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyKeys {
    #[serde(default)]
    pub labels: Vec<LabelDependent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDependent {
    pub index: usize,
    pub value: String,
}

// ————————————————————————————————————————————————————————————————————————————
// ATTRIBUTES & CONSTRAINTS
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub is_computed: bool,
    #[serde(default)]
    pub is_sensitive: bool,
    /// Alternative expression shapes the attribute accepts.
    #[serde(default)]
    pub constraints: Vec<ExprConstraint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExprConstraint {
    Object {
        attributes: IndexMap<String, AttributeSchema>,
    },
    List {
        elem: Vec<ExprConstraint>,
        #[serde(default)]
        min_items: u64,
        #[serde(default)]
        max_items: u64,
    },
    Set {
        elem: Vec<ExprConstraint>,
        #[serde(default)]
        min_items: u64,
        #[serde(default)]
        max_items: u64,
    },
    Map {
        elem: Vec<ExprConstraint>,
    },
    Tuple {
        elems: Vec<Vec<ExprConstraint>>,
    },
    LiteralType(LiteralType),
    LiteralValue(serde_json::Value),
    Keyword(String),
    Reference,
}

/// A value type in the provider type system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralType {
    Dynamic,
    String,
    Number,
    Bool,
    List(Box<LiteralType>),
    Set(Box<LiteralType>),
    Map(Box<LiteralType>),
    Object(IndexMap<String, LiteralType>),
    Tuple(Vec<LiteralType>),
}

impl LiteralType {
    pub fn is_primitive(&self) -> bool {
        matches!(self, LiteralType::String | LiteralType::Number | LiteralType::Bool)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// BUILDERS
// ————————————————————————————————————————————————————————————————————————————

impl BodySchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, attr: AttributeSchema) -> Self {
        self.attributes.insert(key.into(), attr);
        self
    }

    pub fn block(mut self, key: impl Into<String>, block: BlockSchema) -> Self {
        self.blocks.insert(key.into(), block);
        self
    }

    pub fn any_attribute(mut self, attr: AttributeSchema) -> Self {
        self.any_attribute = Some(Box::new(attr));
        self
    }
}

impl BlockSchema {
    pub fn new(block_type: BlockType) -> Self {
        Self { block_type, ..Self::default() }
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn label(mut self, name: impl Into<String>, completable: bool) -> Self {
        self.labels.push(LabelSchema { name: name.into(), description: None, completable });
        self
    }

    pub fn items(mut self, min_items: u64, max_items: u64) -> Self {
        self.min_items = min_items;
        self.max_items = max_items;
        self
    }

    pub fn body(mut self, body: BodySchema) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach `body` for label position `index` taking `value`.
    pub fn dependent(mut self, index: usize, value: impl Into<String>, body: BodySchema) -> Self {
        self.add_dependent(index, value, body);
        self
    }

    pub fn add_dependent(&mut self, index: usize, value: impl Into<String>, body: BodySchema) {
        self.dependent_body.push(DependentBody {
            keys: DependencyKeys {
                labels: vec![LabelDependent { index, value: value.into() }],
            },
            body,
        });
    }
}

impl AttributeSchema {
    fn with_flags(optional: bool, required: bool, computed: bool, constraints: Vec<ExprConstraint>) -> Self {
        Self {
            description: None,
            is_optional: optional,
            is_required: required,
            is_computed: computed,
            is_sensitive: false,
            constraints,
        }
    }

    pub fn optional(constraints: Vec<ExprConstraint>) -> Self {
        Self::with_flags(true, false, false, constraints)
    }

    pub fn required(constraints: Vec<ExprConstraint>) -> Self {
        Self::with_flags(false, true, false, constraints)
    }

    pub fn computed(constraints: Vec<ExprConstraint>) -> Self {
        Self::with_flags(false, false, true, constraints)
    }

    pub fn optional_computed(constraints: Vec<ExprConstraint>) -> Self {
        Self::with_flags(true, false, true, constraints)
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ExprConstraint {
    pub fn literal(ty: LiteralType) -> Self {
        ExprConstraint::LiteralType(ty)
    }

    pub fn string() -> Self {
        ExprConstraint::LiteralType(LiteralType::String)
    }

    pub fn number() -> Self {
        ExprConstraint::LiteralType(LiteralType::Number)
    }

    pub fn bool() -> Self {
        ExprConstraint::LiteralType(LiteralType::Bool)
    }

    pub fn list_of(elem: Vec<ExprConstraint>) -> Self {
        ExprConstraint::List { elem, min_items: 0, max_items: 0 }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE ENCODING
// ————————————————————————————————————————————————————————————————————————————
//
// Primitive types are bare strings ("string", "dynamic"); the rest are two-element arrays
// tagged by kind: ["list", T], ["object", {..}], ["tuple", [T, ..]].

impl Serialize for LiteralType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        fn pair<S: Serializer, T: Serialize + ?Sized>(serializer: S, kind: &str, inner: &T) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(2))?;
            seq.serialize_element(kind)?;
            seq.serialize_element(inner)?;
            seq.end()
        }
        match self {
            LiteralType::Dynamic => serializer.serialize_str("dynamic"),
            LiteralType::String => serializer.serialize_str("string"),
            LiteralType::Number => serializer.serialize_str("number"),
            LiteralType::Bool => serializer.serialize_str("bool"),
            LiteralType::List(t) => pair(serializer, "list", t),
            LiteralType::Set(t) => pair(serializer, "set", t),
            LiteralType::Map(t) => pair(serializer, "map", t),
            LiteralType::Object(fields) => pair(serializer, "object", fields),
            LiteralType::Tuple(elems) => pair(serializer, "tuple", elems),
        }
    }
}

impl<'de> Deserialize<'de> for LiteralType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LiteralTypeVisitor;

        impl<'de> Visitor<'de> for LiteralTypeVisitor {
            type Value = LiteralType;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a type name or a [kind, element] pair")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<LiteralType, E> {
                match v {
                    "dynamic" => Ok(LiteralType::Dynamic),
                    "string" => Ok(LiteralType::String),
                    "number" => Ok(LiteralType::Number),
                    "bool" => Ok(LiteralType::Bool),
                    other => Err(E::unknown_variant(other, &["dynamic", "string", "number", "bool"])),
                }
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LiteralType, A::Error> {
                let kind: String = seq.next_element()?.ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let ty = match kind.as_str() {
                    "list" => LiteralType::List(Box::new(
                        seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?,
                    )),
                    "set" => LiteralType::Set(Box::new(
                        seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?,
                    )),
                    "map" => LiteralType::Map(Box::new(
                        seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?,
                    )),
                    "object" => LiteralType::Object(
                        seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?,
                    ),
                    "tuple" => LiteralType::Tuple(
                        seq.next_element()?.ok_or_else(|| de::Error::invalid_length(1, &self))?,
                    ),
                    other => {
                        return Err(de::Error::unknown_variant(other, &["list", "set", "map", "object", "tuple"]));
                    }
                };
                // object types may carry a third element listing optional attributes
                while seq.next_element::<de::IgnoredAny>()?.is_some() {}
                Ok(ty)
            }
        }

        deserializer.deserialize_any(LiteralTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_types_parse_nested_encoding() {
        let ty: LiteralType = serde_json::from_value(json!(["list", ["object", { "a": "string", "b": ["set", "number"] }]])).unwrap();
        let mut fields = IndexMap::new();
        fields.insert("a".to_string(), LiteralType::String);
        fields.insert("b".to_string(), LiteralType::Set(Box::new(LiteralType::Number)));
        assert_eq!(ty, LiteralType::List(Box::new(LiteralType::Object(fields))));
    }

    #[test]
    fn object_type_tolerates_optional_attribute_list() {
        let ty: LiteralType = serde_json::from_value(json!(["object", { "a": "bool" }, ["a"]])).unwrap();
        assert!(matches!(ty, LiteralType::Object(ref f) if f.len() == 1));
    }

    #[test]
    fn unknown_type_name_is_rejected() {
        assert!(serde_json::from_value::<LiteralType>(json!("complex")).is_err());
        assert!(serde_json::from_value::<LiteralType>(json!(["list"])).is_err());
    }

    #[test]
    fn only_scalars_are_primitive() {
        assert!(LiteralType::Number.is_primitive());
        assert!(!LiteralType::Dynamic.is_primitive());
        assert!(!LiteralType::List(Box::new(LiteralType::String)).is_primitive());
    }

    #[test]
    fn block_schema_defaults_when_fields_missing() {
        let block: BlockSchema = serde_json::from_value(json!({ "labels": [{ "name": "type", "completable": true }] })).unwrap();
        assert_eq!(block.block_type, BlockType::Nil);
        assert_eq!(block.max_items, 0);
        assert!(block.body.is_none());
        assert!(block.labels[0].completable);
    }

    #[test]
    fn body_schema_survives_a_dump_and_reload() {
        let body = BodySchema::new()
            .attribute("name", AttributeSchema::required(vec![ExprConstraint::string()]))
            .block(
                "rule",
                BlockSchema::new(BlockType::List)
                    .label("kind", true)
                    .dependent(0, "allow", BodySchema::new().described("allow rule")),
            );
        let text = serde_json::to_string(&body).unwrap();
        let back: BodySchema = serde_json::from_str(&text).unwrap();
        assert_eq!(back, body);
    }
}
