// Strongly-typed IR handed to contract generation. Serde derives give the wire shape directly:
// unit variants become bare strings, the rest single-key containers.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Type {
    Dynamic,
    String,
    Number,
    Bool,
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<u64>,
        content: Box<Type>,
    },
    Object {
        open: bool,
        content: IndexMap<String, Attribute>,
    },
    Dictionary(Box<Type>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub description: String,
    pub optional: bool,
    pub computed: bool,
    #[serde(rename = "type")]
    pub ty: Type,
}

/// Location of one provider-computed attribute in the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub force: bool,
    pub path: Vec<String>,
}

/// Everything one lowering pass produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaIr {
    pub computed_fields: Vec<FieldDescriptor>,
    pub schema: IndexMap<String, Attribute>,
}

impl Type {
    /// `List` with bounds only where the source declares a nonzero one.
    pub fn list(min_items: u64, max_items: u64, content: Type) -> Self {
        Type::List {
            min: (min_items != 0).then_some(min_items),
            max: (max_items != 0).then_some(max_items),
            content: Box::new(content),
        }
    }

    pub fn object(open: bool, content: IndexMap<String, Attribute>) -> Self {
        Type::Object { open, content }
    }

    pub fn dictionary(content: Type) -> Self {
        Type::Dictionary(Box::new(content))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List { .. })
    }
}

impl Attribute {
    /// Container attribute produced for blocks and label expansions.
    pub fn container(description: impl Into<String>, ty: Type) -> Self {
        Self {
            description: description.into(),
            optional: true,
            computed: false,
            ty,
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
