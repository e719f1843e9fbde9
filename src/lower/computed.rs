use crate::ir::FieldDescriptor;
use crate::path::Path;
use crate::schema::AttributeSchema;

/// Provenance records for provider-computed attributes found under one subtree.
///
/// Each conversion returns its own instance; parents append their children's in order, or
/// drop them when the subtree sits under list cardinality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedFields(Vec<FieldDescriptor>);

impl ComputedFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot `path` now; later path growth never reaches the record.
    pub fn record(&mut self, force: bool, path: &Path) {
        self.0.push(FieldDescriptor { force, path: path.to_vec() });
    }

    pub fn append(&mut self, other: ComputedFields) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<FieldDescriptor> {
        self.0
    }
}

/// Outcome of classifying one attribute's raw flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub optional: bool,
    pub computed: bool,
    /// `Some(force)` when the attribute must be reported as computed.
    pub report: Option<bool>,
}

/// Map raw `(optional, required, computed)` flags to IR flags.
///
/// Attributes come out optional: the contracts cannot mix required and computed members in one
/// record. Identifier fields named `id` are the exception and are never optional.
pub fn classify(path: &Path, schema: &AttributeSchema) -> Classification {
    let is_id = path.last() == Some("id");
    let optional = schema.is_optional && !is_id;

    let (computed, report) = match (optional, schema.is_required, schema.is_computed) {
        (true, false, false) | (false, true, false) => (false, None),
        (false, false, true) => (true, Some(true)),
        (true, false, true) => (true, Some(false)),
        _ => (false, None),
    };

    Classification { optional: !is_id, computed, report }
}
