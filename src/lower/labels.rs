use indexmap::IndexMap;

use crate::schema::{BlockSchema, BodySchema};

/// What one label position of a block ranges over.
#[derive(Debug, Clone)]
pub struct Label<'s> {
    /// Known label values and the dependent body each selects.
    pub possible_values: IndexMap<String, &'s BodySchema>,
    pub wildcard: bool,
}

impl<'s> Label<'s> {
    fn wildcard() -> Self {
        Self { possible_values: IndexMap::new(), wildcard: true }
    }
}

/// One [`Label`] per label position, in position order.
///
/// Completable positions collect the values named by dependent-body keys for that position;
/// a later dependent body for the same value replaces an earlier one.
pub fn classify_labels(block: &BlockSchema) -> Vec<Label<'_>> {
    block
        .labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            if !label.completable {
                return Label::wildcard();
            }
            let mut possible_values = IndexMap::new();
            for dependent in &block.dependent_body {
                for key in dependent.keys.labels.iter().filter(|key| key.index == index) {
                    possible_values.insert(key.value.clone(), &dependent.body);
                }
            }
            Label { possible_values, wildcard: false }
        })
        .collect()
}

pub fn includes_wildcard(labels: &[Label<'_>]) -> bool {
    labels.iter().any(|label| label.wildcard)
}
