use crate::common;

use indexmap::IndexMap;
use std::hash;

/// Map for selecting attributes in projection expressions.
///
/// ```rust
/// use dynamodb_access::common::selection;
///
/// let selection = selection::SelectionMap::Leaves(vec![
///     "id".to_string(),
///     "name".to_string(),
/// ]);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SelectionMap {
    /// Leaf selection - a flat list of attribute names to select.
    Leaves(Vec<String>),
    /// Node selection - nested selection for hierarchical attribute paths.
    Node(IndexMap<String, SelectionMap>),
}

impl hash::Hash for SelectionMap {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        match self {
            Self::Leaves(leaves) => leaves.hash(state),
            Self::Node(map) => map.iter().for_each(|(key, value)| {
                key.hash(state);
                value.hash(state);
            }),
        }
    }
}

impl From<SelectionMap> for common::ExpressionInput {
    fn from(selection_map: SelectionMap) -> Self {
        selection_map.get_selection_operation_recursive(&[])
    }
}

impl SelectionMap {
    fn get_selection_operation_recursive(self, prefix: &[String]) -> common::ExpressionInput {
        let operations: Vec<_> = match self {
            Self::Leaves(leaves) => leaves
                .into_iter()
                .map(|leaf| {
                    let mut path = prefix.to_vec();
                    path.push(leaf);
                    let (expression, expression_attribute_names) =
                        common::segments_placeholder(&path);
                    common::ExpressionInput {
                        expression,
                        expression_attribute_names,
                        ..Default::default()
                    }
                })
                .collect(),
            Self::Node(map) => map
                .into_iter()
                .map(|(key, value)| {
                    let mut path = prefix.to_vec();
                    path.push(key);
                    value.get_selection_operation_recursive(&path)
                })
                .collect(),
        };
        common::ExpressionInput::merge(", ", operations)
    }
}
