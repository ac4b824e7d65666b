//! Common utilities for DynamoDB operations.
//!
//! This module provides the shared pieces used across read and write operations: the attribute
//! codec, key handling, condition expressions and attribute selection.

/// Conversion between native values and attribute values.
pub mod codec;

/// Condition expression building for filters and conditional writes.
pub mod condition;

/// Key types for identifying items in DynamoDB tables.
pub mod key;

/// Attribute selection for projection expressions.
pub mod selection;

use aws_sdk_dynamodb::types;
use std::collections;

/// Separator for attribute path components.
pub(crate) const PATH_SEPARATOR: &str = ".";

/// An item: attribute names mapped to attribute values.
pub type Item = collections::HashMap<String, types::AttributeValue>;

/// Keep only characters that are valid in an expression placeholder.
fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Name placeholder for a single path segment.
///
/// ASCII alphanumerics are kept and every other character is written as `_<hex code point>_`,
/// so distinct segments never share a placeholder.
pub(crate) fn name_placeholder(segment: &str) -> String {
    let mut placeholder = String::with_capacity(segment.len() + 1);
    placeholder.push('#');
    for c in segment.chars() {
        if c.is_ascii_alphanumeric() {
            placeholder.push(c);
        } else {
            placeholder.push_str(&format!("_{:x}_", u32::from(c)));
        }
    }
    placeholder
}

/// Lower already split path segments into their placeholder expression and name map.
pub(crate) fn segments_placeholder<S: AsRef<str>>(
    segments: &[S],
) -> (String, collections::HashMap<String, String>) {
    let mut names = collections::HashMap::with_capacity(segments.len());
    let mut placeholders = Vec::with_capacity(segments.len());
    for segment in segments {
        let segment = segment.as_ref();
        let placeholder = name_placeholder(segment);
        names.insert(placeholder.clone(), segment.to_string());
        placeholders.push(placeholder);
    }
    (placeholders.join(PATH_SEPARATOR), names)
}

/// Lower an attribute path (`a.b`) into its placeholder expression (`#a.#b`) and name map.
pub(crate) fn path_placeholder(path: &str) -> (String, collections::HashMap<String, String>) {
    let segments: Vec<_> = path.split(PATH_SEPARATOR).collect();
    segments_placeholder(&segments)
}

/// Value placeholder derived from the attribute path, the operation and a call-scoped counter.
pub(crate) fn value_placeholder(path: &str, operation: &str, index: &mut usize) -> String {
    let placeholder = format!(":{}_{operation}{index}", sanitize(path));
    *index += 1;
    placeholder
}

fn get_expression(left: String, operator: &str, right: String) -> String {
    if left.is_empty() {
        right
    } else if right.is_empty() {
        left
    } else {
        format!("{left}{operator}{right}")
    }
}

/// A lowered expression: text plus the placeholder maps it refers to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionInput {
    /// The expression text.
    pub expression: String,
    /// Name placeholders (`#name`) to attribute names.
    pub expression_attribute_names: collections::HashMap<String, String>,
    /// Value placeholders (`:value`) to attribute values.
    pub expression_attribute_values: collections::HashMap<String, types::AttributeValue>,
}

impl ExpressionInput {
    pub(crate) fn merge(operator: &str, items: Vec<Self>) -> Self {
        let mut operation = Self::default();
        for item in items {
            operation
                .expression_attribute_names
                .extend(item.expression_attribute_names);
            operation
                .expression_attribute_values
                .extend(item.expression_attribute_values);
            operation.expression = get_expression(operation.expression, operator, item.expression);
        }
        operation
    }

    pub(crate) fn merge_into(
        self,
        names: &mut Option<collections::HashMap<String, String>>,
        values: &mut Option<collections::HashMap<String, types::AttributeValue>>,
    ) -> String {
        if !self.expression_attribute_names.is_empty() {
            match names {
                Some(existing) => existing.extend(self.expression_attribute_names),
                None => *names = Some(self.expression_attribute_names),
            }
        }
        if !self.expression_attribute_values.is_empty() {
            match values {
                Some(existing) => existing.extend(self.expression_attribute_values),
                None => *values = Some(self.expression_attribute_values),
            }
        }
        self.expression
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case::single("a", "#a", &[("#a", "a")])]
    #[case::nested("a.b", "#a.#b", &[("#a", "a"), ("#b", "b")])]
    #[case::escaped("my-attr", "#my_2d_attr", &[("#my_2d_attr", "my-attr")])]
    #[case::underscore("my_attr", "#my_5f_attr", &[("#my_5f_attr", "my_attr")])]
    #[case::non_ascii("名前", "#_540d__524d_", &[("#_540d__524d_", "名前")])]
    fn test_path_placeholder(
        #[case] path: &str,
        #[case] expected_expression: &str,
        #[case] expected_names: &[(&str, &str)],
    ) {
        let (expression, names) = path_placeholder(path);
        assert_eq!(expression, expected_expression);
        let expected_names: collections::HashMap<_, _> = expected_names
            .iter()
            .map(|(placeholder, name)| (placeholder.to_string(), name.to_string()))
            .collect();
        assert_eq!(names, expected_names);
    }

    #[rstest]
    #[case::dash_and_underscore("a-b", "a_b")]
    #[case::non_ascii("名前", "年齢")]
    #[case::escape_lookalike("a-", "a_2d_")]
    fn test_distinct_names_get_distinct_placeholders(#[case] first: &str, #[case] second: &str) {
        assert_ne!(name_placeholder(first), name_placeholder(second));
    }

    #[test]
    fn test_segments_keep_dots() {
        let (expression, names) = segments_placeholder(&["a.b", "c"]);
        assert_eq!(expression, "#a_2e_b.#c");
        assert_eq!(names["#a_2e_b"], "a.b");
    }

    #[test]
    fn test_value_placeholder_counts() {
        let mut index = 0;
        assert_eq!(value_placeholder("a.b", "eq", &mut index), ":a_b_eq0");
        assert_eq!(value_placeholder("a", "set", &mut index), ":a_set1");
        assert_eq!(index, 2);
    }

    #[test]
    fn test_merge_skips_empty_expressions() {
        let merged = ExpressionInput::merge(
            " AND ",
            vec![
                ExpressionInput {
                    expression: "#a = :a".to_string(),
                    ..Default::default()
                },
                ExpressionInput::default(),
                ExpressionInput {
                    expression: "#b = :b".to_string(),
                    ..Default::default()
                },
            ],
        );
        assert_eq!(merged.expression, "#a = :a AND #b = :b");
    }
}
