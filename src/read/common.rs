use crate::{
    common::{self, condition},
    error::Result,
};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use std::collections;

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SingleReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) projection_expression: Option<String>,
    pub(crate) table_name: String,
}

/// Arguments for single-item reads (GetItem and transactional gets).
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct SingleReadArgs {
    /// Whether to use a strongly consistent read.
    ///
    /// Consistent reads consume more capacity units but guarantee you see the latest data.
    pub consistent_read: Option<bool>,
    /// Which attributes to retrieve; all of them when `None`.
    pub selection: Option<common::selection::SelectionMap>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl From<SingleReadArgs> for SingleReadInput {
    fn from(single_read_args: SingleReadArgs) -> Self {
        let (expression_attribute_names, projection_expression) = match single_read_args.selection {
            Some(selection) => {
                let selection_operation: common::ExpressionInput = selection.into();
                (
                    Some(selection_operation.expression_attribute_names),
                    Some(selection_operation.expression),
                )
            }
            None => (None, None),
        };
        Self {
            consistent_read: single_read_args.consistent_read,
            expression_attribute_names,
            projection_expression,
            table_name: single_read_args.table_name,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MultipleReadInput {
    pub(crate) consistent_read: Option<bool>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) filter_expression: Option<String>,
    pub(crate) index_name: Option<String>,
    pub(crate) limit: Option<i32>,
    pub(crate) projection_expression: Option<String>,
    pub(crate) select: Option<types::Select>,
    pub(crate) table_name: String,
}

/// Arguments for paged reads (Query, Scan).
///
/// There is no start key here: the continuation cursor is threaded by the pager, never stored
/// in the request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipleReadArgs<T> {
    /// Filter applied to the items a page read, after any key condition.
    pub condition: Option<condition::ConditionExpr<T>>,
    /// Whether to use a strongly consistent read.
    pub consistent_read: Option<bool>,
    /// The name of a global or local secondary index to read instead of the base table.
    pub index_name: Option<String>,
    /// The maximum number of items evaluated per page (not the number of matching items).
    pub limit: Option<i32>,
    /// Which attributes to return.
    ///
    /// Use `Select::AllAttributes` (default), `Select::AllProjectedAttributes`,
    /// `Select::SpecificAttributes` (with `selection`), or `Select::Count`.
    pub select: Option<types::Select>,
    /// Which attributes to retrieve (projection expression).
    pub selection: Option<common::selection::SelectionMap>,
    /// The name of the table to read from.
    pub table_name: String,
}

impl<T: Serialize> MultipleReadArgs<T> {
    /// Lower the arguments, continuing the placeholder counter at `index`.
    pub(crate) fn lower(self, index: &mut usize) -> Result<MultipleReadInput> {
        let mut expression_attribute_names = None;
        let mut expression_attribute_values = None;
        let filter_expression = match self.condition {
            Some(condition) => Some(condition.lower(index)?.merge_into(
                &mut expression_attribute_names,
                &mut expression_attribute_values,
            )),
            None => None,
        };
        let projection_expression = self.selection.map(|selection| {
            common::ExpressionInput::from(selection)
                .merge_into(&mut expression_attribute_names, &mut expression_attribute_values)
        });
        Ok(MultipleReadInput {
            consistent_read: self.consistent_read,
            expression_attribute_names,
            expression_attribute_values,
            filter_expression,
            index_name: self.index_name,
            limit: self.limit,
            projection_expression,
            select: self.select,
            table_name: self.table_name,
        })
    }
}

impl<T: Serialize> TryFrom<MultipleReadArgs<T>> for MultipleReadInput {
    type Error = crate::error::Error;

    fn try_from(multiple_read_args: MultipleReadArgs<T>) -> Result<Self> {
        multiple_read_args.lower(&mut 0)
    }
}

/// apply common single read operation settings to a builder
#[macro_export]
macro_rules! apply_single_read_operation {
    ($builder:expr, $single_read_operation:expr) => {
        $builder
            .set_consistent_read($single_read_operation.consistent_read)
            .set_expression_attribute_names($single_read_operation.expression_attribute_names)
            .set_projection_expression($single_read_operation.projection_expression)
            .table_name($single_read_operation.table_name)
    };
}

/// apply common multiple read operation settings to a builder
#[macro_export]
macro_rules! apply_multiple_read_operation {
    ($builder:expr, $multiple_read_operation:expr) => {
        $builder
            .set_consistent_read($multiple_read_operation.consistent_read)
            .set_expression_attribute_names($multiple_read_operation.expression_attribute_names)
            .set_expression_attribute_values($multiple_read_operation.expression_attribute_values)
            .set_filter_expression($multiple_read_operation.filter_expression)
            .set_index_name($multiple_read_operation.index_name)
            .set_limit($multiple_read_operation.limit)
            .set_projection_expression($multiple_read_operation.projection_expression)
            .set_select($multiple_read_operation.select)
            .table_name($multiple_read_operation.table_name)
    };
}
