use crate::{
    common::{self, condition},
    error::{Error, Result},
};

use aws_sdk_dynamodb::types;
use serde::Serialize;
use std::collections;

/// Lowered write arguments: resolved condition text and the placeholder maps of every expression
/// the request carries.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct WriteInput {
    pub(crate) condition_expression: Option<String>,
    pub(crate) expression_attribute_names: Option<collections::HashMap<String, String>>,
    pub(crate) expression_attribute_values:
        Option<collections::HashMap<String, types::AttributeValue>>,
    pub(crate) return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    pub(crate) return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    pub(crate) return_values: Option<types::ReturnValue>,
    pub(crate) return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    pub(crate) table_name: String,
}

impl WriteInput {
    /// Merge an expression operation into this write operation.
    pub(crate) fn merge_expression(&mut self, operation: common::ExpressionInput) -> String {
        operation.merge_into(
            &mut self.expression_attribute_names,
            &mut self.expression_attribute_values,
        )
    }
}

/// Arguments common to all write operations (Put, Update, Delete).
#[derive(Clone, Debug, PartialEq)]
pub struct WriteArgs<T> {
    /// Condition that must hold for the write to happen.
    ///
    /// When it does not, the write fails with [`Error::ConditionFailed`].
    pub condition: Option<condition::ConditionExpr<T>>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
    /// Which item attributes to return in the response.
    ///
    /// Options: `AllOld`, `AllNew`, `UpdatedOld`, `UpdatedNew`, or `None`.
    pub return_values: Option<types::ReturnValue>,
    /// Which item attributes to return if a condition check fails.
    pub return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    /// The name of the table to write to.
    pub table_name: String,
}

impl<T> Default for WriteArgs<T> {
    fn default() -> Self {
        Self {
            condition: None,
            return_consumed_capacity: None,
            return_item_collection_metrics: None,
            return_values: None,
            return_values_on_condition_check_failure: None,
            table_name: String::new(),
        }
    }
}

impl<T: Serialize> WriteArgs<T> {
    /// Lower the arguments, continuing the placeholder counter at `index`.
    pub(crate) fn lower(self, index: &mut usize) -> Result<WriteInput> {
        if self.table_name.is_empty() {
            return Err(Error::Argument("missing table name".to_string()));
        }
        let mut operation = WriteInput {
            return_consumed_capacity: self.return_consumed_capacity,
            return_item_collection_metrics: self.return_item_collection_metrics,
            return_values: self.return_values,
            return_values_on_condition_check_failure: self
                .return_values_on_condition_check_failure,
            table_name: self.table_name,
            ..Default::default()
        };
        if let Some(condition) = self.condition {
            let condition_operation = condition.lower(index)?;
            operation.condition_expression = Some(operation.merge_expression(condition_operation));
        }
        Ok(operation)
    }
}

impl<T: Serialize> TryFrom<WriteArgs<T>> for WriteInput {
    type Error = Error;

    fn try_from(write_args: WriteArgs<T>) -> Result<Self> {
        write_args.lower(&mut 0)
    }
}

/// apply common write operation settings to a builder
#[macro_export]
macro_rules! apply_write_operation {
    ($builder:expr, $write_operation:expr) => {
        $builder
            .set_condition_expression($write_operation.condition_expression)
            .set_expression_attribute_names($write_operation.expression_attribute_names)
            .set_expression_attribute_values($write_operation.expression_attribute_values)
            .set_return_consumed_capacity($write_operation.return_consumed_capacity)
            .set_return_item_collection_metrics($write_operation.return_item_collection_metrics)
            .set_return_values($write_operation.return_values)
            .set_return_values_on_condition_check_failure(
                $write_operation.return_values_on_condition_check_failure,
            )
            .table_name($write_operation.table_name)
    };
}

/// apply the condition settings of a write operation to a transaction item builder
#[macro_export]
macro_rules! apply_transact_write_operation {
    ($builder:expr, $write_operation:expr) => {
        $builder
            .set_condition_expression($write_operation.condition_expression)
            .set_expression_attribute_names($write_operation.expression_attribute_names)
            .set_expression_attribute_values($write_operation.expression_attribute_values)
            .set_return_values_on_condition_check_failure(
                $write_operation.return_values_on_condition_check_failure,
            )
            .table_name($write_operation.table_name)
    };
}
