use crate::{
    common::{self, codec},
    error::{Error, Result},
    read,
    store::{Executor, Store},
};

use aws_sdk_dynamodb::{operation, types};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

/// get item operation
#[derive(Clone, Debug, Default, PartialEq)]
struct GetItemInput {
    keys: common::Item,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    single_read_operation: read::common::SingleReadInput,
}

/// Get item operation.
///
/// ```rust,no_run
/// use dynamodb_access::{common, read, store::Executor};
/// use serde_json::Value;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: &Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let get_item = read::get_item::GetItem {
///     keys: common::key::Keys {
///         partition_key: common::key::Key {
///             name: "id".to_string(),
///             value: "1".to_string(),
///         },
///         ..Default::default()
///     },
///     single_read_args: read::common::SingleReadArgs {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let user: Option<Value> = get_item.send(executor, &CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GetItem<T> {
    /// The primary key of the item to retrieve.
    pub keys: common::key::Keys<T>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Additional read operation arguments (table name, consistent read, selection).
    pub single_read_args: read::common::SingleReadArgs,
}

impl<T: Serialize> TryFrom<GetItem<T>> for GetItemInput {
    type Error = Error;

    fn try_from(get_item: GetItem<T>) -> Result<Self> {
        let single_operation: read::common::SingleReadInput = get_item.single_read_args.into();
        let keys = get_item.keys.try_into()?;
        let operation = Self {
            keys,
            return_consumed_capacity: get_item.return_consumed_capacity,
            single_read_operation: single_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> GetItem<T> {
    /// Execute the get item operation.
    ///
    /// An absent item is `Ok(None)`, not an error.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.get_item", skip_all, err)
    )]
    pub async fn send<S: Store, D: DeserializeOwned>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<Option<D>> {
        let get_item: GetItemInput = self.try_into()?;
        let builder = operation::get_item::GetItemInput::builder()
            .set_key(Some(get_item.keys))
            .set_return_consumed_capacity(get_item.return_consumed_capacity);
        let input =
            crate::apply_single_read_operation!(builder, get_item.single_read_operation).build()?;
        let output = executor.get_item(input, cancel).await?;
        output.item.map(codec::decode_item_as).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use serde_json::Value;
    use std::collections;

    #[rstest]
    #[case::empty(
        GetItem {
            keys: common::key::Keys {
                partition_key: common::key::Key {
                    name: "a".to_string(),
                    value: Value::String(
                        "b".to_string()
                    ),
                },
                ..Default::default()
            },
            single_read_args: read::common::SingleReadArgs {
                table_name: "c".to_string(),
                ..Default::default()
            },
            ..Default::default()
        },
        GetItemInput {
            keys: collections::HashMap::from(
                [
                    (
                        "a".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                ]
            ),
            single_read_operation: read::common::SingleReadInput {
                table_name: "c".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    )]
    #[case::full(
        GetItem {
            keys: common::key::Keys {
                partition_key: common::key::Key {
                    name: "a".to_string(),
                    value: Value::String(
                        "b".to_string()
                    ),
                },
                sort_key: Some(
                    common::key::Key {
                        name: "c".to_string(),
                        value: Value::Number(
                            7.into()
                        ),
                    }
                ),
            },
            return_consumed_capacity: Some(
                types::ReturnConsumedCapacity::Indexes
            ),
            single_read_args: read::common::SingleReadArgs {
                consistent_read: Some(true),
                selection: Some(
                    common::selection::SelectionMap::Leaves(
                        vec![
                            "e".to_string(),
                            "f".to_string()
                        ]
                    )
                ),
                table_name: "g".to_string(),
            },
        },
        GetItemInput {
            keys: collections::HashMap::from(
                [
                    (
                        "a".to_string(),
                        types::AttributeValue::S(
                            "b".to_string()
                        )
                    ),
                    (
                        "c".to_string(),
                        types::AttributeValue::N(
                            "7".to_string()
                        )
                    ),
                ]
            ),
            return_consumed_capacity: Some(
                types::ReturnConsumedCapacity::Indexes
            ),
            single_read_operation: read::common::SingleReadInput {
                consistent_read: Some(true),
                expression_attribute_names: Some(
                    collections::HashMap::from(
                        [
                            ("#e".to_string(), "e".to_string()),
                            ("#f".to_string(), "f".to_string()),
                        ]
                    )
                ),
                projection_expression: Some(
                    "#e, #f".to_string()
                ),
                table_name: "g".to_string(),
            },
        }
    )]
    fn test_get_item(#[case] args: GetItem<Value>, #[case] expected: GetItemInput) {
        let actual: GetItemInput = args.try_into().unwrap();
        assert_eq!(actual, expected);
    }
}
