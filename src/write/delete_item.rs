use crate::{
    common,
    error::{Error, Result},
    store::{Executor, Store},
    write,
};

use aws_sdk_dynamodb::operation;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// delete item operation
#[derive(Debug, PartialEq)]
pub(crate) struct DeleteItemInput {
    pub(crate) keys: common::Item,
    pub(crate) write_operation: write::common::WriteInput,
}

/// Delete item operation.
///
/// ```rust,no_run
/// use dynamodb_access::{common, store::Executor, write};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: &Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let delete_item = write::delete_item::DeleteItem {
///     keys: common::key::Keys {
///         partition_key: common::key::Key {
///             name: "id".to_string(),
///             value: "1".to_string(),
///         },
///         ..Default::default()
///     },
///     write_args: write::common::WriteArgs {
///         condition: Some(common::condition::ConditionExpr::Exists("id".to_string())),
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// delete_item.send(executor, &CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteItem<T> {
    /// The primary key of the item to delete.
    pub keys: common::key::Keys<T>,
    /// Additional write operation arguments (table name, condition, return values, etc.).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<DeleteItem<T>> for DeleteItemInput {
    type Error = Error;

    fn try_from(delete_item: DeleteItem<T>) -> Result<Self> {
        let keys = delete_item.keys.try_into()?;
        let write_operation: write::common::WriteInput = delete_item.write_args.try_into()?;
        let operation = Self {
            keys,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> DeleteItem<T> {
    /// Execute the delete item operation.
    ///
    /// Deleting an absent item succeeds unless a condition says otherwise.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.delete_item", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<operation::delete_item::DeleteItemOutput> {
        let delete_item: DeleteItemInput = self.try_into()?;
        let builder =
            operation::delete_item::DeleteItemInput::builder().set_key(Some(delete_item.keys));
        let input = crate::apply_write_operation!(builder, delete_item.write_operation).build()?;
        executor.delete_item(input, cancel).await
    }
}
