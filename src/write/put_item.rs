use crate::{
    common::{self, codec, condition},
    error::{Error, Result},
    store::{Executor, Store},
    write,
};

use aws_sdk_dynamodb::operation;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

/// put item operation
#[derive(Debug, PartialEq)]
pub(crate) struct PutItemInput {
    pub(crate) item: common::Item,
    pub(crate) write_operation: write::common::WriteInput,
}

/// Result of [`PutItem::send_if_absent`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PutOutcome {
    /// No item had the key; the item was written.
    Created,
    /// An item with the key was already there; nothing was written.
    AlreadyExists,
}

/// Put item operation.
///
/// ```rust,no_run
/// use dynamodb_access::{store::Executor, write};
/// use serde_json::json;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: &Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let put_item = write::put_item::PutItem {
///     item: json!({"id": "1", "name": "John"}),
///     write_args: write::common::WriteArgs {
///         table_name: "users".to_string(),
///         ..Default::default()
///     },
/// };
/// let outcome = put_item
///     .send_if_absent(executor, ["id"], &CancellationToken::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PutItem<T> {
    /// The item to put into the table.
    pub item: T,
    /// Additional write operation arguments (table name, condition, return values, etc.).
    pub write_args: write::common::WriteArgs<T>,
}

impl<T: Serialize> TryFrom<PutItem<T>> for PutItemInput {
    type Error = Error;

    fn try_from(put_item: PutItem<T>) -> Result<Self> {
        let item = codec::encode_item(put_item.item)?;
        let write_operation: write::common::WriteInput = put_item.write_args.try_into()?;
        let operation = Self {
            item,
            write_operation,
        };
        Ok(operation)
    }
}

impl<T: Serialize> PutItem<T> {
    /// Execute the put item operation.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.put_item", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<operation::put_item::PutItemOutput> {
        let put_item: PutItemInput = self.try_into()?;
        let builder = operation::put_item::PutItemInput::builder().set_item(Some(put_item.item));
        let input = crate::apply_write_operation!(builder, put_item.write_operation).build()?;
        executor.put_item(input, cancel).await
    }

    /// Put the item only if no item with the same key exists.
    ///
    /// `key_names` are the table's key attributes. The key absence check is the only condition
    /// sent, so a failed condition always means [`PutOutcome::AlreadyExists`]. A caller
    /// condition is rejected before any call.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.put_item_if_absent", skip_all, err)
    )]
    pub async fn send_if_absent<S, I, N>(
        mut self,
        executor: &Executor<S>,
        key_names: I,
        cancel: &CancellationToken,
    ) -> Result<PutOutcome>
    where
        S: Store,
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        if self.write_args.condition.is_some() {
            return Err(Error::Argument(
                "put if absent does not take a condition".to_string(),
            ));
        }
        let Some(absent) = condition::not_exists_all(key_names) else {
            return Err(Error::Argument("no key names".to_string()));
        };
        self.write_args.condition = Some(absent);
        match self.send(executor, cancel).await {
            Ok(_) => Ok(PutOutcome::Created),
            Err(Error::ConditionFailed(_)) => Ok(PutOutcome::AlreadyExists),
            Err(error) => Err(error),
        }
    }
}
