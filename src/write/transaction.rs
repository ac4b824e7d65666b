//! All-or-nothing multi-item writes and reads.
//!
//! A [`TransactWrite`] either applies every item or none of them: one failed condition cancels
//! the whole batch with [`Error::TransactionCancelled`], whose reasons line up with the submitted
//! items. A [`TransactGet`] returns one slot per requested key, in request order.
//!
//! Writes and gets are separate types, so they can never be mixed within one batch.

use crate::{
    common::{self, codec, condition},
    error::{Error, Result},
    read,
    store::{Executor, Store},
    write,
};

use aws_sdk_dynamodb::{operation, types};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

/// A condition on an item that is checked, but not written, within a transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionCheck<T> {
    /// The primary key of the checked item.
    pub keys: common::key::Keys<T>,
    /// The condition the item must meet.
    pub condition: condition::ConditionExpr<T>,
    /// Which item attributes to return if the check fails.
    pub return_values_on_condition_check_failure:
        Option<types::ReturnValuesOnConditionCheckFailure>,
    /// The table of the checked item.
    pub table_name: String,
}

/// One item of a write transaction.
///
/// Per-request response settings of the single-item operations (`return_values`, consumed
/// capacity, collection metrics) are ignored here; set them on [`TransactWrite`] instead.
#[derive(Clone, Debug, PartialEq)]
pub enum TransactWriteItem<T> {
    /// Create or replace an item.
    Put(write::put_item::PutItem<T>),
    /// Delete an item.
    Delete(write::delete_item::DeleteItem<T>),
    /// Update an item.
    Update(write::update_item::UpdateItem<T>),
    /// Check a condition without writing.
    ConditionCheck(ConditionCheck<T>),
}

impl<T: Serialize> TransactWriteItem<T> {
    /// Lower into the transaction item sent to the store.
    pub fn build(self) -> Result<types::TransactWriteItem> {
        let builder = types::TransactWriteItem::builder();
        let item = match self {
            Self::Put(put_item) => {
                let put_item: write::put_item::PutItemInput = put_item.try_into()?;
                let put = types::Put::builder().set_item(Some(put_item.item));
                let put = crate::apply_transact_write_operation!(put, put_item.write_operation)
                    .build()?;
                builder.put(put)
            }
            Self::Delete(delete_item) => {
                let delete_item: write::delete_item::DeleteItemInput = delete_item.try_into()?;
                let delete = types::Delete::builder().set_key(Some(delete_item.keys));
                let delete =
                    crate::apply_transact_write_operation!(delete, delete_item.write_operation)
                        .build()?;
                builder.delete(delete)
            }
            Self::Update(update_item) => {
                let update_item: write::update_item::UpdateItemInput = update_item.try_into()?;
                let update = types::Update::builder()
                    .set_key(Some(update_item.keys))
                    .update_expression(update_item.update_expression);
                let update =
                    crate::apply_transact_write_operation!(update, update_item.write_operation)
                        .build()?;
                builder.update(update)
            }
            Self::ConditionCheck(condition_check) => {
                let keys: common::Item = condition_check.keys.try_into()?;
                let write_operation = write::common::WriteArgs {
                    condition: Some(condition_check.condition),
                    return_values_on_condition_check_failure: condition_check
                        .return_values_on_condition_check_failure,
                    table_name: condition_check.table_name,
                    ..Default::default()
                };
                let write_operation: write::common::WriteInput = write_operation.try_into()?;
                let check = types::ConditionCheck::builder().set_key(Some(keys));
                let check = crate::apply_transact_write_operation!(check, write_operation).build()?;
                builder.condition_check(check)
            }
        };
        Ok(item.build())
    }
}

/// All-or-nothing write batch.
///
/// ```rust,no_run
/// use dynamodb_access::{store::Executor, write};
/// use serde_json::{Value, json};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: &Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let put = |item: Value| {
///     write::transaction::TransactWriteItem::Put(write::put_item::PutItem {
///         item,
///         write_args: write::common::WriteArgs {
///             table_name: "accounts".to_string(),
///             ..Default::default()
///         },
///     })
/// };
/// let transaction = write::transaction::TransactWrite {
///     items: vec![put(json!({"id": "a"})), put(json!({"id": "b"}))],
///     client_request_token: Some("transfer-42".to_string()),
///     ..Default::default()
/// };
/// transaction.send(executor, &CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransactWrite<T> {
    /// The items, applied together or not at all.
    pub items: Vec<TransactWriteItem<T>>,
    /// Idempotency token, passed to the store unmodified.
    ///
    /// Resubmitting the same items with the same token is a no-op repeat for the store.
    pub client_request_token: Option<String>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to return item collection metrics.
    pub return_item_collection_metrics: Option<types::ReturnItemCollectionMetrics>,
}

impl<T> Default for TransactWrite<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            client_request_token: None,
            return_consumed_capacity: None,
            return_item_collection_metrics: None,
        }
    }
}

impl<T: Serialize> TransactWrite<T> {
    /// Lower the batch into the request sent to the store.
    pub fn build(self) -> Result<operation::transact_write_items::TransactWriteItemsInput> {
        if self.items.is_empty() {
            return Err(Error::Argument("empty transaction".to_string()));
        }
        let items = self
            .items
            .into_iter()
            .map(TransactWriteItem::build)
            .collect::<Result<Vec<_>>>()?;
        let input = operation::transact_write_items::TransactWriteItemsInput::builder()
            .set_client_request_token(self.client_request_token)
            .set_return_consumed_capacity(self.return_consumed_capacity)
            .set_return_item_collection_metrics(self.return_item_collection_metrics)
            .set_transact_items(Some(items))
            .build()?;
        Ok(input)
    }

    /// Submit the batch.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.transact_write", skip_all, err)
    )]
    pub async fn send<S: Store>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<operation::transact_write_items::TransactWriteItemsOutput> {
        let input = self.build()?;
        executor.transact_write_items(input, cancel).await
    }
}

/// One key lookup of a read transaction.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactGetItem<T> {
    /// The primary key of the item to read.
    pub keys: common::key::Keys<T>,
    /// Which attributes to retrieve; all of them when `None`.
    pub selection: Option<common::selection::SelectionMap>,
    /// The table to read from.
    pub table_name: String,
}

impl<T: Serialize> TransactGetItem<T> {
    /// Lower into the transaction item sent to the store.
    pub fn build(self) -> Result<types::TransactGetItem> {
        let keys: common::Item = self.keys.try_into()?;
        let single_read_operation: read::common::SingleReadInput = read::common::SingleReadArgs {
            selection: self.selection,
            table_name: self.table_name,
            ..Default::default()
        }
        .into();
        let get = types::Get::builder()
            .set_key(Some(keys))
            .set_expression_attribute_names(single_read_operation.expression_attribute_names)
            .set_projection_expression(single_read_operation.projection_expression)
            .table_name(single_read_operation.table_name)
            .build()?;
        Ok(types::TransactGetItem::builder().get(get).build())
    }
}

/// All-or-nothing read batch.
#[derive(Clone, Debug, PartialEq)]
pub struct TransactGet<T> {
    /// The lookups; the output has one slot per lookup, in the same order.
    pub items: Vec<TransactGetItem<T>>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
}

impl<T> Default for TransactGet<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            return_consumed_capacity: None,
        }
    }
}

impl<T: Serialize> TransactGet<T> {
    /// Lower the batch into the request sent to the store.
    pub fn build(self) -> Result<operation::transact_get_items::TransactGetItemsInput> {
        if self.items.is_empty() {
            return Err(Error::Argument("empty transaction".to_string()));
        }
        let items = self
            .items
            .into_iter()
            .map(TransactGetItem::build)
            .collect::<Result<Vec<_>>>()?;
        let input = operation::transact_get_items::TransactGetItemsInput::builder()
            .set_return_consumed_capacity(self.return_consumed_capacity)
            .set_transact_items(Some(items))
            .build()?;
        Ok(input)
    }

    /// Submit the batch.
    ///
    /// `output[i]` is the item found for `items[i]`, or `None` when there is no such item.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.transact_get", skip_all, err)
    )]
    pub async fn send<S: Store, D: DeserializeOwned>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Option<D>>> {
        let requested = self.items.len();
        let input = self.build()?;
        let output = executor.transact_get_items(input, cancel).await?;
        let Some(responses) = output.responses else {
            return Ok((0..requested).map(|_| None).collect());
        };
        if responses.len() != requested {
            return Err(Error::Transport(format!(
                "{} responses for {requested} requested items",
                responses.len()
            )));
        }
        responses
            .into_iter()
            .map(|response| response.item.map(codec::decode_item_as).transpose())
            .collect()
    }
}

/// Suppress a transaction cancellation whose every cause is allowed.
///
/// Items reported with no code, or with `None`, did not cause the cancellation and are ignored.
/// The error is suppressed only when at least one item caused it and every causing code is in
/// `allowed`; anything else returns the original result unchanged.
///
/// ```rust
/// use dynamodb_access::{
///     error::{CancellationReason, Error},
///     write::transaction,
/// };
///
/// let reason = |code: &str| CancellationReason {
///     code: Some(code.to_string()),
///     message: None,
/// };
/// let cancelled = Error::TransactionCancelled {
///     reasons: vec![reason("None"), reason("ConditionalCheckFailed")],
///     message: String::new(),
/// };
/// let result = transaction::ignore_cancellation_reasons::<()>(
///     Err(cancelled),
///     &["ConditionalCheckFailed"],
/// );
/// assert!(matches!(result, Ok(None)));
/// ```
pub fn ignore_cancellation_reasons<T>(result: Result<T>, allowed: &[&str]) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(Error::TransactionCancelled { reasons, message }) => {
            let mut causes = reasons.iter().filter(|reason| reason.is_cause()).peekable();
            let has_cause = causes.peek().is_some();
            let all_allowed = causes.all(|reason| {
                reason
                    .code
                    .as_deref()
                    .is_some_and(|code| allowed.contains(&code))
            });
            if has_cause && all_allowed {
                Ok(None)
            } else {
                Err(Error::TransactionCancelled { reasons, message })
            }
        }
        Err(error) => Err(error),
    }
}
