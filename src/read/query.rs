use crate::{
    common,
    error::{Error, Result},
    read::{self, paginate},
    store::{Executor, Store},
};

use aws_sdk_dynamodb::{operation, types};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

/// query operation
#[derive(Clone, Debug, Default, PartialEq)]
struct QueryInput {
    key_condition_expression: String,
    multiple_read_operation: read::common::MultipleReadInput,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    scan_index_forward: Option<bool>,
}

/// Query operation.
///
/// Items come back ascending by sort key; set `scan_index_forward` to `Some(false)` to reverse.
///
/// ```rust,no_run
/// use dynamodb_access::{common, read, store::Executor};
/// use serde_json::Value;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: &Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let query = read::query::Query {
///     partition_key: common::key::Key {
///         name: "user_id".to_string(),
///         value: Value::from("1"),
///     },
///     multiple_read_args: read::common::MultipleReadArgs {
///         table_name: "posts".to_string(),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let mut seen = 0;
/// query
///     .drive(executor, &CancellationToken::new(), |_post: Value, _cursor| {
///         seen += 1;
///         Ok(seen < 10)
///     })
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query<T> {
    /// Additional read operation arguments (table name, filter, selection, etc.).
    pub multiple_read_args: read::common::MultipleReadArgs<T>,
    /// The partition key value to query for.
    pub partition_key: common::key::Key<T>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// Whether to scan the index forward (ascending) or backward (descending).
    pub scan_index_forward: Option<bool>,
    /// Optional condition to apply to the sort key.
    pub sort_key_condition: Option<common::condition::KeyCondition<T>>,
}

impl<T: Serialize> Query<T> {
    fn get_key_condition_expression(
        partition_key: common::key::Key<T>,
        sort_key: Option<common::condition::KeyCondition<T>>,
        index: &mut usize,
    ) -> Result<common::ExpressionInput> {
        let condition = common::condition::Condition::Equals(partition_key.value);
        let partition_key = common::condition::KeyCondition {
            condition,
            name: partition_key.name,
        };
        let mut keys = vec![partition_key];
        if let Some(sort_key) = sort_key {
            keys.push(sort_key);
        }
        common::condition::KeyCondition::get_conjunction(keys, index)
    }
}

impl<T: Serialize> TryFrom<Query<T>> for QueryInput {
    type Error = Error;

    fn try_from(query: Query<T>) -> Result<Self> {
        if query.partition_key.name.is_empty() {
            return Err(Error::Argument("missing partition key name".to_string()));
        }
        let mut index = 0;
        let key_condition_operation = Query::get_key_condition_expression(
            query.partition_key,
            query.sort_key_condition,
            &mut index,
        )?;
        let mut multiple_read_operation = query.multiple_read_args.lower(&mut index)?;
        let key_condition_expression = key_condition_operation.merge_into(
            &mut multiple_read_operation.expression_attribute_names,
            &mut multiple_read_operation.expression_attribute_values,
        );
        let operation = Self {
            key_condition_expression,
            multiple_read_operation,
            return_consumed_capacity: query.return_consumed_capacity,
            scan_index_forward: query.scan_index_forward,
        };
        Ok(operation)
    }
}

/// A lowered query, ready to be paged.
#[derive(Clone, Debug, PartialEq)]
pub struct QueryRequest {
    input: operation::query::QueryInput,
}

impl TryFrom<QueryInput> for QueryRequest {
    type Error = Error;

    fn try_from(query: QueryInput) -> Result<Self> {
        let builder = operation::query::QueryInput::builder()
            .key_condition_expression(query.key_condition_expression)
            .set_return_consumed_capacity(query.return_consumed_capacity)
            .set_scan_index_forward(query.scan_index_forward);
        let input =
            crate::apply_multiple_read_operation!(builder, query.multiple_read_operation).build()?;
        Ok(Self { input })
    }
}

impl paginate::PagedRequest for QueryRequest {
    fn page_input(&self, cursor: Option<&paginate::PageToken>) -> paginate::PageInput {
        let mut input = self.input.clone();
        input.exclusive_start_key = cursor.map(|cursor| cursor.key().clone());
        paginate::PageInput::Query(input)
    }
}

impl<T: Serialize> Query<T> {
    /// Lower the query into a pageable request.
    pub fn build(self) -> Result<QueryRequest> {
        let query: QueryInput = self.try_into()?;
        query.try_into()
    }

    /// Visit every item of the query; see [`paginate::drive`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.query", skip_all, err)
    )]
    pub async fn drive<S, D, F>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
        callback: F,
    ) -> Result<()>
    where
        S: Store,
        D: DeserializeOwned,
        F: FnMut(D, Option<&paginate::PageToken>) -> Result<bool>,
    {
        let request = self.build()?;
        paginate::drive(executor, &request, cancel, callback).await
    }

    /// Read every item of the query.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.query", skip_all, err)
    )]
    pub async fn collect<S, D>(
        self,
        executor: &Executor<S>,
        cancel: &CancellationToken,
    ) -> Result<Vec<D>>
    where
        S: Store,
        D: DeserializeOwned,
    {
        let request = self.build()?;
        paginate::collect(executor, &request, cancel).await
    }
}
