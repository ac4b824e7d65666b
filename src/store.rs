//! The upstream store collaborator and the executor that calls it.
//!
//! [`Store`] is the narrow interface to the network client: one method per operation, taking
//! and returning the SDK's request and response types, with errors already classified.
//! [`aws_sdk_dynamodb::Client`] implements it (see [`aws`]); tests use in-memory doubles.
//!
//! [`Executor`] wraps a store. Every call goes through it so that the caller's cancellation token
//! is honored and the metrics sink sees exactly one record per round trip.

/// [`Store`] implementation for the AWS SDK client.
pub mod aws;

use crate::{
    error::{Error, Result},
    metrics::{self, MetricsSink},
};

use async_trait::async_trait;
use aws_sdk_dynamodb::{operation, types};
use std::{fmt, future::Future, sync::Arc, time};
use tokio_util::sync::CancellationToken;

/// Default metrics category.
pub const DEFAULT_CATEGORY: &str = "dynamodb";

/// The network collaborator.
///
/// Implementations classify failures into [`Error::NotFound`], [`Error::ConditionFailed`],
/// [`Error::ResourceInUse`], [`Error::Throttled`], [`Error::TransactionCancelled`] or
/// [`Error::Transport`]. They must not retry on their own behalf.
#[async_trait]
pub trait Store: Send + Sync {
    /// Get a single item.
    async fn get_item(
        &self,
        input: operation::get_item::GetItemInput,
    ) -> Result<operation::get_item::GetItemOutput>;

    /// Put a single item.
    async fn put_item(
        &self,
        input: operation::put_item::PutItemInput,
    ) -> Result<operation::put_item::PutItemOutput>;

    /// Delete a single item.
    async fn delete_item(
        &self,
        input: operation::delete_item::DeleteItemInput,
    ) -> Result<operation::delete_item::DeleteItemOutput>;

    /// Update a single item.
    async fn update_item(
        &self,
        input: operation::update_item::UpdateItemInput,
    ) -> Result<operation::update_item::UpdateItemOutput>;

    /// Fetch one scan page.
    async fn scan(&self, input: operation::scan::ScanInput)
    -> Result<operation::scan::ScanOutput>;

    /// Fetch one query page.
    async fn query(
        &self,
        input: operation::query::QueryInput,
    ) -> Result<operation::query::QueryOutput>;

    /// Create a table.
    async fn create_table(
        &self,
        input: operation::create_table::CreateTableInput,
    ) -> Result<operation::create_table::CreateTableOutput>;

    /// Describe a table.
    async fn describe_table(
        &self,
        input: operation::describe_table::DescribeTableInput,
    ) -> Result<operation::describe_table::DescribeTableOutput>;

    /// Update a table.
    async fn update_table(
        &self,
        input: operation::update_table::UpdateTableInput,
    ) -> Result<operation::update_table::UpdateTableOutput>;

    /// Delete a table.
    async fn delete_table(
        &self,
        input: operation::delete_table::DeleteTableInput,
    ) -> Result<operation::delete_table::DeleteTableOutput>;

    /// Submit an all-or-nothing write batch.
    async fn transact_write_items(
        &self,
        input: operation::transact_write_items::TransactWriteItemsInput,
    ) -> Result<operation::transact_write_items::TransactWriteItemsOutput>;

    /// Submit an all-or-nothing read batch.
    async fn transact_get_items(
        &self,
        input: operation::transact_get_items::TransactGetItemsInput,
    ) -> Result<operation::transact_get_items::TransactGetItemsOutput>;
}

/// Capacity units consumed by a response.
pub(crate) trait Cost {
    fn cost(&self) -> Option<f64>;
}

fn capacity_units(capacity: &types::ConsumedCapacity) -> f64 {
    capacity.capacity_units.unwrap_or(0.0)
}

/// implement `Cost` for outputs carrying a single consumed capacity
macro_rules! single_capacity_cost {
    ($($output_type:ty),* $(,)?) => {
        $(
            impl Cost for $output_type {
                fn cost(&self) -> Option<f64> {
                    self.consumed_capacity.as_ref().map(capacity_units)
                }
            }
        )*
    };
}

/// implement `Cost` for outputs carrying one consumed capacity per table
macro_rules! multiple_capacity_cost {
    ($($output_type:ty),* $(,)?) => {
        $(
            impl Cost for $output_type {
                fn cost(&self) -> Option<f64> {
                    self.consumed_capacity
                        .as_ref()
                        .map(|capacities| capacities.iter().map(capacity_units).sum())
                }
            }
        )*
    };
}

/// implement `Cost` for outputs without consumed capacity
macro_rules! no_cost {
    ($($output_type:ty),* $(,)?) => {
        $(
            impl Cost for $output_type {
                fn cost(&self) -> Option<f64> {
                    None
                }
            }
        )*
    };
}

single_capacity_cost!(
    operation::get_item::GetItemOutput,
    operation::put_item::PutItemOutput,
    operation::delete_item::DeleteItemOutput,
    operation::update_item::UpdateItemOutput,
    operation::scan::ScanOutput,
    operation::query::QueryOutput,
);

multiple_capacity_cost!(
    operation::transact_write_items::TransactWriteItemsOutput,
    operation::transact_get_items::TransactGetItemsOutput,
);

no_cost!(
    operation::create_table::CreateTableOutput,
    operation::describe_table::DescribeTableOutput,
    operation::update_table::UpdateTableOutput,
    operation::delete_table::DeleteTableOutput,
);

/// Runs store calls with cancellation and metrics.
///
/// ```rust,no_run
/// use dynamodb_access::store::Executor;
///
/// # async fn example(client: aws_sdk_dynamodb::Client) {
/// let executor = Executor::new(client);
/// # }
/// ```
pub struct Executor<S> {
    category: String,
    metrics: Arc<dyn MetricsSink>,
    store: S,
}

impl<S: fmt::Debug> fmt::Debug for Executor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("category", &self.category)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// generate one executor method per store operation
macro_rules! executor_operations {
    ($($method:ident: $input_type:ty => $output_type:ty),* $(,)?) => {
        $(
            #[doc = concat!("Run `", stringify!($method), "` against the store.")]
            pub async fn $method(
                &self,
                input: $input_type,
                cancel: &CancellationToken,
            ) -> Result<$output_type> {
                self.call(stringify!($method), input, cancel, |store, input| {
                    store.$method(input)
                })
                .await
            }
        )*
    };
}

impl<S: Store> Executor<S> {
    /// Wrap a store, dropping metrics.
    pub fn new(store: S) -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            metrics: Arc::new(metrics::NoopSink),
            store,
        }
    }

    /// Report every call to `sink` under `category`.
    pub fn with_metrics(mut self, sink: Arc<dyn MetricsSink>, category: impl Into<String>) -> Self {
        self.metrics = sink;
        self.category = category.into();
        self
    }

    /// The wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn call<'a, I, O, F, Fut>(
        &'a self,
        operation: &'static str,
        input: I,
        cancel: &CancellationToken,
        send: F,
    ) -> Result<O>
    where
        I: fmt::Debug,
        O: fmt::Debug + Cost,
        F: FnOnce(&'a S, I) -> Fut,
        Fut: Future<Output = Result<O>> + 'a,
    {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let enabled = self.metrics.enabled();
        let request = if enabled {
            format!("{input:?}")
        } else {
            String::new()
        };
        let start_time = time::SystemTime::now();
        let started = time::Instant::now();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = send(&self.store, input) => result,
        };
        let duration = started.elapsed();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            operation,
            elapsed_ms = duration.as_millis() as u64,
            ok = result.is_ok(),
            "store call finished"
        );
        if enabled {
            let (response, cost, outcome) = match &result {
                Ok(output) => (format!("{output:?}"), output.cost(), metrics::Outcome::Success),
                Err(error) => (String::new(), None, metrics::Outcome::Failure(error.to_string())),
            };
            let record = metrics::OperationRecord {
                operation,
                request,
                response,
                start_time,
                duration,
                cost,
                outcome,
            };
            self.metrics.record(&self.category, record);
        }
        result
    }

    executor_operations!(
        get_item: operation::get_item::GetItemInput => operation::get_item::GetItemOutput,
        put_item: operation::put_item::PutItemInput => operation::put_item::PutItemOutput,
        delete_item: operation::delete_item::DeleteItemInput => operation::delete_item::DeleteItemOutput,
        update_item: operation::update_item::UpdateItemInput => operation::update_item::UpdateItemOutput,
        scan: operation::scan::ScanInput => operation::scan::ScanOutput,
        query: operation::query::QueryInput => operation::query::QueryOutput,
        create_table: operation::create_table::CreateTableInput => operation::create_table::CreateTableOutput,
        describe_table: operation::describe_table::DescribeTableInput => operation::describe_table::DescribeTableOutput,
        update_table: operation::update_table::UpdateTableInput => operation::update_table::UpdateTableOutput,
        delete_table: operation::delete_table::DeleteTableInput => operation::delete_table::DeleteTableOutput,
        transact_write_items: operation::transact_write_items::TransactWriteItemsInput => operation::transact_write_items::TransactWriteItemsOutput,
        transact_get_items: operation::transact_get_items::TransactGetItemsInput => operation::transact_get_items::TransactGetItemsOutput,
    );
}
