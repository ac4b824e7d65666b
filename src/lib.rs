#![deny(missing_docs)]

//! # DynamoDB Access
//!
//! A typed data-access layer over Amazon DynamoDB.
//!
//! ## Overview
//!
//! This library turns structured Rust values into DynamoDB requests and back:
//! - Native values are encoded to attribute values through `serde`, including explicit sets
//! - Conditions and updates are plain data, lowered to expressions with collision-free placeholders
//! - Query and Scan are driven page by page behind a visitor with early exit
//! - Multi-item writes and reads are submitted as all-or-nothing transactions
//! - Schema changes can be awaited until a table or index reaches a status
//!
//! Every network call goes through an [`Executor`](store::Executor), which races it against a
//! caller-supplied cancellation token and reports it to a [`MetricsSink`](metrics::MetricsSink).
//!
//! ## Quick Example
//!
//! ```no_run
//! use aws_sdk_dynamodb::Client;
//! use dynamodb_access::{common, store::Executor, write};
//! use indexmap::IndexMap;
//! use serde_json::Value;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! # let client = Client::from_conf(aws_sdk_dynamodb::config::Config::builder().build());
//! let executor = Executor::new(client);
//! let update_item = write::update_item::UpdateItem {
//!     keys: common::key::Keys {
//!         partition_key: common::key::Key {
//!             name: "id".to_string(),
//!             value: Value::String("1".to_string()),
//!         },
//!         ..Default::default()
//!     },
//!     update: write::update_item::UpdateExpression {
//!         set: IndexMap::from([
//!             (
//!                 "name".to_string(),
//!                 write::update_item::SetInput::Assign(Value::String("Jane".to_string())),
//!             ),
//!             (
//!                 "age".to_string(),
//!                 write::update_item::SetInput::Increment(Value::Number(1.into())),
//!             ),
//!         ]),
//!         ..Default::default()
//!     },
//!     write_args: write::common::WriteArgs {
//!         condition: Some(common::condition::ConditionExpr::Exists("id".to_string())),
//!         table_name: "users".to_string(),
//!         ..Default::default()
//!     },
//! };
//! // SET #name = :name_set0, #age = #age + :age_inc1, then attribute_exists(#id)
//! update_item.send(&executor, &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@common`] - Attribute codec, keys, conditions and selections
//! - [`mod@read`] - Single-item reads and paged Query and Scan
//! - [`mod@write`] - Single-item writes and transactions
//! - [`mod@schema`] - Table operations and status polling
//! - [`mod@store`] - The store seam and the executor
//! - [`mod@metrics`] - The downstream metrics sink
//! - [`mod@error`] - The error taxonomy

/// Common utilities for encoding, keys, conditions, and attribute selection.
pub mod common;

/// Error taxonomy shared by every operation.
pub mod error;

/// Per-call operation records.
pub mod metrics;

/// Read operations for retrieving data from DynamoDB tables.
///
/// This module provides operations for:
/// - Getting individual items by key
/// - Querying items with key conditions
/// - Scanning entire tables
pub mod read;

/// Table lifecycle operations.
pub mod schema;

/// The store seam, its AWS implementation, and the executor running calls against it.
pub mod store;

/// Write operations for modifying data in DynamoDB tables.
///
/// This module provides operations for:
/// - Putting new items or replacing existing ones
/// - Updating items with various operations (set, add, remove, delete)
/// - Deleting items by key
/// - Writing or reading several items atomically
pub mod write;
