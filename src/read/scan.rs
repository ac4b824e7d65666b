use crate::{
    error::{Error, Result},
    read::{self, paginate},
    store::{Executor, Store},
};

use aws_sdk_dynamodb::{operation, types};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

/// scan operation
#[derive(Clone, Debug, Default, PartialEq)]
struct ScanInput {
    multiple_read_operation: read::common::MultipleReadInput,
    return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    segment: Option<i32>,
    total_segments: Option<i32>,
}

/// Scan operation.
///
/// ```rust,no_run
/// use dynamodb_access::{read, store::Executor};
/// use serde_json::Value;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: &Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let scan: read::scan::Scan<Value> = read::scan::Scan {
///     multiple_read_args: read::common::MultipleReadArgs {
///         table_name: "users".to_string(),
///         limit: Some(100),
///         ..Default::default()
///     },
///     ..Default::default()
/// };
/// let users: Vec<Value> = scan.collect(executor, &CancellationToken::new()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scan<T> {
    /// Additional read operation arguments (table name, filter, selection, etc.).
    pub multiple_read_args: read::common::MultipleReadArgs<T>,
    /// Whether to return the consumed capacity information.
    pub return_consumed_capacity: Option<types::ReturnConsumedCapacity>,
    /// The segment number for parallel scans (0-indexed).
    pub segment: Option<i32>,
    /// The total number of segments for parallel scans.
    pub total_segments: Option<i32>,
}

impl<T: Serialize> TryFrom<Scan<T>> for ScanInput {
    type Error = Error;

    fn try_from(scan: Scan<T>) -> Result<Self> {
        let multiple_read_operation: read::common::MultipleReadInput =
            scan.multiple_read_args.try_into()?;
        let operation = Self {
            multiple_read_operation,
            return_consumed_capacity: scan.return_consumed_capacity,
            segment: scan.segment,
            total_segments: scan.total_segments,
        };
        Ok(operation)
    }
}

/// A lowered scan, ready to be paged.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanRequest {
    input: operation::scan::ScanInput,
}

impl TryFrom<ScanInput> for ScanRequest {
    type Error = Error;

    fn try_from(scan: ScanInput) -> Result<Self> {
        let builder = operation::scan::ScanInput::builder()
            .set_return_consumed_capacity(scan.return_consumed_capacity)
            .set_segment(scan.segment)
            .set_total_segments(scan.total_segments);
        let input =
            crate::apply_multiple_read_operation!(builder, scan.multiple_read_operation).build()?;
        Ok(Self { input })
    }
}

impl paginate::PagedRequest for ScanRequest {
    fn page_input(&self, cursor: Option<&paginate::PageToken>) -> paginate::PageInput {
        let mut input = self.input.clone();
        input.exclusive_start_key = cursor.map(|cursor| cursor.key().clone());
        paginate::PageInput::Scan(input)
    }
}

impl<T: Serialize> Scan<T> {
    /// Lower the scan into a pageable request.
    pub fn build(self) -> Result<ScanRequest> {
        let scan: ScanInput = self.try_into()?;
        scan.try_into()
    }

    /// Visit every item of the scan; see [`paginate::drive`].
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.scan", skip_all, err)
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

    /// Read every item of the scan.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "dynamodb_access.scan", skip_all, err)
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
