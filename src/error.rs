//! Error taxonomy shared by every operation of the crate.
//!
//! Argument and encoding errors are raised while lowering a request, before any network call.
//! Store errors are classified by the [`Store`](crate::store::Store) implementation and
//! propagated unchanged, with the two absorptions documented on
//! [`PutItem::send_if_absent`](crate::write::put_item::PutItem::send_if_absent) and
//! [`DeleteTable::send`](crate::schema::table::DeleteTable::send).

use aws_sdk_dynamodb::error::BuildError;
use std::fmt;
use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The reason a single item caused (or did not cause) a transaction to be cancelled.
///
/// Reasons are positional: the reason at index `i` belongs to the item at index `i` of the
/// submitted transaction.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CancellationReason {
    /// The reason code, e.g. `ConditionalCheckFailed`, `TransactionConflict` or `None`.
    pub code: Option<String>,
    /// The human readable message attached by the store.
    pub message: Option<String>,
}

impl CancellationReason {
    /// Whether this item took part in the cancellation.
    ///
    /// The store reports `None` (or no code at all) for the items that were fine.
    pub fn is_cause(&self) -> bool {
        !matches!(self.code.as_deref(), None | Some("None"))
    }
}

/// Errors returned by the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing required input.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// A native value has a shape that cannot be encoded as requested.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// An item returned by the store could not be decoded into the requested type.
    #[error("decode error: {0}")]
    Decode(String),

    /// The targeted resource does not exist.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// A conditional write was rejected.
    #[error("condition check failed: {0}")]
    ConditionFailed(String),

    /// A transaction was cancelled; one reason per submitted item.
    #[error("transaction cancelled: {}", DisplayReasons(.reasons))]
    TransactionCancelled {
        /// Per-item reasons, aligned with the submitted items.
        reasons: Vec<CancellationReason>,
        /// The message attached by the store.
        message: String,
    },

    /// The resource is being created, updated or deleted.
    #[error("resource in use: {0}")]
    ResourceInUse(String),

    /// The request was throttled.
    #[error("request throttled: {0}")]
    Throttled(String),

    /// A wait deadline elapsed before the expected status was reached.
    #[error("timed out after {elapsed:?} waiting for status")]
    Timeout {
        /// How long the wait lasted.
        elapsed: std::time::Duration,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Any other failure talking to the store.
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Whether this is a condition-check failure.
    pub fn is_condition_failed(&self) -> bool {
        matches!(self, Self::ConditionFailed(_))
    }

    /// Whether this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_dynamo::Error> for Error {
    fn from(error: serde_dynamo::Error) -> Self {
        Self::Encoding(error.to_string())
    }
}

impl From<BuildError> for Error {
    fn from(error: BuildError) -> Self {
        Self::Argument(error.to_string())
    }
}

struct DisplayReasons<'a>(&'a [CancellationReason]);

impl fmt::Display for DisplayReasons<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<_> = self
            .0
            .iter()
            .map(|reason| reason.code.as_deref().unwrap_or("None"))
            .collect();
        write!(f, "[{}]", codes.join(", "))
    }
}
