use crate::{
    error::{Error, Result},
    schema::table::DescribeTable,
    store::{Executor, Store},
};

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Status reported for a table or index that does not exist.
///
/// Waiting for [`ABSENT`] is how a caller waits for a deletion to finish.
pub const ABSENT: &str = "ABSENT";

/// Polling cadence and deadline.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct WaitConfig {
    /// Pause between two status queries; zero polls back to back.
    pub delay: Duration,
    /// Give up after this long; zero waits forever.
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Where the poller reads the current status from.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Query the current status once.
    async fn status(&self, cancel: &CancellationToken) -> Result<String>;
}

/// Status of a table, as reported by describe table.
#[derive(Debug)]
pub struct TableStatusSource<'a, S> {
    /// Executor used to describe the table.
    pub executor: &'a Executor<S>,
    /// The table to watch.
    pub table_name: String,
}

#[async_trait]
impl<S: Store> StatusSource for TableStatusSource<'_, S> {
    async fn status(&self, cancel: &CancellationToken) -> Result<String> {
        let description = DescribeTable {
            table_name: self.table_name.clone(),
        }
        .send(self.executor, cancel)
        .await?;
        let status = description
            .and_then(|description| description.table_status)
            .map_or_else(|| ABSENT.to_string(), |status| status.as_str().to_string());
        Ok(status)
    }
}

/// Status of a global secondary index, as reported by describe table.
#[derive(Debug)]
pub struct IndexStatusSource<'a, S> {
    /// Executor used to describe the table.
    pub executor: &'a Executor<S>,
    /// The table owning the index.
    pub table_name: String,
    /// The index to watch.
    pub index_name: String,
}

#[async_trait]
impl<S: Store> StatusSource for IndexStatusSource<'_, S> {
    async fn status(&self, cancel: &CancellationToken) -> Result<String> {
        let description = DescribeTable {
            table_name: self.table_name.clone(),
        }
        .send(self.executor, cancel)
        .await?;
        let status = description
            .and_then(|description| description.global_secondary_indexes)
            .and_then(|indexes| {
                indexes
                    .into_iter()
                    .find(|index| index.index_name.as_deref() == Some(self.index_name.as_str()))
            })
            .and_then(|index| index.index_status)
            .map_or_else(|| ABSENT.to_string(), |status| status.as_str().to_string());
        Ok(status)
    }
}

enum State {
    Polling,
    Reached(String),
    TimedOut(Duration),
    Errored(Error),
}

async fn tick<T: StatusSource + ?Sized>(
    source: &T,
    targets: &[&str],
    config: &WaitConfig,
    started: Instant,
    cancel: &CancellationToken,
) -> State {
    let status = match source.status(cancel).await {
        Ok(status) => status,
        Err(error) => return State::Errored(error),
    };
    if targets.contains(&status.as_str()) {
        return State::Reached(status);
    }
    #[cfg(feature = "tracing")]
    tracing::debug!(status = %status, ?targets, "status not reached yet");
    if !config.delay.is_zero() {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return State::Errored(Error::Cancelled),
            _ = tokio::time::sleep(config.delay) => {}
        }
    }
    let elapsed = started.elapsed();
    if !config.timeout.is_zero() && elapsed > config.timeout {
        State::TimedOut(elapsed)
    } else {
        State::Polling
    }
}

/// Poll `source` until its status is one of `targets`, and return that status.
///
/// The first query happens immediately. A failed query is returned as is, without retrying.
/// Exceeding the timeout gives [`Error::Timeout`] and firing `cancel` gives
/// [`Error::Cancelled`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "dynamodb_access.wait_for_status", skip_all, err)
)]
pub async fn wait_for_status<T: StatusSource + ?Sized>(
    source: &T,
    targets: &[&str],
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<String> {
    let started = Instant::now();
    loop {
        match tick(source, targets, config, started, cancel).await {
            State::Polling => continue,
            State::Reached(status) => return Ok(status),
            State::TimedOut(elapsed) => return Err(Error::Timeout { elapsed }),
            State::Errored(error) => return Err(error),
        }
    }
}

/// Wait until a table reaches one of `targets`, e.g. `["ACTIVE"]` after a create or
/// `[ABSENT]` after a delete.
///
/// ```rust,no_run
/// use dynamodb_access::{schema::wait, store::Executor};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(executor: Executor<aws_sdk_dynamodb::Client>) -> dynamodb_access::error::Result<()> {
/// let status = wait::wait_for_table_status(
///     &executor,
///     "posts",
///     &["ACTIVE"],
///     &wait::WaitConfig::default(),
///     &CancellationToken::new(),
/// )
/// .await?;
/// assert_eq!(status, "ACTIVE");
/// # Ok(())
/// # }
/// ```
pub async fn wait_for_table_status<S: Store>(
    executor: &Executor<S>,
    table_name: &str,
    targets: &[&str],
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<String> {
    let source = TableStatusSource {
        executor,
        table_name: table_name.to_string(),
    };
    wait_for_status(&source, targets, config, cancel).await
}

/// Wait until a global secondary index reaches one of `targets`.
pub async fn wait_for_index_status<S: Store>(
    executor: &Executor<S>,
    table_name: &str,
    index_name: &str,
    targets: &[&str],
    config: &WaitConfig,
    cancel: &CancellationToken,
) -> Result<String> {
    let source = IndexStatusSource {
        executor,
        table_name: table_name.to_string(),
        index_name: index_name.to_string(),
    };
    wait_for_status(&source, targets, config, cancel).await
}
