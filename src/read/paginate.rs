//! Cursor-driven paged reads.
//!
//! [`next_page`] is the single round trip: it takes the cursor explicitly and returns the next
//! one. [`drive`] loops over it, decoding items and handing them to a callback until the callback
//! stops or the cursor runs out. [`collect`] is `drive` with a callback that keeps everything.

use crate::{
    common::{self, codec},
    error::Result,
    store::{Executor, Store},
};

use aws_sdk_dynamodb::{operation, types};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

/// Opaque continuation cursor.
///
/// Wraps the last evaluated key of a page. Its absence after a page means the read is exhausted.
#[derive(Clone, Debug, PartialEq)]
pub struct PageToken(common::Item);

impl PageToken {
    /// Resume from a key previously returned by the store.
    pub fn from_key(key: common::Item) -> Self {
        Self(key)
    }

    /// The key to resume from.
    pub fn key(&self) -> &common::Item {
        &self.0
    }

    /// Unwrap into the key to resume from.
    pub fn into_key(self) -> common::Item {
        self.0
    }
}

/// One page of a paged read.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// The raw items of the page, in store order.
    pub items: Vec<common::Item>,
    /// Where the next page starts; `None` once the read is exhausted.
    pub cursor: Option<PageToken>,
    /// Number of items returned after filtering.
    pub count: i32,
    /// Number of items evaluated before filtering.
    pub scanned_count: i32,
    /// Capacity consumed by this page, when requested.
    pub consumed_capacity: Option<types::ConsumedCapacity>,
}

/// The request of a single page.
#[derive(Clone, Debug, PartialEq)]
pub enum PageInput {
    /// A scan page.
    Scan(operation::scan::ScanInput),
    /// A query page.
    Query(operation::query::QueryInput),
}

/// A lowered read that can be fetched page by page.
pub trait PagedRequest {
    /// The request for the page starting at `cursor`; the first page when `None`.
    fn page_input(&self, cursor: Option<&PageToken>) -> PageInput;
}

fn cursor(last_evaluated_key: Option<common::Item>) -> Option<PageToken> {
    last_evaluated_key
        .filter(|key| !key.is_empty())
        .map(PageToken)
}

/// Fetch the page starting at `cursor`.
pub async fn next_page<S, R>(
    executor: &Executor<S>,
    request: &R,
    cursor: Option<&PageToken>,
    cancel: &CancellationToken,
) -> Result<Page>
where
    S: Store,
    R: PagedRequest + ?Sized,
{
    let page = match request.page_input(cursor) {
        PageInput::Scan(input) => {
            let output = executor.scan(input, cancel).await?;
            Page {
                items: output.items.unwrap_or_default(),
                cursor: self::cursor(output.last_evaluated_key),
                count: output.count,
                scanned_count: output.scanned_count,
                consumed_capacity: output.consumed_capacity,
            }
        }
        PageInput::Query(input) => {
            let output = executor.query(input, cancel).await?;
            Page {
                items: output.items.unwrap_or_default(),
                cursor: self::cursor(output.last_evaluated_key),
                count: output.count,
                scanned_count: output.scanned_count,
                consumed_capacity: output.consumed_capacity,
            }
        }
    };
    Ok(page)
}

/// Visit every item of a paged read in order.
///
/// The callback receives each decoded item together with the cursor its page was fetched with
/// (`None` for the first page). Returning `Ok(false)` stops the read; returning an error stops it
/// and propagates the error. No page is fetched beyond the one holding the last visited item.
///
/// A page is decoded as a whole before its first item is visited, so an undecodable item fails
/// the read before any item of its page reaches the callback.
pub async fn drive<S, R, T, F>(
    executor: &Executor<S>,
    request: &R,
    cancel: &CancellationToken,
    mut callback: F,
) -> Result<()>
where
    S: Store,
    R: PagedRequest + ?Sized,
    T: DeserializeOwned,
    F: FnMut(T, Option<&PageToken>) -> Result<bool>,
{
    let mut current: Option<PageToken> = None;
    #[cfg(feature = "tracing")]
    let mut page_number = 0usize;
    loop {
        let page = next_page(executor, request, current.as_ref(), cancel).await?;
        #[cfg(feature = "tracing")]
        {
            page_number += 1;
            tracing::debug!(
                page_number,
                count = page.count,
                scanned_count = page.scanned_count,
                exhausted = page.cursor.is_none(),
                "page fetched"
            );
        }
        let items = page
            .items
            .into_iter()
            .map(codec::decode_item_as::<T>)
            .collect::<Result<Vec<_>>>()?;
        for item in items {
            if !callback(item, current.as_ref())? {
                return Ok(());
            }
        }
        match page.cursor {
            Some(next) => current = Some(next),
            None => return Ok(()),
        }
    }
}

/// Read every item of a paged read, in order.
pub async fn collect<S, R, T>(
    executor: &Executor<S>,
    request: &R,
    cancel: &CancellationToken,
) -> Result<Vec<T>>
where
    S: Store,
    R: PagedRequest + ?Sized,
    T: DeserializeOwned,
{
    let mut items = Vec::new();
    drive(executor, request, cancel, |item, _| {
        items.push(item);
        Ok(true)
    })
    .await?;
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;
    use std::collections;

    #[rstest]
    #[case::absent(None, None)]
    #[case::empty(Some(collections::HashMap::new()), None)]
    #[case::key(
        Some(collections::HashMap::from([(
            "id".to_string(),
            types::AttributeValue::S("a".to_string())
        )])),
        Some(PageToken::from_key(collections::HashMap::from([(
            "id".to_string(),
            types::AttributeValue::S("a".to_string())
        )])))
    )]
    fn test_cursor(#[case] last_evaluated_key: Option<common::Item>, #[case] expected: Option<PageToken>) {
        assert_eq!(cursor(last_evaluated_key), expected);
    }
}
