//! Client API for the relation store.

use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::RelationStoreError;
use crate::models::{ReadPage, Tuple, TupleFilter};

/// Access to the relationship-based authorization store.
///
/// Implementations must be safe to share between concurrent requests.
/// Every call takes the caller's cancellation token; a cancelled call
/// returns [`RelationStoreError::Cancelled`] and, for writes, leaves the
/// outcome indeterminate.
///
/// ```ignore
/// let store: Arc<dyn RelationStoreClient> = ...;
///
/// let allowed = store.check(&cancel, &tuple, false).await?;
/// ```
#[async_trait]
pub trait RelationStoreClient: Send + Sync {
    /// Whether `tuple` holds, directly or through relation implication
    /// and group membership. With `trace` set the store logs how the
    /// answer was reached.
    ///
    /// # Errors
    ///
    /// - `RequestFailed` if the store could not answer
    /// - `Cancelled` if `cancel` fired first
    async fn check(
        &self,
        cancel: &CancellationToken,
        tuple: &Tuple,
        trace: bool,
    ) -> Result<bool, RelationStoreError>;

    /// Write all tuples or none. Writing an existing tuple is a no-op.
    ///
    /// # Errors
    ///
    /// - `SchemaViolation` if any tuple does not fit the model (nothing is written)
    /// - `RequestFailed` / `Cancelled` if the write may not have happened
    async fn add_relations(
        &self,
        cancel: &CancellationToken,
        tuples: &[Tuple],
    ) -> Result<(), RelationStoreError>;

    /// Delete all tuples or none. Deleting a missing tuple is a no-op.
    ///
    /// # Errors
    ///
    /// Same as [`add_relations`](Self::add_relations).
    async fn remove_relations(
        &self,
        cancel: &CancellationToken,
        tuples: &[Tuple],
    ) -> Result<(), RelationStoreError>;

    /// Direct tuples matching `filter`, in a stable order, at most `limit`
    /// per page. Pass the previous page's `next_cursor` to continue.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` for a zero or oversized `limit` or a cursor this
    ///   store did not issue
    /// - `RequestFailed` / `Cancelled` as for every call
    async fn read_related_objects(
        &self,
        cancel: &CancellationToken,
        filter: &TupleFilter,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<ReadPage, RelationStoreError>;
}

/// Run `fut` unless `cancel` fires first.
///
/// # Errors
///
/// Returns [`RelationStoreError::Cancelled`] if the token fires, otherwise
/// whatever `fut` returns.
pub async fn with_cancellation<T, F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, RelationStoreError>
where
    F: Future<Output = Result<T, RelationStoreError>>,
{
    if cancel.is_cancelled() {
        return Err(RelationStoreError::Cancelled);
    }
    cancel
        .run_until_cancelled(fut)
        .await
        .unwrap_or(Err(RelationStoreError::Cancelled))
}

/// Follow cursors until every tuple matching `filter` has been read.
///
/// # Errors
///
/// Propagates the first error from any page.
pub async fn read_all_related_objects<C>(
    client: &C,
    cancel: &CancellationToken,
    filter: &TupleFilter,
    page_size: u32,
) -> Result<Vec<Tuple>, RelationStoreError>
where
    C: RelationStoreClient + ?Sized,
{
    let mut tuples = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = client
            .read_related_objects(cancel, filter, page_size, cursor.as_deref())
            .await?;
        tuples.extend(page.tuples);

        match page.next_cursor {
            Some(next) => cursor = Some(next),
            None => return Ok(tuples),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use jimm_names::{Relation, Tag};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Serves `total` administrators of one service account, in pages,
    /// using the index of the next tuple as cursor.
    struct PagingStore {
        total: usize,
        reads: AtomicUsize,
    }

    fn tag(s: &str) -> Tag {
        s.parse().unwrap()
    }

    fn admin(i: usize) -> Tuple {
        Tuple::new(
            tag(&format!("user-u{i}")),
            Relation::Administrator,
            tag("serviceaccount-acme"),
        )
    }

    #[async_trait]
    impl RelationStoreClient for PagingStore {
        async fn check(
            &self,
            _cancel: &CancellationToken,
            _tuple: &Tuple,
            _trace: bool,
        ) -> Result<bool, RelationStoreError> {
            Ok(false)
        }

        async fn add_relations(
            &self,
            _cancel: &CancellationToken,
            _tuples: &[Tuple],
        ) -> Result<(), RelationStoreError> {
            Ok(())
        }

        async fn remove_relations(
            &self,
            _cancel: &CancellationToken,
            _tuples: &[Tuple],
        ) -> Result<(), RelationStoreError> {
            Ok(())
        }

        async fn read_related_objects(
            &self,
            _cancel: &CancellationToken,
            _filter: &TupleFilter,
            limit: u32,
            cursor: Option<&str>,
        ) -> Result<ReadPage, RelationStoreError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let start = match cursor {
                Some(c) => c
                    .parse::<usize>()
                    .map_err(|_| RelationStoreError::InvalidRequest("bad cursor".to_owned()))?,
                None => 0,
            };
            let end = (start + limit as usize).min(self.total);
            Ok(ReadPage {
                tuples: (start..end).map(admin).collect(),
                next_cursor: (end < self.total).then(|| end.to_string()),
            })
        }
    }

    fn filter() -> TupleFilter {
        TupleFilter::new(Relation::Administrator, tag("serviceaccount-acme"))
    }

    #[tokio::test]
    async fn read_all_follows_cursors() {
        let store = PagingStore {
            total: 7,
            reads: AtomicUsize::new(0),
        };
        let cancel = CancellationToken::new();

        let all = read_all_related_objects(&store, &cancel, &filter(), 3)
            .await
            .unwrap();

        assert_eq!(all.len(), 7);
        assert_eq!(all[6], admin(6));
        assert_eq!(store.reads.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn read_all_on_empty_result_reads_once() {
        let store = PagingStore {
            total: 0,
            reads: AtomicUsize::new(0),
        };
        let client: &dyn RelationStoreClient = &store;

        let all = read_all_related_objects(client, &CancellationToken::new(), &filter(), 10)
            .await
            .unwrap();

        assert!(all.is_empty());
        assert_eq!(store.reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn with_cancellation_passes_through_result() {
        let cancel = CancellationToken::new();
        let out = with_cancellation(&cancel, async { Ok::<_, RelationStoreError>(42) }).await;
        assert_eq!(out, Ok(42));
    }

    #[tokio::test]
    async fn with_cancellation_rejects_already_cancelled_token() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let out = with_cancellation(&cancel, async { Ok::<_, RelationStoreError>(()) }).await;
        assert_eq!(out, Err(RelationStoreError::Cancelled));
    }

    #[tokio::test]
    async fn with_cancellation_interrupts_pending_future() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let out = with_cancellation(&cancel, async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, RelationStoreError>(())
        })
        .await;
        assert_eq!(out, Err(RelationStoreError::Cancelled));
    }
}
