//! Applying confirmed mutations to a [`CollectionView`].
//!
//! The request always runs first; the view is only touched after the service
//! accepted it. When the service echoes the entity it is merged by id,
//! otherwise the collection is re-fetched and the authoritative copy merged.

use std::future::Future;

use tracing::{debug, info};

use crate::collection::CollectionView;
use crate::error::Result;
use crate::remote::Echo;
use crate::types::{EntityId, Record};

/// How a view was brought up to date after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// The echoed entity replaced the local copy.
    Merged,
    /// The collection was re-fetched and the entity merged from it.
    Refetched,
    /// The entity is gone on the server and was dropped locally.
    Removed,
    /// The new entity was added to the collection.
    Inserted,
}

/// Send an update, then reconcile entity `id`.
pub async fn apply_update<T, C, A, Req, Refetch, Fut>(
    view: &mut CollectionView<T, C, A>,
    id: EntityId,
    request: Req,
    refetch: Refetch,
) -> Result<Reconciled>
where
    T: Record,
    C: Copy + PartialEq,
    A: Clone,
    Req: Future<Output = Result<Echo<T>>>,
    Refetch: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let echo = request.await?;
    reconcile(view, id, echo, refetch).await
}

/// Merge an acknowledged update for entity `id` into `view`.
pub async fn reconcile<T, C, A, Refetch, Fut>(
    view: &mut CollectionView<T, C, A>,
    id: EntityId,
    echo: Echo<T>,
    refetch: Refetch,
) -> Result<Reconciled>
where
    T: Record,
    C: Copy + PartialEq,
    A: Clone,
    Refetch: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    match echo {
        Echo::Echoed(entity) if entity.id() == id => {
            view.merge(entity);
            debug!(id, "merged echoed entity");
            Ok(Reconciled::Merged)
        }
        _ => {
            let fresh = refetch().await?;
            match fresh.into_iter().find(|item| item.id() == id) {
                Some(entity) => {
                    view.merge(entity);
                    info!(id, "service did not echo the entity; merged re-fetched copy");
                    Ok(Reconciled::Refetched)
                }
                None => {
                    view.remove(id);
                    info!(id, "entity no longer exists on the service; removed");
                    Ok(Reconciled::Removed)
                }
            }
        }
    }
}

/// Send a create request, then add the new entity to `view`.
///
/// Without an echo the whole collection is replaced by a fresh fetch, since
/// the new id is unknown.
pub async fn apply_create<T, C, A, Req, Refetch, Fut>(
    view: &mut CollectionView<T, C, A>,
    request: Req,
    refetch: Refetch,
) -> Result<Reconciled>
where
    T: Record,
    C: Copy + PartialEq,
    A: Clone,
    Req: Future<Output = Result<Echo<T>>>,
    Refetch: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    match request.await? {
        Echo::Echoed(entity) => {
            debug!(id = entity.id(), "inserted created entity");
            view.insert(entity);
            Ok(Reconciled::Inserted)
        }
        Echo::Accepted => {
            view.replace_all(refetch().await?);
            Ok(Reconciled::Refetched)
        }
    }
}

/// Send a delete request, then drop entity `id` from `view`.
pub async fn apply_delete<T, C, A, Req>(
    view: &mut CollectionView<T, C, A>,
    id: EntityId,
    request: Req,
) -> Result<Reconciled>
where
    T: Record,
    C: Copy + PartialEq,
    A: Clone,
    Req: Future<Output = Result<()>>,
{
    request.await?;
    view.remove(id);
    info!(id, "deleted");
    Ok(Reconciled::Removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{MatchRule, SearchSpec, SortKey, SortKeyFn};
    use crate::error::PsaError;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: EntityId,
        status: String,
    }

    impl Record for Row {
        fn id(&self) -> EntityId {
            self.id
        }
    }

    fn fields(row: &Row) -> Vec<&str> {
        vec![row.status.as_str()]
    }

    fn loaded(n: EntityId) -> CollectionView<Row, ()> {
        let key: SortKeyFn<Row, ()> = Arc::new(|row: &Row, _: ()| SortKey::text(&row.status));
        let mut view =
            CollectionView::new(SearchSpec::new(MatchRule::Contains, fields), key, None);
        view.replace_all(
            (1..=n)
                .map(|id| Row {
                    id,
                    status: "open".into(),
                })
                .collect(),
        );
        view
    }

    fn closed(id: EntityId) -> Row {
        Row {
            id,
            status: "closed".into(),
        }
    }

    #[tokio::test]
    async fn test_echo_is_merged_without_refetch() {
        let mut view = loaded(3);
        let outcome = apply_update(&mut view, 2, async { Ok(Echo::Echoed(closed(2))) }, || async {
            Err(PsaError::Other("no refetch expected".into()))
        })
        .await
        .unwrap();

        assert_eq!(outcome, Reconciled::Merged);
        assert_eq!(view.get(2), Some(&closed(2)));
        assert_eq!(view.all().len(), 3);
        assert_eq!(view.visible().iter().filter(|r| r.id == 2).count(), 1);
    }

    #[tokio::test]
    async fn test_accepted_refetches_and_merges() {
        let mut view = loaded(3);
        let outcome = apply_update(&mut view, 3, async { Ok(Echo::Accepted) }, || async {
            Ok(vec![
                Row {
                    id: 1,
                    status: "open".into(),
                },
                closed(3),
            ])
        })
        .await
        .unwrap();

        assert_eq!(outcome, Reconciled::Refetched);
        assert_eq!(view.get(3), Some(&closed(3)));
        // Only the target row is reconciled; other rows keep their local copy.
        assert_eq!(view.all().len(), 3);
    }

    #[tokio::test]
    async fn test_accepted_and_missing_removes() {
        let mut view = loaded(2);
        let outcome = apply_update(&mut view, 2, async { Ok(Echo::Accepted) }, || async {
            Ok(vec![])
        })
        .await
        .unwrap();
        assert_eq!(outcome, Reconciled::Removed);
        assert_eq!(view.get(2), None);
    }

    #[tokio::test]
    async fn test_failed_request_leaves_view_untouched() {
        let mut view = loaded(2);
        let before: Vec<Row> = view.all().to_vec();
        let err = apply_update(
            &mut view,
            1,
            async { Err::<Echo<Row>, _>(PsaError::Other("503".into())) },
            || async { Ok(vec![]) },
        )
        .await
        .unwrap_err();

        assert!(matches!(err, PsaError::Other(_)));
        assert_eq!(view.all(), before.as_slice());
    }

    #[tokio::test]
    async fn test_create_inserts_echo() {
        let mut view = loaded(1);
        let outcome = apply_create(&mut view, async { Ok(Echo::Echoed(closed(7))) }, || async {
            Ok(vec![])
        })
        .await
        .unwrap();
        assert_eq!(outcome, Reconciled::Inserted);
        assert_eq!(view.all().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_only_after_success() {
        let mut view = loaded(2);
        assert!(
            apply_delete(&mut view, 1, async { Err(PsaError::Other("409".into())) })
                .await
                .is_err()
        );
        assert!(view.get(1).is_some());

        apply_delete(&mut view, 1, async { Ok(()) }).await.unwrap();
        assert!(view.get(1).is_none());
    }
}
