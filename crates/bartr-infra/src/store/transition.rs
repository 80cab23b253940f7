//! Close-batch evaluation shared by every `TradeStore` implementation.
//!
//! A batch is evaluated against three views: the pre-batch trade snapshot
//! (for `WhenSideClosed`), the pre-batch post rows (for guards), and the
//! staged copies that accumulate the writes. Callers stage everything
//! first and persist only when the whole batch evaluated cleanly.

use std::collections::{BTreeSet, HashMap};

use uuid::Uuid;

use bartr_core::domain::{Post, Trade};
use bartr_core::error::StoreError;
use bartr_core::ports::CloseUpdate;

/// Post ids a batch reads or writes, in stable order. Implementations load
/// exactly these rows into the transaction before evaluating.
pub(crate) fn referenced_posts(updates: &[CloseUpdate]) -> BTreeSet<Uuid> {
    let mut ids = BTreeSet::new();
    collect_posts(updates, &mut ids);
    ids
}

fn collect_posts(updates: &[CloseUpdate], ids: &mut BTreeSet<Uuid>) {
    for update in updates {
        match update {
            CloseUpdate::ExpectPostState { post_id, .. }
            | CloseUpdate::SetPostState { post_id, .. } => {
                ids.insert(*post_id);
            }
            CloseUpdate::WhenSideClosed { then, .. } => collect_posts(then, ids),
            _ => {}
        }
    }
}

/// Evaluate a batch. `snapshot` and `original_posts` are the rows as read
/// inside the transaction; `staged` and `staged_posts` start as copies of
/// them and receive the writes. Any error means nothing may be persisted.
pub(crate) fn apply_updates(
    snapshot: &Trade,
    original_posts: &HashMap<Uuid, Post>,
    staged: &mut Trade,
    staged_posts: &mut HashMap<Uuid, Post>,
    updates: &[CloseUpdate],
) -> Result<(), StoreError> {
    for update in updates {
        match update {
            CloseUpdate::ExpectPostState { post_id, expected } => {
                let post = original_posts.get(post_id).ok_or(StoreError::NotFound {
                    entity: "post",
                    id: *post_id,
                })?;
                if post.state != *expected {
                    return Err(StoreError::Guard { post_id: *post_id });
                }
            }
            CloseUpdate::SetSideClosed { side } => {
                staged.side_mut(*side).closed = true;
            }
            CloseUpdate::SetSidePostState { side, state } => {
                staged.side_mut(*side).post_state = *state;
            }
            CloseUpdate::SetTradeState { state } => {
                staged.state = *state;
            }
            CloseUpdate::SetPostState { post_id, state } => {
                let post = staged_posts.get_mut(post_id).ok_or(StoreError::NotFound {
                    entity: "post",
                    id: *post_id,
                })?;
                post.state = *state;
                post.updated_at = chrono::Utc::now();
            }
            CloseUpdate::WhenSideClosed { side, then } => {
                // Decided on the transaction's snapshot, not on anything
                // this batch staged.
                if snapshot.side(*side).closed {
                    apply_updates(snapshot, original_posts, staged, staged_posts, then)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bartr_core::domain::{GeoPoint, PostState, Side, TradeState};

    fn post() -> Post {
        Post::new(
            Uuid::new_v4(),
            "Canoe".to_string(),
            "Slightly used".to_string(),
            vec![],
            GeoPoint { lat: 0.0, lng: 0.0 },
        )
    }

    fn fixture() -> (Trade, HashMap<Uuid, Post>) {
        let (a, b) = (post(), post());
        let trade = Trade::proposed(&a, &b);
        let posts = HashMap::from([(a.id, a), (b.id, b)]);
        (trade, posts)
    }

    #[test]
    fn guard_failure_aborts_before_any_write() {
        let (trade, mut posts) = fixture();
        let post_id = trade.buyer.post_id;
        posts.get_mut(&post_id).unwrap().state = PostState::Closed;

        let mut staged = trade.clone();
        let mut staged_posts = posts.clone();
        let err = apply_updates(
            &trade,
            &posts,
            &mut staged,
            &mut staged_posts,
            &[
                CloseUpdate::ExpectPostState {
                    post_id,
                    expected: PostState::Pending,
                },
                CloseUpdate::SetSideClosed { side: Side::Buyer },
            ],
        )
        .unwrap_err();

        assert!(matches!(err, StoreError::Guard { post_id: p } if p == post_id));
        assert!(!staged.buyer.closed);
    }

    #[test]
    fn conditional_branch_reads_the_snapshot() {
        let (mut trade, posts) = fixture();
        trade.seller.closed = true;

        let mut staged = trade.clone();
        let mut staged_posts = posts.clone();
        apply_updates(
            &trade,
            &posts,
            &mut staged,
            &mut staged_posts,
            &[CloseUpdate::WhenSideClosed {
                side: Side::Seller,
                then: vec![CloseUpdate::SetTradeState {
                    state: TradeState::Closed,
                }],
            }],
        )
        .unwrap();

        assert_eq!(staged.state, TradeState::Closed);
    }

    #[test]
    fn conditional_branch_skipped_while_other_side_open() {
        let (trade, posts) = fixture();

        let mut staged = trade.clone();
        let mut staged_posts = posts.clone();
        apply_updates(
            &trade,
            &posts,
            &mut staged,
            &mut staged_posts,
            &[CloseUpdate::WhenSideClosed {
                side: Side::Seller,
                then: vec![CloseUpdate::SetTradeState {
                    state: TradeState::Closed,
                }],
            }],
        )
        .unwrap();

        assert_eq!(staged.state, TradeState::Pending);
    }

    #[test]
    fn referenced_posts_walks_nested_updates() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let ids = referenced_posts(&[
            CloseUpdate::ExpectPostState {
                post_id: a,
                expected: PostState::Pending,
            },
            CloseUpdate::WhenSideClosed {
                side: Side::Buyer,
                then: vec![CloseUpdate::SetPostState {
                    post_id: b,
                    state: PostState::Closed,
                }],
            },
        ]);
        assert_eq!(ids, BTreeSet::from([a, b]));
    }
}
