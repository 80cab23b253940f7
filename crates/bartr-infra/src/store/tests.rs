//! Closing-protocol tests run against the in-memory store, plus a mocked
//! SeaORM read test for the PostgreSQL path.

use std::sync::Arc;

use uuid::Uuid;

use bartr_core::closer::TradeCloser;
use bartr_core::domain::{GeoPoint, Post, PostState, Side, Trade, TradeState};
use bartr_core::error::TradeError;
use bartr_core::ports::TradeStore;

use super::memory::MemoryTradeStore;

fn pending_post(owner: Uuid) -> Post {
    Post::new(
        owner,
        "Guitar".to_string(),
        "Six strings, five working".to_string(),
        vec!["music".to_string()],
        GeoPoint {
            lat: 45.5,
            lng: -73.6,
        },
    )
}

/// Seed a trade T1 over posts P1 (buyer) and P2 (seller), all PENDING.
async fn seed(store: &MemoryTradeStore) -> (Trade, Post, Post) {
    let p1 = pending_post(Uuid::new_v4());
    let p2 = pending_post(Uuid::new_v4());
    let trade = Trade::proposed(&p1, &p2);

    store.save_post(p1.clone()).await.unwrap();
    store.save_post(p2.clone()).await.unwrap();
    store.save_trade(trade.clone()).await.unwrap();

    (trade, p1, p2)
}

#[tokio::test]
async fn first_close_settles_one_side_only() {
    let store = Arc::new(MemoryTradeStore::new());
    let closer = TradeCloser::new(store.clone());
    let (trade, p1, p2) = seed(&store).await;

    let updated = closer.close_side(trade.id, Side::Seller).await.unwrap();

    assert!(updated.seller.closed);
    assert_eq!(updated.seller.post_state, PostState::Closed);
    assert!(!updated.buyer.closed);
    assert_eq!(updated.state, TradeState::Pending);

    // Authoritative rows match the snapshots.
    assert_eq!(store.get_post(p2.id).await.unwrap().state, PostState::Closed);
    assert_eq!(store.get_post(p1.id).await.unwrap().state, PostState::Pending);
}

#[tokio::test]
async fn second_close_settles_the_trade() {
    let store = Arc::new(MemoryTradeStore::new());
    let closer = TradeCloser::new(store.clone());
    let (trade, p1, p2) = seed(&store).await;

    closer.close_side(trade.id, Side::Seller).await.unwrap();
    let updated = closer.close_side(trade.id, Side::Buyer).await.unwrap();

    assert_eq!(updated.state, TradeState::Closed);
    assert!(updated.buyer.closed && updated.seller.closed);
    assert_eq!(updated.buyer.post_state, PostState::Closed);
    assert_eq!(updated.seller.post_state, PostState::Closed);
    assert_eq!(store.get_post(p1.id).await.unwrap().state, PostState::Closed);
    assert_eq!(store.get_post(p2.id).await.unwrap().state, PostState::Closed);
}

#[tokio::test]
async fn close_order_does_not_matter() {
    let store = Arc::new(MemoryTradeStore::new());
    let closer = TradeCloser::new(store.clone());
    let (trade, _, _) = seed(&store).await;

    closer.close_side(trade.id, Side::Buyer).await.unwrap();
    let updated = closer.close_side(trade.id, Side::Seller).await.unwrap();

    assert_eq!(updated.state, TradeState::Closed);
    assert!(updated.both_sides_closed());
}

#[tokio::test]
async fn closing_an_unavailable_post_fails_and_changes_nothing() {
    let store = Arc::new(MemoryTradeStore::new());
    let closer = TradeCloser::new(store.clone());
    let (trade, mut p1, _) = seed(&store).await;

    // P1 already closed, e.g. via another trade.
    p1.state = PostState::Closed;
    store.save_post(p1.clone()).await.unwrap();

    let err = closer.close_side(trade.id, Side::Buyer).await.unwrap_err();
    match err {
        TradeError::InvalidState { post_id, .. } => assert_eq!(post_id, p1.id),
        other => panic!("expected InvalidState, got {other:?}"),
    }

    let stored = store.get_trade(trade.id).await.unwrap();
    assert!(!stored.buyer.closed);
    assert_eq!(stored.state, TradeState::Pending);
}

#[tokio::test]
async fn closing_the_same_side_twice_fails_the_second_time() {
    let store = Arc::new(MemoryTradeStore::new());
    let closer = TradeCloser::new(store.clone());
    let (trade, _, _) = seed(&store).await;

    closer.close_side(trade.id, Side::Buyer).await.unwrap();
    let err = closer.close_side(trade.id, Side::Buyer).await.unwrap_err();

    assert!(matches!(err, TradeError::InvalidState { .. }));

    // State from the first close is intact, not corrupted.
    let stored = store.get_trade(trade.id).await.unwrap();
    assert!(stored.buyer.closed);
    assert!(!stored.seller.closed);
    assert_eq!(stored.state, TradeState::Pending);
}

#[tokio::test]
async fn failed_commit_leaves_zero_observable_changes() {
    let store = Arc::new(MemoryTradeStore::new());
    let closer = TradeCloser::new(store.clone());
    let (trade, p1, p2) = seed(&store).await;

    store.fail_next_commit();
    let err = closer.close_side(trade.id, Side::Seller).await.unwrap_err();
    assert!(matches!(err, TradeError::Storage(_)));

    let stored = store.get_trade(trade.id).await.unwrap();
    assert!(!stored.buyer.closed && !stored.seller.closed);
    assert_eq!(stored.state, TradeState::Pending);
    assert_eq!(store.get_post(p1.id).await.unwrap().state, PostState::Pending);
    assert_eq!(store.get_post(p2.id).await.unwrap().state, PostState::Pending);

    // The hook arms a single failure; a retry succeeds.
    let updated = closer.close_side(trade.id, Side::Seller).await.unwrap();
    assert!(updated.seller.closed);
}

#[tokio::test]
async fn close_on_missing_trade_is_not_found() {
    let store = Arc::new(MemoryTradeStore::new());
    let closer = TradeCloser::new(store.clone());

    let err = closer.close_side(Uuid::new_v4(), Side::Buyer).await.unwrap_err();
    assert!(matches!(err, TradeError::NotFound { entity: "trade", .. }));
}

#[tokio::test]
async fn guard_catches_a_post_that_changed_after_the_pre_read() {
    use bartr_core::ports::CloseUpdate;

    let store = Arc::new(MemoryTradeStore::new());
    let (trade, p1, _) = seed(&store).await;

    // A batch built from a stale view of P1: by commit time the post has
    // already been closed elsewhere. The guard must reject the whole unit.
    let mut flipped = p1.clone();
    flipped.state = PostState::Closed;
    store.save_post(flipped).await.unwrap();

    let err = store
        .apply_close_transition(
            trade.id,
            vec![
                CloseUpdate::ExpectPostState {
                    post_id: p1.id,
                    expected: PostState::Pending,
                },
                CloseUpdate::SetSideClosed { side: Side::Buyer },
            ],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        bartr_core::error::StoreError::Guard { post_id } if post_id == p1.id
    ));
    assert!(!store.get_trade(trade.id).await.unwrap().buyer.closed);
}

#[tokio::test]
async fn list_trades_filters_by_side_user_and_state() {
    let store = Arc::new(MemoryTradeStore::new());
    let (trade, p1, _) = seed(&store).await;
    seed(&store).await; // unrelated trade

    let buyer_id = p1.user_id;
    let open = store
        .list_trades(buyer_id, Side::Buyer, TradeState::Pending)
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id, trade.id);

    let closed = store
        .list_trades(buyer_id, Side::Buyer, TradeState::Closed)
        .await
        .unwrap();
    assert!(closed.is_empty());

    let as_seller = store
        .list_trades(buyer_id, Side::Seller, TradeState::Pending)
        .await
        .unwrap();
    assert!(as_seller.is_empty());
}

#[cfg(feature = "postgres")]
mod postgres {
    use super::*;
    use crate::store::entity::{post, trade};
    use crate::store::PostgresTradeStore;
    use bartr_core::ports::CloseUpdate;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn trade_row(trade_id: Uuid, buyer_post_id: Uuid) -> trade::Model {
        let now = chrono::Utc::now();
        trade::Model {
            id: trade_id,
            state: "PENDING".to_owned(),
            buyer_post_id,
            buyer_user_id: Uuid::new_v4(),
            buyer_closed: false,
            buyer_post_state: "PENDING".to_owned(),
            seller_post_id: Uuid::new_v4(),
            seller_user_id: Uuid::new_v4(),
            seller_closed: false,
            seller_post_state: "PENDING".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn post_row(post_id: Uuid) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id: post_id,
            user_id: Uuid::new_v4(),
            title: "Guitar".to_owned(),
            description: "Six strings, five working".to_owned(),
            photo_urls: serde_json::json!([]),
            tags: serde_json::json!(["music"]),
            state: "PENDING".to_owned(),
            lat: 45.5,
            lng: -73.6,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[tokio::test]
    async fn reads_a_trade_row_through_seaorm() {
        let trade_id = Uuid::new_v4();
        let mut row = trade_row(trade_id, Uuid::new_v4());
        row.seller_closed = true;
        row.seller_post_state = "CLOSED".to_owned();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![row]])
            .into_connection();

        let store = PostgresTradeStore::new(db);
        let result = store.get_trade(trade_id).await.unwrap();

        assert_eq!(result.id, trade_id);
        assert_eq!(result.state, TradeState::Pending);
        assert!(result.seller.closed);
        assert_eq!(result.seller.post_state, PostState::Closed);
    }

    #[tokio::test]
    async fn close_transition_locks_its_rows_for_update() {
        let trade_id = Uuid::new_v4();
        let post_id = Uuid::new_v4();

        // One result set per statement, in execution order: the locked
        // trade read, the locked post read, then the two RETURNING updates.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![trade_row(trade_id, post_id)]])
            .append_query_results(vec![vec![post_row(post_id)]])
            .append_query_results(vec![vec![trade_row(trade_id, post_id)]])
            .append_query_results(vec![vec![post_row(post_id)]])
            .into_connection();

        let store = PostgresTradeStore::new(db);
        let updated = store
            .apply_close_transition(
                trade_id,
                vec![
                    CloseUpdate::ExpectPostState {
                        post_id,
                        expected: PostState::Pending,
                    },
                    CloseUpdate::SetSideClosed { side: Side::Buyer },
                    CloseUpdate::SetPostState {
                        post_id,
                        state: PostState::Closed,
                    },
                ],
            )
            .await
            .unwrap();
        assert!(updated.buyer.closed);

        // Two closes racing on the same trade must serialize on the row
        // locks, so both in-transaction SELECTs have to take FOR UPDATE.
        let log = format!("{:?}", store.db.into_transaction_log());
        assert_eq!(log.matches("FOR UPDATE").count(), 2, "statements: {log}");
    }
}
