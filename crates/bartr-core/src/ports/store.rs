//! Durable storage port for trades and posts.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostState, Side, Trade, TradeState};
use crate::error::StoreError;

/// One step of a close batch - a typed (path, value) assignment against the
/// trade row or a referenced post row, plus the two conditional forms that
/// make the batch a single compare-and-swap instead of a read-then-write.
#[derive(Debug, Clone, PartialEq)]
pub enum CloseUpdate {
    /// Abort the entire batch with `StoreError::Guard` unless the post is
    /// in `expected` when the batch commits.
    ExpectPostState { post_id: Uuid, expected: PostState },

    /// Set `trade.<side>.closed = true`.
    SetSideClosed { side: Side },

    /// Set the side's denormalized post-state snapshot.
    SetSidePostState { side: Side, state: PostState },

    /// Set the trade's combined state.
    SetTradeState { state: TradeState },

    /// Set the authoritative state of a referenced post.
    SetPostState { post_id: Uuid, state: PostState },

    /// Apply the nested updates only if `side.closed` is true in the
    /// transaction's own snapshot of the trade - evaluated before any
    /// update in this batch lands, never against a caller-side read.
    WhenSideClosed { side: Side, then: Vec<CloseUpdate> },
}

/// Storage port for trades and posts.
///
/// `apply_close_transition` is the only multi-record mutation: everything
/// in the batch lands or nothing does, and no reader ever observes a
/// partial application. Concurrent transitions on the same trade are not
/// serialized beyond that per-call atomicity; the conditional updates
/// exist so correctness does not depend on it.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn get_trade(&self, id: Uuid) -> Result<Trade, StoreError>;

    async fn get_post(&self, id: Uuid) -> Result<Post, StoreError>;

    /// Apply a close batch as one indivisible unit and return the trade
    /// as it stands after the transition.
    async fn apply_close_transition(
        &self,
        trade_id: Uuid,
        updates: Vec<CloseUpdate>,
    ) -> Result<Trade, StoreError>;

    /// Create or replace a post.
    async fn save_post(&self, post: Post) -> Result<Post, StoreError>;

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError>;

    /// Create or replace a trade. Trade creation itself is outside the
    /// closing protocol; this exists for the proposal flow and fixtures.
    async fn save_trade(&self, trade: Trade) -> Result<Trade, StoreError>;

    /// Trades where the given user sits on `side` and the trade is in
    /// `state`.
    async fn list_trades(
        &self,
        user_id: Uuid,
        side: Side,
        state: TradeState,
    ) -> Result<Vec<Trade>, StoreError>;
}
