//! In-memory trade store - used as fallback when PostgreSQL is unavailable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use bartr_core::domain::{Post, Side, Trade, TradeState};
use bartr_core::error::StoreError;
use bartr_core::ports::{CloseUpdate, TradeStore};

use super::transition;

#[derive(Default)]
struct Documents {
    posts: HashMap<Uuid, Post>,
    trades: HashMap<Uuid, Trade>,
}

/// In-memory trade store using HashMaps behind an async RwLock.
///
/// Close transitions are staged on clones under the write lock and swapped
/// in only when the whole batch evaluated cleanly, so partial application
/// is never observable. Note: data is lost on process restart.
pub struct MemoryTradeStore {
    docs: RwLock<Documents>,
    fail_next_commit: AtomicBool,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Documents::default()),
            fail_next_commit: AtomicBool::new(false),
        }
    }

    /// Make the next `apply_close_transition` fail before touching any
    /// document. Test hook for the atomicity guarantee.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }
}

impl Default for MemoryTradeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TradeStore for MemoryTradeStore {
    async fn get_trade(&self, id: Uuid) -> Result<Trade, StoreError> {
        let docs = self.docs.read().await;
        docs.trades.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "trade",
            id,
        })
    }

    async fn get_post(&self, id: Uuid) -> Result<Post, StoreError> {
        let docs = self.docs.read().await;
        docs.posts.get(&id).cloned().ok_or(StoreError::NotFound {
            entity: "post",
            id,
        })
    }

    async fn apply_close_transition(
        &self,
        trade_id: Uuid,
        updates: Vec<CloseUpdate>,
    ) -> Result<Trade, StoreError> {
        let mut docs = self.docs.write().await;

        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Connection("injected commit failure".to_string()));
        }

        let snapshot = docs
            .trades
            .get(&trade_id)
            .cloned()
            .ok_or(StoreError::NotFound {
                entity: "trade",
                id: trade_id,
            })?;

        let mut original_posts = HashMap::new();
        for post_id in transition::referenced_posts(&updates) {
            let post = docs.posts.get(&post_id).cloned().ok_or(StoreError::NotFound {
                entity: "post",
                id: post_id,
            })?;
            original_posts.insert(post_id, post);
        }

        let mut staged = snapshot.clone();
        let mut staged_posts = original_posts.clone();
        transition::apply_updates(
            &snapshot,
            &original_posts,
            &mut staged,
            &mut staged_posts,
            &updates,
        )?;
        staged.updated_at = chrono::Utc::now();

        // Everything evaluated; swap the staged copies in as one unit.
        docs.trades.insert(trade_id, staged.clone());
        for (post_id, post) in staged_posts {
            docs.posts.insert(post_id, post);
        }

        Ok(staged)
    }

    async fn save_post(&self, post: Post) -> Result<Post, StoreError> {
        let mut docs = self.docs.write().await;
        docs.posts.insert(post.id, post.clone());
        Ok(post)
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        let mut docs = self.docs.write().await;
        docs.posts.remove(&id).ok_or(StoreError::NotFound {
            entity: "post",
            id,
        })?;
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs.posts.values().cloned().collect())
    }

    async fn save_trade(&self, trade: Trade) -> Result<Trade, StoreError> {
        let mut docs = self.docs.write().await;
        docs.trades.insert(trade.id, trade.clone());
        Ok(trade)
    }

    async fn list_trades(
        &self,
        user_id: Uuid,
        side: Side,
        state: TradeState,
    ) -> Result<Vec<Trade>, StoreError> {
        let docs = self.docs.read().await;
        Ok(docs
            .trades
            .values()
            .filter(|t| t.state == state && t.side(side).user_id == user_id)
            .cloned()
            .collect())
    }
}
