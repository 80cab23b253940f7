//! PostgreSQL trade store.
//!
//! `apply_close_transition` runs inside a database transaction that
//! re-reads and row-locks the trade and every referenced post before
//! evaluating the batch, so guards and `WhenSideClosed` decisions are
//! made on the rows the write will actually land on.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DbConn, DbErr, EntityTrait,
    QueryFilter, QuerySelect, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use bartr_core::domain::{Post, Side, Trade, TradeState};
use bartr_core::error::StoreError;
use bartr_core::ports::{CloseUpdate, TradeStore};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::trade::{self, Entity as TradeEntity};
use super::transition;

/// Connection configuration for the trade database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// PostgreSQL-backed trade store.
pub struct PostgresTradeStore {
    pub(crate) db: DbConn,
}

impl PostgresTradeStore {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Connect a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let opts = ConnectOptions::new(&config.url)
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .sqlx_logging(true)
            .to_owned();

        let db = Database::connect(opts).await?;
        tracing::info!(pool = config.max_connections, "trade database connected");
        Ok(Self::new(db))
    }
}

fn query_err(e: DbErr) -> StoreError {
    StoreError::Query(e.to_string())
}

#[async_trait]
impl TradeStore for PostgresTradeStore {
    async fn get_trade(&self, id: Uuid) -> Result<Trade, StoreError> {
        let model = TradeEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(StoreError::NotFound {
                entity: "trade",
                id,
            })?;
        model.try_into()
    }

    async fn get_post(&self, id: Uuid) -> Result<Post, StoreError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(StoreError::NotFound {
                entity: "post",
                id,
            })?;
        model.try_into()
    }

    async fn apply_close_transition(
        &self,
        trade_id: Uuid,
        updates: Vec<CloseUpdate>,
    ) -> Result<Trade, StoreError> {
        let result = self
            .db
            .transaction::<_, Trade, StoreError>(|txn| {
                Box::pin(async move {
                    // Fresh reads inside the transaction; nothing from the
                    // caller's earlier reads is trusted here. The rows are
                    // locked with SELECT .. FOR UPDATE so a concurrent close
                    // of the other side waits for this commit instead of
                    // writing over it from a stale snapshot.
                    let snapshot: Trade = TradeEntity::find_by_id(trade_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .map_err(query_err)?
                        .ok_or(StoreError::NotFound {
                            entity: "trade",
                            id: trade_id,
                        })?
                        .try_into()?;

                    let mut original_posts = HashMap::new();
                    for post_id in transition::referenced_posts(&updates) {
                        let post: Post = PostEntity::find_by_id(post_id)
                            .lock_exclusive()
                            .one(txn)
                            .await
                            .map_err(query_err)?
                            .ok_or(StoreError::NotFound {
                                entity: "post",
                                id: post_id,
                            })?
                            .try_into()?;
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

                    let trade_model: trade::ActiveModel = staged.clone().into();
                    trade_model.update(txn).await.map_err(query_err)?;

                    for (_, post) in staged_posts {
                        let post_model: post::ActiveModel = post.into();
                        post_model.update(txn).await.map_err(query_err)?;
                    }

                    Ok(staged)
                })
            })
            .await;

        result.map_err(|e| match e {
            TransactionError::Connection(db) => StoreError::Connection(db.to_string()),
            TransactionError::Transaction(store) => store,
        })
    }

    async fn save_post(&self, p: Post) -> Result<Post, StoreError> {
        let model: post::ActiveModel = p.into();
        let saved = PostEntity::insert(model)
            .on_conflict(
                OnConflict::column(post::Column::Id)
                    .update_columns([
                        post::Column::Title,
                        post::Column::Description,
                        post::Column::PhotoUrls,
                        post::Column::Tags,
                        post::Column::State,
                        post::Column::Lat,
                        post::Column::Lng,
                        post::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;
        saved.try_into()
    }

    async fn delete_post(&self, id: Uuid) -> Result<(), StoreError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;
        if result.rows_affected == 0 {
            return Err(StoreError::NotFound {
                entity: "post",
                id,
            });
        }
        Ok(())
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let models = PostEntity::find().all(&self.db).await.map_err(query_err)?;
        models.into_iter().map(TryInto::try_into).collect()
    }

    async fn save_trade(&self, t: Trade) -> Result<Trade, StoreError> {
        let model: trade::ActiveModel = t.into();
        let saved = TradeEntity::insert(model)
            .on_conflict(
                OnConflict::column(trade::Column::Id)
                    .update_columns([
                        trade::Column::State,
                        trade::Column::BuyerClosed,
                        trade::Column::BuyerPostState,
                        trade::Column::SellerClosed,
                        trade::Column::SellerPostState,
                        trade::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&self.db)
            .await
            .map_err(query_err)?;
        saved.try_into()
    }

    async fn list_trades(
        &self,
        user_id: Uuid,
        side: Side,
        state: TradeState,
    ) -> Result<Vec<Trade>, StoreError> {
        let user_column = match side {
            Side::Buyer => trade::Column::BuyerUserId,
            Side::Seller => trade::Column::SellerUserId,
        };

        let models = TradeEntity::find()
            .filter(trade::Column::State.eq(state.as_str()))
            .filter(user_column.eq(user_id))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        models.into_iter().map(TryInto::try_into).collect()
    }
}
