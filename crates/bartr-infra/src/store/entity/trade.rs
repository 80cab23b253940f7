//! Trade entity for SeaORM. The two sides are flattened into columns.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use bartr_core::domain::{PostState, Trade, TradeSide, TradeState};
use bartr_core::error::StoreError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "trades")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub state: String,
    pub buyer_post_id: Uuid,
    pub buyer_user_id: Uuid,
    pub buyer_closed: bool,
    pub buyer_post_state: String,
    pub seller_post_id: Uuid,
    pub seller_user_id: Uuid,
    pub seller_closed: bool,
    pub seller_post_state: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_post_state(trade_id: Uuid, s: &str) -> Result<PostState, StoreError> {
    PostState::parse(s).ok_or_else(|| {
        StoreError::Query(format!("trade {} has unknown post state {}", trade_id, s))
    })
}

/// Conversion from SeaORM Model to domain Trade.
impl TryFrom<Model> for Trade {
    type Error = StoreError;

    fn try_from(model: Model) -> Result<Self, StoreError> {
        let state = TradeState::parse(&model.state).ok_or_else(|| {
            StoreError::Query(format!(
                "trade {} has unknown state {}",
                model.id, model.state
            ))
        })?;

        Ok(Self {
            id: model.id,
            state,
            buyer: TradeSide {
                post_id: model.buyer_post_id,
                user_id: model.buyer_user_id,
                closed: model.buyer_closed,
                post_state: parse_post_state(model.id, &model.buyer_post_state)?,
            },
            seller: TradeSide {
                post_id: model.seller_post_id,
                user_id: model.seller_user_id,
                closed: model.seller_closed,
                post_state: parse_post_state(model.id, &model.seller_post_state)?,
            },
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from domain Trade to SeaORM ActiveModel.
impl From<Trade> for ActiveModel {
    fn from(trade: Trade) -> Self {
        Self {
            id: Set(trade.id),
            state: Set(trade.state.as_str().to_string()),
            buyer_post_id: Set(trade.buyer.post_id),
            buyer_user_id: Set(trade.buyer.user_id),
            buyer_closed: Set(trade.buyer.closed),
            buyer_post_state: Set(trade.buyer.post_state.as_str().to_string()),
            seller_post_id: Set(trade.seller.post_id),
            seller_user_id: Set(trade.seller.user_id),
            seller_closed: Set(trade.seller.closed),
            seller_post_state: Set(trade.seller.post_state.as_str().to_string()),
            created_at: Set(trade.created_at.into()),
            updated_at: Set(trade.updated_at.into()),
        }
    }
}
