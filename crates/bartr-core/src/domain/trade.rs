use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Post, PostState};

/// Which half of a trade a request refers to.
///
/// The closing protocol is written once over this type; `other()` supplies
/// the counterpart so buyer and seller never exist as separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buyer,
    Seller,
}

impl Side {
    /// The opposite side of the trade.
    pub fn other(&self) -> Side {
        match self {
            Side::Buyer => Side::Seller,
            Side::Seller => Side::Buyer,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buyer => "buyer",
            Side::Seller => "seller",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Combined state of a trade. PENDING while either side is still open,
/// CLOSED once both sides have closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeState {
    Pending,
    Closed,
}

impl TradeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeState::Pending => "PENDING",
            TradeState::Closed => "CLOSED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(TradeState::Pending),
            "CLOSED" => Some(TradeState::Closed),
            _ => None,
        }
    }
}

/// One half of a trade: a reference to the offered post, its owner, whether
/// this side has closed, and a denormalized snapshot of the post's state.
///
/// The snapshot is kept consistent with the authoritative post row at the
/// moment the side closes - never at any other time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeSide {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub closed: bool,
    pub post_state: PostState,
}

/// Trade entity - a pairing of exactly two posts proposed for exchange.
///
/// Holds reference-style links to its posts, never ownership. Mutated
/// exclusively through the closing protocol; CLOSED is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub state: TradeState,
    pub buyer: TradeSide,
    pub seller: TradeSide,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trade {
    /// Propose a trade between two posts. Both sides start open with the
    /// posts' current states snapshotted.
    pub fn proposed(buyer_post: &Post, seller_post: &Post) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            state: TradeState::Pending,
            buyer: TradeSide {
                post_id: buyer_post.id,
                user_id: buyer_post.user_id,
                closed: false,
                post_state: buyer_post.state,
            },
            seller: TradeSide {
                post_id: seller_post.id,
                user_id: seller_post.user_id,
                closed: false,
                post_state: seller_post.state,
            },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn side(&self, side: Side) -> &TradeSide {
        match side {
            Side::Buyer => &self.buyer,
            Side::Seller => &self.seller,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut TradeSide {
        match side {
            Side::Buyer => &mut self.buyer,
            Side::Seller => &mut self.seller,
        }
    }

    /// Invariant check: the stored state must be CLOSED iff both closed
    /// flags are set.
    pub fn both_sides_closed(&self) -> bool {
        self.buyer.closed && self.seller.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoPoint;

    fn pending_post() -> Post {
        Post::new(
            Uuid::new_v4(),
            "Bike".to_string(),
            "A bike".to_string(),
            vec!["wheels".to_string()],
            GeoPoint { lat: 0.0, lng: 0.0 },
        )
    }

    #[test]
    fn side_other_is_involutive() {
        assert_eq!(Side::Buyer.other(), Side::Seller);
        assert_eq!(Side::Seller.other(), Side::Buyer);
        assert_eq!(Side::Buyer.other().other(), Side::Buyer);
    }

    #[test]
    fn proposed_trade_starts_open() {
        let (a, b) = (pending_post(), pending_post());
        let trade = Trade::proposed(&a, &b);

        assert_eq!(trade.state, TradeState::Pending);
        assert!(!trade.buyer.closed);
        assert!(!trade.seller.closed);
        assert_eq!(trade.side(Side::Buyer).post_id, a.id);
        assert_eq!(trade.side(Side::Seller).post_id, b.id);
        assert!(!trade.both_sides_closed());
    }

    #[test]
    fn side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Buyer).unwrap(), "\"buyer\"");
        assert_eq!(
            serde_json::from_str::<Side>("\"seller\"").unwrap(),
            Side::Seller
        );
    }

    #[test]
    fn states_round_trip_storage_strings() {
        assert_eq!(PostState::parse(PostState::Closed.as_str()), Some(PostState::Closed));
        assert_eq!(TradeState::parse("PENDING"), Some(TradeState::Pending));
        assert_eq!(TradeState::parse("open"), None);
    }
}
