//! The trade-closing protocol.
//!
//! A trade closes through a two-party handshake: each side independently
//! closes its half, and the trade as a whole closes when the second side
//! does. Each close is one atomic batch against the store covering the
//! side's flag, the side's post-state snapshot, the referenced post row,
//! and - when the other side already closed - the combined trade state.
//!
//! Whether the caller is the second closer is decided by a conditional
//! update evaluated inside the store's own transaction snapshot, so two
//! concurrent closers cannot both base their batch on a stale view of the
//! opposite flag.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{PostState, Side, Trade, TradeState};
use crate::error::TradeError;
use crate::ports::{CloseUpdate, TradeStore};

/// Protocol logic for closing trade sides. Holds an injected store handle;
/// one instance serves all requests.
pub struct TradeCloser {
    store: Arc<dyn TradeStore>,
}

impl TradeCloser {
    pub fn new(store: Arc<dyn TradeStore>) -> Self {
        Self { store }
    }

    /// Close one side of a trade.
    ///
    /// Fails with `InvalidState` when the side's post is no longer
    /// PENDING - whether that is seen at the pre-read or at commit time -
    /// and with `NotFound` when the trade or post is missing. Every
    /// failure path leaves the trade and both posts exactly as they were.
    pub async fn close_side(&self, trade_id: Uuid, side: Side) -> Result<Trade, TradeError> {
        let trade = self.store.get_trade(trade_id).await?;
        let post_id = trade.side(side).post_id;
        let post = self.store.get_post(post_id).await?;

        if post.state != PostState::Pending {
            tracing::debug!(%trade_id, %side, %post_id, "close rejected, post not pending");
            return Err(TradeError::InvalidState {
                post_id,
                reason: "is not available for closing",
            });
        }

        let updates = vec![
            CloseUpdate::ExpectPostState {
                post_id,
                expected: PostState::Pending,
            },
            CloseUpdate::SetSideClosed { side },
            CloseUpdate::SetSidePostState {
                side,
                state: PostState::Closed,
            },
            CloseUpdate::SetPostState {
                post_id,
                state: PostState::Closed,
            },
            CloseUpdate::WhenSideClosed {
                side: side.other(),
                then: vec![
                    CloseUpdate::SetTradeState {
                        state: TradeState::Closed,
                    },
                    CloseUpdate::SetSidePostState {
                        side: side.other(),
                        state: PostState::Closed,
                    },
                ],
            },
        ];

        let trade = self.store.apply_close_transition(trade_id, updates).await?;

        tracing::info!(
            %trade_id,
            %side,
            trade_state = trade.state.as_str(),
            "trade side closed"
        );

        Ok(trade)
    }
}
