//! Trade handlers - the close endpoint and the caller's trade listing.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use bartr_shared::ApiResponse;
use bartr_shared::dto::{CloseTradeRequest, TradeListQuery};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/trades/{trade_id}/close
///
/// Closes the caller's chosen side of the trade. One atomic transition:
/// either the whole update set lands or the trade is untouched.
pub async fn close(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CloseTradeRequest>,
) -> AppResult<HttpResponse> {
    let trade_id = path.into_inner();
    let side = body.into_inner().side;

    tracing::debug!(%trade_id, %side, user_id = %identity.user_id, "close requested");

    let trade = state.closer.close_side(trade_id, side).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(trade)))
}

/// GET /api/trades?side=buyer&state=PENDING
///
/// Trades where the caller sits on the given side in the given state.
pub async fn list(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<TradeListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let trades = state
        .store
        .list_trades(identity.user_id, query.side, query.state)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(trades)))
}
