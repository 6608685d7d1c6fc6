//! Currency endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use shared::error::AppError;

use super::ApiResult;
use crate::currency::{Conversion, CurrencyError, MAX_CONVERT_AMOUNT, RateTable};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/currency/rates", get(get_rates))
        .route("/api/currency/convert", get(convert))
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

/// GET /api/currency/rates
pub async fn get_rates(State(state): State<AppState>) -> Json<RateTable> {
    Json(state.currency.rates().await)
}

/// GET /api/currency/convert?amount=&from=&to=
pub async fn convert(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> ApiResult<Conversion> {
    if !query.amount.is_finite() || query.amount < 0.0 {
        return Err(AppError::validation("amount must be a non-negative number").into());
    }
    if query.amount > MAX_CONVERT_AMOUNT {
        return Err(AppError::from(CurrencyError::OutOfRange(query.amount)).into());
    }
    let conversion = state
        .currency
        .convert(query.amount, &query.from, &query.to)
        .await
        .map_err(AppError::from)?;
    Ok(Json(conversion))
}
