//! Bill endpoints: recording sales and reading the sales history.
//!
//! ## Recording
//! ```text
//! POST /bills {cashier_id, total_amount, items: [...]}
//!      │
//!      ├── NewSale::validate()   → 400 on missing fields, empty items,
//!      │                           bad quantities or mismatched totals
//!      ├── bills().record_sale() → one transaction, header + lines
//!      │                           400 on unknown item ids
//!      ▼
//! 200 {"message": "Bill generated successfully!", "bill_id": 17}
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use store_core::validation::validate_search_query;
use store_core::{Bill, BillDetail, NewSale, SalesSummary};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query string of `GET /bills`.
#[derive(Debug, Default, Deserialize)]
pub struct BillListQuery {
    /// Substring of the bill id or cashier id.
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// Body returned by `POST /bills`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillCreated {
    pub message: String,
    pub bill_id: i64,
}

/// `POST /bills`
pub async fn record_bill(
    State(state): State<AppState>,
    payload: Result<Json<NewSale>, JsonRejection>,
) -> ApiResult<Json<BillCreated>> {
    let Json(sale) = payload?;
    let draft = sale.validate()?;

    let bill_id = state.db.bills().record_sale(&draft).await?;

    Ok(Json(BillCreated {
        message: "Bill generated successfully!".to_string(),
        bill_id,
    }))
}

/// `GET /bills`
///
/// Newest first. `limit` defaults to and is capped at `BILLS_PAGE_LIMIT`.
pub async fn list_bills(
    State(state): State<AppState>,
    query: Result<Query<BillListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Bill>>> {
    let Query(query) = query?;
    let search = validate_search_query(query.search.as_deref())?;

    let max = state.config.bills_page_limit;
    let limit = query.limit.unwrap_or(max).min(max);
    let offset = query.offset.unwrap_or(0);

    let bills = state
        .db
        .bills()
        .list(search.as_deref(), limit, offset)
        .await?;
    Ok(Json(bills))
}

/// `GET /bills/{id}`
pub async fn get_bill(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<BillDetail>> {
    let Path(id) = id?;

    state
        .db
        .bills()
        .get_detail(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Bill", id))
}

/// `GET /bills/summary`
pub async fn sales_summary(State(state): State<AppState>) -> ApiResult<Json<SalesSummary>> {
    let summary = state.db.bills().summary().await?;
    Ok(Json(summary))
}
