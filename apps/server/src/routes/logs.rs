//! Historical log browsing: year → month → day drill-down plus search.
//!
//! ```text
//! GET /logs/years                     [2024, 2023]
//! GET /logs/2024                      per-month activity buckets
//! GET /logs/2024/6                    per-day activity buckets
//! GET /logs/2024/6/15                 every transaction that day
//! GET /logs/search?q=&startDate=&endDate=
//! ```
//!
//! Buckets are sparse; months and days without activity are omitted.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use stockbook_core::period::{day_bounds, end_of_day_exclusive, month_bounds, start_of_day, year_bounds};
use stockbook_core::validation::validate_search_query;
use stockbook_core::Transaction;
use stockbook_db::{DayBucket, MonthBucket, SearchFilter};

async fn list_years(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<i64>>> {
    Ok(Json(state.db.reports().list_years().await?))
}

async fn list_months(
    State(state): State<Arc<AppState>>,
    Path(year): Path<i32>,
) -> ApiResult<Json<Vec<MonthBucket>>> {
    let range = year_bounds(year)
        .ok_or_else(|| ApiError::invalid_date(format!("Invalid year: {year}")))?;
    Ok(Json(state.db.reports().month_buckets(&range).await?))
}

async fn list_days(
    State(state): State<Arc<AppState>>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<Json<Vec<DayBucket>>> {
    let range = month_bounds(year, month)
        .ok_or_else(|| ApiError::invalid_date(format!("Invalid month: {year}-{month}")))?;
    Ok(Json(state.db.reports().day_buckets(&range).await?))
}

async fn day_detail(
    State(state): State<Arc<AppState>>,
    Path((year, month, day)): Path<(i32, u32, u32)>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let range = day_bounds(year, month, day).ok_or_else(|| {
        ApiError::invalid_date(format!("Invalid date: {year}-{month}-{day}"))
    })?;
    Ok(Json(state.db.reports().day_detail(&range).await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub q: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Free-text and/or date-range ledger search. With nothing to filter on
/// the contract is an empty list, not the full ledger.
async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let text = match query.q.as_deref() {
        Some(raw) => {
            let trimmed = validate_search_query(raw)?;
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        None => None,
    };

    if let (Some(start), Some(end)) = (query.start_date, query.end_date) {
        if start > end {
            return Err(ApiError::invalid_date("startDate is after endDate"));
        }
    }

    let filter = SearchFilter {
        query: text,
        start: query.start_date.map(start_of_day),
        // endDate is inclusive at the API; expand to the next midnight.
        end: query.end_date.map(end_of_day_exclusive),
    };

    Ok(Json(state.db.reports().search(&filter).await?))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/years", get(list_years))
        .route("/search", get(search))
        .route("/:year", get(list_months))
        .route("/:year/:month", get(list_days))
        .route("/:year/:month/:day", get(day_detail))
}
