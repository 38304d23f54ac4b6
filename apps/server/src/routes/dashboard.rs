//! Dashboard endpoint: KPIs plus chart payloads for one period.
//!
//! The period is an explicit `startDate`/`endDate` pair; when the caller
//! sends neither, the handler defaults to the current calendar month.
//! The default lives HERE, not in the reporting layer, so reports stay
//! pure range-in/numbers-out.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use stockbook_core::period::{end_of_day_exclusive, month_of, start_of_day, trailing_months, DateRange};
use stockbook_core::reporting::{summarize, KpiSummary};
use stockbook_db::{CategoryStock, MonthlyRevenue};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodDto {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Low-stock alert entry for the dashboard.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LowStockProduct {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub low_stock_threshold: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Display currency code from server config.
    pub currency: String,
    pub period: PeriodDto,
    #[serde(flatten)]
    pub kpi: KpiSummary,
    pub stock_by_category: Vec<CategoryStock>,
    /// Trailing 12 calendar months of sales revenue, sparse.
    pub revenue_trend: Vec<MonthlyRevenue>,
    pub low_stock_products: Vec<LowStockProduct>,
}

// =============================================================================
// Handler
// =============================================================================

fn resolve_period(query: &SummaryQuery) -> ApiResult<(DateRange, PeriodDto)> {
    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => {
            if start > end {
                return Err(ApiError::invalid_date("startDate is after endDate"));
            }
            Ok((
                DateRange {
                    start: start_of_day(start),
                    end: end_of_day_exclusive(end),
                },
                PeriodDto {
                    start_date: start,
                    end_date: end,
                },
            ))
        }
        (None, None) => {
            let range = month_of(Utc::now());
            Ok((
                range,
                PeriodDto {
                    start_date: range.start.date_naive(),
                    // range.end is exclusive; the reported period end is
                    // the last day inside it.
                    end_date: range.end.date_naive().pred_opt().unwrap_or_else(|| range.start.date_naive()),
                },
            ))
        }
        _ => Err(ApiError::invalid_date(
            "startDate and endDate must be supplied together",
        )),
    }
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<DashboardSummary>> {
    let (range, period) = resolve_period(&query)?;

    let reports = state.db.reports();
    let sales = reports.sales_in_range(&range).await?;
    let expenses = reports.expense_total(&range).await?;
    let kpi = summarize(&sales, expenses);

    let stock_by_category = reports.stock_by_category().await?;
    let revenue_trend = reports
        .revenue_by_month(&trailing_months(Utc::now(), 12))
        .await?;

    let low_stock_products = state
        .db
        .products()
        .list()
        .await?
        .into_iter()
        .filter(|row| row.product.is_low_stock())
        .map(|row| LowStockProduct {
            id: row.product.id,
            name: row.product.name,
            quantity: row.product.quantity,
            low_stock_threshold: row.product.low_stock_threshold,
        })
        .collect();

    Ok(Json(DashboardSummary {
        currency: state.config.currency.clone(),
        period,
        kpi,
        stock_by_category,
        revenue_trend,
        low_stock_products,
    }))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/summary", get(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_explicit_period_is_inclusive_of_end_date() {
        let query = SummaryQuery {
            start_date: Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()),
        };
        let (range, period) = resolve_period(&query).unwrap();
        assert_eq!(range.start, "2024-06-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(range.end, "2024-07-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(period.end_date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn test_reversed_period_rejected() {
        let query = SummaryQuery {
            start_date: Some(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()),
            end_date: Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
        };
        assert!(resolve_period(&query).is_err());
    }

    #[test]
    fn test_half_supplied_period_rejected() {
        let query = SummaryQuery {
            start_date: Some(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()),
            end_date: None,
        };
        assert!(resolve_period(&query).is_err());
    }

    #[test]
    fn test_absent_period_defaults_to_current_month() {
        let query = SummaryQuery {
            start_date: None,
            end_date: None,
        };
        let (range, _) = resolve_period(&query).unwrap();
        assert!(range.contains(Utc::now()));
    }
}
