//! Expense endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::AppState;
use stockbook_core::validation::{validate_amount_cents, validate_name};
use stockbook_core::Expense;
use stockbook_db::ExpenseInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePayload {
    pub title: String,
    pub amount_cents: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExpensePayload {
    fn validate(&self) -> ApiResult<()> {
        validate_name("title", &self.title)?;
        validate_amount_cents("amountCents", self.amount_cents)?;
        Ok(())
    }

    fn into_input(self) -> ExpenseInput {
        ExpenseInput {
            title: self.title.trim().to_string(),
            amount_cents: self.amount_cents,
            category: self.category,
            date: self.date,
            notes: self.notes,
        }
    }
}

async fn list_expenses(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Expense>>> {
    Ok(Json(state.db.expenses().list().await?))
}

async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExpensePayload>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    payload.validate()?;
    let expense = state.db.expenses().insert(payload.into_input()).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ExpensePayload>,
) -> ApiResult<Json<Expense>> {
    payload.validate()?;
    state.db.expenses().update(&id, payload.into_input()).await?;
    let expense = state
        .db
        .expenses()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| crate::error::ApiError::not_found(format!("Expense not found: {id}")))?;
    Ok(Json(expense))
}

async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.expenses().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_expenses).post(create_expense))
        .route("/:id", axum::routing::put(update_expense).delete(delete_expense))
}
