//! Ledger endpoints: apply and browse transactions.
//!
//! `POST /` takes a [`TransactionRequest`] directly; validation and stock
//! rules run in the engine, atomicity in the repository. The handler only
//! maps outcomes to HTTP.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use stockbook_core::engine::TransactionRequest;
use stockbook_core::Transaction;

async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.db.transactions().list().await?))
}

async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state
        .db
        .transactions()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Transaction not found: {id}")))?;
    Ok(Json(transaction))
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let transaction = state.db.transactions().apply(&request).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/:id", get(get_transaction))
}
