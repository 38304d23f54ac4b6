//! Category endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use stockbook_core::validation::validate_name;
use stockbook_core::Category;
use stockbook_db::CategoryInput;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryPayload {
    fn validate(&self) -> ApiResult<()> {
        validate_name("name", &self.name)?;
        Ok(())
    }

    fn into_input(self) -> CategoryInput {
        CategoryInput {
            name: self.name.trim().to_string(),
            description: self.description,
        }
    }
}

async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    let category = state
        .db
        .categories()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Category not found: {id}")))?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    payload.validate()?;
    let category = state.db.categories().insert(payload.into_input()).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> ApiResult<Json<Category>> {
    payload.validate()?;
    state.db.categories().update(&id, payload.into_input()).await?;
    let category = state
        .db
        .categories()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Category not found: {id}")))?;
    Ok(Json(category))
}

/// Deleting a category leaves its products uncategorized (the schema's
/// ON DELETE SET NULL), never deletes them.
async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.categories().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/:id",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}
