//! Product catalog endpoints.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use stockbook_core::validation::{validate_amount_cents, validate_name};
use stockbook_core::Product;
use stockbook_db::{ProductInput, ProductWithCategory};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub low_stock_threshold: Option<i64>,
}

impl ProductPayload {
    fn validate(&self) -> ApiResult<()> {
        validate_name("name", &self.name)?;
        validate_amount_cents("costPriceCents", self.cost_price_cents)?;
        validate_amount_cents("sellingPriceCents", self.selling_price_cents)?;
        if self.quantity < 0 {
            return Err(ApiError::validation("quantity must not be negative"));
        }
        Ok(())
    }

    fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name.trim().to_string(),
            category_id: self.category_id,
            quantity: self.quantity,
            cost_price_cents: self.cost_price_cents,
            selling_price_cents: self.selling_price_cents,
            supplier: self.supplier,
            notes: self.notes,
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

/// A product as the API returns it: catalog fields plus the resolved
/// category name and the presentation-only low-stock alert flag.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub low_stock: bool,
}

impl From<ProductWithCategory> for ProductResponse {
    fn from(row: ProductWithCategory) -> Self {
        let low_stock = row.product.is_low_stock();
        ProductResponse {
            product: row.product,
            category_name: row.category_name,
            low_stock,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn list_products(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ProductResponse>>> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProductResponse>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product.into()))
}

async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProductPayload>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    payload.validate()?;

    let product = state.db.products().insert(payload.into_input()).await?;
    let low_stock = product.is_low_stock();
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            category_name: None,
            low_stock,
            product,
        }),
    ))
}

async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> ApiResult<Json<ProductResponse>> {
    payload.validate()?;

    state.db.products().update(&id, payload.into_input()).await?;
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {id}")))?;
    Ok(Json(product.into()))
}

async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}
