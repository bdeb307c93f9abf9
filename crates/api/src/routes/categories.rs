//! Category endpoints. Categories are addressed by slug.

use axum::{extract::State, http::StatusCode};

use inventory_core::{CategoryCreate, CategoryUpdate, Entity, ProductCategory};

use super::{PageQuery, slug_param};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `GET /categories/`
pub async fn index(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<ProductCategory>>, AppError> {
    let page = query.resolve(state.pagination())?;
    Ok(Json(state.categories().list(page).await?))
}

/// `GET /categories/{slug}`
pub async fn show(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
) -> Result<Json<ProductCategory>, AppError> {
    let slug = slug_param(&slug, ProductCategory::NAME)?;
    Ok(Json(state.categories().get_by_slug(&slug).await?))
}

/// `POST /categories/`
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(input): Json<CategoryCreate>,
) -> Result<(StatusCode, Json<ProductCategory>), AppError> {
    let category = state.categories().create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `PUT /categories/{slug}`
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
    Json(changes): Json<CategoryUpdate>,
) -> Result<Json<ProductCategory>, AppError> {
    let slug = slug_param(&slug, ProductCategory::NAME)?;
    Ok(Json(state.categories().update(&slug, changes).await?))
}

/// `DELETE /categories/{slug}`
pub async fn destroy(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let slug = slug_param(&slug, ProductCategory::NAME)?;
    state.categories().delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
