//! Collection endpoints. Collections are addressed by slug.

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use inventory_core::{CollectionCreate, CollectionUpdate, Entity, ProductCollection};

use super::{PageQuery, slug_param};
use crate::db::CollectionFilter;
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Query string for `GET /collections/`.
#[derive(Debug, Default, Deserialize)]
pub struct CollectionQuery {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
    /// Only active (`true`) or inactive (`false`) collections.
    pub active: Option<bool>,
    /// Case-insensitive name substring.
    pub q: Option<String>,
}

impl CollectionQuery {
    fn filter(&self) -> CollectionFilter {
        CollectionFilter {
            active: self.active,
            name_contains: self.q.clone().filter(|q| !q.trim().is_empty()),
        }
    }
}

/// `GET /collections/`
pub async fn index(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(query): Query<CollectionQuery>,
) -> Result<Json<Vec<ProductCollection>>, AppError> {
    let page = PageQuery {
        skip: query.skip,
        limit: query.limit,
    }
    .resolve(state.pagination())?;

    let filter = query.filter();
    let collections = if filter == CollectionFilter::default() {
        state.collections().list(page).await?
    } else {
        state.collections().find(&filter, page).await?
    };
    Ok(Json(collections))
}

/// `GET /collections/{slug}`
pub async fn show(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
) -> Result<Json<ProductCollection>, AppError> {
    let slug = slug_param(&slug, ProductCollection::NAME)?;
    Ok(Json(state.collections().get_by_slug(&slug).await?))
}

/// `POST /collections/`
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(input): Json<CollectionCreate>,
) -> Result<(StatusCode, Json<ProductCollection>), AppError> {
    let collection = state.collections().create(input).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

/// `PUT /collections/{slug}`
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
    Json(changes): Json<CollectionUpdate>,
) -> Result<Json<ProductCollection>, AppError> {
    let slug = slug_param(&slug, ProductCollection::NAME)?;
    Ok(Json(state.collections().update(&slug, changes).await?))
}

/// `POST /collections/{slug}/activate`
pub async fn activate(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
) -> Result<Json<ProductCollection>, AppError> {
    let slug = slug_param(&slug, ProductCollection::NAME)?;
    Ok(Json(state.collections().activate(&slug).await?))
}

/// `POST /collections/{slug}/deactivate`
pub async fn deactivate(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
) -> Result<Json<ProductCollection>, AppError> {
    let slug = slug_param(&slug, ProductCollection::NAME)?;
    Ok(Json(state.collections().deactivate(&slug).await?))
}

/// `DELETE /collections/{slug}`
pub async fn destroy(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
) -> Result<StatusCode, AppError> {
    let slug = slug_param(&slug, ProductCollection::NAME)?;
    state.collections().delete(&slug).await?;
    Ok(StatusCode::NO_CONTENT)
}
