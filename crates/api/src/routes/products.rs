//! Product endpoints. Products are addressed by id.

use axum::{extract::State, http::StatusCode};

use inventory_core::{
    CategoryId, CollectionId, Entity, Product, ProductCategory, ProductCollection, ProductCreate,
    ProductId, ProductUpdate,
};

use super::{PageQuery, slug_param};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// `GET /products/`
pub async fn index(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let page = query.resolve(state.pagination())?;
    Ok(Json(state.products().list(page).await?))
}

/// `GET /products/{product_id}`
pub async fn show(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.products().get(product_id).await?))
}

/// `GET /products/slug/{slug}`
pub async fn show_by_slug(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
) -> Result<Json<Product>, AppError> {
    let slug = slug_param(&slug, Product::NAME)?;
    Ok(Json(state.products().get_by_slug(&slug).await?))
}

/// `GET /products/category/{category_id}`
pub async fn by_category(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(category_id): Path<CategoryId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let page = query.resolve(state.pagination())?;
    Ok(Json(
        state
            .products()
            .list_by_category_id(category_id, page)
            .await?,
    ))
}

/// `GET /products/category/slug/{slug}`
pub async fn by_category_slug(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let page = query.resolve(state.pagination())?;
    let slug = slug_param(&slug, ProductCategory::NAME)?;
    Ok(Json(
        state.products().list_by_category_slug(&slug, page).await?,
    ))
}

/// `GET /products/collection/{collection_id}`
pub async fn by_collection(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(collection_id): Path<CollectionId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let page = query.resolve(state.pagination())?;
    Ok(Json(
        state
            .products()
            .list_by_collection_id(collection_id, page)
            .await?,
    ))
}

/// `GET /products/collection/slug/{slug}`
pub async fn by_collection_slug(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Product>>, AppError> {
    let page = query.resolve(state.pagination())?;
    let slug = slug_param(&slug, ProductCollection::NAME)?;
    Ok(Json(
        state
            .products()
            .list_by_collection_slug(&slug, page)
            .await?,
    ))
}

/// `POST /products/`
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(input): Json<ProductCreate>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    let product = state.products().create(input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/{product_id}`
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(product_id): Path<ProductId>,
    Json(changes): Json<ProductUpdate>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(state.products().update(product_id, changes).await?))
}

/// `DELETE /products/{product_id}`
pub async fn destroy(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode, AppError> {
    state.products().delete(product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
