//! Product API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::product::ProductFilter;
use crate::db::repository::{CategoryRepository, ProductRepository, parse_id};
use crate::utils::validation::{MAX_NAME_LEN, validate_money, validate_required_text};
use crate::utils::{ApiResponse, AppError, AppResult, ok};

/// Query params for the catalog listing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// GET /api/products - 商品列表 (active only)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    let category = match &query.category {
        Some(id) => Some(parse_id(id, "category")?),
        None => None,
    };

    let repo = ProductRepository::new(state.db.clone());
    let products = repo
        .find_listed(ProductFilter {
            category,
            featured: query.featured,
            search: query.search,
        })
        .await?;
    Ok(ok(products))
}

/// GET /api/products/:id - 商品详情
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {} not found", id)))?;
    Ok(ok(product))
}

/// POST /api/products - 创建商品 (admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_money(payload.price, "price")?;
    if let Some(discounted) = payload.discounted_price {
        validate_money(discounted, "discounted_price")?;
        if discounted > payload.price {
            return Err(AppError::validation(
                "discounted_price must not exceed price",
            ));
        }
    }

    // Category must exist
    let categories = CategoryRepository::new(state.db.clone());
    categories
        .find_by_id(&payload.category.to_string())
        .await?
        .ok_or_else(|| AppError::validation("Category not found"))?;

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(payload).await?;
    Ok(ok(product))
}

/// PUT /api/products/:id - 更新商品 (admin)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_money(price, "price")?;
    }
    if let Some(Some(discounted)) = payload.discounted_price {
        validate_money(discounted, "discounted_price")?;
    }
    if let Some(category) = &payload.category {
        CategoryRepository::new(state.db.clone())
            .find_by_id(&category.to_string())
            .await?
            .ok_or_else(|| AppError::validation("Category not found"))?;
    }

    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, payload).await?;

    // Price sanity after merge
    if let Some(discounted) = product.discounted_price
        && discounted > product.price
    {
        tracing::warn!(product = %id, "Discounted price exceeds price after update");
    }

    Ok(ok(product))
}

/// DELETE /api/products/:id - 下架商品 (admin, soft delete)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<bool>>> {
    let repo = ProductRepository::new(state.db.clone());
    let result = repo.delete(&id).await?;
    Ok(ok(result))
}
