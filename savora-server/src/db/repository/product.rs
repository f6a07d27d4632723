//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Product, ProductCreate, ProductStatus, ProductUpdate};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

/// Listing filters for the public catalog
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category: Option<RecordId>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Active products, optionally filtered by category / featured / title search
    pub async fn find_listed(&self, filter: ProductFilter) -> RepoResult<Vec<Product>> {
        let mut query = String::from("SELECT * FROM product WHERE status = 'active'");
        if filter.category.is_some() {
            query.push_str(" AND category = $category");
        }
        if filter.featured.is_some() {
            query.push_str(" AND is_featured = $featured");
        }
        if filter.search.is_some() {
            query.push_str(" AND string::lowercase(title) CONTAINS string::lowercase($search)");
        }
        query.push_str(" ORDER BY title");

        let mut request = self.base.db().query(query);
        if let Some(category) = filter.category {
            request = request.bind(("category", category));
        }
        if let Some(featured) = filter.featured {
            request = request.bind(("featured", featured));
        }
        if let Some(search) = filter.search {
            request = request.bind(("search", search));
        }

        let products: Vec<Product> = request.await?.take(0)?;
        Ok(products)
    }

    /// Find product by id (excluding soft-deleted)
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let record = parse_id(id, "product")?;
        let product: Option<Product> = self.base.db().select(record).await?;
        Ok(product.filter(|p| p.status != ProductStatus::Deleted))
    }

    /// Fetch products for a set of ids (cart pricing)
    pub async fn find_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM product WHERE id IN $ids AND status != 'deleted'")
            .bind(("ids", ids.to_vec()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE product SET
                    title = $title,
                    price = $price,
                    discounted_price = $discounted_price,
                    description = $description,
                    status = 'active',
                    is_featured = $is_featured,
                    category = $category,
                    created_at = $created_at
                RETURN AFTER"#,
            )
            .bind(("title", data.title))
            .bind(("price", data.price))
            .bind(("discounted_price", data.discounted_price))
            .bind(("description", data.description))
            .bind(("is_featured", data.is_featured))
            .bind(("category", data.category))
            .bind(("created_at", chrono::Utc::now()))
            .await?;

        let created: Option<Product> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let record = parse_id(id, "product")?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))?;

        let title = data.title.unwrap_or(existing.title);
        let price = data.price.unwrap_or(existing.price);
        // Outer None = untouched; Some(None) clears the discount
        let discounted_price = match data.discounted_price {
            Some(value) => value,
            None => existing.discounted_price,
        };
        let description = data.description.or(existing.description);
        let status = data.status.unwrap_or(existing.status);
        let is_featured = data.is_featured.unwrap_or(existing.is_featured);
        let category = data.category.unwrap_or(existing.category);

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $record SET
                    title = $title,
                    price = $price,
                    discounted_price = $discounted_price,
                    description = $description,
                    status = $status,
                    is_featured = $is_featured,
                    category = $category
                RETURN AFTER"#,
            )
            .bind(("record", record))
            .bind(("title", title))
            .bind(("price", price))
            .bind(("discounted_price", discounted_price))
            .bind(("description", description))
            .bind(("status", status))
            .bind(("is_featured", is_featured))
            .bind(("category", category))
            .await?;

        let updated: Option<Product> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Soft delete a product (kept on disk for order history)
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let record = parse_id(id, "product")?;
        self.base
            .db()
            .query("UPDATE $record SET status = 'deleted'")
            .bind(("record", record))
            .await?
            .check()?;
        Ok(true)
    }
}
