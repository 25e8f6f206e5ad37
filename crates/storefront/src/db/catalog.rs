//! Catalog repository for categories and products.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use merch_core::{CategoryId, Price, ProductId, Slug};

use super::RepositoryError;
use crate::models::{Category, NewProduct, Product};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    slug: String,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let slug = Slug::parse(&row.slug).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid slug in database: {e}"))
        })?;
        Ok(Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    category_id: i64,
    name: String,
    description: String,
    image: Option<String>,
    price: f64,
    stock: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;
        let stock = u32::try_from(row.stock).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative stock in database: {}", row.stock))
        })?;
        Ok(Self {
            id: ProductId::new(row.id),
            category_id: CategoryId::new(row.category_id),
            name: row.name,
            description: row.description,
            image: row.image,
            price,
            stock,
            is_active: row.is_active,
            created_at: row.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "p.id, p.category_id, p.name, p.description, p.image, \
                               p.price, p.stock, p.is_active, p.created_at";

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    pub async fn create_category(
        &self,
        name: &str,
        slug: &Slug,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(
            r"
            INSERT INTO storefront.categories (name, slug)
            VALUES ($1, $2)
            RETURNING id, name, slug
            ",
        )
        .bind(name)
        .bind(slug.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "category"))?;

        row.try_into()
    }

    /// Get a category by its slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(&self, slug: &Slug) -> Result<Option<Category>, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM storefront.categories WHERE slug = $1",
        )
        .bind(slug.as_str())
        .fetch_optional(self.pool)
        .await?
        .map(Category::try_from)
        .transpose()
    }

    /// List all categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, slug FROM storefront.categories ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Category::try_from)
        .collect()
    }

    /// Delete a category and, through the foreign key cascade, its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no category has this slug.
    pub async fn delete_category(&self, slug: &Slug) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.categories WHERE slug = $1")
            .bind(slug.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Constraint` if a column limit is exceeded.
    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let stock = i32::try_from(product.stock)
            .map_err(|_| RepositoryError::Constraint(format!("stock {} too large", product.stock)))?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            INSERT INTO storefront.products AS p
                (category_id, name, description, image, price, stock, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(product.category_id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.image.as_deref())
        .bind(product.price.amount())
        .bind(stock)
        .bind(product.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "product"))?;

        row.try_into()
    }

    /// List products, newest first.
    ///
    /// `category` restricts the listing to one category; `active_only` hides
    /// deactivated products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(
        &self,
        category: Option<&Slug>,
        active_only: bool,
    ) -> Result<Vec<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM storefront.products p
            JOIN storefront.categories c ON c.id = p.category_id
            WHERE ($1::TEXT IS NULL OR c.slug = $1)
              AND (NOT $2 OR p.is_active)
            ORDER BY p.created_at DESC, p.id DESC
            "
        ))
        .bind(category.map(Slug::as_str))
        .bind(active_only)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(Product::try_from)
        .collect()
    }

    /// Show or hide a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_product_active(
        &self,
        id: ProductId,
        is_active: bool,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE storefront.products SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
